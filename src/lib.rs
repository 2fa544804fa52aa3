pub mod api;
pub mod cart;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod models;
pub mod notify;
pub mod observability;
pub mod state;
