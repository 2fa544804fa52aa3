pub mod assignment;
pub mod checkout;
pub mod status;
