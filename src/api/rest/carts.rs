use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cart::SessionCart;
use crate::engine::checkout::{snapshot_items, ItemRef};
use crate::error::AppError;
use crate::models::order::OrderItem;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/carts/:session_id", get(get_cart).delete(clear_cart))
        .route("/carts/:session_id/items", post(add_item))
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionCart> for CartResponse {
    fn from(cart: SessionCart) -> Self {
        Self {
            subtotal: cart.subtotal(),
            items: cart.items,
            updated_at: cart.updated_at,
        }
    }
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<CartResponse> {
    Json(state.carts.load(&session_id).into())
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(item): Json<ItemRef>,
) -> Result<Json<CartResponse>, AppError> {
    let mut lines = snapshot_items(&state, std::slice::from_ref(&item))?;
    let line = lines.remove(0);

    Ok(Json(state.carts.add_item(&session_id, line).into()))
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> StatusCode {
    state.carts.clear(&session_id);
    StatusCode::NO_CONTENT
}
