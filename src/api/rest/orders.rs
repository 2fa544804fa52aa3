use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::assignment::assign_agent;
use crate::engine::checkout::{place_order, snapshot_items, CheckoutInput, ItemRef};
use crate::engine::status::{apply_status_update, StatusUpdate};
use crate::error::AppError;
use crate::models::order::{AddressDetails, Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/assign", post(assign_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_id: Option<Uuid>,
    pub address: AddressDetails,
    /// Either catalog picks to snapshot now, or a session id referencing a
    /// saved cart (whose lines were snapshotted when they were added).
    pub items: Option<Vec<ItemRef>>,
    pub session_id: Option<String>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<Order>, AppError> {
    let items = match (payload.items, &payload.session_id) {
        (Some(refs), _) => snapshot_items(&state, &refs)?,
        (None, Some(session_id)) => {
            let cart = state.carts.load(session_id);
            if cart.items.is_empty() {
                return Err(AppError::Validation(format!(
                    "cart for session {session_id} is empty"
                )));
            }
            cart.items
        }
        (None, None) => {
            return Err(AppError::Validation(
                "checkout needs items or a session_id".to_string(),
            ));
        }
    };

    let order = place_order(
        &state,
        CheckoutInput {
            customer_name: payload.customer_name,
            customer_email: payload.customer_email,
            customer_id: payload.customer_id,
            address: payload.address,
            items,
        },
    )
    .await?;

    if let Some(session_id) = payload.session_id {
        state.carts.clear(&session_id);
    }

    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub customer_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Json<Vec<Order>> {
    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| {
            let order = entry.value();
            query
                .customer_id
                .is_none_or(|id| order.customer_id == Some(id))
                && query
                    .agent_id
                    .is_none_or(|id| order.delivery_agent_id == Some(id))
        })
        .map(|entry| entry.value().clone())
        .collect();

    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order.value().clone()))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub delivery_agent_id: Uuid,
}

#[derive(Serialize)]
pub struct AssignResponse {
    pub order: Order,
    pub notification_queued: bool,
}

async fn assign_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, AppError> {
    let outcome = assign_agent(&state, id, payload.delivery_agent_id).await?;

    Ok(Json(AssignResponse {
        order: outcome.order,
        notification_queued: outcome.notification_queued,
    }))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub actor_id: Uuid,
    #[serde(default)]
    pub confirm: bool,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = apply_status_update(
        &state,
        id,
        StatusUpdate {
            next: payload.status,
            actor_id: payload.actor_id,
            confirmed: payload.confirm,
        },
    )?;

    Ok(Json(order))
}
