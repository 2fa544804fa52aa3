use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::profile::Role;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub next: OrderStatus,
    /// Profile performing the update; role decides what is permitted.
    pub actor_id: Uuid,
    /// Must be true for the irreversible move to `Delivered`.
    pub confirmed: bool,
}

/// Applies a status change requested through the generic update surface.
/// `Processing` is never reachable here; only the assignment service sets
/// it, together with the agent id.
pub fn apply_status_update(
    state: &AppState,
    order_id: Uuid,
    update: StatusUpdate,
) -> Result<Order, AppError> {
    let actor = state
        .profiles
        .get(&update.actor_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::Validation(format!("unknown actor {}", update.actor_id)))?;

    if update.next == OrderStatus::Processing {
        return Err(AppError::Validation(
            "Processing is set by delivery assignment, not by a status update".to_string(),
        ));
    }

    let mut order = state
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.status.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "order is {} and accepts no further updates",
            order.status
        )));
    }

    if !order.status.can_transition(update.next) {
        return Err(AppError::InvalidTransition(format!(
            "cannot move from {} to {}",
            order.status, update.next
        )));
    }

    match update.next {
        OrderStatus::Cancelled => {
            if actor.role != Role::Admin {
                return Err(AppError::Validation(
                    "only an admin may cancel an order".to_string(),
                ));
            }
        }
        OrderStatus::OutForDelivery | OrderStatus::Delivered => {
            if actor.role != Role::Delivery {
                return Err(AppError::Validation(
                    "only the assigned delivery agent may advance an order".to_string(),
                ));
            }
            if order.delivery_agent_id != Some(actor.id) {
                return Err(AppError::Validation(format!(
                    "agent {} is not assigned to order {order_id}",
                    actor.id
                )));
            }
        }
        OrderStatus::Pending | OrderStatus::Processing => unreachable!("rejected above"),
    }

    if update.next == OrderStatus::Delivered && !update.confirmed {
        return Err(AppError::PreconditionFailed(
            "marking an order Delivered is irreversible and requires confirmation".to_string(),
        ));
    }

    order.status = update.next;
    state
        .metrics
        .status_transitions_total
        .with_label_values(&[&update.next.to_string()])
        .inc();

    info!(order_id = %order_id, status = %update.next, actor_id = %update.actor_id, "order status updated");

    Ok(order.clone())
}
