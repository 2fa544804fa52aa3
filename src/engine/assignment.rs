use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::profile::Role;
use crate::notify::NotificationJob;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub order: Order,
    /// False when the fire-and-forget notification could not be queued.
    /// The assignment itself has still happened.
    pub notification_queued: bool,
}

/// Binds a delivery agent to an order. For a `Pending` order this also moves
/// it to `Processing`; both fields change under the same map-entry lock, so
/// no reader can observe one without the other. A `Processing` order may be
/// reassigned to a different agent; once the order is out for delivery or
/// terminal, assignment is rejected.
pub async fn assign_agent(
    state: &AppState,
    order_id: Uuid,
    delivery_agent_id: Uuid,
) -> Result<AssignmentOutcome, AppError> {
    let agent = state
        .profiles
        .get(&delivery_agent_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| {
            AppError::Validation(format!("unknown delivery agent {delivery_agent_id}"))
        })?;

    if agent.role != Role::Delivery {
        return Err(AppError::Validation(format!(
            "profile {delivery_agent_id} does not have the delivery role"
        )));
    }

    let updated = {
        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        match order.status {
            OrderStatus::Pending => {
                order.delivery_agent_id = Some(delivery_agent_id);
                order.status = OrderStatus::Processing;
                state
                    .metrics
                    .status_transitions_total
                    .with_label_values(&["Processing"])
                    .inc();
            }
            OrderStatus::Processing => {
                // Reassignment before pickup is allowed and overwrites.
                order.delivery_agent_id = Some(delivery_agent_id);
            }
            OrderStatus::OutForDelivery => {
                return Err(AppError::InvalidTransition(
                    "order is already out for delivery and cannot be reassigned".to_string(),
                ));
            }
            OrderStatus::Delivered | OrderStatus::Cancelled => {
                return Err(AppError::InvalidTransition(format!(
                    "order is {} and no longer accepts assignment",
                    order.status
                )));
            }
        }

        order.clone()
    };

    let job = NotificationJob::AssignmentMade {
        order_id: updated.id,
        status: updated.status,
        agent_email: agent.email,
        agent_name: agent.full_name,
    };

    let notification_queued = match state.notify_tx.try_send(job) {
        Ok(()) => true,
        Err(err) => {
            warn!(order_id = %order_id, error = %err, "could not queue assignment notification");
            false
        }
    };

    info!(
        order_id = %order_id,
        agent_id = %delivery_agent_id,
        status = %updated.status,
        notification_queued,
        "delivery agent assigned"
    );

    Ok(AssignmentOutcome {
        order: updated,
        notification_queued,
    })
}
