use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::profile::{Role, UserProfile};
use crate::state::AppState;

/// One dashboard per staff role, dispatched through this trait instead of
/// branching on the role string at every call site.
pub trait DashboardView: Send + Sync {
    fn title(&self) -> &'static str;
    fn orders(&self, state: &AppState) -> Vec<Order>;
}

/// Every order, newest first.
pub struct AdminView;

impl DashboardView for AdminView {
    fn title(&self) -> &'static str {
        "Order Management"
    }

    fn orders(&self, state: &AppState) -> Vec<Order> {
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

/// Open deliveries for one agent, oldest first. Delivered orders drop off
/// the list; they live in the history view instead.
pub struct DeliveryView {
    pub agent_id: Uuid,
}

impl DashboardView for DeliveryView {
    fn title(&self) -> &'static str {
        "My Deliveries"
    }

    fn orders(&self, state: &AppState) -> Vec<Order> {
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.delivery_agent_id == Some(self.agent_id)
                    && order.status != OrderStatus::Delivered
            })
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        orders
    }
}

pub fn view_for(profile: &UserProfile) -> Result<Box<dyn DashboardView>, AppError> {
    match profile.role {
        Role::Admin => Ok(Box::new(AdminView)),
        Role::Delivery => Ok(Box::new(DeliveryView {
            agent_id: profile.id,
        })),
        Role::User => Err(AppError::Validation(
            "customer accounts have no dashboard".to_string(),
        )),
    }
}
