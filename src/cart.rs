use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::models::order::OrderItem;

/// A shopper's cart for one browser session. Carts live in the store below
/// rather than in ambient page state; callers load on start and save on
/// every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCart {
    pub items: Vec<OrderItem>,
    pub updated_at: DateTime<Utc>,
}

impl SessionCart {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum()
    }
}

/// Session-scoped cart storage, passed explicitly to whoever needs it.
#[derive(Default)]
pub struct CartStore {
    carts: DashMap<String, SessionCart>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cart for the session, or an empty one if none was saved.
    pub fn load(&self, session_id: &str) -> SessionCart {
        self.carts
            .get(session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(SessionCart::empty)
    }

    pub fn save(&self, session_id: &str, mut cart: SessionCart) {
        cart.updated_at = Utc::now();
        self.carts.insert(session_id.to_string(), cart);
    }

    /// Adds a line to the session's cart, merging quantities when the
    /// product is already present. Returns the saved cart.
    pub fn add_item(&self, session_id: &str, line: OrderItem) -> SessionCart {
        let mut cart = self.load(session_id);

        match cart
            .items
            .iter_mut()
            .find(|item| item.product_id == line.product_id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => cart.items.push(line),
        }

        self.save(session_id, cart.clone());
        cart
    }

    pub fn clear(&self, session_id: &str) {
        self.carts.remove(session_id);
    }
}
