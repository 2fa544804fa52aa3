use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry. Orders never reference these live: checkout and the cart
/// copy the fields they need into an `OrderItem` snapshot, so editing or
/// deleting a product leaves historical orders untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub category: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}
