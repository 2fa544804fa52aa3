use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Latest reported position of a delivery agent. One record per agent,
/// overwritten on every report; no trail is kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeliveryLocation {
    pub delivery_agent_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}
