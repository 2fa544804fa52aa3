use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::config::Config;
use crate::models::location::DeliveryLocation;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::profile::UserProfile;
use crate::notify::{Mailer, NotificationJob};
use crate::observability::metrics::Metrics;

/// Amounts added on top of the cart subtotal at checkout.
#[derive(Debug, Clone, Copy)]
pub struct Pricing {
    pub tax_rate: f64,
    pub delivery_fee: f64,
}

pub struct AppState {
    pub products: DashMap<Uuid, Product>,
    pub orders: DashMap<Uuid, Order>,
    pub profiles: DashMap<Uuid, UserProfile>,
    pub locations: DashMap<Uuid, DeliveryLocation>,
    pub agent_online: DashMap<Uuid, bool>,
    pub carts: CartStore,
    pub notify_tx: mpsc::Sender<NotificationJob>,
    pub location_events_tx: broadcast::Sender<DeliveryLocation>,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Metrics,
    pub pricing: Pricing,
    pub admin_email: String,
    pub email_timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> (Self, mpsc::Receiver<NotificationJob>) {
        let (notify_tx, notify_rx) = mpsc::channel(config.notify_queue_size);
        let (location_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        (
            Self {
                products: DashMap::new(),
                orders: DashMap::new(),
                profiles: DashMap::new(),
                locations: DashMap::new(),
                agent_online: DashMap::new(),
                carts: CartStore::new(),
                notify_tx,
                location_events_tx,
                mailer,
                metrics: Metrics::new(),
                pricing: Pricing {
                    tax_rate: config.tax_rate,
                    delivery_fee: config.delivery_fee,
                },
                admin_email: config.admin_email.clone(),
                email_timeout: Duration::from_millis(config.email_timeout_ms),
            },
            notify_rx,
        )
    }
}
