pub mod dispatcher;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};

pub const TEMPLATE_ORDER_PLACED: &str = "order-placed";
pub const TEMPLATE_DELIVERY_ASSIGNED: &str = "delivery-assigned";

/// A transactional email: a template id plus a flat key/value payload,
/// which is all the external provider's API accepts.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub template: &'static str,
    pub to: String,
    pub params: Map<String, Value>,
}

/// Transport seam for the external email provider.
pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), AppError>>;
}

/// Sends via the provider's HTTP API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl Mailer for HttpMailer {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), AppError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        async move {
            let response = client
                .post(&endpoint)
                .json(&message)
                .send()
                .await
                .map_err(|err| AppError::ExternalService(format!("email send failed: {err}")))?;

            if !response.status().is_success() {
                return Err(AppError::ExternalService(format!(
                    "email provider returned {}",
                    response.status()
                )));
            }

            Ok(())
        }
        .boxed()
    }
}

/// Records sends instead of performing them; failure can be injected.
/// Used by tests in place of the real provider.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_templates(&self) -> Vec<&'static str> {
        self.sent
            .lock()
            .expect("recording mailer lock poisoned")
            .iter()
            .map(|message| message.template)
            .collect()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), AppError>> {
        if self.fail.load(Ordering::SeqCst) {
            return async { Err(AppError::ExternalService("mailer down".to_string())) }.boxed();
        }

        self.sent
            .lock()
            .expect("recording mailer lock poisoned")
            .push(message);
        async { Ok(()) }.boxed()
    }
}

/// Work item for the fire-and-forget dispatcher.
#[derive(Debug, Clone)]
pub enum NotificationJob {
    AssignmentMade {
        order_id: Uuid,
        status: OrderStatus,
        agent_email: String,
        agent_name: String,
    },
}

pub fn order_placed_message(admin_email: &str, order: &Order) -> EmailMessage {
    let product_list = order
        .items
        .iter()
        .map(|item| format!("- {} ({} {})", item.name, item.quantity, item.unit))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "A new order is in.\n\nOrder ID: {}\nCustomer: {}\nTotal Amount: {:.2}\n\nProducts Ordered:\n{}\n\nCheck the admin dashboard for full details.",
        order.id, order.customer_name, order.total_amount, product_list
    );

    let mut params = Map::new();
    params.insert("order_id".to_string(), Value::String(order.id.to_string()));
    params.insert(
        "customer_name".to_string(),
        Value::String(order.customer_name.clone()),
    );
    params.insert("total_amount".to_string(), order.total_amount.into());
    params.insert("items_count".to_string(), order.items.len().into());
    params.insert("message".to_string(), Value::String(body));

    EmailMessage {
        template: TEMPLATE_ORDER_PLACED,
        to: admin_email.to_string(),
        params,
    }
}

pub fn assignment_message(
    order_id: Uuid,
    status: OrderStatus,
    agent_email: &str,
    agent_name: &str,
) -> EmailMessage {
    let mut params = Map::new();
    params.insert("order_id".to_string(), Value::String(order_id.to_string()));
    params.insert("status".to_string(), Value::String(status.to_string()));
    params.insert("agent_name".to_string(), Value::String(agent_name.to_string()));

    EmailMessage {
        template: TEMPLATE_DELIVERY_ASSIGNED,
        to: agent_email.to_string(),
        params,
    }
}
