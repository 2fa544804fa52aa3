use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::notify::{assignment_message, EmailMessage, NotificationJob};
use crate::state::AppState;

/// Consumes fire-and-forget notification jobs. Failures and timeouts are
/// logged and counted; nothing here ever propagates an error back to the
/// operation that queued the job.
pub async fn run_notification_dispatcher(
    state: Arc<AppState>,
    mut notify_rx: mpsc::Receiver<NotificationJob>,
) {
    info!("notification dispatcher started");

    while let Some(job) = notify_rx.recv().await {
        let message = build_message(&job);
        let template = message.template;

        let start = Instant::now();
        let outcome = match timeout(state.email_timeout, state.mailer.send(message)).await {
            Ok(Ok(())) => {
                info!(template, "notification sent");
                "success"
            }
            Ok(Err(err)) => {
                warn!(template, error = %err, "notification failed");
                "error"
            }
            Err(_) => {
                warn!(template, "notification timed out");
                "timeout"
            }
        };

        state
            .metrics
            .notifications_total
            .with_label_values(&[template, outcome])
            .inc();
        state
            .metrics
            .email_send_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
    }

    warn!("notification dispatcher stopped: queue channel closed");
}

fn build_message(job: &NotificationJob) -> EmailMessage {
    match job {
        NotificationJob::AssignmentMade {
            order_id,
            status,
            agent_email,
            agent_name,
        } => assignment_message(*order_id, *status, agent_email, agent_name),
    }
}
