use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_placed_total: IntCounter,
    pub status_transitions_total: IntCounterVec,
    pub notifications_total: IntCounterVec,
    pub email_send_seconds: HistogramVec,
    pub location_updates_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_placed_total =
            IntCounter::new("orders_placed_total", "Total orders placed via checkout")
                .expect("valid orders_placed_total metric");

        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "status_transitions_total",
                "Accepted order status transitions by target status",
            ),
            &["to"],
        )
        .expect("valid status_transitions_total metric");

        let notifications_total = IntCounterVec::new(
            Opts::new(
                "notifications_total",
                "Notification emails by template and outcome",
            ),
            &["template", "outcome"],
        )
        .expect("valid notifications_total metric");

        let email_send_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "email_send_seconds",
                "Latency of email provider calls in seconds",
            ),
            &["outcome"],
        )
        .expect("valid email_send_seconds metric");

        let location_updates_total = IntCounter::new(
            "location_updates_total",
            "Total delivery location upserts accepted",
        )
        .expect("valid location_updates_total metric");

        registry
            .register(Box::new(orders_placed_total.clone()))
            .expect("register orders_placed_total");
        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register status_transitions_total");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(email_send_seconds.clone()))
            .expect("register email_send_seconds");
        registry
            .register(Box::new(location_updates_total.clone()))
            .expect("register location_updates_total");

        Self {
            registry,
            orders_placed_total,
            status_transitions_total,
            notifications_total,
            email_send_seconds,
            location_updates_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
