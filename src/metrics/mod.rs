//! Prometheus metrics for the incident service.
//!
//! Metrics live in a dedicated registry so the `/metrics` endpoint only
//! exposes what this service records. Counters can be incremented before
//! [`init_metrics`] runs; they simply are not exported until registered.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Incident write operations
    ///
    /// Labels: operation (created, updated, deleted)
    pub static ref INCIDENTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("incidents_total", "Total number of incident write operations")
            .namespace("incident_service"),
        &["operation"]
    )
    .expect("valid incidents_total metric definition");

    /// Notification outcomes
    ///
    /// Labels: outcome (sent, failed, dropped)
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("notifications_total", "Total number of notification dispatch outcomes")
            .namespace("incident_service"),
        &["outcome"]
    )
    .expect("valid notifications_total metric definition");
}

/// Register all metrics with the global registry. Call once at startup.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(INCIDENTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(NOTIFICATIONS_TOTAL.clone()))?;
    Ok(())
}

/// Render the registry in Prometheus text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
