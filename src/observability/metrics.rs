//! Metrics collection and exposition.
//!
//! # Metrics
//! - `warden_ping_total` (counter): ping attempts by service, outcome
//! - `warden_ping_duration_ms` (histogram): probe latency by service
//! - `warden_sibling_up` (gauge): 1 = last ping succeeded, 0 = failed
//! - `warden_health_requests_total` (counter): health endpoint hits by status
//!
//! # Design Decisions
//! - The `metrics` facade stays recording-agnostic: with no exporter
//!   installed (tests), every call is a no-op

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one ping outcome.
pub fn record_ping(service: &str, success: bool, duration_ms: u64) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "warden_ping_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("warden_ping_duration_ms", "service" => service.to_string())
        .record(duration_ms as f64);
    gauge!("warden_sibling_up", "service" => service.to_string())
        .set(if success { 1.0 } else { 0.0 });
}

/// Record one health endpoint response.
pub fn record_health_request(endpoint: &'static str, status: u16) {
    counter!(
        "warden_health_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}
