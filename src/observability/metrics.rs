//! Metrics collection and exposition.
//!
//! # Metrics
//! - `egress_hub_attempts_total` (counter): executor calls by path, outcome
//! - `egress_hub_attempt_duration_seconds` (histogram): per-attempt latency
//! - `egress_hub_dispatch_total` (counter): dispatches by serving path, outcome
//! - `egress_hub_dispatch_duration_seconds` (histogram): whole-dispatch latency
//! - `egress_hub_path_health` (gauge): 1=healthy, 0.5=degraded, 0=unhealthy
//! - `egress_hub_probes_total` (counter): health probes by path, outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::state::HealthStatus;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record one executor call.
pub fn record_attempt(path: &str, success: bool, latency: Duration) {
    counter!(
        "egress_hub_attempts_total",
        "path" => path.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
    histogram!("egress_hub_attempt_duration_seconds", "path" => path.to_string())
        .record(latency.as_secs_f64());
}

/// Record a finished dispatch.
pub fn record_dispatch(provider: &str, success: bool, elapsed: Duration) {
    counter!(
        "egress_hub_dispatch_total",
        "provider" => provider.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
    histogram!("egress_hub_dispatch_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a path's current health.
pub fn record_path_health(path: &str, status: HealthStatus) {
    gauge!("egress_hub_path_health", "path" => path.to_string()).set(status.as_gauge());
}

/// Record one health probe.
pub fn record_probe(path: &str, success: bool) {
    counter!(
        "egress_hub_probes_total",
        "path" => path.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}
