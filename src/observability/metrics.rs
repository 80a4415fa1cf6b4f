//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_requests_total` (counter): requests by method, status, matched
//! - `mock_request_duration_seconds` (histogram): resolution latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one answered request.
pub fn record_request(method: &str, status: u16, matched: bool, start: Instant) {
    counter!(
        "mock_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "matched" => matched.to_string()
    )
    .increment(1);
    histogram!("mock_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
