//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, app
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_cache_refresh_total` (counter): cache populations by outcome, trigger
//! - `gateway_cache_routes` (gauge): routes in the current snapshot
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(method: &str, status: u16, app: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("app", app.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_cache_refresh(outcome: &'static str, forced: bool) {
    let trigger = if forced { "forced" } else { "lazy" };
    counter!("gateway_cache_refresh_total", "outcome" => outcome, "trigger" => trigger)
        .increment(1);
}

pub fn record_cache_routes(count: usize) {
    gauge!("gateway_cache_routes").set(count as f64);
}
