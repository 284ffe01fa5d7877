//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by view and status
//! - `site_request_duration_seconds` (histogram): latency distribution
//! - `compare_lookups_total` (counter): per-name compare lookups
//! - `compare_ids_total` (counter): ids produced by compare requests

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a served request.
pub fn record_request(view: &str, status: u16, start: Instant) {
    counter!("site_requests_total", "view" => view.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("site_request_duration_seconds", "view" => view.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a resolved compare request.
pub fn record_compare(lookups: usize, ids: usize) {
    counter!("compare_lookups_total").increment(lookups as u64);
    counter!("compare_ids_total").increment(ids as u64);
}
