//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pakserve_requests_total` (counter): responses by status and strategy
//! - `pakserve_reloads_total` (counter): rebuilds by result
//! - `pakserve_reload_duration_seconds` (histogram): rebuild time
//! - `pakserve_archives_loaded` (gauge): archive stores in the current table
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one response. `strategy` names how the body was produced
/// (`stored`, `gzip`, `deflate`, `inflate`, `file`) or `none`.
pub fn record_request(status: u16, strategy: &'static str) {
    ::metrics::counter!(
        "pakserve_requests_total",
        "status" => status.to_string(),
        "strategy" => strategy
    )
    .increment(1);
}

pub fn record_reload(success: bool, duration: Duration) {
    let result = if success { "ok" } else { "error" };
    ::metrics::counter!("pakserve_reloads_total", "result" => result).increment(1);
    if success {
        ::metrics::histogram!("pakserve_reload_duration_seconds").record(duration.as_secs_f64());
    }
}

pub fn set_archives_loaded(count: usize) {
    ::metrics::gauge!("pakserve_archives_loaded").set(count as f64);
}
