//! Breaker metrics.
//!
//! # Metrics
//! - `breaker_failures_total` (counter): countable failures by command
//! - `breaker_ignored_total` (counter): filtered failures by command, kind
//! - `breaker_trips_total` (counter): trips by command
//! - `breaker_resets_total` (counter): resets by command
//! - `breaker_open_commands` (gauge): commands currently open
//! - `breaker_tracked_commands` (gauge): commands with counted failures
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder globally and return its render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

pub fn record_failure(command: &str) {
    ::metrics::counter!("breaker_failures_total", "command" => command.to_string()).increment(1);
}

pub fn record_ignored(command: &str, kind: &'static str) {
    ::metrics::counter!(
        "breaker_ignored_total",
        "command" => command.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_trip(command: &str) {
    ::metrics::counter!("breaker_trips_total", "command" => command.to_string()).increment(1);
}

pub fn record_reset(command: &str) {
    ::metrics::counter!("breaker_resets_total", "command" => command.to_string()).increment(1);
}

pub fn record_open_commands(count: usize) {
    ::metrics::gauge!("breaker_open_commands").set(count as f64);
}

pub fn record_tracked_commands(count: usize) {
    ::metrics::gauge!("breaker_tracked_commands").set(count as f64);
}
