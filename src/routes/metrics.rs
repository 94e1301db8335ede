//! Prometheus metrics endpoint
//!
//! Exposes relay metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "chat_relay_requests_total",
        "Total number of relay calls by outcome and outbound encoding"
    );
    metrics::describe_histogram!(
        "chat_relay_request_duration_seconds",
        "Relay call duration in seconds, including the webhook round trip"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a relay call
pub fn record_relay(outcome: &str, encoding: &str, duration_secs: f64) {
    metrics::counter!(
        "chat_relay_requests_total",
        "outcome" => outcome.to_string(),
        "encoding" => encoding.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "chat_relay_request_duration_seconds",
        "encoding" => encoding.to_string()
    )
    .record(duration_secs);
}
