//! Health and metrics endpoint integration tests
//!
//! Tests for the probe endpoints:
//! - GET /health - Full health check
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe
//! - GET /metrics - Prometheus exposition

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::RelayHarness;

#[tokio::test]
async fn test_health_endpoint_returns_proper_structure() {
    let harness = RelayHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();

    let json: Value = response.json();

    assert_eq!(json["status"], "healthy");
    assert!(json.get("uptime_seconds").is_some(), "Response should have 'uptime_seconds' field");
    assert_eq!(json["upstream_timeout_seconds"], 300);

    // Version should be the package version from Cargo.toml
    let version = json["version"].as_str().unwrap();
    assert!(version.contains('.'), "Version should be in semver format");

    // Timestamp should be a valid RFC3339 string
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_health_live_and_ready_endpoints() {
    let harness = RelayHarness::new().await;

    for path in ["/health/live", "/health/ready"] {
        let response = harness.server.get(path).await;
        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["status"], "healthy");
    }
}

#[tokio::test]
async fn test_ready_reports_unhealthy_during_shutdown() {
    let harness = RelayHarness::new().await;
    harness.state.shutdown.cancel();

    let response = harness.server.get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    // Liveness is unaffected
    harness.server.get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn test_health_endpoints_accept_get_only() {
    let harness = RelayHarness::new().await;

    // POST should not be allowed
    let response = harness.server.post("/health").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = harness.server.post("/health/live").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_metrics_endpoint_renders_after_relay_call() {
    chat_relay::routes::metrics::init_metrics();
    let harness = RelayHarness::new().await;

    // A rejected call is still counted
    harness
        .server
        .post("/api/proxy")
        .json(&serde_json::json!({"message": "hi"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = harness.server.get("/metrics").await;
    response.assert_status_ok();
    assert!(response.text().contains("chat_relay_requests_total"));
}
