//! Deadline and cancellation integration tests
//!
//! The production deadline is five minutes; these tests configure a short
//! one and point the relay at a webhook that answers too late.

use std::future::IntoFuture;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::RelayHarness;

const RELAY_PATH: &str = "/api/proxy";

#[tokio::test]
async fn test_slow_webhook_times_out_with_504() {
    let harness = RelayHarness::with_timeout(Duration::from_millis(300)).await;
    harness.webhook.mock_slow_reply(Duration::from_secs(10)).await;

    let started = Instant::now();
    let response = harness
        .server
        .post(RELAY_PATH)
        .json(&json!({"webhookUrl": harness.webhook.url(), "message": "hi"}))
        .await;
    let elapsed = started.elapsed();

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.text(), r#"{"error":"Upstream request timed out"}"#);
    assert!(
        elapsed >= Duration::from_millis(300),
        "should wait for the deadline, returned after {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(3),
        "should return shortly after the deadline, took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_audio_upload_times_out_too() {
    let harness = RelayHarness::with_timeout(Duration::from_millis(300)).await;
    harness.webhook.mock_slow_reply(Duration::from_secs(10)).await;

    let response = harness
        .server
        .post(RELAY_PATH)
        .json(&json!({"webhookUrl": harness.webhook.url(), "audioBase64": "UklGRg=="}))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_relay_keeps_serving_after_a_timeout() {
    let harness = RelayHarness::with_timeout(Duration::from_millis(300)).await;
    harness.webhook.mock_slow_reply(Duration::from_secs(10)).await;

    harness
        .server
        .post(RELAY_PATH)
        .json(&json!({"webhookUrl": harness.webhook.url(), "message": "first"}))
        .await
        .assert_status(StatusCode::GATEWAY_TIMEOUT);

    // A fresh webhook answers immediately; the abandoned call must not block it
    let fast = crate::mocks::MockWebhook::start().await;
    fast.mock_json_reply(json!({"output": "second"})).await;

    let response = harness
        .server
        .post(RELAY_PATH)
        .json(&json!({"webhookUrl": fast.url(), "message": "second"}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["output"], "second");
}

#[tokio::test]
async fn test_shutdown_cancels_in_flight_call() {
    let harness = RelayHarness::new().await;
    harness.webhook.mock_slow_reply(Duration::from_secs(10)).await;

    let body = json!({"webhookUrl": harness.webhook.url(), "message": "hi"});
    let request = harness.server.post(RELAY_PATH).json(&body).into_future();
    let shutdown = harness.state.shutdown.clone();

    let started = Instant::now();
    let (response, _) = tokio::join!(request, async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.cancel();
    });

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json, json!({"error": "Relay shutting down"}));
    assert!(started.elapsed() < Duration::from_secs(3));
}
