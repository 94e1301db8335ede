//! Mock conversational webhook for testing
//!
//! Provides wiremock-based stand-ins for the upstream a chat client points
//! the relay at: JSON replies, binary replies, arbitrary status codes, slow
//! responses, and an echo responder that returns the uploaded audio.
//!
//! # Example
//!
//! ```rust,ignore
//! let webhook = MockWebhook::start().await;
//! webhook.mock_json_reply(json!({"output": "hello"})).await;
//!
//! // Use webhook.url() as the webhookUrl of a relay request
//! ```

use std::time::Duration;

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

use crate::common::parse_multipart;

/// Path the mock webhook listens on
pub const WEBHOOK_PATH: &str = "/webhook/chat";

/// Mock webhook server wrapper
pub struct MockWebhook {
    server: MockServer,
}

impl MockWebhook {
    /// Start a new mock webhook
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Full webhook URL to put in relay requests
    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), WEBHOOK_PATH)
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// The single request the webhook received
    pub async fn only_request(&self) -> Request {
        let mut requests = self.received_requests().await;
        assert_eq!(requests.len(), 1, "webhook should receive exactly one request");
        requests.remove(0)
    }

    /// Reply with a JSON body
    pub async fn mock_json_reply(&self, body: Value) {
        self.mount(ResponseTemplate::new(200).set_body_json(body)).await;
    }

    /// Reply with raw bytes and the given content type
    pub async fn mock_raw_reply(&self, status: u16, body: Vec<u8>, content_type: &str) {
        self.mount(ResponseTemplate::new(status).set_body_raw(body, content_type))
            .await;
    }

    /// Reply with bytes and no Content-Type header
    pub async fn mock_untyped_reply(&self, status: u16, body: Vec<u8>) {
        self.mount(ResponseTemplate::new(status).set_body_bytes(body))
            .await;
    }

    /// Reply only after `delay`
    pub async fn mock_slow_reply(&self, delay: Duration) {
        self.mount(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"output": "too late"}))
                .set_delay(delay),
        )
        .await;
    }

    /// Reply with the bytes of the uploaded `audio` part
    pub async fn mock_audio_echo(&self) {
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(AudioEcho)
            .mount(&self.server)
            .await;
    }

    async fn mount(&self, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}

/// Responds with the uploaded audio, so each caller can check it got its own
struct AudioEcho;

impl Respond for AudioEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match parse_multipart(request).into_iter().find(|p| p.name == "audio") {
            Some(part) => ResponseTemplate::new(200).set_body_raw(part.data, "application/octet-stream"),
            None => ResponseTemplate::new(422),
        }
    }
}
