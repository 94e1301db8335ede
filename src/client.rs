//! Typed client for the relay endpoint
//!
//! The chat UI talks to the relay through a fixed interface: it keeps the
//! conversation, sends the most recent turns as context, and renders the
//! webhook's `output`/`audio` reply. This module is that interface for Rust
//! callers.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DEFAULT_UPSTREAM_TIMEOUT_SECS;
use crate::relay::request::{RelayRequest, DEFAULT_AUDIO_FILENAME};
use crate::routes::RELAY_PATH;

/// Number of most recent turns sent as context with each message
pub const CONTEXT_WINDOW: usize = 6;

/// Text shown when the webhook answers without an `output`
pub const FALLBACK_REPLY_TEXT: &str = "Response received";

/// Text of the user turn that carries a voice message
pub const VOICE_MESSAGE_TEXT: &str = "Voice message";

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: String,
    /// Older clients spell this field `type`
    #[serde(alias = "type")]
    pub role: Role,
    pub text: String,
    /// Playable audio, as a URL or data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            audio: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Role::Ai, text)
    }

    /// A user turn carrying a recorded voice message
    pub fn voice(audio: impl Into<String>) -> Self {
        Self::user(VOICE_MESSAGE_TEXT).with_audio(audio)
    }

    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }
}

/// The most recent turns, oldest first
pub fn context_window(turns: &[ChatTurn]) -> &[ChatTurn] {
    &turns[turns.len().saturating_sub(CONTEXT_WINDOW)..]
}

/// Conventional webhook answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookReply {
    #[serde(default)]
    pub output: Option<String>,
    /// Base64-encoded audio
    #[serde(default)]
    pub audio: Option<String>,
}

impl WebhookReply {
    /// Text to display, with a fallback for empty replies
    pub fn display_text(&self) -> &str {
        self.output
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_REPLY_TEXT)
    }

    /// Playable data URI for the reply audio
    pub fn audio_data_uri(&self) -> Option<String> {
        self.audio
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|audio| format!("data:audio/mp3;base64,{audio}"))
    }

    /// The reply as an AI turn
    pub fn into_turn(self) -> ChatTurn {
        let turn = ChatTurn::ai(self.display_text());
        match self.audio_data_uri() {
            Some(uri) => turn.with_audio(uri),
            None => turn,
        }
    }
}

/// Client-side failures, each with a displayable message
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Webhook not configured or invalid. Please set a valid webhook URL in the admin settings.")]
    WebhookNotConfigured,

    #[error("Invalid relay URL: {0}")]
    InvalidRelayUrl(String),

    #[error("Proxy error: {} {}", .status.as_u16(), .status.canonical_reason().unwrap_or(""))]
    Status { status: StatusCode, body: String },

    #[error("Request timed out. Please try again.")]
    Timeout,

    #[error("Failed to send your message. Please check your network or webhook and try again.")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to prepare your message: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err)
        }
    }
}

impl ClientError {
    /// The error as an AI turn, the way the chat shows it
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn::ai(self.to_string())
    }
}

/// Client configuration
///
/// Owned by the caller and passed into every call. The relay itself keeps
/// no record of which webhook a client uses.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the relay service
    pub relay_url: Url,
    /// Target webhook, forwarded with every request
    pub webhook_url: Url,
    /// Client-side deadline for one relay call
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(relay_url: &str, webhook_url: &str) -> Result<Self, ClientError> {
        let webhook_url = Url::parse(webhook_url.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or(ClientError::WebhookNotConfigured)?;

        Ok(Self {
            relay_url: Url::parse(relay_url)
                .map_err(|e| ClientError::InvalidRelayUrl(e.to_string()))?,
            webhook_url,
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the relay endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RelayClient {
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a text message
    ///
    /// `history` is the conversation including the turn being sent; only the
    /// last [`CONTEXT_WINDOW`] turns travel with the request.
    pub async fn send_text(
        &self,
        history: &[ChatTurn],
        text: &str,
    ) -> Result<WebhookReply, ClientError> {
        let request = RelayRequest {
            message: Some(text.into()),
            ..self.base_request(history)?
        };
        self.post(&request).await
    }

    /// Send a recorded voice message
    pub async fn send_audio(
        &self,
        history: &[ChatTurn],
        audio: &[u8],
        filename: Option<&str>,
    ) -> Result<WebhookReply, ClientError> {
        let request = RelayRequest {
            audio_base64: Some(B64.encode(audio)),
            audio_filename: Some(filename.unwrap_or(DEFAULT_AUDIO_FILENAME).to_string()),
            ..self.base_request(history)?
        };
        self.post(&request).await
    }

    fn base_request(&self, history: &[ChatTurn]) -> Result<RelayRequest, ClientError> {
        let messages = context_window(history)
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RelayRequest {
            webhook_url: Some(self.config.webhook_url.to_string()),
            messages: Some(messages),
            ..Default::default()
        })
    }

    async fn post(&self, request: &RelayRequest) -> Result<WebhookReply, ClientError> {
        let url = self
            .config
            .relay_url
            .join(RELAY_PATH)
            .map_err(|e| ClientError::InvalidRelayUrl(e.to_string()))?;
        debug!(url = %url, context_turns = ?request.messages.as_ref().map(Vec::len), "Sending relay request");

        let response = self
            .http
            .post(url)
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Relay returned non-OK status");
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json::<WebhookReply>().await?)
    }
}
