//! Inbound relay request
//!
//! The shape the chat client posts to `/api/proxy`. Conversation turns are
//! kept as raw JSON values so they reach the webhook exactly as sent.

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{RelayError, RelayResult};

/// Filename given to the audio part when the client does not name it
pub const DEFAULT_AUDIO_FILENAME: &str = "audio.wav";

/// A client-composed relay request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// Target webhook. Non-string values deserialize as `None`.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub webhook_url: Option<String>,

    /// Forwarded as sent, whatever its JSON type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,

    /// Conversation context, oldest first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_filename: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn parse_webhook_url(raw: Option<&str>) -> RelayResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RelayError::BadRequest)?;

    let url = Url::parse(raw).map_err(|_| RelayError::BadRequest)?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(RelayError::BadRequest),
    }
}

impl RelayRequest {
    /// Parse a raw request body
    ///
    /// Malformed JSON is an error. A well-formed body without a usable
    /// `webhookUrl` is a bad request, whatever its other fields hold, so the
    /// URL is checked before the rest of the body is typed.
    pub fn from_slice(body: &[u8]) -> RelayResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        let Value::Object(fields) = &value else {
            return Err(RelayError::BadRequest);
        };
        parse_webhook_url(fields.get("webhookUrl").and_then(Value::as_str))?;

        Ok(serde_json::from_value(value)?)
    }

    /// The validated webhook URL
    ///
    /// Rejects missing or empty values and anything that is not an absolute
    /// `http`/`https` URL.
    pub fn webhook_url(&self) -> RelayResult<Url> {
        parse_webhook_url(self.webhook_url.as_deref())
    }

    /// Base64 audio, if the request carries any
    ///
    /// An empty string counts as no audio.
    pub fn audio(&self) -> Option<&str> {
        self.audio_base64.as_deref().filter(|s| !s.is_empty())
    }

    /// Filename for the audio part
    pub fn audio_filename(&self) -> &str {
        self.audio_filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AUDIO_FILENAME)
    }
}
