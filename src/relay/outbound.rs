//! Outbound webhook payloads
//!
//! A relay request becomes exactly one of two bodies: JSON for text
//! messages, multipart form data when the client attached audio.

use std::borrow::Cow;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    DecodeError, Engine as _,
};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::error::RelayResult;
use crate::relay::request::RelayRequest;

/// Media type of the `audio` part
pub const AUDIO_MIME: &str = "audio/wav";

/// Standard alphabet, padding optional
const AUDIO_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 audio payload
///
/// ASCII whitespace (line-wrapped encoders) is ignored.
pub fn decode_audio(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: Cow<'_, str> = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(encoded)
    };
    AUDIO_ENGINE.decode(compact.as_bytes())
}

/// JSON body of the text path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    pub messages: Vec<Value>,
}

/// Fields of the multipart body
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPayload {
    pub audio: Vec<u8>,
    pub filename: String,
    /// JSON-serialized conversation context
    pub messages: String,
}

/// Body sent to the webhook
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Json(TextPayload),
    Multipart(AudioPayload),
}

impl OutboundBody {
    /// Build the outbound body for a relay request
    ///
    /// The presence of audio alone selects the encoding.
    pub fn from_request(request: RelayRequest) -> RelayResult<Self> {
        if let Some(encoded) = request.audio() {
            let audio = decode_audio(encoded)?;
            let filename = request.audio_filename().to_string();
            let messages = serde_json::to_string(&request.messages.unwrap_or_default())?;
            return Ok(OutboundBody::Multipart(AudioPayload {
                audio,
                filename,
                messages,
            }));
        }

        Ok(OutboundBody::Json(TextPayload {
            message: request.message,
            messages: request.messages.unwrap_or_default(),
        }))
    }

    /// Label used in logs and metrics
    pub fn encoding(&self) -> &'static str {
        match self {
            OutboundBody::Json(_) => "json",
            OutboundBody::Multipart(_) => "multipart",
        }
    }

    /// Decoded audio size, for the multipart path
    pub fn audio_len(&self) -> Option<usize> {
        match self {
            OutboundBody::Json(_) => None,
            OutboundBody::Multipart(payload) => Some(payload.audio.len()),
        }
    }

    /// Attach this body to an outbound request
    pub fn attach(self, builder: RequestBuilder) -> RelayResult<RequestBuilder> {
        match self {
            OutboundBody::Json(payload) => Ok(builder.json(&payload)),
            OutboundBody::Multipart(payload) => {
                let audio = Part::bytes(payload.audio)
                    .file_name(payload.filename)
                    .mime_str(AUDIO_MIME)?;
                let form = Form::new()
                    .part("audio", audio)
                    .text("messages", payload.messages);
                Ok(builder.multipart(form))
            }
        }
    }
}
