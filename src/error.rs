//! Error types for the relay
//!
//! Every failure of a relay call is converted into one of a small, fixed set
//! of JSON error bodies. None of them is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relay-level errors
#[derive(Debug, Error)]
pub enum RelayError {
    /// `webhookUrl` missing, not a string, empty, or not an absolute http(s) URL
    #[error("Missing webhookUrl")]
    BadRequest,

    /// The upstream did not answer before the deadline
    #[error("Upstream request timed out")]
    Timeout,

    /// The relay is shutting down and abandoned the upstream call
    #[error("Relay shutting down")]
    Cancelled,

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Invalid audio payload: {0}")]
    AudioDecode(#[from] base64::DecodeError),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

/// Coarse classification of a [`RelayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Timeout,
    Cancelled,
    UpstreamFailure,
}

impl ErrorKind {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::UpstreamFailure => "upstream_failure",
        }
    }
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::BadRequest => ErrorKind::BadRequest,
            RelayError::Timeout => ErrorKind::Timeout,
            RelayError::Cancelled => ErrorKind::Cancelled,
            RelayError::InvalidBody(_) | RelayError::AudioDecode(_) | RelayError::Upstream(_) => {
                ErrorKind::UpstreamFailure
            }
        }
    }

    /// HTTP status returned to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body returned to the client for this error
    pub fn body(&self) -> ErrorResponse {
        match self.kind() {
            ErrorKind::UpstreamFailure => ErrorResponse {
                error: "Proxy failed".to_string(),
                details: Some(self.to_string()),
            },
            _ => ErrorResponse {
                error: self.to_string(),
                details: None,
            },
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Result type alias for convenience
pub type RelayResult<T> = Result<T, RelayError>;
