//! Request logging for relay calls
//!
//! Provides structured logging with short correlation IDs so one relay call
//! can be followed from arrival to the upstream answer.

use std::time::Instant;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

/// Context for tracking a relay call through the system
#[derive(Debug, Clone)]
pub struct RelayContext {
    /// Unique identifier for this call (for log correlation)
    pub trace_id: String,
    /// When the call started
    pub start_time: Instant,
    /// Host of the target webhook, once known. Paths and queries are never
    /// logged since webhook URLs often embed secrets.
    pub webhook_host: Option<String>,
    /// Outbound encoding ("json" or "multipart"), once chosen
    pub encoding: Option<&'static str>,
}

impl RelayContext {
    /// Create a new relay context
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            webhook_host: None,
            encoding: None,
        }
    }

    /// Encoding label, "unknown" before the body was built
    pub fn encoding_label(&self) -> &'static str {
        self.encoding.unwrap_or("unknown")
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request being sent to the webhook
    pub fn log_upstream_request(&self, audio_bytes: Option<usize>) {
        info!(
            trace_id = %self.trace_id,
            webhook_host = ?self.webhook_host,
            encoding = %self.encoding_label(),
            audio_bytes = ?audio_bytes,
            "Forwarding request to webhook"
        );
    }

    /// Log response received from the webhook
    pub fn log_upstream_response(&self, status: u16, content_type: &str, body_bytes: usize) {
        info!(
            trace_id = %self.trace_id,
            webhook_host = ?self.webhook_host,
            status = %status,
            content_type = %content_type,
            body_bytes = %body_bytes,
            elapsed_ms = %self.elapsed_ms(),
            "Webhook responded"
        );
    }

    /// Log a rejected request (caller error)
    pub fn log_rejected(&self, reason: &str) {
        warn!(
            trace_id = %self.trace_id,
            reason = %reason,
            "Relay request rejected"
        );
    }

    /// Log timeout
    pub fn log_timeout(&self, timeout_ms: u128) {
        error!(
            trace_id = %self.trace_id,
            webhook_host = ?self.webhook_host,
            encoding = %self.encoding_label(),
            timeout_ms = %timeout_ms,
            elapsed_ms = %self.elapsed_ms(),
            "Webhook request timed out"
        );
    }

    /// Log cancellation at shutdown
    pub fn log_cancelled(&self) {
        warn!(
            trace_id = %self.trace_id,
            webhook_host = ?self.webhook_host,
            elapsed_ms = %self.elapsed_ms(),
            "Webhook request cancelled by shutdown"
        );
    }

    /// Log relay failure
    pub fn log_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            webhook_host = ?self.webhook_host,
            encoding = %self.encoding_label(),
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Relay failed"
        );
    }

    /// Log body details (debug level)
    pub fn log_body_prepared(&self, messages: usize) {
        debug!(
            trace_id = %self.trace_id,
            encoding = %self.encoding_label(),
            messages = %messages,
            "Outbound body prepared"
        );
    }

    /// Create a tracing span for this call
    pub fn create_span(&self) -> Span {
        tracing::info_span!("relay", trace_id = %self.trace_id)
    }
}

impl Default for RelayContext {
    fn default() -> Self {
        Self::new()
    }
}
