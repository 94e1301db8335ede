//! Chat Relay - stateless proxy between a chat client and a conversational webhook
//!
//! The relay accepts a text or voice message plus recent conversation
//! history, forwards it to the webhook named in the request, and returns the
//! webhook's answer byte for byte.

pub mod client;
pub mod config;
pub mod error;
pub mod relay;
pub mod routes;

use std::time::Instant;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

pub use crate::config::Config;
pub use crate::error::{RelayError, RelayResult};
pub use crate::relay::{RelayRequest, RelayResponse, WebhookForwarder};

/// Application state shared across all request handlers
///
/// Holds no per-conversation or per-upstream state.
pub struct AppState {
    pub config: Config,
    pub forwarder: WebhookForwarder,
    pub start_time: Instant,
    /// Cancelled at shutdown; every relay call watches a child of it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let http_client = WebhookForwarder::build_client()?;
        let forwarder = WebhookForwarder::new(http_client, config.upstream_timeout);

        Ok(Self {
            config,
            forwarder,
            start_time: Instant::now(),
            shutdown: CancellationToken::new(),
        })
    }
}
