//! Configuration management for the relay
//!
//! Configuration is loaded from environment variables. Nothing here describes
//! an upstream: the webhook URL arrives with every request.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Default upstream deadline (five minutes, mirroring the chat client)
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 300;

/// Default inbound body limit (64 MiB, enough for long voice recordings)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Hard deadline for one upstream call, including the body read
    pub upstream_timeout: Duration,

    /// Maximum accepted size of an inbound relay request body
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("RELAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("RELAY_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid RELAY_PORT")?,

            upstream_timeout: Duration::from_secs(
                env::var("RELAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                    .parse()
                    .context("Invalid RELAY_TIMEOUT_SECS")?,
            ),

            max_body_bytes: env::var("RELAY_MAX_BODY_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_BODY_BYTES.to_string())
                .parse()
                .context("Invalid RELAY_MAX_BODY_BYTES")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
