//! Webhook forwarder
//!
//! Issues the single outbound POST of a relay call and turns the webhook's
//! answer into a pass-through response.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::Url;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{RelayError, RelayResult},
    relay::{logging::RelayContext, outbound::OutboundBody, request::RelayRequest},
};

/// Content type reported when the webhook does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// The webhook's answer, relayed verbatim
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: Bytes,
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Forwards relay requests to their webhooks
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookForwarder {
    /// Create a new forwarder
    ///
    /// `timeout` bounds the whole exchange, from building the request to
    /// reading the last body byte.
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build the HTTP client used for webhook calls
    ///
    /// Idle connections are not kept, so no connection outlives its request.
    pub fn build_client() -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().pool_max_idle_per_host(0).build()
    }

    /// Relay one request to its webhook
    ///
    /// Cancelling `cancel` abandons the upstream call and yields
    /// [`RelayError::Cancelled`].
    pub async fn relay(
        &self,
        request: RelayRequest,
        cancel: &CancellationToken,
        ctx: &mut RelayContext,
    ) -> RelayResult<RelayResponse> {
        let url = request.webhook_url()?;
        if let Some(host) = url.host_str() {
            ctx.webhook_host = Some(host.to_string());
        }

        let messages = request.messages.as_ref().map_or(0, Vec::len);
        let body = OutboundBody::from_request(request)?;
        ctx.encoding = Some(body.encoding());
        ctx.log_body_prepared(messages);

        self.forward(url, body, cancel, ctx).await
    }

    /// Send a prepared body under the deadline
    pub async fn forward(
        &self,
        url: Url,
        body: OutboundBody,
        cancel: &CancellationToken,
        ctx: &RelayContext,
    ) -> RelayResult<RelayResponse> {
        let deadline = Instant::now() + self.timeout;
        let audio_bytes = body.audio_len();
        let request = body.attach(self.client.post(url))?;

        ctx.log_upstream_request(audio_bytes);

        // Losing the race drops the exchange future, which closes its connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                ctx.log_cancelled();
                Err(RelayError::Cancelled)
            }
            _ = tokio::time::sleep_until(deadline) => {
                ctx.log_timeout(self.timeout.as_millis());
                Err(RelayError::Timeout)
            }
            result = exchange(request, ctx) => result,
        }
    }
}

async fn exchange(
    request: reqwest::RequestBuilder,
    ctx: &RelayContext,
) -> RelayResult<RelayResponse> {
    let response = request.send().await?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let body = response.bytes().await?;

    ctx.log_upstream_response(
        status.as_u16(),
        content_type.to_str().unwrap_or("<binary>"),
        body.len(),
    );

    Ok(RelayResponse {
        status,
        content_type,
        body,
    })
}
