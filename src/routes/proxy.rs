//! Relay endpoint
//!
//! `POST /api/proxy` accepts a JSON relay request and answers with either the
//! webhook's response, passed through untouched, or a JSON error body.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::{
    error::{ErrorKind, RelayResult},
    relay::{RelayContext, RelayRequest, RelayResponse},
    routes::metrics::record_relay,
    AppState,
};

/// Relay handler
///
/// The body is read as raw bytes so that malformed JSON is reported as a
/// relay failure instead of an extractor rejection.
pub async fn relay_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let start_time = Instant::now();
    let mut ctx = RelayContext::new();
    let span = ctx.create_span();

    let result = relay(&state, &body, &mut ctx).instrument(span).await;

    let duration = start_time.elapsed().as_secs_f64();
    let outcome = match &result {
        Ok(_) => "relayed",
        Err(e) => {
            match e.kind() {
                ErrorKind::BadRequest => ctx.log_rejected(&e.to_string()),
                ErrorKind::Timeout | ErrorKind::Cancelled => {}
                ErrorKind::UpstreamFailure => ctx.log_error(&e.to_string()),
            }
            e.kind().as_str()
        }
    };
    record_relay(outcome, ctx.encoding_label(), duration);

    result.into_response()
}

async fn relay(
    state: &AppState,
    body: &[u8],
    ctx: &mut RelayContext,
) -> RelayResult<RelayResponse> {
    let request = RelayRequest::from_slice(body)?;
    let cancel = state.shutdown.child_token();
    state.forwarder.relay(request, &cancel, ctx).await
}
