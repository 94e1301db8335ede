//! HTTP routes for the relay
//!
//! This module defines all HTTP endpoints exposed by the service.

pub mod health;
pub mod metrics;
pub mod proxy;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Path of the relay endpoint
pub const RELAY_PATH: &str = "/api/proxy";

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // The chat UI may be served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Voice messages arrive base64-encoded inside JSON and can be large
    let relay_routes = Router::new()
        .route(RELAY_PATH, post(proxy::relay_handler))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes));

    // Probes and metrics
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(relay_routes)
        // Global middleware (applied to all routes). No compression layer:
        // relayed bodies must reach the client byte for byte.
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
