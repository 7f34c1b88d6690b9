//! Router assembly for the satbridge HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! body-limit, CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// CORS is permissive: the browser client is served from another origin.
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes;
    Router::new()
        .route("/process_text", post(handlers::solve::process_text))
        .route("/health", get(handlers::health::health))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
