//! Axum router construction.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// A wrong method on a known path falls through to the 404 handler rather than
/// Axum's default `405`.
pub fn build(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            "/hash",
            post(handlers::submit_hash).fallback(handlers::not_found),
        )
        .route(
            "/hash/:id",
            get(handlers::get_hash).fallback(handlers::not_found),
        )
        .route("/stats", get(handlers::stats).fallback(handlers::not_found))
        .route(
            "/shutdown",
            post(handlers::shutdown).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
