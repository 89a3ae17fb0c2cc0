//! Axum HTTP server, routing, and shared state.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Serve until the shutdown token is cancelled.

pub mod handlers;
pub mod router;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Bind `addr` and serve `router` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, router: Router, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    serve_listener(listener, router, shutdown).await
}

/// Serve `router` on an already bound `listener` until `shutdown` is cancelled.
///
/// Once cancelled the listener stops accepting, in-flight requests finish, and
/// the listener is dropped before this returns.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    info!("server closed");
    Ok(())
}
