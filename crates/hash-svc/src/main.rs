//! `hash-svc` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Create the [`JobStore`] and job queue, and spawn the digest worker.
//! 4. Build the Axum router and serve until `POST /shutdown` or Ctrl-C.

mod config;
mod digest;
mod jobs;
mod server;
mod telemetry;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use config::Config;
use jobs::{JobQueue, JobStore};
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "hash-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Job pipeline
    // -----------------------------------------------------------------------
    let store = JobStore::new();
    let (queue, rx) = JobQueue::new(cfg.hash_delay());
    info!(delay_secs = queue.delay().as_secs(), "spawning digest worker");
    // Not awaited: queued jobs are abandoned on exit.
    let _worker = jobs::worker::spawn_worker(rx, store.clone());

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let state = AppState::new(store, queue, shutdown.clone());
    let router = server::router::build(state, cfg.request_timeout());

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    server::serve(addr, router, shutdown).await
}

/// Cancel `shutdown` on Ctrl-C so a signal takes the same path as `POST /shutdown`.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => info!("Ctrl-C received, shutting down"),
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                    return;
                }
            },
            _ = shutdown.cancelled() => return,
        }
        shutdown.cancel();
    });
}
