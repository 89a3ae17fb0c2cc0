//! Shared application state injected into every Axum handler.

use tokio_util::sync::CancellationToken;

use crate::jobs::{JobQueue, JobStore};

/// Application state shared across all request handlers.
///
/// Every field is cheap to clone (`Arc`-backed or a channel handle), so Axum
/// can clone the state per request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Job counter, published digests, and latency average.
    pub store: JobStore,
    /// Sending side of the digest worker's queue.
    pub queue: JobQueue,
    /// Cancelled by `POST /shutdown` to stop the HTTP server gracefully.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new [`AppState`] from its parts.
    pub fn new(store: JobStore, queue: JobQueue, shutdown: CancellationToken) -> Self {
        Self {
            store,
            queue,
            shutdown,
        }
    }

    /// State wired to a freshly spawned digest worker. Must be called from
    /// inside a Tokio runtime.
    #[cfg(test)]
    pub fn with_worker(delay: std::time::Duration) -> Self {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(delay);
        crate::jobs::worker::spawn_worker(rx, store.clone());
        Self::new(store, queue, CancellationToken::new())
    }
}
