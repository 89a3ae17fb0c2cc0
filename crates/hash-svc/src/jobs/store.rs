//! [`JobStore`]: process-wide job counter, published digests, and latency average.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use common::protocol::StatsResponse;
use tokio::sync::RwLock;

/// Running average of submission latency.
#[derive(Debug, Default, Clone, Copy)]
struct LatencyAverage {
    completed: u64,
    average_micros: u64,
}

impl LatencyAverage {
    /// Fold one more sample into the average.
    ///
    /// NOTE: this is a pairwise mean of the previous average and the new
    /// sample, not a cumulative mean. Older samples decay geometrically, so
    /// with more than two jobs the result differs from the arithmetic mean.
    fn record(&mut self, latency_micros: u64) {
        self.average_micros = if self.completed == 0 {
            latency_micros
        } else {
            // floor((a + b) / 2) without overflowing near u64::MAX
            self.average_micros / 2 + latency_micros / 2 + (self.average_micros & latency_micros & 1)
        };
        self.completed = self.completed.saturating_add(1);
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Last identifier handed out; 0 means none yet.
    last_id: AtomicU64,
    results: RwLock<HashMap<u64, String>>,
    latency: RwLock<LatencyAverage>,
}

/// Shared state for the hashing pipeline.
///
/// Cloning is cheap (one `Arc`). Concurrency model:
/// - Identifier allocation is a single atomic `fetch_add`, so concurrent
///   submissions never receive the same identifier.
/// - Digests and the latency average sit behind `RwLock`s. The worker is the
///   only writer; handlers take short read locks and never see a partial entry.
#[derive(Clone, Debug, Default)]
pub struct JobStore {
    inner: Arc<Inner>,
}

impl JobStore {
    /// Create a new, empty [`JobStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next job identifier. The first call returns 1.
    pub fn allocate_id(&self) -> u64 {
        self.inner.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of identifiers allocated so far.
    pub fn total(&self) -> u64 {
        self.inner.last_id.load(Ordering::SeqCst)
    }

    /// Look up the encoded digest for `id`, if it has been published.
    pub async fn get(&self, id: u64) -> Option<String> {
        self.inner.results.read().await.get(&id).cloned()
    }

    /// Publish the digest for `id`.
    ///
    /// Returns `false` and leaves the existing value untouched if a digest was
    /// already published for `id`.
    pub async fn publish(&self, id: u64, digest: String) -> bool {
        match self.inner.results.write().await.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(digest);
                true
            }
        }
    }

    /// Fold a completed job's latency into the running average and return the
    /// new average in microseconds.
    pub async fn record_latency(&self, latency_micros: u64) -> u64 {
        let mut latency = self.inner.latency.write().await;
        latency.record(latency_micros);
        latency.average_micros
    }

    /// Best-effort snapshot of the job count and latency average.
    pub async fn stats(&self) -> StatsResponse {
        let average = self.inner.latency.read().await.average_micros;
        StatsResponse {
            total: self.total(),
            average,
        }
    }
}
