//! Deferred password-hashing jobs.
//!
//! # Lifecycle
//!
//! 1. `POST /hash` allocates an identifier from [`JobStore::allocate_id`] and
//!    hands a [`Job`] to the [`JobQueue`]. The handler returns immediately.
//! 2. A single background task ([`worker::spawn_worker`]) drains the queue in
//!    FIFO order, sleeping until each job's `ready_at` instant.
//! 3. The worker publishes the digest into the [`JobStore`] and folds the job's
//!    submission latency into the running average.
//! 4. `GET /hash/{id}` reads the store; a missing entry means "still processing".
//!
//! # Invariants
//!
//! - Identifiers start at 1 and are never reused.
//! - Exactly one worker exists, so digests and average updates are strictly
//!   sequential.
//! - Passwords are dropped as soon as their digest is computed and are never
//!   logged.

pub mod store;
pub mod worker;

pub use store::JobStore;

use std::time::Duration;

use thiserror::Error;
use tokio::{sync::mpsc, time::Instant};

/// A password waiting to be hashed.
pub struct Job {
    /// Identifier returned to the submitter.
    pub id: u64,
    /// Plaintext password; dropped once the digest is computed.
    pub password: String,
    /// Time spent in the synchronous part of `POST /hash`, in microseconds.
    pub latency_micros: u64,
    /// Earliest instant at which the worker may publish the digest.
    pub ready_at: Instant,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .field("latency_micros", &self.latency_micros)
            .field("ready_at", &self.ready_at)
            .finish()
    }
}

/// Errors from enqueueing a job.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The worker has exited and dropped its receiver.
    #[error("job queue closed; job {0} was not accepted")]
    QueueClosed(u64),
}

/// Sending half of the unbounded job queue.
///
/// Cheap to clone; every handler holds one. The queue has no capacity limit,
/// so a burst of submissions is buffered in memory.
#[derive(Clone, Debug)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
    delay: Duration,
}

impl JobQueue {
    /// Create a queue whose jobs become ready `delay` after submission.
    ///
    /// The returned receiver must be handed to [`worker::spawn_worker`].
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, delay }, rx)
    }

    /// Returns `true` once the worker has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Deferred processing delay applied to every job.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Enqueue `password` under identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::QueueClosed`] if the worker is no longer running.
    pub fn submit(&self, id: u64, password: String, latency_micros: u64) -> Result<(), SubmitError> {
        let job = Job {
            id,
            password,
            latency_micros,
            ready_at: Instant::now() + self.delay,
        };
        self.tx.send(job).map_err(|e| SubmitError::QueueClosed(e.0.id))
    }
}
