//! The single background task that turns queued jobs into published digests.

use tokio::{sync::mpsc, task::JoinHandle, time};
use tracing::{debug, info, warn};

use super::{Job, JobStore};
use crate::digest::encode_password;

/// Spawn the digest worker.
///
/// The task runs until every [`JobQueue`](super::JobQueue) handle has been
/// dropped. Jobs still waiting on their delay when the process exits are lost.
pub fn spawn_worker(rx: mpsc::UnboundedReceiver<Job>, store: JobStore) -> JoinHandle<()> {
    tokio::spawn(worker_loop(rx, store))
}

/// Drain `rx` in order, publishing each job's digest once it is due.
///
/// Jobs are enqueued in submission order with a fixed delay, so their
/// `ready_at` instants are non-decreasing and sleeping on each in turn never
/// delays a job past its own deadline by more than the hashing time of the
/// jobs ahead of it.
pub async fn worker_loop(mut rx: mpsc::UnboundedReceiver<Job>, store: JobStore) {
    info!("digest worker started");

    while let Some(job) = rx.recv().await {
        time::sleep_until(job.ready_at).await;
        process(job, &store).await;
    }

    info!("digest worker stopped: job queue closed");
}

async fn process(job: Job, store: &JobStore) {
    let Job {
        id,
        password,
        latency_micros,
        ..
    } = job;

    let digest = encode_password(password.as_bytes());
    drop(password);

    if !store.publish(id, digest).await {
        warn!(job_id = id, "digest already published; keeping original");
        return;
    }

    let average_micros = store.record_latency(latency_micros).await;
    debug!(job_id = id, latency_micros, average_micros, "digest published");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::jobs::JobQueue;

    #[tokio::test(start_paused = true)]
    async fn digest_appears_only_after_delay() {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(Duration::from_secs(5));
        let _worker = spawn_worker(rx, store.clone());

        let id = store.allocate_id();
        queue.submit(id, "qwerty".into(), 10).unwrap();

        time::sleep(Duration::from_secs(4)).await;
        assert!(store.get(id).await.is_none());

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.get(id).await, Some(encode_password(b"qwerty")));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_does_not_accumulate_delay() {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(Duration::from_secs(5));
        let _worker = spawn_worker(rx, store.clone());

        for _ in 0..10 {
            let id = store.allocate_id();
            queue.submit(id, format!("pw{id}"), 1).unwrap();
        }

        time::sleep(Duration::from_secs(6)).await;
        for id in 1..=10 {
            assert!(store.get(id).await.is_some(), "job {id} not published");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn average_follows_completion_order() {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(Duration::from_secs(1));
        let _worker = spawn_worker(rx, store.clone());

        for latency in [100, 200, 400] {
            let id = store.allocate_id();
            queue.submit(id, "pw".into(), latency).unwrap();
        }

        time::sleep(Duration::from_secs(2)).await;
        let stats = store.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average, 275);
    }

    #[tokio::test]
    async fn same_password_same_digest() {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(Duration::ZERO);
        let worker = spawn_worker(rx, store.clone());

        for _ in 0..2 {
            let id = store.allocate_id();
            queue.submit(id, "angryMonkey".into(), 0).unwrap();
        }
        drop(queue);
        worker.await.unwrap();

        let first = store.get(1).await.unwrap();
        assert_eq!(Some(first), store.get(2).await);
    }

    #[tokio::test]
    async fn worker_exits_when_queue_closed() {
        let (queue, rx) = JobQueue::new(Duration::ZERO);
        let worker = spawn_worker(rx, JobStore::new());
        drop(queue);
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
