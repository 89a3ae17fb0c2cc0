//! Axum request handlers for all service endpoints.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::{info, warn};

use super::state::AppState;

/// Request header carrying the password to hash.
pub const PASSWORD_HEADER: &str = "password";

/// Render a [`ServiceError`] as its status code plus a JSON [`ErrorResponse`].
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}

/// `POST /hash` — accept a password and return its job identifier.
///
/// The password is taken from the `password` header. The digest is computed
/// later by the background worker; this handler never waits for it.
pub async fn submit_hash(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();

    let password = match headers
        .get(PASSWORD_HEADER)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    {
        Some(p) if !p.is_empty() => p.to_owned(),
        _ => return error_response(ServiceError::MissingPassword(PASSWORD_HEADER)),
    };

    // Checked before allocating so `Total` only counts accepted submissions.
    if state.queue.is_closed() {
        warn!("hash job rejected: job queue closed");
        return error_response(ServiceError::Unavailable("job queue closed".into()));
    }

    let id = state.store.allocate_id();
    let latency_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if let Err(e) = state.queue.submit(id, password, latency_micros) {
        warn!(error = %e, "hash job rejected");
        return error_response(ServiceError::Unavailable(e.to_string()));
    }

    info!(job_id = id, latency_micros, "hash job accepted");
    (StatusCode::OK, id.to_string()).into_response()
}

/// `GET /hash/{id}` — fetch a digest.
///
/// Returns `200` with the base64 digest once published, otherwise `202` with
/// an empty body. Identifiers that were never issued also yield `202`.
pub async fn get_hash(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Ok(id) = raw_id.parse::<u64>() else {
        return error_response(ServiceError::InvalidId(raw_id));
    };

    match state.store.get(id).await {
        Some(digest) => (StatusCode::OK, digest).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// `GET /stats` — total submissions and running average latency.
pub async fn stats(State(state): State<AppState>) -> Response {
    Json(state.store.stats().await).into_response()
}

/// `POST /shutdown` — begin graceful shutdown.
///
/// In-flight requests complete; queued jobs are not drained.
pub async fn shutdown(State(state): State<AppState>) -> StatusCode {
    info!("shutdown requested");
    state.shutdown.cancel();
    StatusCode::OK
}

/// Catch-all 404 handler, also used for wrong methods on known paths.
pub async fn not_found() -> Response {
    error_response(ServiceError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::{body::to_bytes, http::HeaderValue};
    use common::protocol::StatsResponse;
    use tokio_util::sync::CancellationToken;

    use crate::jobs::{JobQueue, JobStore};

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn password_headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PASSWORD_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[tokio::test]
    async fn submit_returns_sequential_ids() {
        let state = AppState::with_worker(Duration::from_secs(60));
        for expected in 1..=3 {
            let resp = submit_hash(State(state.clone()), password_headers("qwerty")).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_text(resp).await, expected.to_string());
        }
    }

    #[tokio::test]
    async fn submit_without_header_is_400() {
        let state = AppState::with_worker(Duration::from_secs(60));
        let resp = submit_hash(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("missing credential"));
        assert_eq!(state.store.total(), 0);
    }

    #[tokio::test]
    async fn submit_with_empty_header_is_400() {
        let state = AppState::with_worker(Duration::from_secs(60));
        let resp = submit_hash(State(state.clone()), password_headers("")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.total(), 0);
    }

    #[tokio::test]
    async fn submit_with_closed_queue_is_503_and_not_counted() {
        let store = JobStore::new();
        let (queue, rx) = JobQueue::new(Duration::ZERO);
        drop(rx);
        let state = AppState::new(store, queue, CancellationToken::new());

        let resp = submit_hash(State(state.clone()), password_headers("qwerty")).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.store.total(), 0);
        assert_eq!(state.store.stats().await.total, 0);
    }

    #[tokio::test]
    async fn lookup_before_ready_is_202() {
        let state = AppState::with_worker(Duration::from_secs(60));
        submit_hash(State(state.clone()), password_headers("qwerty")).await;
        let resp = get_hash(State(state), Path("1".into())).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert!(body_text(resp).await.is_empty());
    }

    #[tokio::test]
    async fn lookup_of_published_digest_is_200() {
        let state = AppState::with_worker(Duration::from_secs(60));
        state.store.publish(4, "digest".into()).await;
        let resp = get_hash(State(state), Path("4".into())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "digest");
    }

    #[tokio::test]
    async fn lookup_with_bad_id_is_400() {
        let state = AppState::with_worker(Duration::from_secs(60));
        for raw in ["abc", "-1", "1.5", ""] {
            let resp = get_hash(State(state.clone()), Path(raw.into())).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "id {raw:?}");
        }
    }

    #[tokio::test]
    async fn stats_reports_snapshot() {
        let state = AppState::with_worker(Duration::from_secs(60));
        submit_hash(State(state.clone()), password_headers("a")).await;
        submit_hash(State(state.clone()), password_headers("b")).await;
        state.store.record_latency(8).await;

        let resp = stats(State(state)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: StatsResponse = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(body, StatsResponse { total: 2, average: 8 });
    }

    #[tokio::test]
    async fn shutdown_cancels_token() {
        let state = AppState::with_worker(Duration::from_secs(60));
        assert!(!state.shutdown.is_cancelled());
        assert_eq!(shutdown(State(state.clone())).await, StatusCode::OK);
        assert!(state.shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn not_found_is_json_404() {
        let resp = not_found().await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(body.code, "not_found");
    }
}
