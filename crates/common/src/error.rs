//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::MissingPassword`] → 400
/// - [`ServiceError::InvalidId`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `POST /hash` arrived without a usable `password` header.
    #[error("missing credential: you must set a password value in header '{0}'")]
    MissingPassword(&'static str),

    /// The `{id}` path segment of `GET /hash/{id}` is not a non-negative integer.
    #[error("invalid identifier format: '{0}'")]
    InvalidId(String),

    /// No route matches the method and path.
    #[error("404 not found")]
    NotFound,

    /// The job queue is closed and can no longer accept work.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::MissingPassword(_) => 400,
            ServiceError::InvalidId(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::MissingPassword(_) => "missing_credential",
            ServiceError::InvalidId(_) => "invalid_identifier",
            ServiceError::NotFound => "not_found",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }
}
