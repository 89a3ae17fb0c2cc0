//! Response types returned by the public HTTP API.
//!
//! Field names of [`StatsResponse`] are capitalised on the wire (`Total`,
//! `Average`) to keep existing clients of the stats endpoint working.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Stats endpoint
// ---------------------------------------------------------------------------

/// Response body for `GET /stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Number of accepted `POST /hash` submissions.
    #[serde(rename = "Total")]
    pub total: u64,
    /// Running average of submission latency, in microseconds.
    #[serde(rename = "Average")]
    pub average: u64,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any 4xx/5xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"invalid_identifier"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
