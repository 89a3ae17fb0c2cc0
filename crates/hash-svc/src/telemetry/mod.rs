//! Tracing setup: structured JSON logs on stdout.
//!
//! # Telemetry invariants
//!
//! - **No passwords or digests** may appear in any span attribute or log field.
//!   Only job identifiers and latencies are logged.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
