//! Configuration loading and validation for the hash service.
//!
//! All values are read from environment variables at startup and every one of
//! them has a default, so the service starts with no environment at all.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated hash service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between accepting a password and publishing its digest.
    #[serde(default = "default_hash_delay")]
    pub hash_delay_secs: u64,

    /// Per-request timeout applied to every route.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8000
}
fn default_hash_delay() -> u64 {
    5
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            hash_delay_secs: default_hash_delay(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Delay applied to every submitted job before its digest is published.
    pub fn hash_delay(&self) -> Duration {
        Duration::from_secs(self.hash_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be a non-zero TCP port");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
