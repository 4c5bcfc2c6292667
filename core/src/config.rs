//! Run configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::ClientConfig;
use crate::worker::pacing_period;

/// Run configuration
///
/// Defines how a benchmark run is executed: how many workers, for how long,
/// how they are paced and staggered, and what is displayed. Read-only for
/// the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of concurrent workers
    pub parallelism: usize,

    /// How long the run lasts before workers are told to stop
    pub duration: Duration,

    /// Optional aggregate rate limit (requests per second)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<f64>,

    /// Window over which workers are released (zero releases all at once)
    pub ramp_up: Duration,

    /// Settings for the per-worker HTTP clients
    pub client: ClientConfig,

    /// Render the latency histogram in the final report
    pub histogram: bool,

    /// Print a progress line once per second
    pub live: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallelism: 20,
            duration: Duration::from_secs(15),
            rate_limit: None,
            ramp_up: Duration::ZERO,
            client: ClientConfig::default(),
            histogram: false,
            live: false,
        }
    }
}

impl RunConfig {
    /// Create a new config with the given parallelism
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism,
            ..Default::default()
        }
    }

    /// Set the run duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rps: f64) -> Self {
        self.rate_limit = Some(rps);
        self
    }

    /// Set the ramp-up window
    pub fn with_ramp_up(mut self, window: Duration) -> Self {
        self.ramp_up = window;
        self
    }

    /// Set the client settings
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Enable or disable the histogram
    pub fn with_histogram(mut self, enabled: bool) -> Self {
        self.histogram = enabled;
        self
    }

    /// Enable or disable live progress
    pub fn with_live(mut self, enabled: bool) -> Self {
        self.live = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism(
                "parallelism must be at least 1".into(),
            ));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "duration must be greater than zero".into(),
            ));
        }

        if let Some(rps) = self.rate_limit {
            if !(rps > 0.0 && rps.is_finite()) {
                return Err(ConfigError::InvalidRateLimit(
                    "rate limit must be positive".into(),
                ));
            }
            if pacing_period(rps).is_none() {
                return Err(ConfigError::InvalidRateLimit(
                    "rate limit must be at least one request per day".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid parallelism value
    #[error("Invalid parallelism: {0}")]
    InvalidParallelism(String),

    /// Invalid run duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Invalid rate limit
    #[error("Invalid rate limit: {0}")]
    InvalidRateLimit(String),

    /// Malformed or unsupported target URL
    #[error("Invalid url {0}")]
    InvalidUrl(String),
}
