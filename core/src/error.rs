//! Error types for gb-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::traits::ClientError;

/// Core error type for orchestration APIs
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration error (fatal before any worker starts)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A builder was missing a required component
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),

    /// Target check failed before the run (fatal)
    #[error("url check failed for {url}: {source}")]
    Preflight {
        /// Target URL
        url: String,
        /// Underlying failure
        source: PreflightError,
    },

    /// Building a per-worker HTTP client failed
    #[error("failed to build HTTP client: {0}")]
    Client(ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Create a missing component error
    pub fn missing_config(component: &'static str) -> Self {
        Self::MissingComponent(component)
    }

    /// Whether this error was raised by the preflight check
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Preflight { .. })
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// Failure of the single request issued before the run starts
#[derive(Error, Debug)]
pub enum PreflightError {
    /// Target answered with a status code >= 400
    #[error("{0}")]
    Status(String),

    /// No response could be obtained
    #[error("{0}")]
    Transport(ClientError),
}

/// Per-request failure observed by a worker
///
/// These never stop the worker loop. They are counted in the worker's
/// stats and forwarded to the error aggregator as log-only events.
#[derive(Error, Debug)]
pub enum RequestError {
    /// No response was obtained
    #[error("request failed: {0}")]
    Connection(ClientError),

    /// A response was obtained but its body could not be read to the end
    #[error("read failed: {0}")]
    Read(ClientError),
}

impl RequestError {
    /// Whether this is a transport-level dispatch failure
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
