//! Core traits for the HTTP client collaborator
//!
//! The engine never builds wire bytes itself. It talks to the transport
//! through these traits; the reqwest implementation lives in `gb-http`.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::PreflightError;
use crate::request::RequestSpec;

// ============================================================================
// HTTP Client Trait
// ============================================================================

/// Streaming response body: a sequence of chunk sizes ending at end of stream
///
/// An `Err` item means the body could not be read to completion.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<usize, ClientError>> + Send>>;

/// A response whose headers have arrived but whose body has not been drained
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Remaining body
    pub body: BodyStream,
}

impl HttpResponse {
    /// Create a response from a status and body stream
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// HTTP client owned by a single worker
///
/// Each worker gets its own instance so connection pools are never shared
/// between workers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Dispatch the request and return once the response headers arrive
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ClientError>;
}

/// Builds per-worker clients and performs the preflight check
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Create a fresh, independent client
    fn create(&self) -> Result<Box<dyn HttpClient>, ClientError>;

    /// Issue a single request before the run starts
    ///
    /// Returns the redirect chain that was followed (empty when there was
    /// none). A status code >= 400 or a transport error is a failure.
    async fn preflight(&self, request: &RequestSpec) -> Result<Vec<String>, PreflightError>;
}

/// Transport-level client errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Connection could not be established
    #[error("{0}")]
    Connect(String),

    /// Request or connect timeout expired
    #[error("{0}")]
    Timeout(String),

    /// Response body could not be read
    #[error("{0}")]
    Body(String),

    /// Client could not be constructed
    #[error("{0}")]
    Build(String),

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}
