//! Builder pattern for Worker construction

use crate::error::{BenchError, BenchResult, RequestError};
use crate::monitor::LiveSnapshot;
use crate::request::RequestSpec;
use crate::traits::HttpClient;

use super::executor::Worker;
use super::ramp_up::RampGate;
use super::rate_limiter::RequestRateLimiter;

use std::sync::Arc;
use tokio::sync::mpsc;

/// Builder for creating Worker instances
///
/// Provides ergonomic construction with validation.
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(1)
///     .request(request)
///     .client(client)
///     .errors_tx(errors_tx)
///     .rate_limiter(limiter)
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    request: Option<Arc<RequestSpec>>,
    client: Option<Box<dyn HttpClient>>,
    errors_tx: Option<mpsc::Sender<RequestError>>,
    live_tx: Option<mpsc::Sender<LiveSnapshot>>,
    rate_limiter: Option<Arc<RequestRateLimiter>>,
    ramp_gate: Option<RampGate>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            request: None,
            client: None,
            errors_tx: None,
            live_tx: None,
            rate_limiter: None,
            ramp_gate: None,
        }
    }

    /// Set the shared request
    pub fn request(mut self, request: Arc<RequestSpec>) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the worker's own HTTP client
    pub fn client(mut self, client: Box<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the error event sender
    pub fn errors_tx(mut self, tx: mpsc::Sender<RequestError>) -> Self {
        self.errors_tx = Some(tx);
        self
    }

    /// Set the live snapshot sender (live mode only)
    pub fn live_tx(mut self, tx: Option<mpsc::Sender<LiveSnapshot>>) -> Self {
        self.live_tx = tx;
        self
    }

    /// Set the shared rate limiter
    ///
    /// A disabled limiter is dropped so the worker never waits on it.
    pub fn rate_limiter(mut self, limiter: Arc<RequestRateLimiter>) -> Self {
        self.rate_limiter = limiter.is_enabled().then_some(limiter);
        self
    }

    /// Set the ramp-up gate
    pub fn ramp_gate(mut self, gate: Option<RampGate>) -> Self {
        self.ramp_gate = gate;
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let request = self.request.ok_or(BenchError::missing_config("request"))?;
        let client = self.client.ok_or(BenchError::missing_config("client"))?;
        let errors_tx = self
            .errors_tx
            .ok_or(BenchError::missing_config("errors_tx"))?;

        let mut worker = Worker::new(self.id, request, client, errors_tx);

        if let Some(tx) = self.live_tx {
            worker = worker.with_live(tx);
        }
        if let Some(limiter) = self.rate_limiter {
            worker = worker.with_rate_limiter(limiter);
        }
        if let Some(gate) = self.ramp_gate {
            worker = worker.with_ramp_gate(gate);
        }

        Ok(worker)
    }
}
