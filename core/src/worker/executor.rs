//! Worker execution loop

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::RequestError;
use crate::monitor::LiveSnapshot;
use crate::request::RequestSpec;
use crate::shutdown::Shutdown;
use crate::traits::HttpClient;

use super::ramp_up::RampGate;
use super::rate_limiter::RequestRateLimiter;
use super::stats::WorkerStats;

/// Minimum time between two live snapshots from the same worker
pub const LIVE_SNAPSHOT_INTERVAL: Duration = Duration::from_millis(500);

/// Worker executes requests in a loop: wait -> dispatch -> drain -> record -> repeat
///
/// Workers are tokio tasks spawned by the Orchestrator. Each one owns its
/// HTTP client and its [`WorkerStats`]; the stats are handed back exactly
/// once, as the return value of [`Worker::run`].
pub struct Worker {
    /// Worker identifier (1-based)
    id: usize,

    /// Request shared read-only by all workers
    request: Arc<RequestSpec>,

    /// Client owned by this worker alone
    client: Box<dyn HttpClient>,

    /// Error events for the error aggregator
    errors_tx: mpsc::Sender<RequestError>,

    /// Live snapshots for the progress aggregator (None when live mode is off)
    live_tx: Option<mpsc::Sender<LiveSnapshot>>,

    /// Global pacer shared by all workers
    rate_limiter: Option<Arc<RequestRateLimiter>>,

    /// Ramp-up gate passed once before the first request
    ramp_gate: Option<RampGate>,
}

/// Request/byte counts accumulated since the last live snapshot
struct LiveWindow {
    requests: u64,
    bytes: u64,
    since: Instant,
}

impl LiveWindow {
    fn new() -> Self {
        Self {
            requests: 0,
            bytes: 0,
            since: Instant::now(),
        }
    }

    fn take(&mut self, worker_id: usize, now: Instant) -> LiveSnapshot {
        let snapshot = LiveSnapshot {
            worker_id,
            requests: self.requests,
            bytes: self.bytes,
        };
        self.requests = 0;
        self.bytes = 0;
        self.since = now;
        snapshot
    }
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        request: Arc<RequestSpec>,
        client: Box<dyn HttpClient>,
        errors_tx: mpsc::Sender<RequestError>,
    ) -> Self {
        Self {
            id,
            request,
            client,
            errors_tx,
            live_tx: None,
            rate_limiter: None,
            ramp_gate: None,
        }
    }

    /// Emit live snapshots on the given channel
    pub fn with_live(mut self, live_tx: mpsc::Sender<LiveSnapshot>) -> Self {
        self.live_tx = Some(live_tx);
        self
    }

    /// Pace requests with a shared rate limiter
    pub fn with_rate_limiter(mut self, limiter: Arc<RequestRateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Wait on a ramp-up gate before the first request
    pub fn with_ramp_gate(mut self, gate: RampGate) -> Self {
        self.ramp_gate = Some(gate);
        self
    }

    /// Run the worker loop until the stop signal is observed
    ///
    /// The stop signal is only checked between requests: a request in
    /// flight when the run stops always completes and is recorded.
    pub async fn run(mut self, mut shutdown: Shutdown) -> WorkerStats {
        let mut stats = WorkerStats::new();

        if let Some(gate) = &self.ramp_gate {
            gate.wait().await;
        }
        let mut window = LiveWindow::new();

        tracing::debug!(worker_id = self.id, "Worker started");

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait_or_shutdown(&mut shutdown).await;
            }

            if shutdown.is_triggered() {
                break;
            }

            let bytes_before = stats.bytes_read;
            let finished = self.execute_one(&mut stats).await;
            window.requests += 1;
            window.bytes += stats.bytes_read - bytes_before;

            if finished.duration_since(window.since) >= LIVE_SNAPSHOT_INTERVAL {
                let snapshot = window.take(self.id, finished);
                self.send_live(snapshot).await;
            }
        }

        tracing::debug!(
            worker_id = self.id,
            requests = stats.requests,
            conn_errors = stats.conn_errors,
            read_errors = stats.read_errors,
            "Worker finished"
        );

        stats
    }

    /// Issue one request, drain its body and record the outcome
    ///
    /// Returns the instant the request finished.
    async fn execute_one(&self, stats: &mut WorkerStats) -> Instant {
        stats.record_attempt();
        let start = Instant::now();

        let response = match self.client.send(&self.request).await {
            Ok(response) => response,
            Err(e) => {
                stats.record_connection_error();
                self.report_error(RequestError::Connection(e)).await;
                return Instant::now();
            }
        };

        stats.record_status(response.status);

        let mut body = response.body;
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(n) => stats.record_bytes(n as u64),
                Err(e) => {
                    stats.record_read_error();
                    self.report_error(RequestError::Read(e)).await;
                    break;
                }
            }
        }
        drop(body);

        let finished = Instant::now();
        stats.record_latency(finished - start);
        finished
    }

    async fn report_error(&self, error: RequestError) {
        tracing::debug!(worker_id = self.id, error = %error, "Request error");
        // The aggregator drains until every worker is gone, so this only
        // fails if it was never started.
        let _ = self.errors_tx.send(error).await;
    }

    async fn send_live(&mut self, snapshot: LiveSnapshot) {
        let Some(tx) = &self.live_tx else {
            return;
        };
        if tx.send(snapshot).await.is_err() {
            tracing::debug!(worker_id = self.id, "Live channel closed, snapshots disabled");
            self.live_tx = None;
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("request", &self.request.to_string())
            .field("live", &self.live_tx.is_some())
            .field("rate_limiter", &self.rate_limiter)
            .field("ramp_up", &self.ramp_gate.is_some())
            .finish()
    }
}
