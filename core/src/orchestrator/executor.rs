//! Orchestrator execution logic

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult, RequestError};
use crate::monitor::{ErrorReporter, LiveProgress, LiveSnapshot};
use crate::request::RequestSpec;
use crate::shutdown::Shutdown;
use crate::traits::{ClientFactory, HttpClient};
use crate::worker::{RampGate, RampUpScheduler, RequestRateLimiter, Worker, WorkerBuilder};

use super::aggregator::aggregate_worker_stats;
use super::{RunOutcome, RunPhase};

type MonitorOutput = Box<dyn Write + Send>;

/// Orchestrator manages the run lifecycle
///
/// Responsible for the preflight check, spawning workers and monitors,
/// broadcasting the stop signal and collecting results.
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: RunConfig,

    /// Request shared by all workers
    pub(crate) request: Arc<RequestSpec>,

    /// Builds one client per worker
    pub(crate) factory: Arc<dyn ClientFactory>,

    /// Channel capacities
    pub(crate) channel_config: ChannelConfig,

    /// Discard error and live output instead of writing to stdout
    pub(crate) quiet: bool,

    /// Shutdown signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,

    /// Current lifecycle phase
    pub(crate) phase: watch::Sender<RunPhase>,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a validated construction.
    pub fn new(config: RunConfig, request: RequestSpec, factory: Arc<dyn ClientFactory>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (phase, _) = watch::channel(RunPhase::Idle);

        Self {
            config,
            request: Arc::new(request),
            factory,
            channel_config: ChannelConfig::default(),
            quiet: false,
            shutdown_tx,
            phase,
        }
    }

    /// Get a shutdown signal handle
    pub fn shutdown_receiver(&self) -> Shutdown {
        Shutdown::new(self.shutdown_tx.subscribe())
    }

    /// Trigger shutdown of a running run
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    /// Watch lifecycle phase changes
    pub fn subscribe_phase(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Get the target request
    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// Run for the configured duration
    pub async fn run(&self) -> BenchResult<RunOutcome> {
        self.run_until(std::future::pending()).await
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C stops the run early; the stats collected so far are returned.
    pub async fn run_with_signal_handling(&self) -> BenchResult<RunOutcome> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received Ctrl+C, stopping run..."),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Run until the configured duration elapses or `interrupt` completes
    ///
    /// # Errors
    ///
    /// Fails before any worker starts if the preflight request fails or a
    /// client cannot be built.
    pub async fn run_until<F>(&self, interrupt: F) -> BenchResult<RunOutcome>
    where
        F: Future<Output = ()> + Send,
    {
        let parallelism = self.config.parallelism;

        let redirects = self
            .factory
            .preflight(&self.request)
            .await
            .map_err(|source| BenchError::Preflight {
                url: self.request.url().to_string(),
                source,
            })?;

        if !redirects.is_empty() {
            tracing::warn!(
                url = %self.request.url(),
                chain = %redirects.join(" -> "),
                "Target redirects, results include redirect hops"
            );
        }

        let clients = (0..parallelism)
            .map(|_| self.factory.create())
            .collect::<Result<Vec<_>, _>>()
            .map_err(BenchError::Client)?;

        let (errors_tx, errors_rx) = mpsc::channel(self.channel_config.error_buffer.max(1));
        let (live_tx, live_rx) = if self.config.live {
            let (tx, rx) = mpsc::channel(self.channel_config.live_buffer(parallelism));
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let ramp_gate = (!self.config.ramp_up.is_zero()).then(RampGate::new);
        let limiter = Arc::new(RequestRateLimiter::new(self.config.rate_limit)?);

        let workers = self.build_workers(clients, errors_tx, live_tx, &limiter, &ramp_gate)?;

        tracing::info!(
            url = %self.request.url(),
            parallelism,
            duration = ?self.config.duration,
            rate_limit = ?self.config.rate_limit,
            ramp_up = ?self.config.ramp_up,
            "Starting run"
        );

        let reporter = tokio::spawn(ErrorReporter::new().run(
            errors_rx,
            self.shutdown_receiver(),
            self.monitor_output(),
        ));
        let live = live_rx.map(|rx| {
            tokio::spawn(LiveProgress::new(self.config.duration).run(
                rx,
                self.shutdown_receiver(),
                self.monitor_output(),
            ))
        });
        let ramp = ramp_gate.map(|gate| {
            let scheduler = RampUpScheduler::new(gate, parallelism, self.config.ramp_up);
            tokio::spawn(scheduler.run(self.shutdown_receiver()))
        });

        self.phase.send_replace(RunPhase::Running);
        let start = Instant::now();
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| {
                let shutdown = self.shutdown_receiver();
                tokio::spawn(worker.run(shutdown))
            })
            .collect();

        // External shutdown() calls end the wait as well
        let mut stop = self.shutdown_receiver();
        let interrupted = tokio::select! {
            _ = tokio::time::sleep(self.config.duration) => false,
            _ = interrupt => true,
            _ = stop.recv() => true,
        };

        self.phase.send_replace(RunPhase::Stopping);
        tracing::info!(interrupted, "Stopping workers");
        self.shutdown();

        let mut results = Vec::with_capacity(handles.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => results.push(stats),
                Err(e) => {
                    tracing::error!(worker_id = idx + 1, error = %e, "Worker task panicked");
                }
            }
        }
        let elapsed = start.elapsed();
        let total = aggregate_worker_stats(&results, elapsed);

        if let Some(handle) = ramp {
            log_join_error("ramp-up scheduler", handle.await);
        }
        log_join_error("error reporter", reporter.await);
        if let Some(handle) = live {
            log_join_error("live progress", handle.await);
        }

        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            requests = total.requests,
            errors = total.errors(),
            workers = total.workers,
            "Run completed"
        );
        self.phase.send_replace(RunPhase::Done);

        Ok(RunOutcome {
            total,
            redirects,
            interrupted,
        })
    }

    /// Build every worker up front so a failure leaves nothing running
    fn build_workers(
        &self,
        clients: Vec<Box<dyn HttpClient>>,
        errors_tx: mpsc::Sender<RequestError>,
        live_tx: Option<mpsc::Sender<LiveSnapshot>>,
        limiter: &Arc<RequestRateLimiter>,
        ramp_gate: &Option<RampGate>,
    ) -> BenchResult<Vec<Worker>> {
        clients
            .into_iter()
            .enumerate()
            .map(|(idx, client)| {
                WorkerBuilder::new(idx + 1)
                    .request(Arc::clone(&self.request))
                    .client(client)
                    .errors_tx(errors_tx.clone())
                    .live_tx(live_tx.clone())
                    .rate_limiter(Arc::clone(limiter))
                    .ramp_gate(ramp_gate.clone())
                    .build()
            })
            .collect()
    }

    fn monitor_output(&self) -> MonitorOutput {
        if self.quiet {
            Box::new(std::io::sink())
        } else {
            Box::new(std::io::stdout())
        }
    }
}

fn log_join_error<T>(task: &'static str, result: Result<T, tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(task, error = %e, "Monitor task failed");
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("request", &self.request.to_string())
            .field("channel_config", &self.channel_config)
            .field("phase", &self.phase())
            .finish()
    }
}
