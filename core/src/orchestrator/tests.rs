//! Tests for the Orchestrator module

use super::builder::OrchestratorBuilder;
use super::RunPhase;
use crate::config::{ConfigError, RunConfig};
use crate::error::{BenchError, PreflightError};
use crate::request::RequestSpec;
use crate::traits::{ClientError, ClientFactory, HttpClient, HttpResponse};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Mock HttpClient
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Respond with the status and a 100-byte body
    Status(u16),
    /// Respond 200, then fail after the first body chunk
    TruncatedBody,
    /// Never get a response
    Refuse,
}

struct MockClient {
    behavior: Behavior,
    latency: Duration,
}

#[async_trait]
impl HttpClient for MockClient {
    async fn send(&self, _request: &RequestSpec) -> Result<HttpResponse, ClientError> {
        tokio::time::sleep(self.latency).await;

        let chunks = match self.behavior {
            Behavior::Status(status) => {
                return Ok(HttpResponse::new(
                    status,
                    Box::pin(futures::stream::iter(vec![Ok(60), Ok(40)])),
                ));
            }
            Behavior::TruncatedBody => vec![Ok(10), Err(ClientError::Body("unexpected eof".into()))],
            Behavior::Refuse => return Err(ClientError::Connect("connection refused".into())),
        };
        Ok(HttpResponse::new(200, Box::pin(futures::stream::iter(chunks))))
    }
}

// ============================================================================
// Mock ClientFactory
// ============================================================================

struct MockFactory {
    behavior: Behavior,
    latency: Duration,
    preflight_status: Option<u16>,
    fail_create: bool,
    created: AtomicUsize,
    preflights: AtomicUsize,
}

impl MockFactory {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            latency: Duration::from_millis(10),
            preflight_status: None,
            fail_create: false,
            created: AtomicUsize::new(0),
            preflights: AtomicUsize::new(0),
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn with_preflight_status(mut self, status: u16) -> Self {
        self.preflight_status = Some(status);
        self
    }

    fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    fn create(&self) -> Result<Box<dyn HttpClient>, ClientError> {
        if self.fail_create {
            return Err(ClientError::Build("no TLS backend".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockClient {
            behavior: self.behavior,
            latency: self.latency,
        }))
    }

    async fn preflight(&self, _request: &RequestSpec) -> Result<Vec<String>, PreflightError> {
        self.preflights.fetch_add(1, Ordering::SeqCst);
        match self.preflight_status {
            Some(status) if status >= 400 => {
                Err(PreflightError::Status(format!("{} Service Unavailable", status)))
            }
            _ => Ok(vec![]),
        }
    }
}

fn request() -> RequestSpec {
    RequestSpec::get("http://localhost:8080/").unwrap()
}

fn builder(factory: &Arc<MockFactory>, config: RunConfig) -> OrchestratorBuilder {
    OrchestratorBuilder::new()
        .config(config)
        .request(request())
        .factory(factory.clone())
        .quiet(true)
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_missing_factory() {
    let result = OrchestratorBuilder::new().request(request()).build();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("client factory"));
}

#[test]
fn test_builder_missing_request() {
    let factory: Arc<dyn ClientFactory> = Arc::new(MockFactory::new(Behavior::Status(200)));
    let result = OrchestratorBuilder::new().factory(factory).build();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("request"));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let result = builder(&factory, RunConfig::new(0)).build();
    assert!(matches!(result, Err(BenchError::Config(_))));

    let result = builder(&factory, RunConfig::new(1).with_rate_limit(-1.0)).build();
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[test]
fn test_builder_defaults() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let orchestrator = OrchestratorBuilder::new()
        .request(request())
        .factory(factory)
        .build()
        .unwrap();

    assert_eq!(orchestrator.config().parallelism, 20);
    assert_eq!(orchestrator.config().duration, Duration::from_secs(15));
    assert_eq!(orchestrator.phase(), RunPhase::Idle);
}

// ============================================================================
// Run Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_server_errors_everywhere() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(500)));
    let config = RunConfig::new(4).with_duration(Duration::from_secs(1));
    let orchestrator = builder(&factory, config).build().unwrap();

    let outcome = orchestrator.run().await.unwrap();
    let total = &outcome.total;

    assert!(!outcome.interrupted);
    assert!(outcome.redirects.is_empty());
    assert_eq!(factory.created(), 4);
    assert_eq!(factory.preflights.load(Ordering::SeqCst), 1);
    assert_eq!(total.workers, 4);
    assert!(total.requests >= 4 * 90, "requests = {}", total.requests);
    assert_eq!(total.status_counts.get(&500), Some(&total.requests));
    assert_eq!(total.status_counts.len(), 1);
    assert_eq!(total.conn_errors, 0);
    assert_eq!(total.read_errors, 0);
    assert_eq!(total.bytes_read, total.requests * 100);
    assert_eq!(total.histogram.total(), total.requests);
    assert!(total.elapsed >= Duration::from_secs(1));
    assert_eq!(orchestrator.phase(), RunPhase::Done);
}

#[tokio::test(start_paused = true)]
async fn test_preflight_failure_aborts_run() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)).with_preflight_status(503));
    let orchestrator = builder(&factory, RunConfig::new(8)).build().unwrap();

    let err = orchestrator.run().await.unwrap_err();

    assert!(err.is_preflight());
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("http://localhost:8080/"));
    assert_eq!(factory.created(), 0);
    assert_eq!(orchestrator.phase(), RunPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_client_build_failure_aborts_run() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)).failing_create());
    let orchestrator = builder(&factory, RunConfig::new(2)).build().unwrap();

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, BenchError::Client(ClientError::Build(_))));
    assert_eq!(orchestrator.phase(), RunPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_in_flight_request_is_recorded() {
    let factory =
        Arc::new(MockFactory::new(Behavior::Status(200)).with_latency(Duration::from_millis(300)));
    let config = RunConfig::new(1).with_duration(Duration::from_millis(100));
    let orchestrator = builder(&factory, config).build().unwrap();

    let outcome = orchestrator.run().await.unwrap();
    let total = &outcome.total;

    assert_eq!(total.requests, 1);
    assert_eq!(total.status_counts.get(&200), Some(&1));
    assert_eq!(total.conn_errors, 0);
    assert_eq!(total.histogram.total(), 1);
    assert_eq!(total.bytes_read, 100);
    assert!(total.elapsed >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_connection_errors_have_no_status_or_latency() {
    let factory = Arc::new(MockFactory::new(Behavior::Refuse).with_latency(Duration::from_millis(5)));
    let config = RunConfig::new(3).with_duration(Duration::from_millis(500));
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;

    assert!(total.requests > 0);
    assert_eq!(total.conn_errors, total.requests);
    assert!(total.status_counts.is_empty());
    assert!(total.histogram.is_empty());
    assert_eq!(total.bytes_read, 0);
}

#[tokio::test(start_paused = true)]
async fn test_read_errors_keep_status_and_latency() {
    let factory = Arc::new(MockFactory::new(Behavior::TruncatedBody));
    let config = RunConfig::new(2).with_duration(Duration::from_millis(200));
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;

    assert!(total.requests > 0);
    assert_eq!(total.read_errors, total.requests);
    assert_eq!(total.conn_errors, 0);
    assert_eq!(total.status_counts.get(&200), Some(&total.requests));
    assert_eq!(total.histogram.total(), total.requests);
    assert_eq!(total.bytes_read, total.requests * 10);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_early() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let config = RunConfig::new(2).with_duration(Duration::from_secs(60));
    let orchestrator = builder(&factory, config).build().unwrap();

    let outcome = orchestrator
        .run_until(tokio::time::sleep(Duration::from_millis(50)))
        .await
        .unwrap();

    assert!(outcome.interrupted);
    assert_eq!(outcome.total.workers, 2);
    assert!(outcome.total.elapsed < Duration::from_secs(1));
    assert_eq!(orchestrator.phase(), RunPhase::Done);
}

#[tokio::test(start_paused = true)]
async fn test_external_shutdown_stops_run() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let config = RunConfig::new(2).with_duration(Duration::from_secs(60));
    let orchestrator = builder(&factory, config).build().unwrap();

    let (outcome, ()) = tokio::join!(orchestrator.run(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(orchestrator.phase(), RunPhase::Running);
        orchestrator.shutdown();
    });

    let outcome = outcome.unwrap();
    assert!(outcome.interrupted);
    assert!(outcome.total.elapsed < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ramp_up_cut_short_releases_every_worker() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let config = RunConfig::new(10)
        .with_duration(Duration::from_millis(300))
        .with_ramp_up(Duration::from_secs(5));
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;

    // Every worker reports even though most were never released by a tick
    assert_eq!(total.workers, 10);
    assert!(total.requests > 0);
    assert_eq!(orchestrator.phase(), RunPhase::Done);
}

#[tokio::test(start_paused = true)]
async fn test_live_mode_run_completes() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let config = RunConfig::new(3)
        .with_duration(Duration::from_secs(2))
        .with_live(true);
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;
    assert_eq!(total.workers, 3);
    assert_eq!(total.histogram.total(), total.requests);
}

#[tokio::test]
async fn test_rate_limit_caps_aggregate_rate() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)).with_latency(Duration::from_millis(1)));
    let config = RunConfig::new(2)
        .with_duration(Duration::from_secs(1))
        .with_rate_limit(10.0);
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;

    // One permit every 100ms, first one immediately
    assert!(
        (8..=12).contains(&total.requests),
        "requests = {}",
        total.requests
    );
}

#[tokio::test]
async fn test_rate_limit_single_worker() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)).with_latency(Duration::from_millis(1)));
    let config = RunConfig::new(1)
        .with_duration(Duration::from_secs(1))
        .with_rate_limit(10.0);
    let orchestrator = builder(&factory, config).build().unwrap();

    let total = orchestrator.run().await.unwrap().total;

    assert!(
        (9..=11).contains(&total.requests),
        "requests = {}",
        total.requests
    );
    assert_eq!(total.status_counts.get(&200), Some(&total.requests));
}

#[tokio::test]
async fn test_unpaceable_rate_limit_rejected_at_build() {
    let factory = Arc::new(MockFactory::new(Behavior::Status(200)));
    let config = RunConfig::new(1).with_rate_limit(1e-20);

    let err = builder(&factory, config).build().unwrap_err();
    assert!(matches!(err, BenchError::Config(ConfigError::InvalidRateLimit(_))));
    assert_eq!(factory.created(), 0);
}
