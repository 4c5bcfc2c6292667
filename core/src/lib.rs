//! gb-core: Concurrent engine of the gb HTTP load generator
//!
//! This crate provides the pieces every gb component builds on:
//!
//! - Request and run configuration types
//! - Client traits implemented by the transport crate (`HttpClient`, `ClientFactory`)
//! - Workers with shared rate limiting and staggered ramp-up
//! - Error and live-progress monitors
//! - The orchestrator that runs, stops and merges a benchmark
//! - Latency histogram and unit formatting used by the reports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod histogram;
pub mod monitor;
pub mod orchestrator;
pub mod request;
pub mod shutdown;
pub mod traits;
pub mod units;
pub mod worker;

pub use channel::ChannelConfig;
pub use config::{ConfigError, RunConfig};
pub use error::*;
pub use histogram::LatencyHistogram;
pub use monitor::{ErrorReporter, LiveProgress, LiveSnapshot};
pub use orchestrator::{
    aggregate_worker_stats, Orchestrator, OrchestratorBuilder, RunOutcome, RunPhase, TotalStats,
};
pub use request::{ClientConfig, RequestSpec};
pub use shutdown::Shutdown;
pub use traits::*;
pub use worker::{RequestRateLimiter, Worker, WorkerBuilder, WorkerStats};
