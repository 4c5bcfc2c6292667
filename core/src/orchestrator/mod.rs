//! Orchestrator for run lifecycle management
//!
//! The Orchestrator drives one benchmark run through its phases:
//! - `Idle`: preflight request, one HTTP client built per worker
//! - `Running`: workers, ramp-up scheduler and monitors spawned
//! - `Stopping`: deadline or interrupt reached, stop signal broadcast
//! - `Done`: one [`WorkerStats`](crate::worker::WorkerStats) collected per
//!   worker and merged into [`TotalStats`]
//!
//! # Example
//!
//! ```ignore
//! use gb_core::{OrchestratorBuilder, RequestSpec, RunConfig};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .config(RunConfig::new(20).with_duration(Duration::from_secs(15)))
//!     .request(RequestSpec::get("http://localhost:8080/")?)
//!     .factory(factory)
//!     .build()?;
//!
//! let outcome = orchestrator.run_with_signal_handling().await?;
//! println!("Requests: {}", outcome.total.requests);
//! ```

mod aggregator;
mod builder;
mod executor;

use serde::Serialize;

pub use aggregator::{aggregate_worker_stats, TotalStats};
pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Not started, or aborted before any worker was spawned
    Idle,
    /// Workers are issuing requests
    Running,
    /// Stop signal sent, waiting for workers to return
    Stopping,
    /// Stats merged, monitors drained
    Done,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Merged stats of every worker that reported
    pub total: TotalStats,

    /// Redirect chain observed by the preflight request
    pub redirects: Vec<String>,

    /// Whether the run stopped before its deadline
    pub interrupted: bool,
}

#[cfg(test)]
mod tests;
