//! Worker module for executing benchmark requests
//!
//! The Worker is the leaf producer of a run, responsible for the simple but
//! critical loop: **wait -> dispatch -> drain -> record -> repeat**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Waits once for its ramp-up release (if ramp-up is configured)
//! 2. Waits for a permit from the shared rate limiter (if any)
//! 3. Checks the stop signal between requests, never mid-flight
//! 4. Dispatches the request through its own HTTP client and drains the body
//! 5. Records status, bytes, errors and latency in its own [`WorkerStats`]
//! 6. Forwards error events and periodic live snapshots over channels
//! 7. Returns its stats exactly once when stopped
//!
//! # Example
//!
//! ```ignore
//! use gb_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(1)
//!     .request(request)
//!     .client(factory.create()?)
//!     .errors_tx(errors_tx)
//!     .build()?;
//!
//! let stats = worker.run(shutdown).await;
//! println!("Requests: {}", stats.requests);
//! ```

mod builder;
mod executor;
mod ramp_up;
mod rate_limiter;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::{Worker, LIVE_SNAPSHOT_INTERVAL};
pub use ramp_up::{RampGate, RampUpScheduler, RAMP_UP_INTERVAL};
pub use rate_limiter::{pacing_period, RequestRateLimiter, MAX_PACING_PERIOD};
pub use stats::WorkerStats;
