//! Run-time monitors fed by worker channels
//!
//! Both monitors are single consumers spawned by the orchestrator. They stop
//! reading only once every worker has dropped its sender, so a worker never
//! blocks forever on a full channel.

mod errors;
mod live;

pub use errors::{ErrorReporter, ERROR_REPORT_INTERVAL};
pub use live::{LiveProgress, LiveSnapshot, LIVE_REPORT_INTERVAL};
