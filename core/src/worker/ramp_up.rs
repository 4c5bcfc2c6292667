//! Staggered worker release

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::MissedTickBehavior;

use crate::shutdown::Shutdown;

/// Interval between two release groups
pub const RAMP_UP_INTERVAL: Duration = Duration::from_millis(100);

/// Gate every worker passes once before its first request
///
/// Backed by a semaphore: the scheduler releases workers by adding permits
/// and releases everyone still waiting by closing it.
#[derive(Debug, Clone)]
pub struct RampGate {
    permits: Arc<Semaphore>,
}

impl RampGate {
    /// Create a closed gate
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    /// Wait for this worker's release
    ///
    /// Consumes exactly one release. Returns immediately once the gate has
    /// been opened for everyone.
    pub async fn wait(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    /// Release `count` waiting workers
    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }

    /// Release every current and future waiter
    pub fn open(&self) {
        self.permits.close();
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Default for RampGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases workers in equal-size groups over a ramp-up window
#[derive(Debug)]
pub struct RampUpScheduler {
    gate: RampGate,
    workers: usize,
    window: Duration,
    interval: Duration,
}

impl RampUpScheduler {
    /// Create a scheduler releasing `workers` through `gate` over `window`
    pub fn new(gate: RampGate, workers: usize, window: Duration) -> Self {
        Self {
            gate,
            workers,
            window,
            interval: RAMP_UP_INTERVAL,
        }
    }

    /// Number of workers released per tick
    ///
    /// The window is split into `max(1, window / interval)` groups; the first
    /// group goes out immediately, so the last one leaves no later than the
    /// end of the window.
    pub fn group_size(&self) -> usize {
        if self.interval.is_zero() {
            return self.workers.max(1);
        }
        let groups = (self.window.as_nanos() / self.interval.as_nanos()).max(1);
        let groups = usize::try_from(groups).unwrap_or(usize::MAX);
        self.workers.div_ceil(groups).max(1)
    }

    /// Release workers until all are out or the run is stopped
    ///
    /// The gate is always opened on exit, so workers that were never
    /// released by a tick still get through on shutdown.
    pub async fn run(self, mut shutdown: Shutdown) {
        if self.window.is_zero() || self.workers == 0 {
            self.gate.open();
            return;
        }

        let group = self.group_size();
        let mut remaining = self.workers;
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        tracing::debug!(
            workers = self.workers,
            group,
            window_ms = self.window.as_millis() as u64,
            "Ramp-up started"
        );

        loop {
            let batch = group.min(remaining);
            self.gate.release(batch);
            remaining -= batch;
            if remaining == 0 {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => {
                    tracing::debug!(remaining, "Ramp-up interrupted by shutdown");
                    break;
                }
            }
        }

        self.gate.open();
    }
}
