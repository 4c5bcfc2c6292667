//! Once-per-second progress line fed by worker snapshots

use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::shutdown::Shutdown;
use crate::units::format_throughput;

/// Progress line interval
pub const LIVE_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Request/byte deltas a worker accumulated since its previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSnapshot {
    /// Sending worker
    pub worker_id: usize,

    /// Requests completed in the window
    pub requests: u64,

    /// Body bytes read in the window
    pub bytes: u64,
}

/// Aggregates live snapshots into a progress line per interval
///
/// The line is suppressed once the run reaches its configured duration;
/// the final numbers come from the merged stats instead.
#[derive(Debug)]
pub struct LiveProgress {
    duration: Duration,
    interval: Duration,
    requests: u64,
    bytes: u64,
    active: HashSet<usize>,
}

impl LiveProgress {
    /// Create an aggregator for a run of the given duration
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            interval: LIVE_REPORT_INTERVAL,
            requests: 0,
            bytes: 0,
            active: HashSet::new(),
        }
    }

    /// Add a snapshot to the current window
    pub fn record(&mut self, snapshot: &LiveSnapshot) {
        self.requests += snapshot.requests;
        self.bytes += snapshot.bytes;
        self.active.insert(snapshot.worker_id);
    }

    /// Close the current window
    ///
    /// Returns the progress line, or `None` once `elapsed` has reached the
    /// configured duration.
    pub fn close_window(&mut self, elapsed: Duration) -> Option<String> {
        let percent = if self.duration.is_zero() {
            100
        } else {
            elapsed.as_nanos() * 100 / self.duration.as_nanos()
        };

        let line = format!(
            "Duration: {:3.0}s ({:2}%) | Rate: {} req/s | Throughput: {} | Live clients: {}",
            elapsed.as_secs_f64(),
            percent,
            self.requests,
            format_throughput(self.bytes, self.interval),
            self.active.len(),
        );

        self.requests = 0;
        self.bytes = 0;
        self.active.clear();

        (percent < 100).then_some(line)
    }

    /// Consume snapshots until the channel closes
    ///
    /// After shutdown, remaining snapshots are drained and discarded.
    /// Returns the writer once every sender has been dropped.
    pub async fn run<W: Write + Send>(
        mut self,
        mut live_rx: mpsc::Receiver<LiveSnapshot>,
        mut shutdown: Shutdown,
        mut out: W,
    ) -> W {
        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                snapshot = live_rx.recv() => match snapshot {
                    Some(snapshot) => self.record(&snapshot),
                    None => return out,
                },
                now = ticker.tick() => {
                    if let Some(line) = self.close_window(now - start) {
                        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                            tracing::warn!(error = %e, "Failed to write live progress");
                        }
                    }
                }
                _ = shutdown.recv() => break,
            }
        }

        // Workers might still be sending snapshots
        while live_rx.recv().await.is_some() {}
        out
    }
}
