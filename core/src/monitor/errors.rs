//! De-duplicating error reporter

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::RequestError;
use crate::shutdown::Shutdown;

/// Default reporting window
pub const ERROR_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Tallies error events per distinct message and prints them once per window
///
/// Prints `Error: <message> (<count>)` for every message seen in the window,
/// then starts a fresh tally. Keeps draining after shutdown until every
/// sender is gone, so no worker blocks on its last error.
#[derive(Debug)]
pub struct ErrorReporter {
    interval: Duration,
    tally: BTreeMap<String, u64>,
}

impl ErrorReporter {
    /// Create a reporter with the default one-second window
    pub fn new() -> Self {
        Self {
            interval: ERROR_REPORT_INTERVAL,
            tally: BTreeMap::new(),
        }
    }

    /// Count one occurrence of an error
    pub fn record(&mut self, error: &RequestError) {
        *self.tally.entry(error.to_string()).or_insert(0) += 1;
    }

    /// Write the current window and clear it
    pub fn flush<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        for (message, count) in std::mem::take(&mut self.tally) {
            writeln!(out, "Error: {} ({})", message, count)?;
        }
        out.flush()
    }

    /// Consume error events until the channel closes
    ///
    /// Returns the writer once every sender has been dropped.
    pub async fn run<W: Write + Send>(
        mut self,
        mut errors_rx: mpsc::Receiver<RequestError>,
        mut shutdown: Shutdown,
        mut out: W,
    ) -> W {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = errors_rx.recv() => match event {
                    Some(error) => self.record(&error),
                    None => break,
                },
                _ = ticker.tick() => self.write_window(&mut out),
                _ = shutdown.recv() => {
                    tracing::debug!("Error reporter draining after shutdown");
                }
            }

            if shutdown.is_triggered() {
                // Workers might still be sending errors
                while let Some(error) = errors_rx.recv().await {
                    self.record(&error);
                }
                break;
            }
        }

        self.write_window(&mut out);
        out
    }

    fn write_window<W: Write>(&mut self, out: &mut W) {
        if let Err(e) = self.flush(out) {
            tracing::warn!(error = %e, "Failed to write error report");
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
