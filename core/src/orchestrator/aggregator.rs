//! Result aggregation from multiple workers

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::histogram::LatencyHistogram;
use crate::worker::WorkerStats;

/// Merged statistics of a whole run
///
/// Pointwise sum of every worker's stats. This is the only input to
/// reporting and is never modified after the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalStats {
    /// Requests issued
    pub requests: u64,

    /// Requests that got no response
    pub conn_errors: u64,

    /// Responses whose body could not be read to the end
    pub read_errors: u64,

    /// Body bytes read
    pub bytes_read: u64,

    /// Responses per status code
    pub status_counts: BTreeMap<u16, u64>,

    /// Latency histogram in whole milliseconds
    pub histogram: LatencyHistogram,

    /// Number of workers that reported
    pub workers: usize,

    /// First worker launch to last stats received
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl TotalStats {
    /// Requests per second over the elapsed time
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            0.0
        }
    }

    /// Average body size per request, zero when no request was made
    pub fn bytes_per_request(&self) -> u64 {
        self.bytes_read.checked_div(self.requests).unwrap_or(0)
    }

    /// Total error count (connection + read)
    pub fn errors(&self) -> u64 {
        self.conn_errors + self.read_errors
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Aggregate statistics from multiple workers
///
/// Merge order does not matter.
pub fn aggregate_worker_stats(stats: &[WorkerStats], elapsed: Duration) -> TotalStats {
    let merged = stats.iter().fold(WorkerStats::new(), |mut acc, s| {
        acc.merge(s);
        acc
    });

    TotalStats {
        requests: merged.requests,
        conn_errors: merged.conn_errors,
        read_errors: merged.read_errors,
        bytes_read: merged.bytes_read,
        status_counts: merged.status_counts,
        histogram: merged.histogram,
        workers: stats.len(),
        elapsed,
    }
}
