//! Worker statistics tracking

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::histogram::LatencyHistogram;

/// Statistics tracked by each worker
///
/// Owned exclusively by one worker for the whole run and returned by value
/// when the worker exits.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Request attempts issued
    pub requests: u64,

    /// Dispatches that failed without a response
    pub conn_errors: u64,

    /// Responses whose body could not be read to the end
    pub read_errors: u64,

    /// Cumulative response body bytes
    pub bytes_read: u64,

    /// Responses per status code
    pub status_counts: BTreeMap<u16, u64>,

    /// Response times of every request that obtained a response
    pub histogram: LatencyHistogram,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatch attempt
    pub fn record_attempt(&mut self) {
        self.requests += 1;
    }

    /// Record a dispatch that produced no response
    pub fn record_connection_error(&mut self) {
        self.conn_errors += 1;
    }

    /// Record the status code of a response
    pub fn record_status(&mut self, status: u16) {
        *self.status_counts.entry(status).or_insert(0) += 1;
    }

    /// Record body bytes
    pub fn record_bytes(&mut self, bytes: u64) {
        self.bytes_read += bytes;
    }

    /// Record a body read failure
    pub fn record_read_error(&mut self) {
        self.read_errors += 1;
    }

    /// Record the round-trip latency of a request that obtained a response
    pub fn record_latency(&mut self, latency: Duration) {
        self.histogram.record(latency);
    }

    /// Requests that obtained a response (successfully read or not)
    pub fn responses(&self) -> u64 {
        self.requests - self.conn_errors
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &WorkerStats) {
        self.requests += other.requests;
        self.conn_errors += other.conn_errors;
        self.read_errors += other.read_errors;
        self.bytes_read += other.bytes_read;
        for (&status, &count) in &other.status_counts {
            *self.status_counts.entry(status).or_insert(0) += count;
        }
        self.histogram.merge(&other.histogram);
    }
}
