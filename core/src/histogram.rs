//! Sparse response-time histogram keyed by whole milliseconds

use std::collections::btree_map::{self, BTreeMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Response-time histogram
///
/// Buckets are whole milliseconds (latency floored), unbounded on the high
/// end. Only buckets that were hit are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatencyHistogram {
    buckets: BTreeMap<u64, u64>,
}

impl LatencyHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request with the given round-trip latency
    pub fn record(&mut self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.record_millis(millis, 1);
    }

    /// Add `count` requests to the bucket for `millis`
    pub fn record_millis(&mut self, millis: u64, count: u64) {
        *self.buckets.entry(millis).or_insert(0) += count;
    }

    /// Count stored in a bucket
    pub fn get(&self, millis: u64) -> u64 {
        self.buckets.get(&millis).copied().unwrap_or(0)
    }

    /// Total number of recorded requests
    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Number of distinct buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Largest single bucket count
    pub fn max_count(&self) -> u64 {
        self.buckets.values().copied().max().unwrap_or(0)
    }

    /// Slowest recorded bucket
    pub fn max_millis(&self) -> Option<u64> {
        self.buckets.keys().next_back().copied()
    }

    /// Iterate buckets in ascending latency order
    pub fn iter(&self) -> btree_map::Iter<'_, u64, u64> {
        self.buckets.iter()
    }

    /// Add every bucket of `other` into this histogram
    pub fn merge(&mut self, other: &LatencyHistogram) {
        for (&millis, &count) in &other.buckets {
            self.record_millis(millis, count);
        }
    }
}

impl<'a> IntoIterator for &'a LatencyHistogram {
    type Item = (&'a u64, &'a u64);
    type IntoIter = btree_map::Iter<'a, u64, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(u64, u64)> for LatencyHistogram {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (millis, count) in iter {
            histogram.record_millis(millis, count);
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_floors_to_millis() {
        let mut hist = LatencyHistogram::new();
        hist.record(Duration::from_micros(12_999));
        hist.record(Duration::from_micros(12_000));
        hist.record(Duration::from_micros(999));

        assert_eq!(hist.get(12), 2);
        assert_eq!(hist.get(0), 1);
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.len(), 2);
    }

    #[test]
    fn test_iter_is_ascending() {
        let hist: LatencyHistogram = [(300, 1), (5, 2), (40, 3)].into_iter().collect();
        let keys: Vec<u64> = hist.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![5, 40, 300]);
        assert_eq!(hist.max_millis(), Some(300));
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn test_merge_unions_keys() {
        let mut a: LatencyHistogram = [(1, 1), (2, 2)].into_iter().collect();
        let b: LatencyHistogram = [(2, 3), (9, 1)].into_iter().collect();
        a.merge(&b);

        assert_eq!(a.get(1), 1);
        assert_eq!(a.get(2), 5);
        assert_eq!(a.get(9), 1);
        assert_eq!(a.total(), 7);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = LatencyHistogram::new();
        assert!(hist.is_empty());
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.max_count(), 0);
        assert_eq!(hist.max_millis(), None);
    }
}
