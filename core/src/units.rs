//! Human-readable size, throughput and bandwidth formatting
//!
//! Byte quantities scale by 1024, bandwidth (bits) by 1000.

use std::time::Duration;

const SIZE_UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];
const THROUGHPUT_UNITS: [&str; 6] = ["B/s", "kB/s", "MB/s", "GB/s", "TB/s", "PB/s"];
const BANDWIDTH_UNITS: [&str; 4] = ["bps", "kbps", "Mbps", "Gbps"];

/// Scale `value` by `base` until it fits below `base` or the units run out
fn scale(mut value: f64, base: f64, units: &[&str]) -> String {
    let mut unit = 0;
    while value >= base && unit + 1 < units.len() {
        value /= base;
        unit += 1;
    }
    format!("{:.2} {}", value, units[unit])
}

fn per_second(value: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        value / secs
    } else {
        0.0
    }
}

/// Format a byte count, e.g. `1.50 kB`
pub fn format_size(bytes: u64) -> String {
    scale(bytes as f64, 1024.0, &SIZE_UNITS)
}

/// Format bytes transferred over `elapsed` as a rate, e.g. `2.00 MB/s`
pub fn format_throughput(bytes: u64, elapsed: Duration) -> String {
    scale(per_second(bytes as f64, elapsed), 1024.0, &THROUGHPUT_UNITS)
}

/// Format bytes transferred over `elapsed` as bits per second, e.g. `8.00 kbps`
pub fn format_bandwidth(bytes: u64, elapsed: Duration) -> String {
    scale(per_second(8.0 * bytes as f64, elapsed), 1000.0, &BANDWIDTH_UNITS)
}
