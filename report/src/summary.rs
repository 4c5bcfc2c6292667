//! Plain-text run summary

use std::io::{self, Write};

use gb_core::units::{format_bandwidth, format_size, format_throughput};
use gb_core::TotalStats;

use crate::histogram::render_histogram;

/// Text report of a finished run
///
/// ```text
/// Duration: 15.01s
/// Requests: 1234
/// Rate: 82.21 req/s
/// Size: 1.21 MB (1.00 kB/req)
/// Throughput: 82.21 kB/s
/// Bandwidth: 673.47 kbps
///
/// Status[200]: 1234
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    total: &'a TotalStats,
    histogram: bool,
}

impl<'a> TextReport<'a> {
    /// Report over the merged stats
    pub fn new(total: &'a TotalStats) -> Self {
        Self {
            total,
            histogram: false,
        }
    }

    /// Append the latency histogram
    pub fn with_histogram(mut self, enabled: bool) -> Self {
        self.histogram = enabled;
        self
    }

    /// Write the full report
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_summary(out)?;
        self.write_status(out)?;
        if self.histogram && !self.total.histogram.is_empty() {
            writeln!(out)?;
            out.write_all(render_histogram(&self.total.histogram).as_bytes())?;
        }
        out.flush()
    }

    /// Render the full report to a string
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let total = self.total;
        writeln!(out)?;
        writeln!(out, "Duration: {:.2}s", total.elapsed.as_secs_f64())?;
        writeln!(out, "Requests: {}", total.requests)?;
        writeln!(out, "Rate: {:.2} req/s", total.requests_per_second())?;
        writeln!(
            out,
            "Size: {} ({}/req)",
            format_size(total.bytes_read),
            format_size(total.bytes_per_request())
        )?;
        writeln!(
            out,
            "Throughput: {}",
            format_throughput(total.bytes_read, total.elapsed)
        )?;
        writeln!(
            out,
            "Bandwidth: {}",
            format_bandwidth(total.bytes_read, total.elapsed)
        )?;
        if total.conn_errors > 0 {
            writeln!(out, "Connection errors: {}", total.conn_errors)?;
        }
        if total.read_errors > 0 {
            writeln!(out, "Read errors: {}", total.read_errors)?;
        }
        Ok(())
    }

    fn write_status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.total.status_counts.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        for (status, count) in &self.total.status_counts {
            writeln!(out, "Status[{}]: {}", status, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_core::{aggregate_worker_stats, WorkerStats};
    use std::time::Duration;

    fn total(status: u16, requests: u64, bytes_each: u64, elapsed: Duration) -> TotalStats {
        let mut stats = WorkerStats::new();
        for i in 0..requests {
            stats.record_attempt();
            stats.record_status(status);
            stats.record_bytes(bytes_each);
            stats.record_latency(Duration::from_millis(5 + i % 2));
        }
        aggregate_worker_stats(&[stats], elapsed)
    }

    #[test]
    fn test_summary_lines() {
        let total = total(200, 1000, 1024, Duration::from_secs(2));
        let report = TextReport::new(&total).render();

        assert_eq!(
            report,
            "\nDuration: 2.00s\n\
             Requests: 1000\n\
             Rate: 500.00 req/s\n\
             Size: 1000.00 kB (1.00 kB/req)\n\
             Throughput: 500.00 kB/s\n\
             Bandwidth: 4.10 Mbps\n\
             \n\
             Status[200]: 1000\n"
        );
    }

    #[test]
    fn test_server_errors_everywhere() {
        let total = total(500, 37, 0, Duration::from_secs(1));
        let report = TextReport::new(&total).render();

        assert!(report.contains("Status[500]: 37\n"));
        assert!(!report.contains("Status[200]"));
        assert!(!report.contains("Connection errors"));
    }

    #[test]
    fn test_error_lines_only_when_present() {
        let mut stats = WorkerStats::new();
        stats.record_attempt();
        stats.record_connection_error();
        stats.record_attempt();
        stats.record_status(200);
        stats.record_read_error();
        stats.record_latency(Duration::from_millis(3));
        let total = aggregate_worker_stats(&[stats], Duration::from_secs(1));

        let report = TextReport::new(&total).render();
        assert!(report.contains("Connection errors: 1\n"));
        assert!(report.contains("Read errors: 1\n"));
    }

    #[test]
    fn test_no_requests() {
        let total = aggregate_worker_stats(&[], Duration::ZERO);
        let report = TextReport::new(&total).with_histogram(true).render();

        assert!(report.contains("Requests: 0\n"));
        assert!(report.contains("Rate: 0.00 req/s\n"));
        assert!(report.contains("Size: 0.00 B (0.00 B/req)\n"));
        assert!(!report.contains("Status["));
        assert!(!report.contains("Time["));
    }

    #[test]
    fn test_histogram_appended_on_request() {
        let total = total(200, 4, 10, Duration::from_secs(1));

        let without = TextReport::new(&total).render();
        assert!(!without.contains("Time["));

        let with = TextReport::new(&total).with_histogram(true).render();
        assert!(with.ends_with(&render_histogram(&total.histogram)));
        assert!(with.contains("\n\nTime[5 ms]: 2 (50%) |"));
    }
}
