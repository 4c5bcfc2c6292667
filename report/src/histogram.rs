//! Latency histogram rendering with percentile markers

use std::fmt::Write as _;

use gb_core::LatencyHistogram;

/// Percentile targets annotated on the histogram, ascending
pub const PERCENTILE_TARGETS: [u64; 7] = [10, 25, 50, 75, 90, 95, 99];

/// Total width shared by the bucket label, count and bar
const LINE_WIDTH: usize = 60;

/// One histogram line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramRow {
    /// Bucket, in whole milliseconds
    pub millis: u64,
    /// Responses in the bucket
    pub count: u64,
    /// Percentile target first reached at this bucket
    pub percentile: Option<u64>,
}

/// Annotate every bucket with the percentile target it reaches, if any
///
/// Walks buckets in ascending order keeping a cumulative count over the
/// histogram total. A bucket gets the highest still-pending target its
/// cumulative share reaches, and every target up to that one is consumed,
/// so annotations strictly increase down the histogram.
pub fn histogram_rows(histogram: &LatencyHistogram) -> Vec<HistogramRow> {
    let total = histogram.total();
    let mut cumulative = 0u64;
    let mut next = 0;

    histogram
        .iter()
        .map(|(&millis, &count)| {
            cumulative += count;
            let reached = PERCENTILE_TARGETS[next..]
                .iter()
                .take_while(|&&target| cumulative * 100 >= target * total)
                .count();

            let percentile = (reached > 0).then(|| {
                next += reached;
                PERCENTILE_TARGETS[next - 1]
            });

            HistogramRow {
                millis,
                count,
                percentile,
            }
        })
        .collect()
}

/// Render the histogram, one `Time[<ms> ms]: <count> (<pct>%) |***` line per bucket
///
/// Returns an empty string for an empty histogram.
pub fn render_histogram(histogram: &LatencyHistogram) -> String {
    let Some(max_millis) = histogram.max_millis() else {
        return String::new();
    };
    let max_count = histogram.max_count();

    let millis_width = max_millis.to_string().len();
    let count_width = max_count.to_string().len();
    let bar_width = LINE_WIDTH.saturating_sub(millis_width + count_width) as u64;

    let mut out = String::new();
    for row in histogram_rows(histogram) {
        let marker = match row.percentile {
            Some(p) => format!("({}%)", p),
            None => " ".repeat(5),
        };
        let stars = (row.count * bar_width / max_count.max(1)) as usize;
        let _ = writeln!(
            out,
            "Time[{:>mw$} ms]: {:>cw$} {} |{}",
            row.millis,
            row.count,
            marker,
            "*".repeat(stars),
            mw = millis_width,
            cw = count_width,
        );
    }
    out
}
