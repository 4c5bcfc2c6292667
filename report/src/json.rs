//! JSON summary export

use std::io::Write;

use serde_json::{json, Value};

use gb_core::TotalStats;

use crate::histogram::histogram_rows;

/// Exports the merged stats as JSON
pub struct JsonExporter;

impl JsonExporter {
    /// Build the summary document
    ///
    /// Contains the raw totals plus derived rates and the percentile
    /// markers shown on the text histogram.
    pub fn summary(total: &TotalStats) -> serde_json::Result<Value> {
        let percentiles: serde_json::Map<String, Value> = histogram_rows(&total.histogram)
            .into_iter()
            .filter_map(|row| row.percentile.map(|p| (format!("p{}", p), json!(row.millis))))
            .collect();

        Ok(json!({
            "totals": serde_json::to_value(total)?,
            "derived": {
                "requests_per_second": total.requests_per_second(),
                "bytes_per_request": total.bytes_per_request(),
                "bytes_per_second": if total.elapsed.is_zero() {
                    0.0
                } else {
                    total.bytes_read as f64 / total.elapsed.as_secs_f64()
                },
            },
            "percentiles_ms": percentiles,
        }))
    }

    /// Write the pretty-printed summary followed by a newline
    pub fn write<W: Write>(total: &TotalStats, mut out: W) -> serde_json::Result<()> {
        let summary = Self::summary(total)?;
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out).map_err(serde_json::Error::io)
    }
}
