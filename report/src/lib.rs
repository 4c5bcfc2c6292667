//! Report generation for benchmark results
//!
//! This crate renders the merged [`gb_core::TotalStats`] of a run as:
//!
//! - A plain-text summary with a status code breakdown
//! - A latency histogram with percentile markers
//! - A JSON document

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod histogram;
pub mod json;
pub mod summary;

pub use histogram::{histogram_rows, render_histogram, HistogramRow, PERCENTILE_TARGETS};
pub use json::JsonExporter;
pub use summary::TextReport;
