//! CSV export of pipeline data.
//!
//! Three row shapes cover what embedders dump to disk: windowed analytics
//! summaries, producer performance counters, and raw gaze traces. Writers
//! emit a literal header row, `\n` newlines, 3 decimal places for
//! durations in seconds and 6 for fractions and relative timestamps.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod csv;
mod error;

pub use csv::{
    write_analytics_csv, write_gaze_csv, write_performance_csv, AnalyticsRow, GazeRow,
    PerformanceRow,
};
pub use error::{ExportError, ExportResult};
