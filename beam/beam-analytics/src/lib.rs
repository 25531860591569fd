//! Rolling-window gaze analytics.
//!
//! Maintains a pruned history of valid gaze points and derives fixation,
//! saccade, and scan-path metrics from it on demand:
//!
//! - [`GazeHistory`] keeps the last N seconds of gaze points.
//! - [`FixationDetector`] segments the history into fixations with the
//!   dispersion-threshold method.
//! - [`GazeAnalytics`] ties both together and produces
//!   [`AnalyticsSnapshot`] summaries for the query side.
//!
//! All positions are viewport-normalized, so thresholds are resolution
//! independent.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod fixation;
mod history;
mod metrics;

pub use fixation::{Fixation, FixationDetector};
pub use history::{GazeHistory, GazePoint};
pub use metrics::{AnalyticsConfig, AnalyticsSnapshot, GazeAnalytics};
