//! Windowed gaze metrics and their snapshot type.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::fixation::{Fixation, FixationDetector};
use crate::history::GazeHistory;

/// Step size below which consecutive samples are not counted as saccadic
/// motion, in normalized units.
const SACCADE_MIN_STEP: f32 = 0.01;

/// Analytics tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// History window in seconds.
    pub window_s: f64,
    /// Minimum fixation duration in seconds.
    pub min_fixation_duration_s: f64,
    /// Maximum sample gap inside one fixation, seconds.
    pub max_gap_s: f64,
    /// Fixation dispersion threshold in normalized units.
    pub dispersion_threshold: f32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_s: 10.0,
            min_fixation_duration_s: 0.1,
            max_gap_s: 0.5,
            dispersion_threshold: 0.05,
        }
    }
}

/// Point-in-time summary of the analytics window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Number of fixations detected in the window.
    pub fixation_count: usize,
    /// Mean fixation duration in seconds, zero when none.
    pub avg_fixation_duration_s: f64,
    /// Mean saccadic velocity in normalized units per second.
    pub saccade_velocity: f32,
    /// Total gaze travel in normalized units over the window.
    pub scan_path_length: f32,
    /// Centroids of the detected fixations, oldest first.
    pub fixation_centroids: Vec<Vec2>,
}

/// Accumulates valid gaze points and derives windowed metrics.
///
/// # Example
///
/// ```
/// use beam_analytics::{AnalyticsConfig, GazeAnalytics};
/// use glam::Vec2;
///
/// let mut analytics = GazeAnalytics::new(AnalyticsConfig::default());
/// for i in 0..10 {
///     analytics.record(f64::from(i) * 0.05, Vec2::new(0.5, 0.5));
/// }
/// let snapshot = analytics.snapshot();
/// assert_eq!(snapshot.fixation_count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct GazeAnalytics {
    config: AnalyticsConfig,
    history: GazeHistory,
}

impl GazeAnalytics {
    /// Creates an analytics accumulator.
    #[must_use]
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            history: GazeHistory::new(config.window_s),
        }
    }

    /// Records one valid gaze point.
    ///
    /// Invalid samples must not be fed here; gaps in time are handled by
    /// the fixation detector's gap rule.
    pub fn record(&mut self, t_s: f64, pos: Vec2) {
        self.history.push(t_s, pos);
    }

    /// Forgets all history, for session discontinuities.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Number of points currently in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true when the window holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Computes metrics over the current window.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let points: Vec<_> = self.history.iter().copied().collect();

        let detector = FixationDetector {
            dispersion_threshold: self.config.dispersion_threshold,
            min_duration_s: self.config.min_fixation_duration_s,
            max_gap_s: self.config.max_gap_s,
        };
        let fixations = detector.detect(&points);

        let avg_fixation_duration_s = if fixations.is_empty() {
            0.0
        } else {
            fixations.iter().map(Fixation::duration_s).sum::<f64>() / fixations.len() as f64
        };

        let mut scan_path_length = 0.0f32;
        let mut velocity_sum = 0.0f32;
        let mut velocity_count = 0u32;
        for pair in points.windows(2) {
            let step = (pair[1].pos - pair[0].pos).length();
            scan_path_length += step;
            let dt = pair[1].t_s - pair[0].t_s;
            if step > SACCADE_MIN_STEP && dt > 0.0 {
                velocity_sum += step / dt as f32;
                velocity_count += 1;
            }
        }
        let saccade_velocity = if velocity_count > 0 {
            velocity_sum / velocity_count as f32
        } else {
            0.0
        };

        trace!(
            points = points.len(),
            fixations = fixations.len(),
            "analytics snapshot"
        );

        AnalyticsSnapshot {
            fixation_count: fixations.len(),
            avg_fixation_duration_s,
            saccade_velocity,
            scan_path_length,
            fixation_centroids: fixations.iter().map(|f| f.centroid).collect(),
        }
    }
}
