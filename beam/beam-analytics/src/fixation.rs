//! Dispersion-threshold fixation detection.

use glam::Vec2;

use crate::history::GazePoint;

/// One detected fixation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixation {
    /// Start of the fixation in local seconds.
    pub start_s: f64,
    /// End of the fixation in local seconds.
    pub end_s: f64,
    /// Mean gaze position over the fixation, normalized.
    pub centroid: Vec2,
    /// Number of samples in the fixation.
    pub samples: usize,
}

impl Fixation {
    /// Fixation duration in seconds.
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }
}

/// Dispersion-threshold fixation detector.
///
/// A run starts at its anchor sample and stays alive while every later
/// sample lies within `dispersion_threshold` of the anchor. The first
/// sample outside the threshold closes the run; runs lasting at least the
/// minimum duration are emitted as fixations. A temporal gap larger than
/// `max_gap_s` between consecutive points always ends the current run, so
/// tracking dropouts never merge two fixations.
#[derive(Debug, Clone, Copy)]
pub struct FixationDetector {
    /// Dispersion threshold in normalized viewport units.
    pub dispersion_threshold: f32,
    /// Minimum duration for a run to count as a fixation, seconds.
    pub min_duration_s: f64,
    /// Maximum gap between consecutive samples inside one run, seconds.
    pub max_gap_s: f64,
}

impl FixationDetector {
    /// Segments a time-ordered point sequence into fixations.
    #[must_use]
    pub fn detect(&self, points: &[GazePoint]) -> Vec<Fixation> {
        let mut fixations = Vec::new();
        let mut start = 0;

        while start < points.len() {
            // Grow the run while it stays near its anchor and gap-free.
            let anchor = points[start].pos;
            let mut end = start + 1;
            while end < points.len()
                && points[end].t_s - points[end - 1].t_s <= self.max_gap_s
                && (points[end].pos - anchor).length() <= self.dispersion_threshold
            {
                end += 1;
            }

            let run = &points[start..end];
            let duration = run[run.len() - 1].t_s - run[0].t_s;
            if run.len() >= 2 && duration >= self.min_duration_s {
                fixations.push(Fixation {
                    start_s: run[0].t_s,
                    end_s: run[run.len() - 1].t_s,
                    centroid: centroid(run),
                    samples: run.len(),
                });
                start = end;
            } else {
                start += 1;
            }
        }
        fixations
    }
}

/// Mean position of a point run.
#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[GazePoint]) -> Vec2 {
    let sum: Vec2 = points.iter().map(|p| p.pos).sum();
    sum / points.len() as f32
}
