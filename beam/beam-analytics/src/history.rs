//! Time-pruned gaze point history.

use std::collections::VecDeque;

use glam::Vec2;

/// One timestamped, viewport-normalized gaze point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazePoint {
    /// Local pipeline time in seconds.
    pub t_s: f64,
    /// Normalized screen position.
    pub pos: Vec2,
}

/// Bounded history of recent gaze points.
///
/// Points older than the window are dropped on every push, so memory is
/// proportional to window length times sample rate.
///
/// # Example
///
/// ```
/// use beam_analytics::GazeHistory;
/// use glam::Vec2;
///
/// let mut history = GazeHistory::new(1.0);
/// history.push(0.0, Vec2::new(0.5, 0.5));
/// history.push(2.0, Vec2::new(0.6, 0.5));
/// assert_eq!(history.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GazeHistory {
    points: VecDeque<GazePoint>,
    window_s: f64,
}

impl GazeHistory {
    /// Creates an empty history retaining `window_s` seconds of points.
    #[must_use]
    pub fn new(window_s: f64) -> Self {
        Self {
            points: VecDeque::new(),
            window_s: window_s.max(0.0),
        }
    }

    /// Appends a point and prunes anything older than the window.
    ///
    /// Out-of-order timestamps (a replay seek, a clock reset) clear the
    /// history so derived metrics never span a discontinuity.
    pub fn push(&mut self, t_s: f64, pos: Vec2) {
        if self.points.back().is_some_and(|last| t_s < last.t_s) {
            self.points.clear();
        }
        self.points.push_back(GazePoint { t_s, pos });
        self.prune_before(t_s - self.window_s);
    }

    /// Drops points with timestamps strictly before `cutoff_s`.
    pub fn prune_before(&mut self, cutoff_s: f64) {
        while self.points.front().is_some_and(|p| p.t_s < cutoff_s) {
            self.points.pop_front();
        }
    }

    /// Removes all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of retained points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when no points are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates points oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &GazePoint> {
        self.points.iter()
    }

    /// Retention window in seconds.
    #[must_use]
    pub const fn window_s(&self) -> f64 {
        self.window_s
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn prunes_outside_window() {
        let mut history = GazeHistory::new(1.0);
        for i in 0..20 {
            history.push(f64::from(i) * 0.1, Vec2::ZERO);
        }
        // Last push at t=1.9 keeps [0.9, 1.9].
        assert_eq!(history.len(), 11);
        assert!((history.iter().next().unwrap().t_s - 0.9).abs() < 1e-9);
    }

    #[test]
    fn time_regression_clears_history() {
        let mut history = GazeHistory::new(10.0);
        history.push(5.0, Vec2::ZERO);
        history.push(6.0, Vec2::ZERO);
        history.push(1.0, Vec2::ONE);
        assert_eq!(history.len(), 1);
        assert_eq!(history.iter().next().unwrap().t_s, 1.0);
    }

    #[test]
    fn empty_history() {
        let mut history = GazeHistory::new(1.0);
        assert!(history.is_empty());
        history.push(0.0, Vec2::ZERO);
        history.clear();
        assert!(history.is_empty());
    }
}
