//! Producer performance counters.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Rolling measurement window in seconds.
const WINDOW_S: f64 = 1.0;

/// Point-in-time performance summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfSnapshot {
    /// Publishes per second over the last second; 0 until measurable.
    pub fps: f32,
    /// Mean inter-frame time over the window, seconds.
    pub frame_time_avg_s: f64,
    /// Shortest inter-frame time in the window, seconds.
    pub frame_time_min_s: f64,
    /// Longest inter-frame time in the window, seconds.
    pub frame_time_max_s: f64,
    /// Frames overwritten in the ring before any reader saw them.
    pub dropped_frames: u64,
}

/// Rolling one-second window of publish timings.
///
/// Reports 0 FPS until two publishes land inside the window; there is no
/// placeholder rate.
#[derive(Debug, Clone, Default)]
pub struct PerfStats {
    /// Publish timestamps paired with their inter-frame times.
    publishes: VecDeque<(f64, f64)>,
    dropped_frames: u64,
}

impl PerfStats {
    /// Creates empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one published frame and its inter-frame time.
    pub fn on_publish(&mut self, now_s: f64, frame_time_s: f64) {
        self.publishes.push_back((now_s, frame_time_s));
        while self
            .publishes
            .front()
            .is_some_and(|(t, _)| now_s - t > WINDOW_S)
        {
            self.publishes.pop_front();
        }
    }

    /// Records a frame lost to ring overwrite.
    pub fn on_dropped(&mut self) {
        self.dropped_frames += 1;
    }

    /// Publishes per second over the window ending at `now_s`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn fps(&self, now_s: f64) -> f32 {
        let recent: Vec<f64> = self
            .publishes
            .iter()
            .filter(|(t, _)| now_s - t <= WINDOW_S)
            .map(|(t, _)| *t)
            .collect();
        if recent.len() < 2 {
            return 0.0;
        }
        let span = recent[recent.len() - 1] - recent[0];
        if span <= 0.0 {
            return 0.0;
        }
        ((recent.len() - 1) as f64 / span) as f32
    }

    /// Frames lost to ring overwrite so far.
    #[must_use]
    pub const fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Summarizes the window ending at `now_s`.
    #[must_use]
    pub fn snapshot(&self, now_s: f64) -> PerfSnapshot {
        let mut min = f64::INFINITY;
        let mut max = 0.0f64;
        let mut sum = 0.0;
        let mut count = 0u32;
        for &(t, dt) in &self.publishes {
            if now_s - t <= WINDOW_S && dt > 0.0 {
                min = min.min(dt);
                max = max.max(dt);
                sum += dt;
                count += 1;
            }
        }
        let (avg, min) = if count > 0 {
            (sum / f64::from(count), min)
        } else {
            (0.0, 0.0)
        };
        PerfSnapshot {
            fps: self.fps(now_s),
            frame_time_avg_s: avg,
            frame_time_min_s: min,
            frame_time_max_s: max,
            dropped_frames: self.dropped_frames,
        }
    }
}
