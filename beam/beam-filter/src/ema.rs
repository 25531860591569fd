//! Exponential moving average filters.
//!
//! `x̂ ← α·x + (1−α)·x̂_prev` per channel, with an optional delta-adaptive
//! alpha: as the sample delta grows toward the channel's delta scale `K`,
//! the effective alpha is pulled from `α` down to `α/2` (more smoothing on
//! large jumps). `K` is 100 for screen pixels and centimeters, 2 degrees
//! per axis for rotations.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Delta scale for 2D (screen pixels) and 3D (centimeters) channels.
const DELTA_SCALE_LINEAR: f32 = 100.0;
/// Delta scale for rotation channels, degrees per axis.
const DELTA_SCALE_ROTATION: f32 = 2.0;

/// Parameters for the EMA filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaConfig {
    /// Base smoothing factor in `[0, 1]`; 1 passes input through.
    pub alpha: f32,
    /// Enables the delta-adaptive alpha.
    pub adaptive: bool,
    /// Samples below this confidence hold the previous output.
    pub min_confidence: f32,
}

impl Default for EmaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            adaptive: false,
            min_confidence: 0.0,
        }
    }
}

impl EmaConfig {
    /// Effective alpha for a sample delta of magnitude `delta` against the
    /// channel delta scale `k`.
    fn effective_alpha(&self, delta: f32, k: f32) -> f32 {
        if !self.adaptive {
            return self.alpha;
        }
        let t = (delta / k).clamp(0.0, 1.0);
        // lerp(alpha, alpha/2, t)
        t.mul_add(self.alpha / 2.0 - self.alpha, self.alpha)
    }
}

/// EMA over a 2D channel (screen pixels).
#[derive(Debug, Clone, Copy)]
pub struct Ema2 {
    config: EmaConfig,
    value: Option<Vec2>,
}

impl Ema2 {
    /// Creates a filter with the given parameters.
    #[must_use]
    pub const fn new(config: EmaConfig) -> Self {
        Self {
            config,
            value: None,
        }
    }

    /// Filters one sample. `confidence` gates the update.
    pub fn apply(&mut self, sample: Vec2, confidence: f32) -> Vec2 {
        let Some(prev) = self.value else {
            self.value = Some(sample);
            return sample;
        };
        if confidence < self.config.min_confidence {
            return prev;
        }
        let alpha = self
            .config
            .effective_alpha((sample - prev).length(), DELTA_SCALE_LINEAR);
        let filtered = prev.lerp(sample, alpha);
        self.value = Some(filtered);
        filtered
    }

    /// Clears state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Returns true if at least one sample has been accepted.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

/// EMA over a 3D channel (head position, centimeters).
#[derive(Debug, Clone, Copy)]
pub struct Ema3 {
    config: EmaConfig,
    value: Option<Vec3>,
}

impl Ema3 {
    /// Creates a filter with the given parameters.
    #[must_use]
    pub const fn new(config: EmaConfig) -> Self {
        Self {
            config,
            value: None,
        }
    }

    /// Filters one sample. `confidence` gates the update.
    pub fn apply(&mut self, sample: Vec3, confidence: f32) -> Vec3 {
        let Some(prev) = self.value else {
            self.value = Some(sample);
            return sample;
        };
        if confidence < self.config.min_confidence {
            return prev;
        }
        let alpha = self
            .config
            .effective_alpha((sample - prev).length(), DELTA_SCALE_LINEAR);
        let filtered = prev.lerp(sample, alpha);
        self.value = Some(filtered);
        filtered
    }

    /// Clears state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Returns true if at least one sample has been accepted.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

/// EMA over Euler rotations, smoothed per axis.
///
/// Axes are `(pitch, yaw, roll)` in degrees. Sample-to-sample deltas are
/// small at tracker rates, so per-axis Euler smoothing is sufficient and no
/// quaternion slerp is performed. The adaptive delta scale is evaluated per
/// axis.
#[derive(Debug, Clone, Copy)]
pub struct EmaRotator {
    config: EmaConfig,
    value: Option<Vec3>,
}

impl EmaRotator {
    /// Creates a filter with the given parameters.
    #[must_use]
    pub const fn new(config: EmaConfig) -> Self {
        Self {
            config,
            value: None,
        }
    }

    /// Filters one rotation sample in degrees. `confidence` gates the update.
    pub fn apply(&mut self, sample: Vec3, confidence: f32) -> Vec3 {
        let Some(prev) = self.value else {
            self.value = Some(sample);
            return sample;
        };
        if confidence < self.config.min_confidence {
            return prev;
        }
        let mut filtered = Vec3::ZERO;
        for axis in 0..3 {
            let alpha = self
                .config
                .effective_alpha((sample[axis] - prev[axis]).abs(), DELTA_SCALE_ROTATION);
            filtered[axis] = alpha.mul_add(sample[axis] - prev[axis], prev[axis]);
        }
        self.value = Some(filtered);
        filtered
    }

    /// Clears state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Returns true if at least one sample has been accepted.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}
