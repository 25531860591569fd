//! One-Euro filter for 2D signals.
//!
//! The One-Euro filter is a speed-adaptive first-order low-pass: at low
//! speeds the cutoff stays at `min_cutoff` to suppress jitter, and it grows
//! with the filtered derivative magnitude (`beta` coefficient) to keep lag
//! low during fast motion. The derivative itself is low-passed with a fixed
//! 1 Hz cutoff.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed cutoff for the derivative low-pass, Hz.
const DERIVATIVE_CUTOFF_HZ: f32 = 1.0;

/// Parameters for the One-Euro filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneEuroConfig {
    /// Minimum cutoff frequency in Hz. Lower values smooth more at rest.
    pub min_cutoff: f32,
    /// Speed coefficient. Higher values track fast motion more tightly.
    pub beta: f32,
    /// Fallback sample rate in Hz, used when a tick arrives with `dt <= 0`.
    pub data_rate_hz: f32,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.2,
            data_rate_hz: 120.0,
        }
    }
}

/// Smoothing factor for a first-order low-pass at `cutoff_hz` and `dt`.
fn smoothing_alpha(cutoff_hz: f32, dt: f32) -> f32 {
    let tau = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
    1.0 / (1.0 + tau / dt)
}

fn low_pass(alpha: f32, value: Vec2, prev: Vec2) -> Vec2 {
    prev.lerp(value, alpha)
}

/// One-Euro filter over a 2D signal.
///
/// The first sample passes through unchanged; `reset()` returns the filter
/// to that state (required across head-session discontinuities).
#[derive(Debug, Clone, Copy)]
pub struct OneEuroFilter2 {
    config: OneEuroConfig,
    /// Last filtered value, once initialized.
    value: Option<Vec2>,
    /// Last filtered derivative.
    derivative: Vec2,
}

impl OneEuroFilter2 {
    /// Creates a filter with the given parameters.
    #[must_use]
    pub const fn new(config: OneEuroConfig) -> Self {
        Self {
            config,
            value: None,
            derivative: Vec2::ZERO,
        }
    }

    /// Returns the filter parameters.
    #[must_use]
    pub const fn config(&self) -> OneEuroConfig {
        self.config
    }

    /// Returns true if at least one sample has been accepted.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    /// Filters one sample with the elapsed time since the previous one.
    ///
    /// Non-positive or non-finite `dt` falls back to the configured data
    /// rate.
    pub fn apply(&mut self, sample: Vec2, dt_s: f32) -> Vec2 {
        let dt = if dt_s.is_finite() && dt_s > 0.0 {
            dt_s
        } else {
            1.0 / self.config.data_rate_hz
        };

        let Some(prev) = self.value else {
            self.value = Some(sample);
            self.derivative = Vec2::ZERO;
            return sample;
        };

        // Instantaneous derivative, low-passed at a fixed 1 Hz cutoff.
        let raw_derivative = (sample - prev) / dt;
        let d_alpha = smoothing_alpha(DERIVATIVE_CUTOFF_HZ, dt);
        self.derivative = low_pass(d_alpha, raw_derivative, self.derivative);

        // Speed-adaptive cutoff.
        let cutoff = self
            .config
            .beta
            .mul_add(self.derivative.length(), self.config.min_cutoff);
        let alpha = smoothing_alpha(cutoff, dt);
        let filtered = low_pass(alpha, sample, prev);
        self.value = Some(filtered);
        filtered
    }

    /// Clears all state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.value = None;
        self.derivative = Vec2::ZERO;
    }
}
