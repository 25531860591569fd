//! Gaze sample type and vendor confidence mapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Vendor confidence ordinal that marks lost tracking.
///
/// The vendor reports gaze quality as an ordinal in `0..=3`; zero means the
/// tracker has lost the user entirely and the sample carries no signal.
pub const LOST_TRACKING_ORDINAL: u8 = 0;

/// Maps a vendor confidence ordinal in `0..=3` to a `[0, 1]` confidence.
///
/// The mapping is exactly `k / 3`; ordinals above 3 saturate to 1.
///
/// # Example
///
/// ```
/// use beam_types::confidence_from_ordinal;
///
/// assert_eq!(confidence_from_ordinal(0), 0.0);
/// assert_eq!(confidence_from_ordinal(3), 1.0);
/// assert!((confidence_from_ordinal(2) - 2.0 / 3.0).abs() < 1e-7);
/// ```
#[must_use]
pub fn confidence_from_ordinal(ordinal: u8) -> f32 {
    f32::from(ordinal.min(3)) / 3.0
}

/// A single gaze sample in viewport coordinates.
///
/// `screen_norm` is the point-of-regard in viewport-normalized coordinates
/// (`(0, 0)` top-left, `(1, 1)` bottom-right); `screen_px` is the same point
/// rescaled by the viewport geometry current at publish time.
///
/// # Example
///
/// ```
/// use beam_types::GazeSample;
///
/// let gaze = GazeSample::invalid();
/// assert!(!gaze.valid);
/// assert_eq!(gaze.confidence, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeSample {
    /// False when the source lost tracking or confidence fell below the gate.
    pub valid: bool,
    /// Point-of-regard in viewport-normalized coordinates, `[0, 1]²`.
    pub screen_norm: Vec2,
    /// Point-of-regard in viewport pixels.
    pub screen_px: Vec2,
    /// Renormalized vendor confidence in `[0, 1]`.
    pub confidence: f32,
    /// Vendor-reported sample time in milliseconds.
    pub t_vendor_ms: f64,
}

impl GazeSample {
    /// Creates a gaze sample marked invalid with zeroed fields.
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Creates a valid gaze sample.
    #[must_use]
    pub fn new(screen_norm: Vec2, screen_px: Vec2, confidence: f32, t_vendor_ms: f64) -> Self {
        Self {
            valid: true,
            screen_norm,
            screen_px,
            confidence,
            t_vendor_ms,
        }
    }

    /// Returns a copy of this sample with `valid` cleared.
    #[must_use]
    pub fn invalidated(mut self) -> Self {
        self.valid = false;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_mapping_is_exact() {
        assert_eq!(confidence_from_ordinal(0), 0.0 / 3.0);
        assert_eq!(confidence_from_ordinal(1), 1.0 / 3.0);
        assert_eq!(confidence_from_ordinal(2), 2.0 / 3.0);
        assert_eq!(confidence_from_ordinal(3), 3.0 / 3.0);
    }

    #[test]
    fn ordinal_saturates() {
        assert_eq!(confidence_from_ordinal(7), 1.0);
    }

    #[test]
    fn invalid_sample_is_zeroed() {
        let g = GazeSample::invalid();
        assert!(!g.valid);
        assert_eq!(g.screen_norm, Vec2::ZERO);
        assert_eq!(g.t_vendor_ms, 0.0);
    }

    #[test]
    fn invalidated_keeps_position() {
        let g = GazeSample::new(Vec2::new(0.5, 0.5), Vec2::new(960.0, 540.0), 1.0, 10.0);
        let inv = g.invalidated();
        assert!(!inv.valid);
        assert_eq!(inv.screen_norm, g.screen_norm);
        assert_eq!(inv.confidence, g.confidence);
    }
}
