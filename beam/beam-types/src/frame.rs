//! Published pipeline frame.

use serde::{Deserialize, Serialize};

use crate::gaze::GazeSample;
use crate::head::HeadPose;

/// One published pipeline frame: a gaze sample, a head pose, and timing.
///
/// `frame_id` is strictly monotone per pipeline instance with no gaps.
/// `t_local_s` is the local monotonic clock at stamping time; `dt_s` is the
/// delta since the previously published frame.
///
/// Frames are plain `Copy` data with no indirection so ring slots can be
/// copied out without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedFrame {
    /// Gaze sample.
    pub gaze: GazeSample,
    /// Head pose.
    pub head: HeadPose,
    /// Strictly monotone frame counter.
    pub frame_id: i64,
    /// Vendor-reported sample time in milliseconds.
    pub t_vendor_ms: f64,
    /// Local monotonic time at stamping, seconds.
    pub t_local_s: f64,
    /// Seconds since the previously published frame.
    pub dt_s: f64,
}

fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    t.mul_add(b - a, a)
}

fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    t.mul_add(b - a, a)
}

impl TrackedFrame {
    /// Linearly interpolates between two frames.
    ///
    /// Continuous fields (`screen_norm`, `screen_px`, `confidence`,
    /// `pos_cm`, `rot_deg`, timestamps) interpolate componentwise;
    /// `valid` AND-combines; `session_uid` and `frame_id` take the newer
    /// frame's values.
    ///
    /// # Example
    ///
    /// ```
    /// use beam_types::TrackedFrame;
    ///
    /// let mut a = TrackedFrame::default();
    /// a.gaze.confidence = 0.0;
    /// let mut b = TrackedFrame::default();
    /// b.gaze.confidence = 1.0;
    ///
    /// let mid = TrackedFrame::lerp(&a, &b, 0.5);
    /// assert!((mid.gaze.confidence - 0.5).abs() < 1e-6);
    /// ```
    #[must_use]
    pub fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        let t64 = f64::from(t);
        Self {
            gaze: GazeSample {
                valid: a.gaze.valid && b.gaze.valid,
                screen_norm: a.gaze.screen_norm.lerp(b.gaze.screen_norm, t),
                screen_px: a.gaze.screen_px.lerp(b.gaze.screen_px, t),
                confidence: lerp_f32(a.gaze.confidence, b.gaze.confidence, t),
                t_vendor_ms: lerp_f64(a.gaze.t_vendor_ms, b.gaze.t_vendor_ms, t64),
            },
            head: HeadPose {
                pos_cm: a.head.pos_cm.lerp(b.head.pos_cm, t),
                rot_deg: a.head.rot_deg.lerp(b.head.rot_deg, t),
                confidence: lerp_f32(a.head.confidence, b.head.confidence, t),
                session_uid: b.head.session_uid,
                t_vendor_ms: lerp_f64(a.head.t_vendor_ms, b.head.t_vendor_ms, t64),
            },
            frame_id: b.frame_id,
            t_vendor_ms: lerp_f64(a.t_vendor_ms, b.t_vendor_ms, t64),
            t_local_s: lerp_f64(a.t_local_s, b.t_local_s, t64),
            dt_s: lerp_f64(a.dt_s, b.dt_s, t64),
        }
    }

    /// Structural midpoint of two frames (`lerp` at `t = 0.5`).
    #[must_use]
    pub fn midpoint(a: &Self, b: &Self) -> Self {
        Self::lerp(a, b, 0.5)
    }
}
