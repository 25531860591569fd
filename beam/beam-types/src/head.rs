//! Head pose type.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A head pose sample in world coordinates.
///
/// Positions are centimeters (vendor HCS→WCS translation × 100); rotations
/// are Euler degrees with pitch about X, yaw about Y, roll about Z,
/// extracted once from the vendor rotation matrix.
///
/// `session_uid` increases monotonically each time the vendor reacquires
/// head tracking after loss. A change is a discontinuity signal: consumers
/// must reset any temporal filtering across it.
///
/// # Example
///
/// ```
/// use beam_types::HeadPose;
/// use glam::Vec3;
///
/// let head = HeadPose {
///     pos_cm: Vec3::new(0.0, 0.0, 60.0),
///     rot_deg: Vec3::ZERO,
///     confidence: 1.0,
///     session_uid: 1,
///     t_vendor_ms: 1000.0,
/// };
/// assert!(head.has_signal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Head position in centimeters, world frame.
    pub pos_cm: Vec3,
    /// Euler rotation in degrees: `(pitch, yaw, roll)` = rotation about X, Y, Z.
    pub rot_deg: Vec3,
    /// Renormalized vendor confidence in `[0, 1]`.
    pub confidence: f32,
    /// Monotone session counter; increments on tracking reacquisition.
    pub session_uid: i64,
    /// Vendor-reported sample time in milliseconds.
    pub t_vendor_ms: f64,
}

impl HeadPose {
    /// Returns true if the pose carries any signal (non-zero confidence).
    #[must_use]
    pub fn has_signal(&self) -> bool {
        self.confidence > 0.0
    }

    /// Returns a copy with position and rotation zeroed but timing and
    /// session identity kept.
    ///
    /// Used by the pipeline quality gate when head confidence falls below
    /// the configured minimum.
    #[must_use]
    pub fn zeroed_pose(mut self) -> Self {
        self.pos_cm = Vec3::ZERO;
        self.rot_deg = Vec3::ZERO;
        self
    }
}
