//! Core sample types for the beam gaze/head-pose pipeline.
//!
//! This crate provides the value objects shared by every other beam crate:
//!
//! - [`GazeSample`] - Point-of-regard in viewport coordinates with confidence
//! - [`HeadPose`] - Head position (cm) and Euler rotation (degrees)
//! - [`TrackedFrame`] - One published pipeline frame (gaze + head + timing)
//! - [`Health`] - Monotone-degrading tracker health state
//! - [`SourceKind`] - Which sample producer is active
//! - [`Viewport`] - Active viewport geometry for normalized → pixel mapping
//! - [`Clock`] - Monotonic time source abstraction
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no runtime dependencies beyond math and
//! serialization. It can be used in:
//! - The live pipeline
//! - Offline recording analysis tools
//! - Test harnesses
//!
//! # Coordinate Conventions
//!
//! Gaze points are viewport-normalized: `(x, y)` in `[0, 1]²` with `(0, 0)`
//! at the top-left of the active viewport. Head positions are centimeters in
//! the world frame; head rotations are Euler degrees with pitch about X,
//! yaw about Y, roll about Z.
//!
//! # Example
//!
//! ```
//! use beam_types::{GazeSample, Viewport, confidence_from_ordinal};
//! use glam::Vec2;
//!
//! let viewport = Viewport::new(1920, 1080);
//! let norm = Vec2::new(0.5, 0.5);
//!
//! let gaze = GazeSample {
//!     valid: true,
//!     screen_norm: norm,
//!     screen_px: viewport.to_pixels(norm),
//!     confidence: confidence_from_ordinal(3),
//!     t_vendor_ms: 1000.0,
//! };
//!
//! assert!((gaze.screen_px.x - 960.0).abs() < 1e-3);
//! assert!((gaze.confidence - 1.0).abs() < 1e-6);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod frame;
mod gaze;
mod head;
mod health;
mod time;
mod viewport;

pub use frame::TrackedFrame;
pub use gaze::{confidence_from_ordinal, GazeSample, LOST_TRACKING_ORDINAL};
pub use head::HeadPose;
pub use health::{Health, SourceKind};
pub use time::{millis_to_secs, secs_to_millis, Clock, ManualClock, MonotonicClock};
pub use viewport::Viewport;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        confidence_from_ordinal, Clock, GazeSample, HeadPose, Health, ManualClock,
        MonotonicClock, SourceKind, TrackedFrame, Viewport,
    };
}
