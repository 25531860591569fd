//! Signal conditioning filters for the beam gaze/head-pose pipeline.
//!
//! Two filter families, selectable per channel:
//!
//! - [`OneEuroFilter2`] - Speed-adaptive low-pass for 2D gaze; cutoff grows
//!   with signal velocity to reduce lag on fast motion.
//! - [`Ema2`] / [`Ema3`] / [`EmaRotator`] - Exponential moving averages for
//!   2D points, 3D positions, and per-axis Euler rotations, with an
//!   optional delta-adaptive alpha.
//!
//! Filter state is owned by the pipeline; sources and the ring never smooth.
//! Every filter passes its first sample through unchanged and supports
//! `reset()` for session discontinuities.
//!
//! # Example
//!
//! ```
//! use beam_filter::{OneEuroConfig, OneEuroFilter2};
//! use glam::Vec2;
//!
//! let mut filter = OneEuroFilter2::new(OneEuroConfig::default());
//!
//! // First sample is identity.
//! let first = filter.apply(Vec2::new(100.0, 100.0), 1.0 / 120.0);
//! assert_eq!(first, Vec2::new(100.0, 100.0));
//!
//! // Subsequent samples are smoothed toward the input.
//! let second = filter.apply(Vec2::new(110.0, 100.0), 1.0 / 120.0);
//! assert!(second.x > 100.0 && second.x < 110.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod ema;
mod one_euro;

pub use ema::{Ema2, Ema3, EmaConfig, EmaRotator};
pub use one_euro::{OneEuroConfig, OneEuroFilter2};
