//! Lock-free SPSC frame ring for the beam gaze/head-pose pipeline.
//!
//! A bounded, power-of-two-capacity ring of timestamped [`TrackedFrame`]s
//! decoupling the single producer (the polling loop) from any number of
//! non-blocking consumers (game/render thread, analytics readers).
//!
//! The single-producer contract is type-enforced: [`FrameRing::channel`]
//! hands out one non-cloneable [`RingProducer`] and a cloneable
//! [`RingReader`]. Consumers always copy frames out; they never hold slot
//! references.
//!
//! # Example
//!
//! ```
//! use beam_ring::FrameRing;
//! use beam_types::TrackedFrame;
//!
//! let (mut producer, reader) = FrameRing::channel(64);
//!
//! let mut frame = TrackedFrame::default();
//! frame.frame_id = 1;
//! producer.publish(&frame, 0.0);
//!
//! let latest = reader.latest().unwrap();
//! assert_eq!(latest.frame_id, 1);
//! ```
//!
//! [`TrackedFrame`]: beam_types::TrackedFrame

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod ring;

pub use ring::{FrameRing, RingProducer, RingReader};
