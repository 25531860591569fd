//! Sample producers for the beam gaze/head-pose pipeline.
//!
//! A [`SampleSource`] yields raw [`TrackedFrame`]s to the pipeline's polling
//! loop. Three implementations share the contract:
//!
//! - [`LiveSource`] - Bridges a native vendor tracker library (unit and
//!   coordinate conversion, confidence renormalization, health mapping).
//! - [`RecordedSource`] - Deterministic playback of a `.beamrec` recording,
//!   substitutable for the live bridge.
//! - [`SyntheticSource`] - Deterministic generated signal for CI and
//!   performance tests.
//!
//! Sources produce raw frames only; filtering, stamping, and publication
//! belong to the pipeline.
//!
//! # Example
//!
//! ```
//! use beam_source::{SampleSource, SyntheticSource, SyntheticConfig};
//! use beam_types::{ManualClock, Viewport};
//! use std::sync::Arc;
//!
//! let clock = ManualClock::new();
//! let mut source = SyntheticSource::new(SyntheticConfig::default(), Arc::new(clock.clone()));
//! assert!(source.init("demo", Viewport::new(1920, 1080)));
//!
//! clock.advance(1.0 / 120.0);
//! let frame = source.fetch_current().expect("synthetic frame due");
//! assert!(frame.gaze.valid);
//! ```
//!
//! [`TrackedFrame`]: beam_types::TrackedFrame

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod live;
mod recorded;
mod source;
mod synthetic;

pub use error::{SourceError, SourceResult};
pub use live::{
    rotation_to_euler_deg, LiveSource, VendorApi, VendorAvailability, VendorGaze, VendorHead,
    VendorUserState,
};
pub use recorded::RecordedSource;
pub use source::{SampleSource, SourceStage, StageTracker};
pub use synthetic::{SyntheticConfig, SyntheticSource};
