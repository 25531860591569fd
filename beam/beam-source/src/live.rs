//! Live vendor tracker bridge.
//!
//! [`LiveSource`] converts the vendor library's native units into pipeline
//! frames: confidence ordinals renormalize to `[0, 1]`, head translation
//! converts from meters to centimeters, and the vendor's 3x3 rotation
//! matrix is reduced to Euler degrees in one documented place
//! ([`rotation_to_euler_deg`]).
//!
//! The vendor library itself sits behind the [`VendorApi`] trait so tests
//! can script it and embedders can swap SDK generations without touching
//! the pipeline.

use std::sync::Arc;

use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
use tracing::{debug, warn};

use beam_types::{
    confidence_from_ordinal, Clock, GazeSample, HeadPose, Health, SourceKind, TrackedFrame,
    Viewport, LOST_TRACKING_ORDINAL,
};

use crate::source::{SampleSource, SourceStage, StageTracker};

/// Consecutive empty fetches before a live source reports itself stale.
const STALE_FETCH_THRESHOLD: u32 = 120;

/// What the vendor library reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorAvailability {
    /// Tracker app running and delivering data.
    Running,
    /// Tracker app running but no data is arriving.
    RunningNoData,
    /// Tracker app is not running.
    NotRunning,
    /// The native library could not be loaded.
    LibraryMissing,
    /// Any other failure.
    Faulted,
}

/// Raw vendor gaze: screen-pixel point plus a 0..3 confidence ordinal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorGaze {
    /// Point of regard in screen pixels within the tracking rectangle.
    pub point_px: Vec2,
    /// Confidence ordinal, `0..=3`; zero means lost tracking.
    pub confidence_ordinal: u8,
}

/// Raw vendor head pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorHead {
    /// Head translation in meters (vendor HCS→WCS).
    pub translation_m: Vec3,
    /// Head rotation matrix.
    pub rotation: Mat3,
    /// Confidence ordinal, `0..=3`.
    pub confidence_ordinal: u8,
    /// Monotone session counter; increments on reacquisition.
    pub session_uid: i64,
}

/// One vendor user-state sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorUserState {
    /// Vendor sample time in seconds; zero means "no sample yet".
    pub t_vendor_s: f64,
    /// Gaze portion.
    pub gaze: VendorGaze,
    /// Head portion.
    pub head: VendorHead,
}

/// Surface of the native vendor tracker library.
///
/// All calls are made from the pipeline's producer task.
/// [`latest_state`](Self::latest_state) must be bounded; the pipeline
/// treats an over-budget call as a miss.
pub trait VendorApi: Send {
    /// Creates a tracking session for the named application over the given
    /// viewport rectangle (`(0,0)` to `(w-1, h-1)`).
    fn initialize(&mut self, app_name: &str, viewport: Viewport) -> bool;

    /// Destroys the tracking session. Idempotent.
    fn shutdown_session(&mut self);

    /// Returns the vendor's latest user state, or `None` when the session
    /// has nothing new.
    fn latest_state(&mut self) -> Option<VendorUserState>;

    /// Current library/application availability.
    fn availability(&self) -> VendorAvailability;

    /// Updates the tracking rectangle.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Begins a head recentering gesture.
    fn begin_recenter(&mut self) -> bool {
        false
    }

    /// Ends a head recentering gesture.
    fn end_recenter(&mut self) {}

    /// Begins calibration for a profile.
    fn begin_calibration(&mut self, _profile_id: &str) -> bool {
        false
    }

    /// Ends calibration.
    fn end_calibration(&mut self) {}
}

/// Extracts Euler degrees from a rotation matrix.
///
/// This is the single matrix→Euler site in the pipeline. Axis order:
/// pitch is the rotation about X, yaw about Y, roll about Z, decomposed
/// as yaw·pitch·roll (Y, then X, then Z).
#[must_use]
pub fn rotation_to_euler_deg(rotation: &Mat3) -> Vec3 {
    let (yaw, pitch, roll) = Quat::from_mat3(rotation).to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Bridge from a [`VendorApi`] to the [`SampleSource`] contract.
pub struct LiveSource<V: VendorApi> {
    vendor: V,
    clock: Arc<dyn Clock>,
    viewport: Viewport,
    tracker: StageTracker,
    /// Vendor timestamp of the last frame handed out, for deduplication.
    last_t_vendor_ms: f64,
}

impl<V: VendorApi> LiveSource<V> {
    /// Creates a live source over a vendor library handle.
    pub fn new(vendor: V, clock: Arc<dyn Clock>) -> Self {
        Self {
            vendor,
            clock,
            viewport: Viewport::default(),
            tracker: StageTracker::new(STALE_FETCH_THRESHOLD),
            last_t_vendor_ms: f64::NEG_INFINITY,
        }
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> SourceStage {
        self.tracker.stage()
    }

    fn convert(&self, state: &VendorUserState) -> TrackedFrame {
        let t_vendor_ms = state.t_vendor_s * 1000.0;
        let screen_px = state.gaze.point_px;
        let screen_norm = self.viewport.to_normalized(screen_px);

        TrackedFrame {
            gaze: GazeSample {
                valid: state.gaze.confidence_ordinal != LOST_TRACKING_ORDINAL,
                screen_norm,
                screen_px,
                confidence: confidence_from_ordinal(state.gaze.confidence_ordinal),
                t_vendor_ms,
            },
            head: HeadPose {
                pos_cm: state.head.translation_m * 100.0,
                rot_deg: rotation_to_euler_deg(&state.head.rotation),
                confidence: confidence_from_ordinal(state.head.confidence_ordinal),
                session_uid: state.head.session_uid,
                t_vendor_ms,
            },
            frame_id: 0,
            t_vendor_ms,
            t_local_s: self.clock.now_seconds(),
            dt_s: 0.0,
        }
    }
}

impl<V: VendorApi> SampleSource for LiveSource<V> {
    fn init(&mut self, app_name: &str, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            warn!(width = viewport.width, height = viewport.height, "rejecting invalid viewport");
            return false;
        }
        self.viewport = viewport;
        if self.vendor.initialize(app_name, viewport) {
            self.tracker.on_init();
            self.last_t_vendor_ms = f64::NEG_INFINITY;
            debug!(app_name, "vendor session created");
            true
        } else {
            debug!(app_name, availability = ?self.vendor.availability(), "vendor init failed");
            false
        }
    }

    fn shutdown(&mut self) {
        self.vendor.shutdown_session();
        self.tracker.on_shutdown();
    }

    fn is_valid(&self) -> bool {
        !matches!(
            self.tracker.stage(),
            SourceStage::Uninit | SourceStage::Failed
        )
    }

    fn fetch_current(&mut self) -> Option<TrackedFrame> {
        if !self.is_valid() {
            return None;
        }
        let frame = self.vendor.latest_state().and_then(|state| {
            // A zero vendor timestamp or the lost-tracking sentinel means
            // the sample carries no signal; a repeated timestamp means no
            // new sample since the last fetch.
            let t_vendor_ms = state.t_vendor_s * 1000.0;
            if state.t_vendor_s == 0.0
                || state.gaze.confidence_ordinal == LOST_TRACKING_ORDINAL
                || t_vendor_ms <= self.last_t_vendor_ms
            {
                return None;
            }
            Some(self.convert(&state))
        });
        if let Some(frame) = &frame {
            self.last_t_vendor_ms = frame.t_vendor_ms;
        }
        self.tracker.on_fetch(frame.is_some());
        frame
    }

    fn health(&self) -> Health {
        match self.vendor.availability() {
            VendorAvailability::Running => Health::Ok,
            VendorAvailability::RunningNoData => Health::NoData,
            VendorAvailability::NotRunning => Health::AppNotRunning,
            VendorAvailability::LibraryMissing => Health::DllMissing,
            VendorAvailability::Faulted => Health::Error,
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn update_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.viewport = viewport;
            self.vendor.set_viewport(viewport);
        }
    }

    fn start_recenter(&mut self) -> bool {
        self.vendor.begin_recenter()
    }

    fn end_recenter(&mut self) {
        self.vendor.end_recenter();
    }

    fn start_calibration(&mut self, profile_id: &str) -> bool {
        self.vendor.begin_calibration(profile_id)
    }

    fn stop_calibration(&mut self) {
        self.vendor.end_calibration();
    }
}
