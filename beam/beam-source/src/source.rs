//! The `SampleSource` trait and the source lifecycle state machine.

use beam_types::{Health, SourceKind, TrackedFrame, Viewport};

/// A producer of raw tracking frames.
///
/// Called only from the pipeline's producer task; implementations need
/// `Send` but not `Sync`. All calls are non-blocking except
/// [`fetch_current`](Self::fetch_current) on a live source, which is
/// bounded by the vendor library (the pipeline treats an over-budget call
/// as a miss).
pub trait SampleSource: Send {
    /// Initializes the source for the given application and viewport.
    ///
    /// Returns `false` on failure; [`health`](Self::health) then reports
    /// why.
    fn init(&mut self, app_name: &str, viewport: Viewport) -> bool;

    /// Tears the source down. Idempotent.
    fn shutdown(&mut self);

    /// Returns true while the source can be fetched from.
    fn is_valid(&self) -> bool;

    /// Returns the next raw frame, or `None` when no new frame is ready.
    fn fetch_current(&mut self) -> Option<TrackedFrame>;

    /// Current source health.
    fn health(&self) -> Health;

    /// Which kind of producer this is.
    fn kind(&self) -> SourceKind;

    /// Updates the viewport used for coordinate mapping.
    fn update_viewport(&mut self, viewport: Viewport);

    /// Begins a head recentering gesture. Returns `false` if unsupported.
    fn start_recenter(&mut self) -> bool {
        false
    }

    /// Ends a head recentering gesture.
    fn end_recenter(&mut self) {}

    /// Begins a calibration run for the given profile. Returns `false` if
    /// unsupported.
    fn start_calibration(&mut self, _profile_id: &str) -> bool {
        false
    }

    /// Ends a calibration run.
    fn stop_calibration(&mut self) {}
}

/// Lifecycle stage of a sample source.
///
/// ```text
///  Uninit ──init──► Ready ──fetch hit──► Streaming
///                     │                     │
///                     │          fetch miss × N ──► Stale ──hit──► Streaming
///                     └──────── shutdown ◄──────────┘
///  any ──fatal──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceStage {
    /// Not yet initialized.
    #[default]
    Uninit,
    /// Initialized, no frame seen yet.
    Ready,
    /// Producing frames.
    Streaming,
    /// Too many consecutive empty fetches.
    Stale,
    /// Unrecoverable failure.
    Failed,
}

/// Tracks the source lifecycle from init/fetch outcomes.
#[derive(Debug, Clone, Copy)]
pub struct StageTracker {
    stage: SourceStage,
    consecutive_misses: u32,
    stale_threshold: u32,
}

impl StageTracker {
    /// Creates a tracker that goes stale after `stale_threshold`
    /// consecutive misses.
    #[must_use]
    pub const fn new(stale_threshold: u32) -> Self {
        Self {
            stage: SourceStage::Uninit,
            consecutive_misses: 0,
            stale_threshold: if stale_threshold == 0 {
                1
            } else {
                stale_threshold
            },
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> SourceStage {
        self.stage
    }

    /// Misses since the last hit.
    #[must_use]
    pub const fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    /// Records a successful `init`.
    pub fn on_init(&mut self) {
        self.stage = SourceStage::Ready;
        self.consecutive_misses = 0;
    }

    /// Records a fetch outcome.
    pub fn on_fetch(&mut self, hit: bool) {
        match self.stage {
            SourceStage::Uninit | SourceStage::Failed => {}
            SourceStage::Ready | SourceStage::Streaming | SourceStage::Stale => {
                if hit {
                    self.stage = SourceStage::Streaming;
                    self.consecutive_misses = 0;
                } else {
                    self.consecutive_misses = self.consecutive_misses.saturating_add(1);
                    if self.stage == SourceStage::Streaming
                        && self.consecutive_misses >= self.stale_threshold
                    {
                        self.stage = SourceStage::Stale;
                    }
                }
            }
        }
    }

    /// Records a shutdown.
    pub fn on_shutdown(&mut self) {
        self.stage = SourceStage::Uninit;
        self.consecutive_misses = 0;
    }

    /// Records an unrecoverable failure.
    pub fn on_fatal(&mut self) {
        self.stage = SourceStage::Failed;
    }
}
