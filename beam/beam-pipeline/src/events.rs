//! Embedder callback surface.

use beam_types::{Health, TrackedFrame, Viewport};

/// Callbacks the embedder may supply to observe the pipeline.
///
/// All methods default to no-ops, so embedders implement only what they
/// need. Every callback is invoked from the producer thread and must
/// return quickly; anything slow belongs on the embedder's side of a
/// channel.
pub trait PipelineHooks: Send {
    /// Current viewport, queried once per publish. Returning `Some`
    /// overrides the configured viewport and is forwarded to the source.
    fn viewport(&self) -> Option<Viewport> {
        None
    }

    /// Health transition. Fired once per change, never per tick.
    fn on_health_changed(&self, _health: Health) {}

    /// Every published frame, post-filtering.
    fn on_frame(&self, _frame: &TrackedFrame) {}

    /// Gaze validity flipped.
    fn on_gaze_valid_changed(&self, _valid: bool) {}

    /// Vendor session identifier changed (tracking was reacquired).
    fn on_session_changed(&self, _session_uid: i64) {}
}

/// Hook implementation that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PipelineHooks for NoHooks {}
