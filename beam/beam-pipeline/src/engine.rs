//! Single-threaded producer state machine.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use beam_analytics::GazeAnalytics;
use beam_filter::{Ema3, EmaConfig, EmaRotator, OneEuroConfig, OneEuroFilter2};
use beam_rec::RecordingWriter;
use beam_ring::{FrameRing, RingProducer, RingReader};
use beam_source::SampleSource;
use beam_types::{Clock, Health, TrackedFrame, Viewport};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::events::PipelineHooks;
use crate::perf::PerfStats;
use crate::watchdog::Watchdog;

/// Confidence below which adaptive smoothing slows the filter response.
const LOW_CONFIDENCE: f32 = 0.7;

/// Shared per-sample counters, written by the producer, read anywhere.
#[derive(Debug, Default)]
pub struct DiagCounters {
    outliers_rejected: AtomicU64,
    misses: AtomicU64,
    filter_resets: AtomicU64,
    consecutive_failures: AtomicU64,
}

impl DiagCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time diagnostic summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Samples invalidated or substituted by outlier rejection.
    pub outliers_rejected: u64,
    /// Ticks on which the source produced nothing.
    pub misses: u64,
    /// Filter resets forced by discontinuities.
    pub filter_resets: u64,
    /// Frames overwritten in the ring before any reader saw them.
    pub dropped_frames: u64,
    /// Current watchdog failure run length.
    pub consecutive_failures: u64,
}

impl DiagCounters {
    /// Snapshots the counters; `dropped_frames` comes from perf stats.
    #[must_use]
    pub fn snapshot(&self, dropped_frames: u64) -> Diagnostics {
        Diagnostics {
            outliers_rejected: self.outliers_rejected.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            filter_resets: self.filter_resets.load(Ordering::Relaxed),
            dropped_frames,
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
        }
    }
}

/// Producer state machine driving one source at the polling cadence.
///
/// Everything mutable lives on the producer side; consumers only see the
/// ring reader and the shared atomics handed out by [`shared`](Self::shared).
/// One [`tick`](Self::tick) performs the full poll step: fetch, stamp,
/// quality gate, discontinuity check, outlier rejection, smoothing,
/// publish, record, analytics, and transition events. A frame whose gaze
/// and head signals are both absent after the gate counts as a miss and
/// never reaches the ring.
pub struct PipelineCore {
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
    source: Box<dyn SampleSource>,
    hooks: Box<dyn PipelineHooks>,
    producer: RingProducer,
    gaze_filter: OneEuroFilter2,
    head_pos_filter: Ema3,
    head_rot_filter: EmaRotator,
    recorder: Option<RecordingWriter>,
    analytics: Arc<Mutex<GazeAnalytics>>,
    perf: Arc<Mutex<PerfStats>>,
    diag: Arc<DiagCounters>,
    health: Arc<AtomicU8>,
    recording: Arc<AtomicBool>,
    watchdog: Watchdog,
    viewport: Viewport,
    prev: Option<TrackedFrame>,
    consecutive_misses: u32,
    next_frame_id: i64,
    last_gaze_valid: Option<bool>,
}

/// Read-side state a [`PipelineCore`] shares with its consumer handle.
pub(crate) struct SharedState {
    pub reader: RingReader,
    pub analytics: Arc<Mutex<GazeAnalytics>>,
    pub perf: Arc<Mutex<PerfStats>>,
    pub diag: Arc<DiagCounters>,
    pub health: Arc<AtomicU8>,
    pub recording: Arc<AtomicBool>,
}

impl PipelineCore {
    /// Builds a core from a validated configuration and a source.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] when the configuration fails validation.
    pub fn new(
        config: PipelineConfig,
        source: Box<dyn SampleSource>,
        hooks: Box<dyn PipelineHooks>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let (producer, _) = FrameRing::channel(config.frame_buffer_size);
        #[allow(clippy::cast_possible_truncation)]
        let data_rate_hz = config.effective_hz() as f32;
        let gaze_filter = OneEuroFilter2::new(OneEuroConfig {
            min_cutoff: config.min_cutoff,
            beta: config.beta,
            data_rate_hz,
        });
        let head_ema = EmaConfig {
            adaptive: config.enable_adaptive_smoothing,
            min_confidence: config.min_head_confidence,
            ..EmaConfig::default()
        };
        let analytics = Arc::new(Mutex::new(GazeAnalytics::new(config.analytics)));
        let viewport = config.viewport;

        Ok(Self {
            clock,
            source,
            hooks,
            producer,
            gaze_filter,
            head_pos_filter: Ema3::new(head_ema),
            head_rot_filter: EmaRotator::new(head_ema),
            recorder: None,
            analytics,
            perf: Arc::new(Mutex::new(PerfStats::new())),
            diag: Arc::new(DiagCounters::default()),
            health: Arc::new(AtomicU8::new(Health::NoData.as_u8())),
            recording: Arc::new(AtomicBool::new(false)),
            watchdog: Watchdog::new(),
            viewport,
            prev: None,
            consecutive_misses: 0,
            next_frame_id: 0,
            last_gaze_valid: None,
            config,
        })
    }

    /// Hands out the consumer-side view of this core.
    pub(crate) fn shared(&self) -> SharedState {
        SharedState {
            reader: self.producer.reader(),
            analytics: Arc::clone(&self.analytics),
            perf: Arc::clone(&self.perf),
            diag: Arc::clone(&self.diag),
            health: Arc::clone(&self.health),
            recording: Arc::clone(&self.recording),
        }
    }

    /// A reader over the ring this core publishes to.
    #[must_use]
    pub fn reader(&self) -> RingReader {
        self.producer.reader()
    }

    /// Initializes the source. Returns whether it came up.
    pub fn start(&mut self) -> bool {
        let ok = self.source.init(&self.config.app_name, self.viewport);
        if ok {
            info!(kind = ?self.source.kind(), "source initialized");
            self.set_health(self.source.health());
        } else {
            let health = self.source.health();
            warn!(kind = ?self.source.kind(), ?health, "source failed to initialize");
            self.set_health(health);
            self.watchdog.on_failure(self.clock.now_seconds());
            self.sync_failures();
        }
        ok
    }

    /// Performs one poll step.
    pub fn tick(&mut self) {
        let now = self.clock.now_seconds();

        if let Some(viewport) = self.hooks.viewport() {
            if viewport.is_valid() && viewport != self.viewport {
                self.viewport = viewport;
                self.source.update_viewport(viewport);
            }
        }

        match self.source.fetch_current() {
            Some(raw) => self.on_sample(raw, now),
            None => self.on_miss(now),
        }
    }

    /// Misses accumulated; at one second of expected cadence the source is
    /// stale and the watchdog engages.
    fn on_miss(&mut self, now: f64) {
        DiagCounters::bump(&self.diag.misses);
        self.consecutive_misses = self.consecutive_misses.saturating_add(1);

        let source_health = self.source.health();
        if source_health >= Health::AppNotRunning {
            // Hard failure reported by the source itself.
            self.set_health(source_health);
            if !self.watchdog.is_recovering() {
                self.watchdog.on_failure(now);
            } else if self.watchdog.should_retry(now) {
                self.try_reinit(now);
            }
            self.sync_failures();
            return;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stale_threshold = self.config.effective_hz().ceil() as u32;
        if self.consecutive_misses < stale_threshold {
            return;
        }

        if self.watchdog.is_recovering() {
            self.set_health(Health::Recovering);
            if self.watchdog.should_retry(now) {
                self.try_reinit(now);
            }
        } else {
            self.set_health(Health::NoData);
            self.watchdog.on_failure(now);
        }
        self.sync_failures();
    }

    fn try_reinit(&mut self, now: f64) {
        debug!(
            failures = self.watchdog.consecutive_failures(),
            "watchdog re-initializing source"
        );
        self.source.shutdown();
        if !self.source.init(&self.config.app_name, self.viewport) {
            self.watchdog.on_failure(now);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn on_sample(&mut self, raw: TrackedFrame, now: f64) {
        let mut frame = raw;
        let dt = self
            .prev
            .as_ref()
            .map_or(self.config.period_s(), |p| now - p.t_local_s);
        frame.t_local_s = now;
        frame.dt_s = dt;

        let head_gated = self.apply_quality_gate(&mut frame);
        if !frame.gaze.valid && frame.head.confidence <= 0.0 {
            // Neither signal survived the gate; nothing to publish.
            self.on_miss(now);
            return;
        }

        if self.watchdog.is_recovering() {
            info!("source recovered");
            self.watchdog.on_recovered();
            self.sync_failures();
        }
        self.consecutive_misses = 0;
        self.next_frame_id += 1;
        frame.frame_id = self.next_frame_id;

        let discontinuity = self.check_discontinuity(&frame);
        if !discontinuity {
            self.reject_outliers(&mut frame, head_gated);
        }
        self.smooth(&mut frame, dt, head_gated);

        if self.producer.utilization() >= 1.0 {
            if let Ok(mut perf) = self.perf.lock() {
                perf.on_dropped();
            }
        }
        self.producer.publish(&frame, now);
        if let Ok(mut perf) = self.perf.lock() {
            perf.on_publish(now, dt);
        }

        if let Some(writer) = self.recorder.as_mut() {
            if let Err(err) = writer.write_frame(&frame) {
                warn!(%err, "recording write failed, recording stopped");
                self.recorder = None;
                self.recording.store(false, Ordering::Release);
            }
        }

        if frame.gaze.valid {
            if let Ok(mut analytics) = self.analytics.lock() {
                analytics.record(now, frame.gaze.screen_norm);
            }
        }

        self.set_health(Health::Ok);
        if self.last_gaze_valid != Some(frame.gaze.valid) {
            self.hooks.on_gaze_valid_changed(frame.gaze.valid);
            self.last_gaze_valid = Some(frame.gaze.valid);
        }
        self.hooks.on_frame(&frame);
        self.prev = Some(frame);
    }

    /// Session change or vendor time regression resets the filters and
    /// suppresses outlier rejection for this frame.
    fn check_discontinuity(&mut self, frame: &TrackedFrame) -> bool {
        let Some(prev) = self.prev.as_ref() else {
            return false;
        };
        let session_changed = frame.head.session_uid != prev.head.session_uid;
        let time_regressed = frame.t_vendor_ms < prev.t_vendor_ms;
        if !session_changed && !time_regressed {
            return false;
        }

        debug!(
            session_changed,
            time_regressed, "discontinuity, resetting filters"
        );
        self.gaze_filter.reset();
        self.head_pos_filter.reset();
        self.head_rot_filter.reset();
        DiagCounters::bump(&self.diag.filter_resets);

        if session_changed {
            self.hooks.on_session_changed(frame.head.session_uid);
            if let Ok(mut analytics) = self.analytics.lock() {
                analytics.reset();
            }
        }
        true
    }

    /// Invalidates low-confidence gaze and zeroes a low-confidence head
    /// pose. Returns whether the head was gated.
    fn apply_quality_gate(&self, frame: &mut TrackedFrame) -> bool {
        if frame.gaze.confidence < self.config.min_gaze_confidence {
            frame.gaze = frame.gaze.invalidated();
        }
        let head_gated = frame.head.confidence < self.config.min_head_confidence;
        if head_gated {
            frame.head = frame.head.zeroed_pose();
        }
        head_gated
    }

    fn reject_outliers(&mut self, frame: &mut TrackedFrame, head_gated: bool) {
        if !self.config.enable_outlier_detection {
            return;
        }
        let Some(prev) = self.prev.as_ref() else {
            return;
        };

        if frame.gaze.valid && prev.gaze.valid {
            let step_px = (frame.gaze.screen_px - prev.gaze.screen_px).length();
            if step_px > self.config.outlier_threshold * 100.0 {
                frame.gaze = frame.gaze.invalidated();
                DiagCounters::bump(&self.diag.outliers_rejected);
            }
        }
        if !head_gated {
            let step_cm = (frame.head.pos_cm - prev.head.pos_cm).length();
            if step_cm > self.config.outlier_threshold * 50.0 {
                frame.head = prev.head;
                DiagCounters::bump(&self.diag.outliers_rejected);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn smooth(&mut self, frame: &mut TrackedFrame, dt: f64, head_gated: bool) {
        if !self.config.enable_smoothing {
            return;
        }
        if frame.gaze.valid {
            let mut dt_eff = dt;
            if self.config.enable_adaptive_smoothing && frame.gaze.confidence < LOW_CONFIDENCE {
                dt_eff *= self.config.low_confidence_smoothing_multiplier;
            }
            frame.gaze.screen_px = self.gaze_filter.apply(frame.gaze.screen_px, dt_eff as f32);
            frame.gaze.screen_norm = self.viewport.to_normalized(frame.gaze.screen_px);
        }
        // A gated pose stays zeroed; feeding it to the EMA would hand the
        // pre-gate pose back through the low-confidence hold.
        if !head_gated && frame.head.has_signal() {
            frame.head.pos_cm = self.head_pos_filter.apply(frame.head.pos_cm, frame.head.confidence);
            frame.head.rot_deg = self
                .head_rot_filter
                .apply(frame.head.rot_deg, frame.head.confidence);
        }
    }

    fn set_health(&self, health: Health) {
        let old = self.health.swap(health.as_u8(), Ordering::AcqRel);
        if old != health.as_u8() {
            info!(from = %Health::from_u8(old), to = %health, "health changed");
            self.hooks.on_health_changed(health);
        }
    }

    fn sync_failures(&self) {
        self.diag.consecutive_failures.store(
            u64::from(self.watchdog.consecutive_failures()),
            Ordering::Relaxed,
        );
    }

    /// Begins recording filtered frames to `path`. Returns whether the
    /// file was created.
    pub fn start_recording<P: AsRef<Path>>(&mut self, path: P) -> bool {
        if self.recorder.is_some() {
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let start_ts = self.clock.now_millis().max(0.0) as u64;
        match RecordingWriter::create(path.as_ref(), start_ts) {
            Ok(writer) => {
                info!(path = %path.as_ref().display(), "recording started");
                self.recorder = Some(writer);
                self.recording.store(true, Ordering::Release);
                true
            }
            Err(err) => {
                warn!(path = %path.as_ref().display(), %err, "failed to start recording");
                false
            }
        }
    }

    /// Finalizes the active recording, rewriting the header counts.
    pub fn stop_recording(&mut self) {
        if let Some(writer) = self.recorder.take() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let end_ts = self.clock.now_millis().max(0.0) as u64;
            if let Err(err) = writer.finalize(end_ts) {
                warn!(%err, "failed to finalize recording");
            } else {
                info!("recording stopped");
            }
        }
        self.recording.store(false, Ordering::Release);
    }

    /// Whether frames are currently being written to disk.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> Health {
        Health::from_u8(self.health.load(Ordering::Acquire))
    }

    /// Watchdog state, for observation.
    #[must_use]
    pub const fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    /// Publishes per second over the last second; 0 until measurable.
    #[must_use]
    pub fn tracking_fps(&self) -> f32 {
        let now = self.clock.now_seconds();
        self.perf.lock().map(|perf| perf.fps(now)).unwrap_or(0.0)
    }

    /// Windowed fixation and saccade metrics.
    #[must_use]
    pub fn analytics_snapshot(&self) -> beam_analytics::AnalyticsSnapshot {
        self.analytics
            .lock()
            .map(|analytics| analytics.snapshot())
            .unwrap_or_default()
    }

    /// Diagnostic counter snapshot.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        let dropped = self
            .perf
            .lock()
            .map(|perf| perf.dropped_frames())
            .unwrap_or_default();
        self.diag.snapshot(dropped)
    }

    /// Forwards a recenter gesture start to the source.
    pub fn start_recenter(&mut self) -> bool {
        self.source.start_recenter()
    }

    /// Forwards a recenter gesture end to the source.
    pub fn end_recenter(&mut self) {
        self.source.end_recenter();
    }

    /// Forwards a calibration start to the source.
    pub fn start_calibration(&mut self, profile_id: &str) -> bool {
        self.source.start_calibration(profile_id)
    }

    /// Forwards a calibration stop to the source.
    pub fn stop_calibration(&mut self) {
        self.source.stop_calibration();
    }

    /// Finalizes recording and tears the source down.
    pub fn shutdown(&mut self) {
        self.stop_recording();
        self.source.shutdown();
        info!("pipeline core shut down");
    }
}
