//! Threaded pipeline handle.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::warn;

use beam_analytics::AnalyticsSnapshot;
use beam_source::SampleSource;
use beam_types::{Clock, GazeSample, Health, HeadPose, MonotonicClock, TrackedFrame};

use crate::config::PipelineConfig;
use crate::engine::{Diagnostics, PipelineCore, SharedState};
use crate::error::Result;
use crate::events::PipelineHooks;
use crate::perf::PerfSnapshot;

/// How long command replies may take before the caller gives up.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

enum Command {
    Start(Sender<bool>),
    StartRecording(PathBuf, Sender<bool>),
    StopRecording,
    StartRecenter(Sender<bool>),
    EndRecenter,
    StartCalibration(String, Sender<bool>),
    StopCalibration,
    Shutdown,
}

/// Embedder-owned pipeline handle.
///
/// Owns the polling thread and exposes the thread-safe query surface.
/// All query methods are wait-free reads of the ring or shared atomics;
/// control methods go through a command channel to the producer and the
/// `bool`-returning ones block briefly for the reply.
///
/// Dropping the handle shuts the polling thread down, finalizing any
/// active recording first.
pub struct Pipeline {
    shared: SharedState,
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Spawns a pipeline over a source, using the monotonic wall clock.
    ///
    /// With `auto_start` set the source is initialized immediately;
    /// otherwise the thread idles until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`crate::PipelineError::Config`] for an invalid configuration,
    /// [`crate::PipelineError::Spawn`] if the thread cannot be created.
    pub fn spawn(
        config: PipelineConfig,
        source: Box<dyn SampleSource>,
        hooks: Box<dyn PipelineHooks>,
    ) -> Result<Self> {
        Self::spawn_with_clock(config, source, hooks, Arc::new(MonotonicClock::new()))
    }

    /// Spawns a pipeline with an explicit clock for frame stamping.
    ///
    /// # Errors
    ///
    /// Same as [`spawn`](Self::spawn).
    pub fn spawn_with_clock(
        config: PipelineConfig,
        source: Box<dyn SampleSource>,
        hooks: Box<dyn PipelineHooks>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let core = PipelineCore::new(config.clone(), source, hooks, Arc::clone(&clock))?;
        let shared = core.shared();
        let (tx, rx) = mpsc::channel();
        let period = Duration::from_secs_f64(config.period_s());
        let auto_start = config.auto_start;

        let worker = std::thread::Builder::new()
            .name("beam-poll".to_owned())
            .spawn(move || run_loop(core, &rx, period, auto_start))?;

        Ok(Self {
            shared,
            commands: tx,
            worker: Some(worker),
            clock,
            config,
        })
    }

    /// Initializes the source and begins streaming.
    ///
    /// Returns whether the source came up; the watchdog keeps retrying
    /// either way.
    pub fn start(&self) -> bool {
        self.request(Command::Start)
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Latest published frame, if any.
    #[must_use]
    pub fn current_frame(&self) -> Option<TrackedFrame> {
        self.shared.reader.latest()
    }

    /// Latest gaze sample; invalid when absent or older than the
    /// configured maximum age.
    #[must_use]
    pub fn current_gaze(&self) -> GazeSample {
        match self.shared.reader.latest() {
            Some(frame) => {
                let age = self.clock.now_seconds() - frame.t_local_s;
                if age > self.config.max_gaze_age_seconds {
                    frame.gaze.invalidated()
                } else {
                    frame.gaze
                }
            }
            None => GazeSample::invalid(),
        }
    }

    /// Latest head pose; identity when nothing has been published.
    #[must_use]
    pub fn current_head(&self) -> HeadPose {
        self.shared
            .reader
            .latest()
            .map(|frame| frame.head)
            .unwrap_or_default()
    }

    /// Frame closest to a vendor timestamp, within a tolerance.
    #[must_use]
    pub fn frame_at(&self, t_target_ms: f64, tolerance_ms: f64) -> Option<TrackedFrame> {
        self.shared.reader.frame_at(t_target_ms, tolerance_ms)
    }

    /// Midpoint of the two newest frames, falling back to the latest.
    #[must_use]
    pub fn latest_interpolated(&self) -> Option<TrackedFrame> {
        self.shared.reader.latest_interpolated()
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> Health {
        Health::from_u8(self.shared.health.load(Ordering::Acquire))
    }

    /// Publishes per second over the last second; 0 until measurable.
    #[must_use]
    pub fn tracking_fps(&self) -> f32 {
        let now = self.clock.now_seconds();
        self.shared
            .perf
            .lock()
            .map(|perf| perf.fps(now))
            .unwrap_or(0.0)
    }

    /// Fraction of the ring currently occupied.
    #[must_use]
    pub fn buffer_utilization(&self) -> f32 {
        self.shared.reader.utilization()
    }

    /// Performance counters over the last second.
    #[must_use]
    pub fn perf_snapshot(&self) -> PerfSnapshot {
        let now = self.clock.now_seconds();
        self.shared
            .perf
            .lock()
            .map(|perf| perf.snapshot(now))
            .unwrap_or_default()
    }

    /// Diagnostic counters.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        let dropped = self
            .shared
            .perf
            .lock()
            .map(|perf| perf.dropped_frames())
            .unwrap_or_default();
        self.shared.diag.snapshot(dropped)
    }

    /// Windowed fixation and saccade metrics.
    #[must_use]
    pub fn analytics_snapshot(&self) -> AnalyticsSnapshot {
        self.shared
            .analytics
            .lock()
            .map(|analytics| analytics.snapshot())
            .unwrap_or_default()
    }

    /// Begins recording filtered frames to `path`.
    pub fn start_recording<P: Into<PathBuf>>(&self, path: P) -> bool {
        let path = path.into();
        self.request(move |reply| Command::StartRecording(path, reply))
    }

    /// Stops and finalizes the active recording, if any.
    pub fn stop_recording(&self) {
        let _ = self.commands.send(Command::StopRecording);
    }

    /// Whether frames are currently being written to disk.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::Acquire)
    }

    /// Begins a head recentering gesture.
    pub fn start_recenter(&self) -> bool {
        self.request(Command::StartRecenter)
    }

    /// Ends a head recentering gesture.
    pub fn end_recenter(&self) {
        let _ = self.commands.send(Command::EndRecenter);
    }

    /// Begins calibration for a profile.
    pub fn start_calibration(&self, profile_id: &str) -> bool {
        let profile = profile_id.to_owned();
        self.request(move |reply| Command::StartCalibration(profile, reply))
    }

    /// Ends calibration.
    pub fn stop_calibration(&self) {
        let _ = self.commands.send(Command::StopCalibration);
    }

    /// Stops the polling thread, finalizing recording and the source.
    ///
    /// Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.commands.send(Command::Shutdown);
            if worker.join().is_err() {
                warn!("polling thread panicked during shutdown");
            }
        }
    }

    /// Sends a command carrying a reply channel and waits for the answer.
    fn request<F>(&self, build: F) -> bool
    where
        F: FnOnce(Sender<bool>) -> Command,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.commands.send(build(reply_tx)).is_err() {
            return false;
        }
        reply_rx.recv_timeout(REPLY_TIMEOUT).unwrap_or(false)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(mut core: PipelineCore, rx: &Receiver<Command>, period: Duration, auto_start: bool) {
    // `started` is the embedder's intent, not init success: a failed init
    // must keep ticking so the watchdog can re-initialize on its backoff
    // schedule.
    let mut started = auto_start;
    if started {
        core.start();
    }
    let mut next_deadline = Instant::now() + period;

    'run: loop {
        loop {
            match rx.try_recv() {
                Ok(Command::Shutdown) | Err(TryRecvError::Disconnected) => break 'run,
                Ok(Command::Start(reply)) => {
                    started = true;
                    let _ = reply.send(core.start());
                }
                Ok(Command::StartRecording(path, reply)) => {
                    let _ = reply.send(core.start_recording(path));
                }
                Ok(Command::StopRecording) => core.stop_recording(),
                Ok(Command::StartRecenter(reply)) => {
                    let _ = reply.send(core.start_recenter());
                }
                Ok(Command::EndRecenter) => core.end_recenter(),
                Ok(Command::StartCalibration(profile, reply)) => {
                    let _ = reply.send(core.start_calibration(&profile));
                }
                Ok(Command::StopCalibration) => core.stop_calibration(),
                Err(TryRecvError::Empty) => break,
            }
        }

        if started {
            core.tick();
        }

        let now = Instant::now();
        if next_deadline > now {
            std::thread::sleep(next_deadline - now);
        }
        next_deadline += period;
        // A long vendor stall should not cause a burst of catch-up ticks.
        if next_deadline < Instant::now() {
            next_deadline = Instant::now() + period;
        }
    }

    core.shutdown();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::events::NoHooks;
    use beam_source::{SyntheticConfig, SyntheticSource};
    use beam_types::{SourceKind, Viewport};

    fn synthetic_pipeline(auto_start: bool) -> Pipeline {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        let source = Box::new(SyntheticSource::new(
            SyntheticConfig::default(),
            Arc::clone(&clock),
        ));
        let config = PipelineConfig {
            auto_start,
            polling_hz: 120.0,
            viewport: Viewport::new(1920, 1080),
            ..PipelineConfig::default()
        };
        Pipeline::spawn_with_clock(config, source, Box::new(NoHooks), clock).unwrap()
    }

    #[test]
    fn auto_start_streams_frames() {
        let mut pipeline = synthetic_pipeline(true);
        std::thread::sleep(Duration::from_millis(300));

        assert!(pipeline.current_frame().is_some());
        assert_eq!(pipeline.health(), Health::Ok);
        assert!(pipeline.buffer_utilization() > 0.0);
        pipeline.shutdown();
    }

    #[test]
    fn idle_until_started() {
        let mut pipeline = synthetic_pipeline(false);
        std::thread::sleep(Duration::from_millis(100));
        assert!(pipeline.current_frame().is_none());

        assert!(pipeline.start());
        std::thread::sleep(Duration::from_millis(300));
        assert!(pipeline.current_frame().is_some());
        pipeline.shutdown();
    }

    #[test]
    fn recording_flag_follows_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = synthetic_pipeline(true);
        std::thread::sleep(Duration::from_millis(100));

        assert!(!pipeline.is_recording());
        assert!(pipeline.start_recording(dir.path().join("run.beamrec")));
        assert!(pipeline.is_recording());

        pipeline.stop_recording();
        std::thread::sleep(Duration::from_millis(100));
        assert!(!pipeline.is_recording());
        pipeline.shutdown();
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pipeline = synthetic_pipeline(true);
        pipeline.shutdown();
        pipeline.shutdown();
        assert!(!pipeline.start());
    }

    /// Synthetic source whose `init` fails a set number of times first.
    struct FlakyInitSource {
        inner: SyntheticSource,
        failures_left: u32,
        ready: bool,
    }

    impl SampleSource for FlakyInitSource {
        fn init(&mut self, app_name: &str, viewport: Viewport) -> bool {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return false;
            }
            self.ready = self.inner.init(app_name, viewport);
            self.ready
        }

        fn shutdown(&mut self) {
            self.inner.shutdown();
            self.ready = false;
        }

        fn is_valid(&self) -> bool {
            self.ready
        }

        fn fetch_current(&mut self) -> Option<TrackedFrame> {
            if self.ready {
                self.inner.fetch_current()
            } else {
                None
            }
        }

        fn health(&self) -> Health {
            if self.ready {
                self.inner.health()
            } else {
                Health::AppNotRunning
            }
        }

        fn kind(&self) -> SourceKind {
            self.inner.kind()
        }

        fn update_viewport(&mut self, viewport: Viewport) {
            self.inner.update_viewport(viewport);
        }
    }

    #[test]
    fn watchdog_retries_a_failed_auto_start() {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        let source = Box::new(FlakyInitSource {
            inner: SyntheticSource::new(SyntheticConfig::default(), Arc::clone(&clock)),
            failures_left: 1,
            ready: false,
        });
        let config = PipelineConfig {
            auto_start: true,
            polling_hz: 120.0,
            viewport: Viewport::new(1920, 1080),
            ..PipelineConfig::default()
        };
        let mut pipeline =
            Pipeline::spawn_with_clock(config, source, Box::new(NoHooks), clock).unwrap();

        // The first retry fires after the 0.25 s backoff; leave headroom.
        std::thread::sleep(Duration::from_millis(900));
        assert_eq!(pipeline.health(), Health::Ok);
        assert!(pipeline.current_frame().is_some());
        pipeline.shutdown();
    }

    #[test]
    fn current_gaze_is_invalid_before_any_frame() {
        let mut pipeline = synthetic_pipeline(false);
        assert!(!pipeline.current_gaze().valid);
        assert_eq!(pipeline.current_head(), HeadPose::default());
        assert_eq!(pipeline.tracking_fps(), 0.0);
        pipeline.shutdown();
    }
}
