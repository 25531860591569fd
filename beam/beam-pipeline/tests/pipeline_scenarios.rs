//! End-to-end producer scenarios driven tick by tick under a manual clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};

use beam_pipeline::{NoHooks, PipelineConfig, PipelineCore};
use beam_source::{RecordedSource, SampleSource};
use beam_types::{
    GazeSample, Health, HeadPose, ManualClock, SourceKind, TrackedFrame, Viewport,
};

/// Shared frame script a test can refill mid-run.
type Script = Arc<Mutex<VecDeque<TrackedFrame>>>;

/// Source that hands out pre-scripted frames, one per fetch.
struct ScriptedSource {
    script: Script,
    open: bool,
}

impl ScriptedSource {
    fn new() -> (Self, Script) {
        let script: Script = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                script: Arc::clone(&script),
                open: false,
            },
            script,
        )
    }
}

impl SampleSource for ScriptedSource {
    fn init(&mut self, _app_name: &str, _viewport: Viewport) -> bool {
        self.open = true;
        true
    }

    fn shutdown(&mut self) {
        self.open = false;
    }

    fn is_valid(&self) -> bool {
        self.open
    }

    fn fetch_current(&mut self) -> Option<TrackedFrame> {
        if !self.open {
            return None;
        }
        self.script.lock().unwrap().pop_front()
    }

    fn health(&self) -> Health {
        Health::Ok
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn update_viewport(&mut self, _viewport: Viewport) {}
}

fn frame(t_vendor_ms: f64, norm: Vec2, gaze_conf: f32, session_uid: i64) -> TrackedFrame {
    let viewport = Viewport::new(1920, 1080);
    TrackedFrame {
        gaze: GazeSample::new(norm, viewport.to_pixels(norm), gaze_conf, t_vendor_ms),
        head: HeadPose {
            pos_cm: Vec3::new(0.0, 0.0, 60.0),
            rot_deg: Vec3::ZERO,
            confidence: 1.0,
            session_uid,
            t_vendor_ms,
        },
        frame_id: 0,
        t_vendor_ms,
        t_local_s: 0.0,
        dt_s: 0.0,
    }
}

struct Rig {
    core: PipelineCore,
    clock: Arc<ManualClock>,
    script: Script,
}

fn rig(config: PipelineConfig) -> Rig {
    let clock = Arc::new(ManualClock::new());
    let (source, script) = ScriptedSource::new();
    let core = PipelineCore::new(
        config,
        Box::new(source),
        Box::new(NoHooks),
        clock.clone() as Arc<dyn beam_types::Clock>,
    )
    .unwrap();
    let mut rig = Rig {
        core,
        clock,
        script,
    };
    assert!(rig.core.start());
    rig
}

impl Rig {
    fn push(&self, frame: TrackedFrame) {
        self.script.lock().unwrap().push_back(frame);
    }

    /// One tick followed by one poll period of clock advance.
    fn tick(&mut self) {
        self.core.tick();
        self.clock.advance(1.0 / 120.0);
    }
}

#[test]
fn happy_path_start_up() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();
    for i in 0..5 {
        rig.push(frame(
            1000.0 + f64::from(i) * 8.0,
            Vec2::new(0.5, 0.5),
            1.0,
            1,
        ));
        rig.tick();
    }

    assert!(reader.utilization() >= 5.0 / 64.0);
    assert_eq!(rig.core.health(), Health::Ok);
    let fps = rig.core.tracking_fps();
    assert!((108.0..=132.0).contains(&fps), "fps = {fps}");
}

#[test]
fn frame_ids_increase_strictly() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();
    let mut last_id = 0;
    for i in 0..10 {
        rig.push(frame(1000.0 + f64::from(i), Vec2::new(0.5, 0.5), 1.0, 1));
        rig.tick();
        let id = reader.latest().unwrap().frame_id;
        assert!(id > last_id);
        last_id = id;
    }
}

#[test]
fn quality_gate_invalidates_low_confidence_gaze() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();

    rig.push(frame(1000.0, Vec2::new(0.5, 0.5), 0.3, 1));
    rig.tick();
    assert!(!reader.latest().unwrap().gaze.valid);

    rig.push(frame(1008.0, Vec2::new(0.5, 0.5), 0.8, 1));
    rig.tick();
    assert!(reader.latest().unwrap().gaze.valid);
}

#[test]
fn outlier_rejection_invalidates_large_jumps() {
    let config = PipelineConfig {
        enable_outlier_detection: true,
        outlier_threshold: 1.0,
        enable_smoothing: false,
        ..PipelineConfig::default()
    };
    let mut rig = rig(config);
    let reader = rig.core.reader();
    let viewport = Viewport::new(1920, 1080);

    rig.push(frame(
        1000.0,
        viewport.to_normalized(Vec2::new(500.0, 500.0)),
        1.0,
        1,
    ));
    rig.tick();
    assert!(reader.latest().unwrap().gaze.valid);

    // 200 px step exceeds the 100 px budget.
    rig.push(frame(
        1008.0,
        viewport.to_normalized(Vec2::new(700.0, 500.0)),
        1.0,
        1,
    ));
    rig.tick();
    assert!(!reader.latest().unwrap().gaze.valid);
    assert_eq!(rig.core.diagnostics().outliers_rejected, 1);

    // 50 px step from the last accepted position is fine.
    rig.push(frame(
        1016.0,
        viewport.to_normalized(Vec2::new(550.0, 500.0)),
        1.0,
        1,
    ));
    rig.tick();
    assert!(reader.latest().unwrap().gaze.valid);
}

#[test]
fn frames_with_no_usable_signal_are_not_published() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();

    let mut empty = frame(1000.0, Vec2::new(0.5, 0.5), 0.3, 1);
    empty.head.confidence = 0.0;
    rig.push(empty);
    rig.tick();
    assert!(reader.latest().is_none());
    assert_eq!(rig.core.diagnostics().misses, 1);

    // A head-only frame still publishes, with the gaze left invalid.
    let mut head_only = frame(1008.0, Vec2::new(0.5, 0.5), 0.3, 1);
    head_only.head.confidence = 1.0;
    rig.push(head_only);
    rig.tick();
    let published = reader.latest().unwrap();
    assert!(!published.gaze.valid);
    assert_eq!(published.head.confidence, 1.0);
    // The dropped frame did not consume a frame id.
    assert_eq!(published.frame_id, 1);
}

#[test]
fn gated_head_pose_stays_zeroed_through_smoothing() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();

    let mut a = frame(1000.0, Vec2::new(0.5, 0.5), 1.0, 1);
    a.head.pos_cm = Vec3::new(5.0, 5.0, 60.0);
    rig.push(a);
    rig.tick();
    assert_eq!(reader.latest().unwrap().head.pos_cm, Vec3::new(5.0, 5.0, 60.0));

    // Head confidence drops below the 0.3 gate; the published pose must be
    // the zeroed one, not the filter's held value.
    let mut b = frame(1008.0, Vec2::new(0.5, 0.5), 1.0, 1);
    b.head.pos_cm = Vec3::new(5.0, 5.0, 60.0);
    b.head.confidence = 0.2;
    rig.push(b);
    rig.tick();

    let published = reader.latest().unwrap();
    assert_eq!(published.head.pos_cm, Vec3::ZERO);
    assert_eq!(published.head.rot_deg, Vec3::ZERO);
    assert_eq!(published.head.confidence, 0.2);
}

#[test]
fn session_change_resets_head_smoothing() {
    let mut rig = rig(PipelineConfig::default());
    let reader = rig.core.reader();

    let mut a = frame(1000.0, Vec2::new(0.5, 0.5), 1.0, 7);
    a.head.rot_deg = Vec3::ZERO;
    rig.push(a);
    rig.tick();

    let mut b = frame(1008.0, Vec2::new(0.5, 0.5), 1.0, 8);
    b.head.rot_deg = Vec3::new(30.0, 0.0, 0.0);
    rig.push(b);
    rig.tick();

    // First post-discontinuity sample passes through unsmoothed.
    let published = reader.latest().unwrap();
    assert_eq!(published.head.rot_deg, Vec3::new(30.0, 0.0, 0.0));
    assert_eq!(published.head.session_uid, 8);
    assert_eq!(rig.core.diagnostics().filter_resets, 1);
}

#[test]
fn recording_round_trip_replays_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.beamrec");

    let config = PipelineConfig {
        enable_smoothing: false,
        ..PipelineConfig::default()
    };
    let mut rig = rig(config);
    assert!(rig.core.start_recording(&path));
    assert!(rig.core.is_recording());

    let gazes = [
        Vec2::new(0.1, 0.1),
        Vec2::new(0.2, 0.2),
        Vec2::new(0.3, 0.3),
    ];
    for (i, norm) in gazes.iter().enumerate() {
        rig.push(frame(1000.0 + i as f64 * 8.0, *norm, 1.0, 1));
        rig.tick();
    }
    rig.core.stop_recording();
    assert!(!rig.core.is_recording());

    // Replay through a second core and confirm order and content.
    let clock = Arc::new(ManualClock::new());
    let source = RecordedSource::new(&path, clock.clone() as Arc<dyn beam_types::Clock>);
    let config = PipelineConfig {
        enable_smoothing: false,
        ..PipelineConfig::default()
    };
    let mut replay = PipelineCore::new(
        config,
        Box::new(source),
        Box::new(NoHooks),
        clock.clone() as Arc<dyn beam_types::Clock>,
    )
    .unwrap();
    assert!(replay.start());
    let reader = replay.reader();

    replay.tick();
    assert!((reader.latest().unwrap().gaze.screen_norm - gazes[0]).length() < 1e-6);

    clock.advance(0.008);
    replay.tick();
    assert!((reader.latest().unwrap().gaze.screen_norm - gazes[1]).length() < 1e-6);

    // At wall-time 12 ms the nearest frame to vendor 1008 is the second.
    clock.advance(0.004);
    let hit = reader.frame_at(1008.0, 2.0).unwrap();
    assert!((hit.gaze.screen_norm - gazes[1]).length() < 1e-6);

    clock.advance(0.004);
    replay.tick();
    assert!((reader.latest().unwrap().gaze.screen_norm - gazes[2]).length() < 1e-6);
}

#[test]
fn watchdog_recovers_a_stalled_source() {
    let mut rig = rig(PipelineConfig::default());

    rig.push(frame(1000.0, Vec2::new(0.5, 0.5), 1.0, 1));
    rig.tick();
    assert_eq!(rig.core.health(), Health::Ok);

    // One second of misses at 120 Hz marks the source stale.
    for _ in 0..120 {
        rig.tick();
    }
    assert_eq!(rig.core.health(), Health::NoData);
    assert_eq!(rig.core.watchdog().consecutive_failures(), 1);

    rig.tick();
    assert_eq!(rig.core.health(), Health::Recovering);

    // Refill the source; the next tick recovers within one poll step.
    rig.push(frame(3000.0, Vec2::new(0.5, 0.5), 1.0, 1));
    rig.tick();
    assert_eq!(rig.core.health(), Health::Ok);
    assert_eq!(rig.core.watchdog().consecutive_failures(), 0);
}

#[test]
fn analytics_reports_a_single_fixation() {
    let config = PipelineConfig {
        enable_smoothing: false,
        ..PipelineConfig::default()
    };
    let mut rig = rig(config);

    // Twelve samples jittering inside 0.02 of screen center, 50 ms apart.
    for i in 0..12 {
        let jitter = Vec2::new(
            if i % 2 == 0 { 0.01 } else { 0.0 },
            if i % 3 == 0 { -0.01 } else { 0.0 },
        );
        rig.push(frame(
            1000.0 + f64::from(i) * 50.0,
            Vec2::new(0.5, 0.5) + jitter,
            1.0,
            1,
        ));
        rig.core.tick();
        rig.clock.advance(0.05);
    }
    // Saccade away.
    rig.push(frame(1600.0, Vec2::new(0.9, 0.9), 1.0, 1));
    rig.core.tick();

    let snapshot = rig.core.analytics_snapshot();
    assert_eq!(snapshot.fixation_count, 1);
    assert!((snapshot.avg_fixation_duration_s - 0.55).abs() < 0.01);
    assert!((snapshot.fixation_centroids[0] - Vec2::new(0.5, 0.5)).length() < 0.01);
    assert!(snapshot.saccade_velocity > 0.0);
    assert!(snapshot.scan_path_length > 0.5);
}
