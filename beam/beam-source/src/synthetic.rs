//! Deterministic synthetic tracker for development and soak testing.
//!
//! [`SyntheticSource`] emits a smooth Lissajous gaze sweep and a slow
//! sinusoidal head wobble, paced against the clock at a configurable
//! rate. Output is a pure function of clock time, so runs reproduce
//! exactly under a manual clock.

use std::f64::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::debug;

use beam_types::{Clock, GazeSample, HeadPose, Health, SourceKind, TrackedFrame, Viewport};

use crate::source::SampleSource;

/// Synthetic signal parameters.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    /// Emission rate in Hz.
    pub rate_hz: f64,
    /// Normalized gaze sweep amplitude around screen center.
    pub gaze_amplitude: f32,
    /// Head rotation amplitude in degrees per axis.
    pub head_amplitude_deg: f32,
    /// Head motion period in seconds.
    pub head_period_s: f64,
    /// Reported confidence for every sample.
    pub confidence: f32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rate_hz: 30.0,
            gaze_amplitude: 0.4,
            head_amplitude_deg: 15.0,
            head_period_s: 8.0,
            confidence: 1.0,
        }
    }
}

/// Clock-driven synthetic sample source.
pub struct SyntheticSource {
    config: SyntheticConfig,
    clock: Arc<dyn Clock>,
    viewport: Viewport,
    running: bool,
    /// Clock reading of the last emitted sample, or `None` before the first.
    last_emit_s: Option<f64>,
}

impl SyntheticSource {
    /// Creates a synthetic source with the given parameters.
    pub fn new(config: SyntheticConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            viewport: Viewport::default(),
            running: false,
            last_emit_s: None,
        }
    }

    /// Sample value at an absolute clock time, independent of pacing.
    #[allow(clippy::cast_possible_truncation)]
    fn sample_at(&self, t_s: f64) -> TrackedFrame {
        let amp = self.config.gaze_amplitude;
        // 3:2 Lissajous with a quarter-phase offset traces a closed,
        // non-repeating-looking sweep over the whole viewport.
        let x = 0.5 + amp * ((3.0 * t_s + PI / 2.0).sin() as f32);
        let y = 0.5 + amp * ((2.0 * t_s).sin() as f32);
        let screen_norm = Vec2::new(x, y);
        let screen_px = self.viewport.to_pixels(screen_norm);

        let head_phase = 2.0 * PI * t_s / self.config.head_period_s;
        let head_amp = self.config.head_amplitude_deg;
        let rot_deg = Vec3::new(
            head_amp * (head_phase.sin() as f32),
            head_amp * ((head_phase * 0.7).sin() as f32),
            head_amp * 0.3 * ((head_phase * 1.3).sin() as f32),
        );
        let pos_cm = Vec3::new(
            3.0 * (head_phase.cos() as f32),
            1.5 * ((head_phase * 0.5).sin() as f32),
            60.0,
        );

        let t_vendor_ms = t_s * 1000.0;
        TrackedFrame {
            gaze: GazeSample::new(screen_norm, screen_px, self.config.confidence, t_vendor_ms),
            head: HeadPose {
                pos_cm,
                rot_deg,
                confidence: self.config.confidence,
                session_uid: 1,
                t_vendor_ms,
            },
            frame_id: 0,
            t_vendor_ms,
            t_local_s: t_s,
            dt_s: 0.0,
        }
    }
}

impl SampleSource for SyntheticSource {
    fn init(&mut self, _app_name: &str, viewport: Viewport) -> bool {
        if viewport.is_valid() {
            self.viewport = viewport;
        }
        self.running = true;
        self.last_emit_s = None;
        debug!(rate_hz = self.config.rate_hz, "synthetic source started");
        true
    }

    fn shutdown(&mut self) {
        self.running = false;
        self.last_emit_s = None;
    }

    fn is_valid(&self) -> bool {
        self.running
    }

    fn fetch_current(&mut self) -> Option<TrackedFrame> {
        if !self.running {
            return None;
        }
        let now = self.clock.now_seconds();
        let period = 1.0 / self.config.rate_hz.max(1.0);
        if let Some(last) = self.last_emit_s {
            if now - last < period {
                return None;
            }
        }
        self.last_emit_s = Some(now);
        Some(self.sample_at(now))
    }

    fn health(&self) -> Health {
        if self.running {
            Health::Ok
        } else {
            Health::AppNotRunning
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn update_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.viewport = viewport;
        }
    }
}
