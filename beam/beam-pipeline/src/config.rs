//! Embedder-facing pipeline configuration.

use serde::{Deserialize, Serialize};

use beam_analytics::AnalyticsConfig;
use beam_types::Viewport;

use crate::error::ConfigError;

/// Lower clamp for the producer tick rate.
pub const MIN_POLLING_HZ: f64 = 15.0;
/// Upper clamp for the producer tick rate.
pub const MAX_POLLING_HZ: f64 = 240.0;

/// Which sample source variant the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataSource {
    /// Vendor tracker bridge.
    #[default]
    Live,
    /// `.beamrec` replay.
    Recorded,
    /// Deterministic synthetic signal.
    Synthetic,
}

/// Full pipeline configuration with serde defaults.
///
/// Unknown rates and sizes fail [`validate`](Self::validate); a valid but
/// out-of-range `polling_hz` is clamped by [`effective_hz`](Self::effective_hz)
/// rather than rejected.
///
/// # Example
///
/// ```
/// use beam_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert!(config.validate().is_ok());
/// assert!((config.effective_hz() - 120.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Application name passed to the source at init.
    pub app_name: String,
    /// Producer tick rate in Hz, clamped to 15..=240 at use.
    pub polling_hz: f64,
    /// Gates One-Euro smoothing of the gaze point.
    pub enable_smoothing: bool,
    /// One-Euro minimum cutoff in Hz.
    pub min_cutoff: f32,
    /// One-Euro speed coefficient.
    pub beta: f32,
    /// Opaque projection distance, forwarded to the embedder untouched.
    pub trace_distance: f32,
    /// Starts the polling thread at construction.
    pub auto_start: bool,
    /// Source variant to drive.
    pub data_source: DataSource,
    /// Recording path for the `Recorded` source.
    pub file_path: String,
    /// Gaze samples below this confidence are marked invalid.
    pub min_gaze_confidence: f32,
    /// Head poses below this confidence are zeroed.
    pub min_head_confidence: f32,
    /// Queries report gaze invalid once the newest frame is older than this.
    pub max_gaze_age_seconds: f64,
    /// Enables step-size outlier rejection.
    pub enable_outlier_detection: bool,
    /// Outlier threshold multiplier (×100 px gaze, ×50 cm head).
    pub outlier_threshold: f32,
    /// Slows smoothing response when confidence drops below 0.7.
    pub enable_adaptive_smoothing: bool,
    /// `dt` multiplier applied under low confidence.
    pub low_confidence_smoothing_multiplier: f64,
    /// Ring capacity, rounded up to a power of two.
    pub frame_buffer_size: usize,
    /// Initial viewport; the embedder may update it per publish.
    pub viewport: Viewport,
    /// Analytics window tuning.
    pub analytics: AnalyticsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            app_name: "beam".to_owned(),
            polling_hz: 120.0,
            enable_smoothing: true,
            min_cutoff: 1.0,
            beta: 0.2,
            trace_distance: 5000.0,
            auto_start: false,
            data_source: DataSource::default(),
            file_path: String::new(),
            min_gaze_confidence: 0.5,
            min_head_confidence: 0.3,
            max_gaze_age_seconds: 0.5,
            enable_outlier_detection: false,
            outlier_threshold: 2.5,
            enable_adaptive_smoothing: false,
            low_confidence_smoothing_multiplier: 2.0,
            frame_buffer_size: 64,
            viewport: Viewport::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Rejects configurations the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PollingRate`] for a non-finite or non-positive rate,
    /// [`ConfigError::BufferSize`] for a zero ring capacity,
    /// [`ConfigError::Viewport`] for a zero-area viewport, and
    /// [`ConfigError::MissingFilePath`] when the `Recorded` source has no
    /// path to play from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.polling_hz.is_finite() || self.polling_hz <= 0.0 {
            return Err(ConfigError::PollingRate(self.polling_hz));
        }
        if self.frame_buffer_size == 0 {
            return Err(ConfigError::BufferSize);
        }
        if !self.viewport.is_valid() {
            return Err(ConfigError::Viewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if self.data_source == DataSource::Recorded && self.file_path.is_empty() {
            return Err(ConfigError::MissingFilePath);
        }
        Ok(())
    }

    /// Tick rate after clamping to the supported range.
    #[must_use]
    pub fn effective_hz(&self) -> f64 {
        self.polling_hz.clamp(MIN_POLLING_HZ, MAX_POLLING_HZ)
    }

    /// Tick period in seconds at the effective rate.
    #[must_use]
    pub fn period_s(&self) -> f64 {
        1.0 / self.effective_hz()
    }
}
