//! Pipeline error types.

use thiserror::Error;

/// Construction-time configuration failures.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Polling rate is not a positive finite number.
    #[error("polling rate must be positive and finite, got {0}")]
    PollingRate(f64),

    /// Ring capacity of zero.
    #[error("frame buffer size must be non-zero")]
    BufferSize,

    /// Zero-area viewport.
    #[error("viewport dimensions must be non-zero, got {width}x{height}")]
    Viewport {
        /// Offending width.
        width: u32,
        /// Offending height.
        height: u32,
    },

    /// Recorded source selected without a file to play.
    #[error("recorded data source requires a file path")]
    MissingFilePath,
}

/// Failures surfaced by the pipeline itself.
///
/// Runtime source trouble is not an error here; it flows through the
/// health channel and the watchdog instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The polling thread could not be spawned.
    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, PipelineError>;
