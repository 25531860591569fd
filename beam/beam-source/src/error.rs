//! Error types for sample sources.
//!
//! The [`SampleSource`](crate::SampleSource) trait surface itself stays
//! `bool`/`Option` — no error crosses into the polling loop — but source
//! internals use these kinds for logging and diagnostics.

use thiserror::Error;

/// Result type for source internals.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur inside a sample source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A recording could not be opened or read.
    #[error("playback error: {0}")]
    Playback(#[from] beam_rec::RecError),

    /// An operation was called before `init`.
    #[error("source not initialized")]
    NotInitialized,
}
