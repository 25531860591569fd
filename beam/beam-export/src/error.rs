//! Export error type.

use thiserror::Error;

/// Failures while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying writer failed.
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for export results.
pub type ExportResult<T> = Result<T, ExportError>;
