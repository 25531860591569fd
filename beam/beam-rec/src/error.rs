//! Error types for recording I/O.

use thiserror::Error;

/// Result type for recording operations.
pub type RecResult<T> = Result<T, RecError>;

/// Errors that can occur reading or writing `.beamrec` files.
#[derive(Debug, Error)]
pub enum RecError {
    /// File does not start with the `BEAM` magic.
    #[error("bad magic: expected 0x{expected:08X}, got 0x{got:08X}")]
    BadMagic {
        /// Expected magic value.
        expected: u32,
        /// Value found in the file.
        got: u32,
    },

    /// Header carries a version this reader does not understand.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),

    /// File ended inside a header or record.
    #[error("unexpected end of file at byte {position}")]
    UnexpectedEof {
        /// Byte offset where the file ended.
        position: u64,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
