//! Binary `.beamrec` session recording format.
//!
//! A `.beamrec` file is a little-endian 40-byte header followed by
//! `frame_count` fixed-size 80-byte frame records. The writer stamps a
//! zero-count header on creation and rewrites it with the final count and
//! end timestamp on finalize, so a crashed recording reads back as empty
//! rather than torn.
//!
//! # Example
//!
//! ```no_run
//! use beam_rec::{RecordingReader, RecordingWriter};
//! use beam_types::TrackedFrame;
//!
//! let mut writer = RecordingWriter::create("session.beamrec", 0).unwrap();
//! writer.write_frame(&TrackedFrame::default()).unwrap();
//! writer.finalize(16).unwrap();
//!
//! let reader = RecordingReader::open("session.beamrec").unwrap();
//! assert_eq!(reader.header().frame_count, 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod format;
mod reader;
mod writer;

pub use error::{RecError, RecResult};
pub use format::{FrameRecord, RecordingHeader, BEAMREC_MAGIC, BEAMREC_VERSION};
pub use reader::RecordingReader;
pub use writer::RecordingWriter;
