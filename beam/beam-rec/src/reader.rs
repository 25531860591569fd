//! `.beamrec` reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{RecError, RecResult};
use crate::format::{FrameRecord, RecordingHeader, HEADER_SIZE, RECORD_SIZE};

/// Sequential reader for `.beamrec` recordings.
///
/// Opening validates the magic and version; [`read_frame`](Self::read_frame)
/// then yields records in file order up to the header's `frame_count`.
pub struct RecordingReader {
    reader: BufReader<File>,
    header: RecordingHeader,
    frames_read: u32,
}

impl RecordingReader {
    /// Opens a recording, validating its header.
    ///
    /// # Errors
    ///
    /// Returns [`RecError::BadMagic`] or [`RecError::UnsupportedVersion`]
    /// for unrecognized files, [`RecError::UnexpectedEof`] for files too
    /// short to hold a header, and I/O errors otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> RecResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut buf = [0u8; HEADER_SIZE];
        read_exact_at(&mut reader, &mut buf, 0)?;
        let header = RecordingHeader::from_bytes(&buf)?;

        Ok(Self {
            reader,
            header,
            frames_read: 0,
        })
    }

    /// The validated file header.
    #[must_use]
    pub const fn header(&self) -> RecordingHeader {
        self.header
    }

    /// Reads the next frame record, or `None` past the recorded count.
    ///
    /// # Errors
    ///
    /// Returns [`RecError::UnexpectedEof`] when the file is shorter than
    /// its header claims.
    pub fn read_frame(&mut self) -> RecResult<Option<FrameRecord>> {
        if self.frames_read >= self.header.frame_count {
            return Ok(None);
        }
        let position = HEADER_SIZE as u64 + u64::from(self.frames_read) * RECORD_SIZE as u64;
        let mut buf = [0u8; RECORD_SIZE];
        read_exact_at(&mut self.reader, &mut buf, position)?;
        self.frames_read += 1;
        Ok(Some(FrameRecord::from_bytes(&buf)))
    }

    /// Reads all remaining frame records.
    ///
    /// # Errors
    ///
    /// Same as [`read_frame`](Self::read_frame).
    pub fn read_all(&mut self) -> RecResult<Vec<FrameRecord>> {
        let remaining = (self.header.frame_count - self.frames_read) as usize;
        let mut records = Vec::with_capacity(remaining);
        while let Some(record) = self.read_frame()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of records consumed so far.
    #[must_use]
    pub const fn frames_read(&self) -> u32 {
        self.frames_read
    }
}

/// Reads exactly `buf.len()` bytes, mapping a short read to `UnexpectedEof`
/// with the file position of the failure.
fn read_exact_at<R: Read>(reader: &mut R, buf: &mut [u8], position: u64) -> RecResult<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            RecError::UnexpectedEof { position }
        } else {
            RecError::Io(e)
        }
    })
}
