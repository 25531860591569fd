//! `.beamrec` writer.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use beam_types::TrackedFrame;

use crate::error::RecResult;
use crate::format::{FrameRecord, RecordingHeader, BEAMREC_VERSION};

/// Streaming writer for `.beamrec` recordings.
///
/// The header is written immediately with `frame_count = 0` and rewritten
/// on [`finalize`](Self::finalize) with the final count and end timestamp.
/// A writer dropped without finalizing leaves a structurally valid file
/// that reads back as an empty recording.
pub struct RecordingWriter {
    writer: BufWriter<File>,
    header: RecordingHeader,
}

impl RecordingWriter {
    /// Creates a recording file and writes the provisional header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn create<P: AsRef<Path>>(path: P, start_ts_ms: u64) -> RecResult<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let header = RecordingHeader {
            version: BEAMREC_VERSION,
            frame_count: 0,
            start_ts_ms,
            end_ts_ms: 0,
        };
        writer.write_all(&header.to_bytes())?;
        Ok(Self { writer, header })
    }

    /// Appends one frame record.
    ///
    /// # Errors
    ///
    /// Returns an error on write failure; the caller should treat the
    /// recording as terminated.
    pub fn write_frame(&mut self, frame: &TrackedFrame) -> RecResult<()> {
        self.writer
            .write_all(&FrameRecord::from_frame(frame).to_bytes())?;
        self.header.frame_count += 1;
        Ok(())
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    /// Seeks back and rewrites the header with the final frame count and
    /// end timestamp, then flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite or flush fails.
    pub fn finalize(mut self, end_ts_ms: u64) -> RecResult<()> {
        self.header.end_ts_ms = end_ts_ms;
        self.writer.flush()?;
        self.writer.seek(SeekFrom::Start(0))?;
        self.writer.write_all(&self.header.to_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::reader::RecordingReader;

    fn frame(t_vendor_ms: f64, x: f32) -> TrackedFrame {
        let mut f = TrackedFrame::default();
        f.t_vendor_ms = t_vendor_ms;
        f.gaze.t_vendor_ms = t_vendor_ms;
        f.gaze.screen_norm = glam::Vec2::new(x, x);
        f.gaze.confidence = 1.0;
        f.gaze.valid = true;
        f
    }

    #[test]
    fn finalize_rewrites_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.beamrec");

        let mut writer = RecordingWriter::create(&path, 1000).unwrap();
        writer.write_frame(&frame(1000.0, 0.1)).unwrap();
        writer.write_frame(&frame(1008.0, 0.2)).unwrap();
        assert_eq!(writer.frame_count(), 2);
        writer.finalize(1016).unwrap();

        let reader = RecordingReader::open(&path).unwrap();
        assert_eq!(reader.header().frame_count, 2);
        assert_eq!(reader.header().start_ts_ms, 1000);
        assert_eq!(reader.header().end_ts_ms, 1016);
    }

    #[test]
    fn unfinalized_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.beamrec");

        {
            let mut writer = RecordingWriter::create(&path, 0).unwrap();
            writer.write_frame(&frame(0.0, 0.5)).unwrap();
            // dropped without finalize
        }

        let reader = RecordingReader::open(&path).unwrap();
        assert_eq!(reader.header().frame_count, 0);
    }
}
