//! Replay of captured `.beamrec` sessions.
//!
//! [`RecordedSource`] loads an entire recording at init and re-releases
//! its frames against the wall clock, preserving the original inter-frame
//! timing. A frame becomes due when the elapsed playback time reaches its
//! offset from the first recorded timestamp.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use beam_rec::{FrameRecord, RecordingReader};
use beam_types::{Clock, Health, SourceKind, TrackedFrame, Viewport};

use crate::error::{SourceError, SourceResult};
use crate::source::SampleSource;

/// Sample source that replays a `.beamrec` file in real time.
pub struct RecordedSource {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    records: Vec<FrameRecord>,
    cursor: usize,
    /// Local clock reading when playback (re)started.
    playback_start_s: f64,
    /// Vendor timestamp of the record playback starts from.
    origin_ms: f64,
    open: bool,
}

impl RecordedSource {
    /// Creates a replay source for a recording path.
    ///
    /// The file is not touched until [`SampleSource::init`].
    pub fn new<P: Into<PathBuf>>(path: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            records: Vec::new(),
            cursor: 0,
            playback_start_s: 0.0,
            origin_ms: 0.0,
            open: false,
        }
    }

    /// Loads the recording, returning the frame count.
    fn load(&mut self) -> SourceResult<usize> {
        let mut reader = RecordingReader::open(&self.path)?;
        self.records = reader.read_all()?;
        Ok(self.records.len())
    }

    /// Number of frames in the loaded recording.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the recording holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true once every frame has been released.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.cursor >= self.records.len()
    }

    /// Jumps playback to the record nearest the given vendor timestamp.
    ///
    /// Pacing resumes from the target frame, so the next fetch releases it
    /// immediately and later frames keep their original spacing.
    pub fn seek(&mut self, t_vendor_ms: f64) -> SourceResult<()> {
        if !self.open {
            return Err(SourceError::NotInitialized);
        }
        let nearest = self
            .records
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.t_vendor_ms as f64 - t_vendor_ms).abs();
                let db = (b.t_vendor_ms as f64 - t_vendor_ms).abs();
                da.total_cmp(&db)
            })
            .map(|(i, _)| i);
        if let Some(index) = nearest {
            self.cursor = index;
            #[allow(clippy::cast_precision_loss)]
            {
                self.origin_ms = self.records[index].t_vendor_ms as f64;
            }
            self.playback_start_s = self.clock.now_seconds();
            debug!(index, t_vendor_ms, "seek");
        }
        Ok(())
    }
}

impl SampleSource for RecordedSource {
    fn init(&mut self, _app_name: &str, _viewport: Viewport) -> bool {
        match self.load() {
            Ok(count) => {
                self.cursor = 0;
                #[allow(clippy::cast_precision_loss)]
                {
                    self.origin_ms = self
                        .records
                        .first()
                        .map_or(0.0, |r| r.t_vendor_ms as f64);
                }
                self.playback_start_s = self.clock.now_seconds();
                self.open = true;
                info!(path = %self.path.display(), frames = count, "replay opened");
                true
            }
            Err(err) => {
                info!(path = %self.path.display(), %err, "replay open failed");
                false
            }
        }
    }

    fn shutdown(&mut self) {
        self.open = false;
        self.records.clear();
        self.cursor = 0;
    }

    fn is_valid(&self) -> bool {
        self.open
    }

    fn fetch_current(&mut self) -> Option<TrackedFrame> {
        if !self.open || self.finished() {
            return None;
        }
        let record = &self.records[self.cursor];
        #[allow(clippy::cast_precision_loss)]
        let due_ms = record.t_vendor_ms as f64 - self.origin_ms;
        let elapsed_ms = (self.clock.now_seconds() - self.playback_start_s) * 1000.0;
        if elapsed_ms < due_ms {
            return None;
        }
        self.cursor += 1;
        let mut frame = record.to_frame();
        frame.t_local_s = self.clock.now_seconds();
        Some(frame)
    }

    fn health(&self) -> Health {
        if !self.open {
            Health::AppNotRunning
        } else if self.finished() {
            Health::NoData
        } else {
            Health::Ok
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Recorded
    }

    fn update_viewport(&mut self, _viewport: Viewport) {
        // Replayed pixel coordinates keep their recorded geometry.
    }
}
