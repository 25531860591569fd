//! On-disk layout of the `.beamrec` format.
//!
//! Everything is little-endian. The file is a [`RecordingHeader`] followed
//! by `frame_count` fixed-size [`FrameRecord`]s.
//!
//! ```text
//! Header (40 bytes):                FrameRecord (80 bytes):
//!   magic        u32 = 'BEAM'         t_vendor_ms  u64 (millis, truncated)
//!   version      u32 = 1              gaze_norm_x  f32
//!   frame_count  u32                  gaze_norm_y  f32
//!   start_ts     u64                  gaze_px_x    f32
//!   end_ts       u64                  gaze_px_y    f32
//!   reserved     u32[4]               gaze_conf    f32
//!                                     head_pos_*   f32 × 3 (cm)
//!                                     head_pitch/yaw/roll f32 (deg)
//!                                     head_conf    f32
//!                                     reserved     u32[2]
//! ```

use glam::{Vec2, Vec3};

use beam_types::{GazeSample, HeadPose, TrackedFrame};

/// File magic: `'B' 'E' 'A' 'M'` read as a little-endian u32.
pub const BEAMREC_MAGIC: u32 = 0x4245_414D;

/// Current format version.
pub const BEAMREC_VERSION: u32 = 1;

/// Header size on disk, bytes.
pub(crate) const HEADER_SIZE: usize = 40;

/// Record size on disk, bytes.
pub(crate) const RECORD_SIZE: usize = 80;

/// Parsed `.beamrec` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingHeader {
    /// Format version.
    pub version: u32,
    /// Number of frame records in the file.
    pub frame_count: u32,
    /// Recording start, milliseconds.
    pub start_ts_ms: u64,
    /// Recording end, milliseconds; zero until finalized.
    pub end_ts_ms: u64,
}

impl RecordingHeader {
    /// Serializes the header into its 40-byte on-disk form.
    #[must_use]
    pub(crate) fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&BEAMREC_MAGIC.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.frame_count.to_le_bytes());
        buf[12..20].copy_from_slice(&self.start_ts_ms.to_le_bytes());
        buf[20..28].copy_from_slice(&self.end_ts_ms.to_le_bytes());
        // bytes 28..40 reserved, zero
        buf
    }

    /// Parses a header from its on-disk form, validating magic and version.
    pub(crate) fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, crate::RecError> {
        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != BEAMREC_MAGIC {
            return Err(crate::RecError::BadMagic {
                expected: BEAMREC_MAGIC,
                got: magic,
            });
        }
        let version = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if version != BEAMREC_VERSION {
            return Err(crate::RecError::UnsupportedVersion(version));
        }
        Ok(Self {
            version,
            frame_count: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            start_ts_ms: u64::from_le_bytes([
                buf[12], buf[13], buf[14], buf[15], buf[16], buf[17], buf[18], buf[19],
            ]),
            end_ts_ms: u64::from_le_bytes([
                buf[20], buf[21], buf[22], buf[23], buf[24], buf[25], buf[26], buf[27],
            ]),
        })
    }
}

/// One on-disk frame record.
///
/// Floats are stored exactly as sampled; reading back is bit-preserving
/// with no recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameRecord {
    /// Vendor sample time, whole milliseconds.
    pub t_vendor_ms: u64,
    /// Normalized gaze point.
    pub gaze_norm: Vec2,
    /// Gaze point in viewport pixels.
    pub gaze_px: Vec2,
    /// Gaze confidence, `[0, 1]`.
    pub gaze_conf: f32,
    /// Head position, centimeters.
    pub head_pos_cm: Vec3,
    /// Head rotation `(pitch, yaw, roll)`, degrees.
    pub head_rot_deg: Vec3,
    /// Head confidence, `[0, 1]`.
    pub head_conf: f32,
}

fn f32_at(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

impl FrameRecord {
    /// Serializes the record into its 80-byte on-disk form.
    #[must_use]
    pub(crate) fn to_bytes(self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..8].copy_from_slice(&self.t_vendor_ms.to_le_bytes());
        let fields = [
            self.gaze_norm.x,
            self.gaze_norm.y,
            self.gaze_px.x,
            self.gaze_px.y,
            self.gaze_conf,
            self.head_pos_cm.x,
            self.head_pos_cm.y,
            self.head_pos_cm.z,
            self.head_rot_deg.x,
            self.head_rot_deg.y,
            self.head_rot_deg.z,
            self.head_conf,
        ];
        for (i, field) in fields.iter().enumerate() {
            let offset = 8 + i * 4;
            buf[offset..offset + 4].copy_from_slice(&field.to_le_bytes());
        }
        // bytes 56..64 hold head_conf end; 64..80... reserved pair zero
        buf
    }

    /// Parses a record from its on-disk form.
    #[must_use]
    pub(crate) fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        Self {
            t_vendor_ms: u64::from_le_bytes([
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ]),
            gaze_norm: Vec2::new(f32_at(buf, 8), f32_at(buf, 12)),
            gaze_px: Vec2::new(f32_at(buf, 16), f32_at(buf, 20)),
            gaze_conf: f32_at(buf, 24),
            head_pos_cm: Vec3::new(f32_at(buf, 28), f32_at(buf, 32), f32_at(buf, 36)),
            head_rot_deg: Vec3::new(f32_at(buf, 40), f32_at(buf, 44), f32_at(buf, 48)),
            head_conf: f32_at(buf, 52),
        }
    }

    /// Builds a record from a published frame.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_frame(frame: &TrackedFrame) -> Self {
        Self {
            t_vendor_ms: frame.t_vendor_ms.max(0.0) as u64,
            gaze_norm: frame.gaze.screen_norm,
            gaze_px: frame.gaze.screen_px,
            gaze_conf: frame.gaze.confidence,
            head_pos_cm: frame.head.pos_cm,
            head_rot_deg: frame.head.rot_deg,
            head_conf: frame.head.confidence,
        }
    }

    /// Reconstructs a frame from this record.
    ///
    /// Gaze validity is reconstructed from `gaze_conf > 0`; frame id,
    /// local time and session uid are assigned by the replaying source.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_frame(self) -> TrackedFrame {
        let t_vendor_ms = self.t_vendor_ms as f64;
        TrackedFrame {
            gaze: GazeSample {
                valid: self.gaze_conf > 0.0,
                screen_norm: self.gaze_norm,
                screen_px: self.gaze_px,
                confidence: self.gaze_conf,
                t_vendor_ms,
            },
            head: HeadPose {
                pos_cm: self.head_pos_cm,
                rot_deg: self.head_rot_deg,
                confidence: self.head_conf,
                session_uid: 0,
                t_vendor_ms,
            },
            frame_id: 0,
            t_vendor_ms,
            t_local_s: 0.0,
            dt_s: 0.0,
        }
    }
}
