//! Row types and CSV writers.

use std::io::Write;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use beam_analytics::AnalyticsSnapshot;
use beam_pipeline::PerfSnapshot;
use beam_types::TrackedFrame;

use crate::error::ExportResult;

const ANALYTICS_HEADER: &str =
    "Timestamp,AverageFixationDuration,SaccadeVelocity,FixationCount,ScanPathLength";
const PERFORMANCE_HEADER: &str =
    "Timestamp,AverageFrameTime,MinFrameTime,MaxFrameTime,CPUUsage,MemoryUsage,DroppedFrames";
const GAZE_HEADER: &str =
    "Timestamp,GazeX,GazeY,GazeConfidence,HeadPitch,HeadYaw,HeadRoll,HeadConfidence";

/// One analytics sample for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    /// Sample time relative to export start, seconds.
    pub timestamp_s: f64,
    /// Mean fixation duration in the window, seconds.
    pub avg_fixation_duration_s: f64,
    /// Mean saccadic velocity, normalized units per second.
    pub saccade_velocity: f32,
    /// Fixations in the window.
    pub fixation_count: usize,
    /// Gaze travel over the window, normalized units.
    pub scan_path_length: f32,
}

impl AnalyticsRow {
    /// Builds a row from a snapshot taken at `timestamp_s`.
    #[must_use]
    pub fn from_snapshot(timestamp_s: f64, snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            timestamp_s,
            avg_fixation_duration_s: snapshot.avg_fixation_duration_s,
            saccade_velocity: snapshot.saccade_velocity,
            fixation_count: snapshot.fixation_count,
            scan_path_length: snapshot.scan_path_length,
        }
    }
}

/// One performance sample for export.
///
/// CPU and memory usage are supplied by the embedder; the pipeline does
/// not measure them itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    /// Sample time relative to export start, seconds.
    pub timestamp_s: f64,
    /// Mean inter-frame time, seconds.
    pub frame_time_avg_s: f64,
    /// Shortest inter-frame time, seconds.
    pub frame_time_min_s: f64,
    /// Longest inter-frame time, seconds.
    pub frame_time_max_s: f64,
    /// Process CPU usage fraction, embedder-supplied.
    pub cpu_usage: f32,
    /// Process memory usage fraction, embedder-supplied.
    pub memory_usage: f32,
    /// Frames lost to ring overwrite.
    pub dropped_frames: u64,
}

impl PerformanceRow {
    /// Builds a row from a performance snapshot taken at `timestamp_s`.
    #[must_use]
    pub fn from_snapshot(timestamp_s: f64, snapshot: &PerfSnapshot) -> Self {
        Self {
            timestamp_s,
            frame_time_avg_s: snapshot.frame_time_avg_s,
            frame_time_min_s: snapshot.frame_time_min_s,
            frame_time_max_s: snapshot.frame_time_max_s,
            cpu_usage: 0.0,
            memory_usage: 0.0,
            dropped_frames: snapshot.dropped_frames,
        }
    }

    /// Fills in the embedder-measured process usage fractions.
    #[must_use]
    pub const fn with_usage(mut self, cpu: f32, memory: f32) -> Self {
        self.cpu_usage = cpu;
        self.memory_usage = memory;
        self
    }
}

/// One gaze trace sample for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeRow {
    /// Sample time relative to export start, seconds.
    pub timestamp_s: f64,
    /// Normalized gaze position.
    pub gaze_norm: Vec2,
    /// Gaze confidence fraction.
    pub gaze_confidence: f32,
    /// Head rotation in degrees, pitch X, yaw Y, roll Z.
    pub head_rot_deg: Vec3,
    /// Head confidence fraction.
    pub head_confidence: f32,
}

impl GazeRow {
    /// Builds a row from a frame, stamping it relative to `start_s`.
    #[must_use]
    pub fn from_frame(start_s: f64, frame: &TrackedFrame) -> Self {
        Self {
            timestamp_s: frame.t_local_s - start_s,
            gaze_norm: frame.gaze.screen_norm,
            gaze_confidence: frame.gaze.confidence,
            head_rot_deg: frame.head.rot_deg,
            head_confidence: frame.head.confidence,
        }
    }
}

/// Writes the analytics CSV.
///
/// # Errors
///
/// Propagates any failure of the underlying writer.
pub fn write_analytics_csv<W: Write>(out: &mut W, rows: &[AnalyticsRow]) -> ExportResult<()> {
    out.write_all(ANALYTICS_HEADER.as_bytes())?;
    out.write_all(b"\n")?;
    for row in rows {
        writeln!(
            out,
            "{:.6},{:.3},{:.6},{},{:.6}",
            row.timestamp_s,
            row.avg_fixation_duration_s,
            row.saccade_velocity,
            row.fixation_count,
            row.scan_path_length,
        )?;
    }
    debug!(rows = rows.len(), "analytics export written");
    Ok(())
}

/// Writes the performance CSV.
///
/// # Errors
///
/// Propagates any failure of the underlying writer.
pub fn write_performance_csv<W: Write>(out: &mut W, rows: &[PerformanceRow]) -> ExportResult<()> {
    out.write_all(PERFORMANCE_HEADER.as_bytes())?;
    out.write_all(b"\n")?;
    for row in rows {
        writeln!(
            out,
            "{:.6},{:.3},{:.3},{:.3},{:.6},{:.6},{}",
            row.timestamp_s,
            row.frame_time_avg_s,
            row.frame_time_min_s,
            row.frame_time_max_s,
            row.cpu_usage,
            row.memory_usage,
            row.dropped_frames,
        )?;
    }
    debug!(rows = rows.len(), "performance export written");
    Ok(())
}

/// Writes the gaze trace CSV.
///
/// # Errors
///
/// Propagates any failure of the underlying writer.
pub fn write_gaze_csv<W: Write>(out: &mut W, rows: &[GazeRow]) -> ExportResult<()> {
    out.write_all(GAZE_HEADER.as_bytes())?;
    out.write_all(b"\n")?;
    for row in rows {
        writeln!(
            out,
            "{:.6},{:.6},{:.6},{:.6},{:.3},{:.3},{:.3},{:.6}",
            row.timestamp_s,
            row.gaze_norm.x,
            row.gaze_norm.y,
            row.gaze_confidence,
            row.head_rot_deg.x,
            row.head_rot_deg.y,
            row.head_rot_deg.z,
            row.head_confidence,
        )?;
    }
    debug!(rows = rows.len(), "gaze export written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn analytics_csv_layout() {
        let rows = [AnalyticsRow {
            timestamp_s: 1.5,
            avg_fixation_duration_s: 0.25,
            saccade_velocity: 1.75,
            fixation_count: 3,
            scan_path_length: 2.5,
        }];
        let mut buffer = Vec::new();
        write_analytics_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Timestamp,AverageFixationDuration,SaccadeVelocity,FixationCount,ScanPathLength\n\
             1.500000,0.250,1.750000,3,2.500000\n"
        );
    }

    #[test]
    fn performance_csv_layout() {
        let rows = [PerformanceRow {
            timestamp_s: 0.0,
            frame_time_avg_s: 0.00833,
            frame_time_min_s: 0.008,
            frame_time_max_s: 0.012,
            cpu_usage: 0.125,
            memory_usage: 0.5,
            dropped_frames: 7,
        }];
        let mut buffer = Vec::new();
        write_performance_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Timestamp,AverageFrameTime,MinFrameTime,MaxFrameTime,CPUUsage,MemoryUsage,DroppedFrames\n\
             0.000000,0.008,0.008,0.012,0.125000,0.500000,7\n"
        );
    }

    #[test]
    fn gaze_csv_layout() {
        let rows = [GazeRow {
            timestamp_s: 0.008333,
            gaze_norm: Vec2::new(0.25, 0.75),
            gaze_confidence: 1.0,
            head_rot_deg: Vec3::new(10.0, -5.0, 0.5),
            head_confidence: 2.0 / 3.0,
        }];
        let mut buffer = Vec::new();
        write_gaze_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Timestamp,GazeX,GazeY,GazeConfidence,HeadPitch,HeadYaw,HeadRoll,HeadConfidence\n\
             0.008333,0.250000,0.750000,1.000000,10.000,-5.000,0.500,0.666667\n"
        );
    }

    #[test]
    fn rows_build_from_snapshots() {
        let snapshot = AnalyticsSnapshot {
            fixation_count: 2,
            avg_fixation_duration_s: 0.3,
            saccade_velocity: 1.2,
            scan_path_length: 0.9,
            fixation_centroids: vec![Vec2::ZERO, Vec2::ONE],
        };
        let row = AnalyticsRow::from_snapshot(4.0, &snapshot);
        assert_eq!(row.fixation_count, 2);
        assert_eq!(row.timestamp_s, 4.0);

        let perf = PerfSnapshot {
            fps: 120.0,
            frame_time_avg_s: 0.008,
            frame_time_min_s: 0.007,
            frame_time_max_s: 0.01,
            dropped_frames: 1,
        };
        let row = PerformanceRow::from_snapshot(2.0, &perf).with_usage(0.1, 0.2);
        assert_eq!(row.dropped_frames, 1);
        assert_eq!(row.cpu_usage, 0.1);
    }
}
