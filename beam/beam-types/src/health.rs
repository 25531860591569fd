//! Tracker health state and source kind.

use serde::{Deserialize, Serialize};

/// Health of the tracking stack.
///
/// Variants are declared in display-severity order so the derived `Ord`
/// matches the semantic ordering:
/// `Ok < Warning < NoData < Recovering < AppNotRunning < DllMissing < Error`.
///
/// # Example
///
/// ```
/// use beam_types::Health;
///
/// assert!(Health::Ok < Health::NoData);
/// assert!(Health::Recovering < Health::DllMissing);
/// assert_eq!(Health::from_u8(Health::Error.as_u8()), Health::Error);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Health {
    /// Receiving data normally.
    #[default]
    Ok = 0,
    /// Degraded but usable (e.g. low confidence streak).
    Warning = 1,
    /// Tracker app is running but no samples are arriving.
    NoData = 2,
    /// Watchdog is retrying source initialization with backoff.
    Recovering = 3,
    /// Tracker application is not running.
    AppNotRunning = 4,
    /// Vendor library could not be loaded.
    DllMissing = 5,
    /// Unrecoverable error.
    Error = 6,
}

impl Health {
    /// Returns the health as its `u8` discriminant (for atomic storage).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Reconstructs a health value from its discriminant.
    ///
    /// Unknown values map to [`Health::Error`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Warning,
            2 => Self::NoData,
            3 => Self::Recovering,
            4 => Self::AppNotRunning,
            5 => Self::DllMissing,
            _ => Self::Error,
        }
    }

    /// Returns true if samples can be expected in this state.
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::Ok | Self::Warning)
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ok => "Ok",
            Self::Warning => "Warning",
            Self::NoData => "NoData",
            Self::Recovering => "Recovering",
            Self::AppNotRunning => "AppNotRunning",
            Self::DllMissing => "DllMissing",
            Self::Error => "Error",
        };
        write!(f, "{name}")
    }
}

/// Kind of sample producer feeding the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceKind {
    /// Live vendor tracker.
    #[default]
    Live,
    /// Deterministic playback from a `.beamrec` file.
    Recorded,
    /// Deterministic generated signal (CI and performance tests).
    Synthetic,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Live => "Live",
            Self::Recorded => "Recorded",
            Self::Synthetic => "Synthetic",
        };
        write!(f, "{name}")
    }
}
