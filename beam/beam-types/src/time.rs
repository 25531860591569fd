//! Monotonic clock abstraction and time unit helpers.
//!
//! The pipeline stamps every frame with seconds from a single monotonic
//! clock. The [`Clock`] trait lets tests and embedders substitute their own
//! time source; [`MonotonicClock`] is the production implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Converts milliseconds to seconds.
#[must_use]
pub fn millis_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}

/// Converts seconds to milliseconds.
#[must_use]
pub fn secs_to_millis(s: f64) -> f64 {
    s * 1000.0
}

/// A monotonic time source reporting seconds.
///
/// Implementations must be cheap to call and non-decreasing.
pub trait Clock: Send + Sync {
    /// Current monotonic time in seconds.
    fn now_seconds(&self) -> f64;

    /// Current monotonic time in milliseconds.
    fn now_millis(&self) -> f64 {
        secs_to_millis(self.now_seconds())
    }
}

/// Production clock anchored to an [`Instant`] at construction.
///
/// # Example
///
/// ```
/// use beam_types::{Clock, MonotonicClock};
///
/// let clock = MonotonicClock::new();
/// let a = clock.now_seconds();
/// let b = clock.now_seconds();
/// assert!(b >= a);
/// ```
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Stores microseconds in an atomic so clones share the same time base.
///
/// # Example
///
/// ```
/// use beam_types::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(0.25);
/// assert!((clock.now_seconds() - 0.25).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock at the given time in seconds.
    #[must_use]
    pub fn at(seconds: f64) -> Self {
        let clock = Self::new();
        clock.set(seconds);
        clock
    }

    /// Sets the clock to the given time in seconds.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn set(&self, seconds: f64) {
        self.micros
            .store((seconds.max(0.0) * 1e6) as u64, Ordering::SeqCst);
    }

    /// Advances the clock by the given number of seconds.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn advance(&self, seconds: f64) {
        self.micros
            .fetch_add((seconds.max(0.0) * 1e6) as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[allow(clippy::cast_precision_loss)]
    fn now_seconds(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1e6
    }
}
