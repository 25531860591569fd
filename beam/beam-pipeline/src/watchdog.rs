//! Source recovery backoff.

use tracing::debug;

/// First retry delay in seconds.
const BACKOFF_BASE_S: f64 = 0.25;
/// Retry delay ceiling in seconds.
const BACKOFF_CAP_S: f64 = 8.0;

/// Exponential-backoff retry state for source recovery.
///
/// Each failure doubles the delay before the next re-init attempt,
/// capped at 8 seconds. The first successful fetch after a failure run
/// resets the schedule.
///
/// # Example
///
/// ```
/// use beam_pipeline::Watchdog;
///
/// let mut watchdog = Watchdog::new();
/// watchdog.on_failure(10.0);
/// assert!(!watchdog.should_retry(10.1));
/// assert!(watchdog.should_retry(10.25));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Watchdog {
    consecutive_failures: u32,
    backoff_deadline_s: f64,
}

impl Watchdog {
    /// Creates an idle watchdog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consecutive_failures: 0,
            backoff_deadline_s: 0.0,
        }
    }

    /// Records a failed init or a stale source, scheduling the next retry.
    pub fn on_failure(&mut self, now_s: f64) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let exponent = self.consecutive_failures - 1;
        let delay = (BACKOFF_BASE_S * f64::from(2u32.pow(exponent.min(10)))).min(BACKOFF_CAP_S);
        self.backoff_deadline_s = now_s + delay;
        debug!(
            failures = self.consecutive_failures,
            delay_s = delay,
            "watchdog backoff"
        );
    }

    /// Returns true when a re-init attempt is due.
    #[must_use]
    pub fn should_retry(&self, now_s: f64) -> bool {
        self.consecutive_failures > 0 && now_s >= self.backoff_deadline_s
    }

    /// Clears the failure run after a successful fetch.
    pub fn on_recovered(&mut self) {
        self.consecutive_failures = 0;
        self.backoff_deadline_s = 0.0;
    }

    /// Number of failures in the current run.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Deadline of the pending retry, meaningless while idle.
    #[must_use]
    pub const fn backoff_deadline_s(&self) -> f64 {
        self.backoff_deadline_s
    }

    /// Returns true while a failure run is active.
    #[must_use]
    pub const fn is_recovering(&self) -> bool {
        self.consecutive_failures > 0
    }
}
