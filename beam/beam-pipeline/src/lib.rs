//! Sample pipeline: drives a source at a fixed cadence, filters the
//! samples, and publishes them to a lock-free ring for consumers.
//!
//! The split between [`PipelineCore`] and [`Pipeline`] mirrors the
//! producer/consumer boundary. `PipelineCore` is the single-threaded
//! producer state machine whose [`tick`](PipelineCore::tick) performs one
//! full poll step; it is deterministic under a manual clock and is what
//! the integration tests drive. [`Pipeline`] wraps a core in a dedicated
//! thread, paces it at the configured rate, and exposes the thread-safe
//! query surface (latest frame, temporal search, health, performance and
//! analytics snapshots, recording control).

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod engine;
mod error;
mod events;
mod perf;
mod pipeline;
mod watchdog;

pub use config::{DataSource, PipelineConfig, MAX_POLLING_HZ, MIN_POLLING_HZ};
pub use engine::{DiagCounters, Diagnostics, PipelineCore};
pub use error::{ConfigError, PipelineError, Result};
pub use events::{NoHooks, PipelineHooks};
pub use perf::{PerfSnapshot, PerfStats};
pub use pipeline::Pipeline;
pub use watchdog::Watchdog;
