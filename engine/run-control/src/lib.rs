//! # run-control
//!
//! Run lifecycle coordination around the timestamp coincidence-matching
//! engine: record dispatch, configuration, shared-state locking, metrics,
//! and the end-of-run drain.
//!
//! A [`RunContext`] is constructed once from a [`RunConfig`] and passed to
//! the ingestion and drain call sites; there is no ambient global state.

pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod record;



pub use config::{ClockSettings, MonitoringConfig, RunConfig};
pub use context::{ResultSink, RunContext};
pub use error::RunControlError;
pub use metrics::{MetricsCollector, RunMetrics};
pub use record::{RawEvent, Record, RecordKind, RunParam, ScalerBlock};

/// Re-export commonly used engine types
pub use tstamp::{
    Correlator, MatchResult, Payload, QueueStats, Resolved, ResultKind, SinglesReason, Source,
    TimestampedEvent,
};

/// Current version of run-control
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default coincidence window (microseconds)
pub const DEFAULT_COINC_WINDOW_US: f64 = 10.0;

/// Default matching-queue residency time (10 seconds, in microseconds)
pub const DEFAULT_QUEUE_TIME_US: f64 = 10e6;

/// Default wall-clock budget for the end-of-run drain (seconds)
pub const DEFAULT_FLUSH_BUDGET_SECS: u64 = 30;

/// Default per-source buffer depth bound
pub const DEFAULT_MAX_DEPTH: usize = 16384;

/// Default replay cache entry capacity
pub const DEFAULT_REPLAY_CAPACITY: usize = 1024;

/// Install a global fmt subscriber honoring the configured log level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
