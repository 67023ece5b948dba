//! Metrics collection for the correlation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tstamp::Source;

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Head trigger events ingested
    pub head_events: u64,

    /// Tail trigger events ingested
    pub tail_events: u64,

    /// Scaler blocks seen
    pub scaler_records: u64,

    /// Run parameter records seen
    pub run_parameters: u64,

    /// Coincidences delivered
    pub coincidences: u64,

    /// Singles delivered (all reasons)
    pub singles: u64,

    /// Replay cache hits on resolve()
    pub replay_hits: u64,

    /// Replay cache misses on resolve()
    pub replay_misses: u64,

    /// Uptime of this context in seconds
    pub uptime_seconds: u64,

    /// Wall-clock time this snapshot was taken
    pub collected_at: DateTime<Utc>,
}

impl RunMetrics {
    /// Serialized form used for metrics emission via the log stream.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Atomic counters behind the pipeline.
pub struct MetricsCollector {
    head_events: AtomicU64,
    tail_events: AtomicU64,
    scaler_records: AtomicU64,
    run_parameters: AtomicU64,
    coincidences: AtomicU64,
    singles: AtomicU64,
    replay_hits: AtomicU64,
    replay_misses: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            head_events: AtomicU64::new(0),
            tail_events: AtomicU64::new(0),
            scaler_records: AtomicU64::new(0),
            run_parameters: AtomicU64::new(0),
            coincidences: AtomicU64::new(0),
            singles: AtomicU64::new(0),
            replay_hits: AtomicU64::new(0),
            replay_misses: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_event(&self, source: Source) {
        match source {
            Source::Head => self.head_events.fetch_add(1, Ordering::Relaxed),
            Source::Tail => self.tail_events.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_scaler(&self) {
        self.scaler_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_parameter(&self) {
        self.run_parameters.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coincidence(&self) {
        self.coincidences.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_singles(&self) {
        self.singles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay(&self, hit: bool) {
        if hit {
            self.replay_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.replay_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics
    pub fn snapshot(&self) -> RunMetrics {
        RunMetrics {
            head_events: self.head_events.load(Ordering::Relaxed),
            tail_events: self.tail_events.load(Ordering::Relaxed),
            scaler_records: self.scaler_records.load(Ordering::Relaxed),
            run_parameters: self.run_parameters.load(Ordering::Relaxed),
            coincidences: self.coincidences.load(Ordering::Relaxed),
            singles: self.singles.load(Ordering::Relaxed),
            replay_hits: self.replay_hits.load(Ordering::Relaxed),
            replay_misses: self.replay_misses.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            collected_at: Utc::now(),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.head_events.store(0, Ordering::Relaxed);
        self.tail_events.store(0, Ordering::Relaxed);
        self.scaler_records.store(0, Ordering::Relaxed);
        self.run_parameters.store(0, Ordering::Relaxed);
        self.coincidences.store(0, Ordering::Relaxed);
        self.singles.store(0, Ordering::Relaxed);
        self.replay_hits.store(0, Ordering::Relaxed);
        self.replay_misses.store(0, Ordering::Relaxed);
    }
}
