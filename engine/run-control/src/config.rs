//! Configuration for a run

use crate::{
    DEFAULT_COINC_WINDOW_US, DEFAULT_FLUSH_BUDGET_SECS, DEFAULT_MAX_DEPTH,
    DEFAULT_QUEUE_TIME_US, DEFAULT_REPLAY_CAPACITY,
};
use crate::error::RunControlError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tstamp::{ClockModel, EngineCfg};

/// Configuration for the correlation pipeline of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Symmetric coincidence tolerance in microseconds (exclusive boundary)
    pub coinc_window_us: f64,

    /// Matching-queue residency time in microseconds; events older than
    /// this relative to the newest arrival are emitted as singles
    pub queue_time_us: f64,

    /// Per-source buffer depth bound
    pub max_depth: usize,

    /// Replay cache entry capacity
    pub replay_capacity: usize,

    /// Wall-clock budget for the end-of-run drain, in seconds
    pub flush_budget_secs: u64,

    /// Hardware clock geometry
    pub clock: ClockSettings,

    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

/// Hardware counter geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClockSettings {
    /// Counter width in bits (wraps at 2^bits)
    pub counter_bits: u8,

    /// Counter frequency in ticks per microsecond
    pub ticks_per_us: f64,
}

/// Monitoring and observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable metrics emission
    pub emit_metrics: bool,

    /// Log level for the run
    pub log_level: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            coinc_window_us: DEFAULT_COINC_WINDOW_US,
            queue_time_us: DEFAULT_QUEUE_TIME_US,
            max_depth: DEFAULT_MAX_DEPTH,
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            flush_budget_secs: DEFAULT_FLUSH_BUDGET_SECS,
            clock: ClockSettings::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Default for ClockSettings {
    fn default() -> Self {
        // 20 MHz counter, 32-bit rollover
        Self { counter_bits: 32, ticks_per_us: 20.0 }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { emit_metrics: true, log_level: "info".to_string() }
    }
}

impl RunConfig {
    /// Get the drain budget as Duration
    pub fn flush_budget(&self) -> Duration {
        Duration::from_secs(self.flush_budget_secs)
    }

    /// Lower this configuration into the engine's validated form.
    pub fn engine_cfg(&self) -> EngineCfg {
        EngineCfg {
            window_us: self.coinc_window_us,
            max_depth: self.max_depth,
            max_residency_us: self.queue_time_us,
            replay_capacity: self.replay_capacity,
            clock: ClockModel {
                counter_bits: self.clock.counter_bits,
                ticks_per_us: self.clock.ticks_per_us,
            },
        }
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, RunControlError> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        config.engine_cfg().validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &str) -> Result<(), RunControlError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
