use crate::ClockModel;

/// Engine configuration: coincidence window, buffer bounds, clock geometry.
#[derive(Clone, Copy, Debug)]
pub struct EngineCfg {
    /// Symmetric coincidence tolerance in microseconds (exclusive boundary).
    pub window_us: f64,

    /// Maximum buffered events per source before forced eviction.
    pub max_depth: usize,

    /// Age bound in microseconds; older entries are swept as singles.
    pub max_residency_us: f64,

    /// Entry capacity of the replay cache.
    pub replay_capacity: usize,

    /// Hardware counter geometry.
    pub clock: ClockModel,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CfgError {
    #[error("coincidence window must be non-negative, got {0}")]
    NegativeWindow(f64),

    #[error("coincidence window must be finite")]
    NonFiniteWindow,

    #[error("buffer depth must be > 0")]
    ZeroDepth,

    #[error("residency bound must be non-negative and finite, got {0}")]
    BadResidency(f64),

    #[error("counter width must be 1..=64 bits, got {0}")]
    BadCounterWidth(u8),

    #[error("clock frequency must be positive and finite, got {0}")]
    BadClockFrequency(f64),

    #[error("replay cache capacity must be > 0")]
    ReplayCapacityZero,
}

impl EngineCfg {
    pub fn validate(&self) -> Result<(), CfgError> {
        validate_window(self.window_us)?;
        validate_depth(self.max_depth)?;
        validate_residency(self.max_residency_us)?;
        if self.clock.counter_bits == 0 || self.clock.counter_bits > 64 {
            return Err(CfgError::BadCounterWidth(self.clock.counter_bits));
        }
        if !(self.clock.ticks_per_us.is_finite() && self.clock.ticks_per_us > 0.0) {
            return Err(CfgError::BadClockFrequency(self.clock.ticks_per_us));
        }
        if self.replay_capacity == 0 {
            return Err(CfgError::ReplayCapacityZero);
        }
        Ok(())
    }
}

pub(crate) fn validate_window(window_us: f64) -> Result<(), CfgError> {
    if !window_us.is_finite() {
        return Err(CfgError::NonFiniteWindow);
    }
    if window_us < 0.0 {
        return Err(CfgError::NegativeWindow(window_us));
    }
    Ok(())
}

pub(crate) fn validate_depth(max_depth: usize) -> Result<(), CfgError> {
    if max_depth == 0 {
        return Err(CfgError::ZeroDepth);
    }
    Ok(())
}

pub(crate) fn validate_residency(max_residency_us: f64) -> Result<(), CfgError> {
    if !(max_residency_us.is_finite() && max_residency_us >= 0.0) {
        return Err(CfgError::BadResidency(max_residency_us));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_cfg() -> EngineCfg {
        EngineCfg {
            window_us: 10.0,
            max_depth: 1000,
            max_residency_us: 10e6,
            replay_capacity: 256,
            clock: ClockModel { counter_bits: 32, ticks_per_us: 20.0 },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_cfg().validate().is_ok());
    }

    #[test]
    fn negative_window_rejected() {
        let cfg = EngineCfg { window_us: -1.0, ..valid_cfg() };
        assert_eq!(cfg.validate(), Err(CfgError::NegativeWindow(-1.0)));
    }

    #[test]
    fn nan_window_rejected() {
        let cfg = EngineCfg { window_us: f64::NAN, ..valid_cfg() };
        assert_eq!(cfg.validate(), Err(CfgError::NonFiniteWindow));
    }

    #[test]
    fn zero_window_allowed() {
        // nothing can be coincident under an exclusive zero window, but it
        // is a legal configuration
        let cfg = EngineCfg { window_us: 0.0, ..valid_cfg() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_depth_rejected() {
        let cfg = EngineCfg { max_depth: 0, ..valid_cfg() };
        assert_eq!(cfg.validate(), Err(CfgError::ZeroDepth));
    }

    #[test]
    fn bad_clock_rejected() {
        let cfg = EngineCfg {
            clock: ClockModel { counter_bits: 0, ticks_per_us: 20.0 },
            ..valid_cfg()
        };
        assert_eq!(cfg.validate(), Err(CfgError::BadCounterWidth(0)));

        let cfg = EngineCfg {
            clock: ClockModel { counter_bits: 32, ticks_per_us: 0.0 },
            ..valid_cfg()
        };
        assert_eq!(cfg.validate(), Err(CfgError::BadClockFrequency(0.0)));
    }
}
