use std::sync::Arc;

use crate::{ClockModel, RawClock, Serial, Source, TimeUs};

/// Opaque unparsed event data, owned by the unpacking layer. The engine
/// never inspects it.
pub type Payload = Arc<[u8]>;

/// One detector event, stamped with its rollover-corrected trigger time.
///
/// `trigger_time_us` is `None` when the raw count was impossible for the
/// configured counter width; such events are excluded from matching and
/// emitted as singles immediately.
#[derive(Debug, Clone)]
pub struct TimestampedEvent {
    pub source: Source,
    pub serial: Serial,
    pub raw_clock: RawClock,
    pub trigger_time_us: Option<TimeUs>,
    pub payload: Payload,
}

impl TimestampedEvent {
    /// Stamp a raw front-end tuple with its corrected trigger time.
    pub fn from_raw(
        source: Source,
        serial: Serial,
        raw_clock: RawClock,
        payload: Payload,
        clock: &ClockModel,
    ) -> Self {
        let trigger_time_us = clock.correct(raw_clock);
        if trigger_time_us.is_none() {
            tracing::warn!(
                ?source,
                serial,
                raw_clock,
                counter_bits = clock.counter_bits,
                "raw clock count impossible for configured counter width"
            );
        }
        Self { source, serial, raw_clock, trigger_time_us, payload }
    }

    pub fn is_valid(&self) -> bool {
        self.trigger_time_us.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Payload {
        Arc::from(&[0xde, 0xad][..])
    }

    #[test]
    fn from_raw_stamps_trigger_time() {
        let clock = ClockModel { counter_bits: 32, ticks_per_us: 20.0 };
        let ev = TimestampedEvent::from_raw(Source::Head, 7, 400, payload(), &clock);
        assert_eq!(ev.trigger_time_us, Some(20.0));
        assert!(ev.is_valid());
        assert_eq!(ev.serial, 7);
    }

    #[test]
    fn from_raw_marks_impossible_count_invalid() {
        let clock = ClockModel { counter_bits: 30, ticks_per_us: 20.0 };
        let ev = TimestampedEvent::from_raw(Source::Tail, 8, 1 << 40, payload(), &clock);
        assert!(!ev.is_valid());
        assert_eq!(ev.raw_clock, 1 << 40);
    }
}
