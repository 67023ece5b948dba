use crate::{Serial, Source, TimeUs, TimestampedEvent};

/// Why an event was emitted without a partner.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SinglesReason {
    /// Aged out of the buffer without finding a partner.
    Unmatched = 0,
    /// Forcibly evicted when the buffer exceeded its depth bound.
    Overflow = 1,
    /// Raw clock could not be corrected; never entered matching.
    InvalidTimestamp = 2,
    /// Emitted during an end-of-run drain.
    Drained = 3,
    /// Emitted by the drain's final pass after the wall-clock budget expired.
    DrainForced = 4,
}

/// Outcome of consuming one or two events.
///
/// Every pushed event ends up in exactly one `MatchResult`; results are
/// transient values handed to the consumer by move, never references into
/// buffer internals.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// Paired head + tail within the window. `xtrig` is the signed
    /// tail - head trigger-time difference in microseconds, including
    /// rollover correction.
    Coincidence { head: TimestampedEvent, tail: TimestampedEvent, xtrig: TimeUs },
    /// Standalone observation.
    Singles { event: TimestampedEvent, reason: SinglesReason },
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ResultKind {
    Coincidence = 0,
    Singles = 1,
}

impl MatchResult {
    #[inline]
    pub fn kind(&self) -> ResultKind {
        match self {
            MatchResult::Coincidence { .. } => ResultKind::Coincidence,
            MatchResult::Singles { .. } => ResultKind::Singles,
        }
    }

    /// Number of source events consumed into this result.
    #[inline]
    pub fn event_count(&self) -> usize {
        match self {
            MatchResult::Coincidence { .. } => 2,
            MatchResult::Singles { .. } => 1,
        }
    }

    /// Serials consumed, as (source, serial) pairs.
    pub fn serials(&self) -> Vec<(Source, Serial)> {
        match self {
            MatchResult::Coincidence { head, tail, .. } => {
                vec![(head.source, head.serial), (tail.source, tail.serial)]
            }
            MatchResult::Singles { event, .. } => vec![(event.source, event.serial)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClockModel;
    use std::sync::Arc;

    fn ev(source: Source, serial: Serial, raw: u64) -> TimestampedEvent {
        let clock = ClockModel { counter_bits: 32, ticks_per_us: 1.0 };
        TimestampedEvent::from_raw(source, serial, raw, Arc::from(&[][..]), &clock)
    }

    #[test]
    fn result_accessors() {
        let coinc = MatchResult::Coincidence {
            head: ev(Source::Head, 1, 100),
            tail: ev(Source::Tail, 2, 105),
            xtrig: 5.0,
        };
        assert_eq!(coinc.kind(), ResultKind::Coincidence);
        assert_eq!(coinc.event_count(), 2);
        assert_eq!(coinc.serials(), vec![(Source::Head, 1), (Source::Tail, 2)]);

        let single =
            MatchResult::Singles { event: ev(Source::Tail, 3, 200), reason: SinglesReason::Unmatched };
        assert_eq!(single.kind(), ResultKind::Singles);
        assert_eq!(single.event_count(), 1);
        assert_eq!(single.serials(), vec![(Source::Tail, 3)]);
    }
}
