// tstamp - deterministic timestamp coincidence-matching engine

mod buffer;
mod clock;
mod config;
mod correlator;
mod drain;
mod events;
mod messages;
mod replay;
mod types;

pub use buffer::{Buffered, SourceBuffer};
pub use clock::ClockModel;
pub use config::{CfgError, EngineCfg};
pub use correlator::{Correlator, QueueStats};
pub use drain::DrainController;
pub use events::{MatchResult, ResultKind, SinglesReason};
pub use messages::{Payload, TimestampedEvent};
pub use replay::{RecordErr, ReplayCache, Resolved};
pub use types::{RawClock, Serial, Source, TimeUs};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cfg() -> EngineCfg {
        EngineCfg {
            window_us: 0.1,
            max_depth: 4096,
            max_residency_us: 10e6,
            replay_capacity: 256,
            clock: ClockModel { counter_bits: 32, ticks_per_us: 1.0 },
        }
    }

    fn ev(source: Source, serial: u32, raw: u64) -> TimestampedEvent {
        TimestampedEvent::from_raw(source, serial, raw, Arc::from(&[][..]), &cfg().clock)
    }

    #[test]
    fn unmatched_events_come_back_as_singles_on_flush() {
        let mut c = Correlator::new(cfg()).unwrap();
        assert!(c.push(ev(Source::Head, 1, 100)).is_empty());
        assert!(c.push(ev(Source::Tail, 1, 105)).is_empty());

        let out = c.flush(0.0);
        assert_eq!(out.len(), 2);
        let serials: Vec<_> = out.iter().flat_map(|r| r.serials()).collect();
        assert_eq!(serials, vec![(Source::Head, 1), (Source::Tail, 1)]);

        let stats = c.stats();
        assert_eq!(stats.singles, 2);
        assert_eq!(stats.matched, 0);
        assert_eq!(stats.pending_head + stats.pending_tail, 0);
    }

    #[test]
    fn mixed_run_accounts_for_every_event() {
        let mut c = Correlator::new(cfg()).unwrap();
        let mut coinc = 0usize;
        let mut singles = 0usize;
        let mut tally = |results: Vec<MatchResult>| {
            for r in &results {
                match r.kind() {
                    ResultKind::Coincidence => coinc += 1,
                    ResultKind::Singles => singles += 1,
                }
            }
        };

        // two matched pairs, one lone head, one lone tail
        tally(c.push(ev(Source::Head, 1, 1_000_000)));
        tally(c.push(ev(Source::Tail, 1, 1_000_000)));
        tally(c.push(ev(Source::Head, 2, 2_000_000)));
        tally(c.push(ev(Source::Head, 3, 3_000_000)));
        tally(c.push(ev(Source::Tail, 2, 3_000_000)));
        tally(c.push(ev(Source::Tail, 3, 9_000_000)));
        tally(c.flush(0.0));

        assert_eq!(coinc, 2);
        assert_eq!(singles, 2);
        assert_eq!(singles + 2 * coinc, 6);
    }
}
