use chrono::{DateTime, Utc};

use crate::config::{validate_depth, validate_residency, validate_window};
use crate::{
    CfgError, EngineCfg, MatchResult, SinglesReason, Source, SourceBuffer, TimestampedEvent,
};

/// Running totals plus pending depths, snapshotted under the caller's lock.
#[derive(Debug, Clone, Copy)]
pub struct QueueStats {
    pub pending_head: usize,
    pub pending_tail: usize,
    pub matched: u64,
    pub singles: u64,
    pub expired: u64,
    pub overflow: u64,
    pub invalid_timestamp: u64,
    pub drained: u64,
    pub drain_forced: u64,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub matched: u64,
    pub singles: u64,
    pub expired: u64,
    pub overflow: u64,
    pub invalid_timestamp: u64,
    pub drained: u64,
    pub drain_forced: u64,
}

/// The coincidence-matching queue.
///
/// Holds one ordered buffer per source and pairs events across them under a
/// FIFO first-match policy. Every pushed event is consumed into exactly one
/// `MatchResult`: paired into a `Coincidence`, or expired/evicted/drained
/// into a `Singles`. At most one match per arrival is ever produced; the
/// policy deliberately favors determinism over globally optimal assignment.
///
/// The coincidence relation is not transitive near the window boundary
/// (A~B and B~C do not imply A~C), so buffer ordering supports nothing
/// beyond the linear scan-to-first-match used here. The FIFO tie-break is a
/// reproducibility requirement for downstream analyses and must not change.
pub struct Correlator {
    cfg: EngineCfg,
    pub(crate) head: SourceBuffer,
    pub(crate) tail: SourceBuffer,
    newest_time: Option<f64>,
    pub(crate) counters: Counters,
}

impl Correlator {
    pub fn new(cfg: EngineCfg) -> Result<Self, CfgError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            head: SourceBuffer::new(),
            tail: SourceBuffer::new(),
            newest_time: None,
            counters: Counters::default(),
        })
    }

    #[inline]
    pub fn cfg(&self) -> &EngineCfg {
        &self.cfg
    }

    /// True when both events carry valid times within the window (exclusive).
    pub fn is_coincident(&self, a: &TimestampedEvent, b: &TimestampedEvent) -> bool {
        match (a.trigger_time_us, b.trigger_time_us) {
            (Some(ta), Some(tb)) => self.cfg.clock.time_diff(ta, tb).abs() < self.cfg.window_us,
            _ => false,
        }
    }

    /// Ingest one event; returns the results it produced, in emission order:
    /// the triggering event's own result (if any) followed by swept
    /// expirations and overflow evictions.
    pub fn push(&mut self, event: TimestampedEvent) -> Vec<MatchResult> {
        let mut out = Vec::new();

        let Some(t) = event.trigger_time_us else {
            self.counters.invalid_timestamp += 1;
            self.counters.singles += 1;
            tracing::warn!(
                source = ?event.source,
                serial = event.serial,
                raw_clock = event.raw_clock,
                "event without usable trigger time, emitting as singles"
            );
            out.push(MatchResult::Singles { event, reason: SinglesReason::InvalidTimestamp });
            return out;
        };

        self.newest_time = Some(self.newest_time.map_or(t, |n| n.max(t)));

        let clock = self.cfg.clock;
        let window = self.cfg.window_us;
        let source = event.source;

        let partner = {
            let opp = self.buffer_mut(source.opposite());
            match opp.scan_match(t, window, &clock) {
                Some(idx) => opp.take(idx),
                None => None,
            }
        };

        if let Some(partner) = partner {
            let (head, head_t, tail, tail_t) = match source {
                Source::Head => (event, t, partner.event, partner.time),
                Source::Tail => (partner.event, partner.time, event, t),
            };
            let xtrig = clock.time_diff(head_t, tail_t);
            self.counters.matched += 1;
            out.push(MatchResult::Coincidence { head, tail, xtrig });
        } else {
            self.buffer_mut(source).insert(t, event);
            self.sweep_expired(&mut out);
            self.enforce_depth(source, &mut out);
        }

        out
    }

    /// Configure the coincidence window; applies to subsequent pushes only.
    pub fn set_window_us(&mut self, window_us: f64) -> Result<(), CfgError> {
        validate_window(window_us)?;
        self.cfg.window_us = window_us;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> Result<(), CfgError> {
        validate_depth(max_depth)?;
        self.cfg.max_depth = max_depth;
        Ok(())
    }

    pub fn set_max_residency_us(&mut self, max_residency_us: f64) -> Result<(), CfgError> {
        validate_residency(max_residency_us)?;
        self.cfg.max_residency_us = max_residency_us;
        Ok(())
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending_head: self.head.len(),
            pending_tail: self.tail.len(),
            matched: self.counters.matched,
            singles: self.counters.singles,
            expired: self.counters.expired,
            overflow: self.counters.overflow,
            invalid_timestamp: self.counters.invalid_timestamp,
            drained: self.counters.drained,
            drain_forced: self.counters.drain_forced,
            collected_at: Utc::now(),
        }
    }

    #[inline]
    fn buffer_mut(&mut self, source: Source) -> &mut SourceBuffer {
        match source {
            Source::Head => &mut self.head,
            Source::Tail => &mut self.tail,
        }
    }

    /// Pop entries older than the residency bound relative to the newest
    /// known time, oldest first across both buffers.
    fn sweep_expired(&mut self, out: &mut Vec<MatchResult>) {
        let Some(newest) = self.newest_time else { return };
        let horizon = self.cfg.max_residency_us;
        loop {
            let h = self.head.front_time().filter(|t| newest - t > horizon);
            let t = self.tail.front_time().filter(|t| newest - t > horizon);
            let from_head = match (h, t) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(a), Some(b)) => a <= b,
            };
            let popped = if from_head { self.head.pop_front() } else { self.tail.pop_front() };
            if let Some(b) = popped {
                self.counters.expired += 1;
                self.counters.singles += 1;
                out.push(MatchResult::Singles { event: b.event, reason: SinglesReason::Unmatched });
            }
        }
    }

    /// Forcibly evict from the front when a buffer exceeds its depth bound,
    /// regardless of age. Bounds memory under sustained one-sided traffic.
    fn enforce_depth(&mut self, source: Source, out: &mut Vec<MatchResult>) {
        let max_depth = self.cfg.max_depth;
        while self.buffer_mut(source).len() > max_depth {
            let Some(b) = self.buffer_mut(source).pop_front() else { break };
            self.counters.overflow += 1;
            self.counters.singles += 1;
            tracing::warn!(
                ?source,
                serial = b.event.serial,
                max_depth,
                "buffer depth exceeded, evicting oldest as singles"
            );
            out.push(MatchResult::Singles { event: b.event, reason: SinglesReason::Overflow });
        }
    }
}
