use std::time::{Duration, Instant};

use crate::{Correlator, MatchResult, SinglesReason};

/// Wall-clock budget for an end-of-run drain.
///
/// A zero budget means "no additional waiting": the synchronous drain still
/// empties both buffers, since draining never waits for new arrivals; the
/// budget exists only to bound online draining where events might still be
/// racing in.
pub struct DrainController {
    budget: Duration,
    started: Instant,
}

impl DrainController {
    pub fn start(budget_secs: f64) -> Self {
        let budget = if budget_secs.is_finite() && budget_secs > 0.0 {
            Duration::from_secs_f64(budget_secs)
        } else {
            Duration::ZERO
        };
        Self { budget, started: Instant::now() }
    }

    /// True once a non-zero budget has been exhausted.
    #[inline]
    pub fn expired(&self) -> bool {
        !self.budget.is_zero() && self.started.elapsed() >= self.budget
    }
}

impl Correlator {
    /// Drain all residual buffered events as singles, oldest first across
    /// both buffers.
    ///
    /// Total: every event present at invocation is emitted, in time order
    /// while the budget holds, then force-emitted in one final pass with a
    /// warning and the `drain_forced` counter incremented. Idempotent on
    /// empty buffers: returns an empty vec, changes no counters.
    pub fn flush(&mut self, budget_secs: f64) -> Vec<MatchResult> {
        let ctl = DrainController::start(budget_secs);
        let mut out = Vec::new();

        while !ctl.expired() {
            let from_head = match (self.head.front_time(), self.tail.front_time()) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(h), Some(t)) => h <= t,
            };
            let popped = if from_head { self.head.pop_front() } else { self.tail.pop_front() };
            if let Some(b) = popped {
                self.counters.drained += 1;
                self.counters.singles += 1;
                out.push(MatchResult::Singles { event: b.event, reason: SinglesReason::Drained });
            }
        }

        let remaining = self.head.len() + self.tail.len();
        if remaining > 0 {
            tracing::warn!(remaining, "drain budget exhausted, force-emitting remainder");
            while let Some(b) = self.head.pop_front() {
                self.counters.drain_forced += 1;
                self.counters.singles += 1;
                out.push(MatchResult::Singles { event: b.event, reason: SinglesReason::DrainForced });
            }
            while let Some(b) = self.tail.pop_front() {
                self.counters.drain_forced += 1;
                self.counters.singles += 1;
                out.push(MatchResult::Singles { event: b.event, reason: SinglesReason::DrainForced });
            }
        }

        out
    }
}
