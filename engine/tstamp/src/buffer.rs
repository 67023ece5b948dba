use std::collections::VecDeque;

use crate::{ClockModel, TimeUs, TimestampedEvent};

/// A buffered event paired with its (known-valid) trigger time.
#[derive(Debug, Clone)]
pub struct Buffered {
    pub time: TimeUs,
    pub event: TimestampedEvent,
}

/// Ordered holding area for events of one source awaiting a partner.
///
/// Entries are kept in ascending trigger-time order. Arrival is already
/// time-ordered per source, so inserts are normally tail appends; a short
/// back-to-front scan handles the rare straggler.
pub struct SourceBuffer {
    entries: VecDeque<Buffered>,
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self { entries: VecDeque::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trigger time of the oldest buffered entry.
    #[inline]
    pub fn front_time(&self) -> Option<TimeUs> {
        self.entries.front().map(|b| b.time)
    }

    /// Insert preserving ascending time order.
    pub fn insert(&mut self, time: TimeUs, event: TimestampedEvent) {
        debug_assert!(
            !self.entries.iter().any(|b| b.event.serial == event.serial),
            "duplicate serial in source buffer"
        );
        let mut idx = self.entries.len();
        while idx > 0 && self.entries[idx - 1].time > time {
            idx -= 1;
        }
        self.entries.insert(idx, Buffered { time, event });
    }

    /// Index of the first entry, in ascending time order, coincident with
    /// the probe time: `|time_diff| < window`, strictly. FIFO first-match.
    pub fn scan_match(&self, probe_time: TimeUs, window: f64, clock: &ClockModel) -> Option<usize> {
        self.entries.iter().position(|b| clock.time_diff(probe_time, b.time).abs() < window)
    }

    /// Remove and return the entry at `idx`.
    pub fn take(&mut self, idx: usize) -> Option<Buffered> {
        self.entries.remove(idx)
    }

    pub fn pop_front(&mut self) -> Option<Buffered> {
        self.entries.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Source, TimestampedEvent};
    use std::sync::Arc;

    fn clock() -> ClockModel {
        ClockModel { counter_bits: 32, ticks_per_us: 1.0 }
    }

    fn ev(serial: u32, raw: u64) -> (TimeUs, TimestampedEvent) {
        let e = TimestampedEvent::from_raw(Source::Head, serial, raw, Arc::from(&[][..]), &clock());
        let t = e.trigger_time_us.expect("test event must have a valid time");
        (t, e)
    }

    fn serials(buf: &SourceBuffer) -> Vec<u32> {
        buf.entries.iter().map(|b| b.event.serial).collect()
    }

    #[test]
    fn in_order_arrival_appends() {
        let mut buf = SourceBuffer::new();
        for (serial, raw) in [(1, 100), (2, 200), (3, 300)] {
            let (t, e) = ev(serial, raw);
            buf.insert(t, e);
        }
        assert_eq!(serials(&buf), vec![1, 2, 3]);
    }

    #[test]
    fn straggler_is_placed_by_time() {
        let mut buf = SourceBuffer::new();
        for (serial, raw) in [(1, 100), (2, 300)] {
            let (t, e) = ev(serial, raw);
            buf.insert(t, e);
        }
        let (t, e) = ev(3, 200);
        buf.insert(t, e);
        assert_eq!(serials(&buf), vec![1, 3, 2]);
    }

    #[test]
    fn scan_match_is_fifo_first_match() {
        let mut buf = SourceBuffer::new();
        // both entries compatible with a probe at 102 under a wide window
        for (serial, raw) in [(1, 100), (2, 104)] {
            let (t, e) = ev(serial, raw);
            buf.insert(t, e);
        }
        let idx = buf.scan_match(102.0, 10.0, &clock()).expect("match");
        assert_eq!(idx, 0, "oldest compatible entry wins");
    }

    #[test]
    fn scan_match_window_boundary_is_exclusive() {
        let mut buf = SourceBuffer::new();
        let (t, e) = ev(1, 100);
        buf.insert(t, e);
        // |diff| == window exactly: not coincident
        assert!(buf.scan_match(100.1, 0.1, &clock()).is_none());
        assert!(buf.scan_match(100.05, 0.1, &clock()).is_some());
    }

    #[test]
    fn take_and_pop_front() {
        let mut buf = SourceBuffer::new();
        for (serial, raw) in [(1, 100), (2, 200), (3, 300)] {
            let (t, e) = ev(serial, raw);
            buf.insert(t, e);
        }
        let mid = buf.take(1).expect("take");
        assert_eq!(mid.event.serial, 2);
        let front = buf.pop_front().expect("pop");
        assert_eq!(front.event.serial, 1);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.front_time(), Some(300.0));
    }
}
