use std::collections::VecDeque;

use crate::{Serial, Source, TimeUs};

/// Bookkeeping for an event already resolved by the correlator, kept so a
/// consumer re-examining it by serial number can skip recomputation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    /// True when the event went out as one side of a coincidence.
    pub matched: bool,
    /// Signed tail - head trigger-time difference, when matched.
    pub xtrig: Option<TimeUs>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    key: u64, // 0 => EMPTY, 1 => TOMBSTONE
    val: Resolved,
}

const EMPTY: u64 = 0;
const TOMBSTONE: u64 = 1;

const VACANT: Resolved = Resolved { matched: false, xtrig: None };

// SplitMix64: fast, reproducible 64-bit hash
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// Shifting the source tag past the serial keeps every key clear of the
// reserved EMPTY/TOMBSTONE values.
#[inline]
fn cache_key(source: Source, serial: Serial) -> u64 {
    ((source as u64 + 1) << 32) | serial as u64
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecordErr {
    Duplicate,
}

/// Fixed-capacity open-addressed table keyed by (source, serial), with
/// oldest-first eviction of entries that are recorded but never consumed.
///
/// Linear probing with tombstones; the table is sized at twice the entry
/// capacity so probes stay short.
pub struct ReplayCache {
    mask: usize,
    tabs: Box<[Entry]>,
    order: VecDeque<u64>,
    len: usize,
    tombs: usize,
    cap_entries: usize,
}

impl ReplayCache {
    pub fn with_capacity(cap_entries: usize) -> Self {
        assert!(cap_entries > 0, "replay capacity must be > 0");
        let cap_pow2 = (cap_entries * 2).next_power_of_two().max(8);
        Self {
            mask: cap_pow2 - 1,
            tabs: vec![Entry { key: EMPTY, val: VACANT }; cap_pow2].into_boxed_slice(),
            order: VecDeque::new(),
            len: 0,
            tombs: 0,
            cap_entries,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap_entries
    }

    /// Record a resolved event. Duplicate (source, serial) pairs are
    /// rejected; when the cache is at capacity the oldest never-consumed
    /// entry is evicted first.
    pub fn record(
        &mut self,
        source: Source,
        serial: Serial,
        value: Resolved,
    ) -> Result<(), RecordErr> {
        let key = cache_key(source, serial);
        if self.get_key(key).is_some() {
            return Err(RecordErr::Duplicate);
        }
        if self.len == self.cap_entries {
            self.evict_oldest();
        }
        if self.tombs > self.tabs.len() / 4 {
            self.rebuild();
        }

        let mut idx = (splitmix64(key) as usize) & self.mask;
        let mut first_tomb: Option<usize> = None;
        loop {
            let e = &self.tabs[idx];
            if e.key == EMPTY {
                let slot = first_tomb.unwrap_or(idx);
                self.tabs[slot] = Entry { key, val: value };
                if first_tomb.is_some() {
                    self.tombs -= 1;
                }
                self.len += 1;
                self.order.push_back(key);
                self.compact_order();
                return Ok(());
            }
            if e.key == TOMBSTONE && first_tomb.is_none() {
                first_tomb = Some(idx);
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Single-use lookup: removes the entry on hit.
    pub fn take(&mut self, source: Source, serial: Serial) -> Option<Resolved> {
        self.remove_key(cache_key(source, serial))
    }

    fn get_key(&self, key: u64) -> Option<Resolved> {
        let mut idx = (splitmix64(key) as usize) & self.mask;
        loop {
            let e = &self.tabs[idx];
            if e.key == EMPTY {
                return None;
            }
            if e.key == key {
                return Some(e.val);
            }
            idx = (idx + 1) & self.mask;
        }
    }

    fn remove_key(&mut self, key: u64) -> Option<Resolved> {
        let mut idx = (splitmix64(key) as usize) & self.mask;
        loop {
            let e = self.tabs[idx];
            if e.key == EMPTY {
                return None;
            }
            if e.key == key {
                self.tabs[idx] = Entry { key: TOMBSTONE, val: VACANT };
                self.len -= 1;
                self.tombs += 1;
                return Some(e.val);
            }
            idx = (idx + 1) & self.mask;
        }
    }

    fn evict_oldest(&mut self) {
        // the order ring may lead with keys already consumed by take()
        while let Some(key) = self.order.pop_front() {
            if self.remove_key(key).is_some() {
                tracing::debug!(key, "replay cache full, evicting oldest entry");
                break;
            }
        }
    }

    /// Drop stale (already-consumed) keys so the order ring stays bounded.
    fn compact_order(&mut self) {
        if self.order.len() > self.cap_entries * 2 {
            let live: VecDeque<u64> =
                self.order.iter().copied().filter(|&k| self.get_key(k).is_some()).collect();
            self.order = live;
        }
    }

    /// Rebuild the table without tombstones so probe chains always
    /// terminate on an empty slot.
    fn rebuild(&mut self) {
        let live: Vec<Entry> =
            self.tabs.iter().copied().filter(|e| e.key != EMPTY && e.key != TOMBSTONE).collect();
        for e in self.tabs.iter_mut() {
            *e = Entry { key: EMPTY, val: VACANT };
        }
        self.tombs = 0;
        for entry in live {
            let mut idx = (splitmix64(entry.key) as usize) & self.mask;
            while self.tabs[idx].key != EMPTY {
                idx = (idx + 1) & self.mask;
            }
            self.tabs[idx] = entry;
        }
    }
}
