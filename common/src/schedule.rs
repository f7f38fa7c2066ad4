use std::collections::HashMap;

use crate::types::FeedTime;

/// Ordered, duplicate-free list of configured feed times.
///
/// Insertion order is preserved; deletion is index-addressed to match the
/// web UI's per-item delete links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSchedule {
    times: Vec<FeedTime>,
}

impl FeedSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from loaded config, dropping duplicate entries
    /// while keeping the first occurrence in place.
    pub fn from_times(times: Vec<FeedTime>) -> Self {
        let mut schedule = Self::new();
        for time in times {
            schedule.add(time);
        }
        schedule
    }

    /// Appends `time` unless it is already present. Returns whether the
    /// list changed.
    pub fn add(&mut self, time: FeedTime) -> bool {
        if self.contains(time) {
            return false;
        }
        self.times.push(time);
        true
    }

    /// Removes the entry at `idx`; out-of-range indexes are a no-op.
    pub fn remove(&mut self, idx: usize) -> Option<FeedTime> {
        if idx < self.times.len() {
            Some(self.times.remove(idx))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }

    pub fn contains(&self, time: FeedTime) -> bool {
        self.times.contains(&time)
    }

    pub fn get(&self, idx: usize) -> Option<FeedTime> {
        self.times.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FeedTime> + '_ {
        self.times.iter().copied()
    }

    pub fn times(&self) -> &[FeedTime] {
        &self.times
    }
}

/// Day-of-month a feed time last fired, so a slot triggers at most once per
/// day even though the loop sees the same `HH:MM` stamp for a whole minute.
///
/// In-memory only: the ledger restarts empty, so a reboot near a feed time
/// can re-fire that slot within the same day. Known limitation, kept. A
/// backward clock jump (NTP resync) can likewise re-trigger a stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerLedger {
    last_day: HashMap<FeedTime, u32>,
}

impl TriggerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stamp: FeedTime, day: u32) {
        self.last_day.insert(stamp, day);
    }

    /// Drops the entry for `stamp`, re-arming it for the current day.
    pub fn forget(&mut self, stamp: FeedTime) {
        self.last_day.remove(&stamp);
    }

    pub fn clear(&mut self) {
        self.last_day.clear();
    }

    pub fn last_day(&self, stamp: FeedTime) -> Option<u32> {
        self.last_day.get(&stamp).copied()
    }
}

/// True iff `stamp` is a configured feed time that has not already fired
/// on `day`. Callers must `record` the trigger once they act on it.
pub fn should_trigger(
    schedule: &FeedSchedule,
    ledger: &TriggerLedger,
    stamp: FeedTime,
    day: u32,
) -> bool {
    schedule.contains(stamp) && ledger.last_day(stamp) != Some(day)
}
