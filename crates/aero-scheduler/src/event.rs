use std::fmt;

use crate::error::{Result, SchedulerError};

/// Value stored in a slot whose event is not scheduled.
pub const DISABLED: i32 = i32::MAX;

/// Number of cycles between two firings of the reserved rebase event.
///
/// Every enabled time and the cycle counter stay below this (plus whatever lateness the host
/// accumulates before calling `fire`), so subtracting it never underflows and adding a relative
/// offset of up to this value never overflows.
pub const REBASE_INTERVAL: i32 = i32::MAX / 2;

/// Identifies an event slot. Ids are dense: `0..capacity`, with `id == slot index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventId(pub u32);

impl EventId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EventId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Fixed-capacity table of absolute due times, one slot per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EventTable {
    times: Vec<i32>,
}

impl EventTable {
    /// Allocates `capacity` slots, all disabled.
    pub(crate) fn new(capacity: u32) -> Result<Self> {
        let len = capacity as usize;
        let mut times = Vec::new();
        times
            .try_reserve_exact(len)
            .map_err(|_| SchedulerError::OutOfMemory { len })?;
        times.resize(len, DISABLED);
        Ok(Self { times })
    }

    pub(crate) fn from_times(times: Vec<i32>) -> Self {
        Self { times }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub(crate) fn time(&self, id: EventId) -> i32 {
        self.times[id.index()]
    }

    #[inline]
    pub(crate) fn is_enabled(&self, id: EventId) -> bool {
        self.time(id) != DISABLED
    }

    #[inline]
    pub(crate) fn set(&mut self, id: EventId, time: i32) {
        self.times[id.index()] = time;
    }

    #[inline]
    pub(crate) fn disable(&mut self, id: EventId) {
        self.set(id, DISABLED);
    }

    pub(crate) fn disable_all(&mut self) {
        self.times.fill(DISABLED);
    }

    /// `(time, id)` ordering used for every "which fires first" decision.
    #[inline]
    pub(crate) fn fires_before(&self, a: EventId, b: EventId) -> bool {
        (self.time(a), a) < (self.time(b), b)
    }

    /// Subtracts `interval` from every enabled slot. Relative order is unchanged.
    pub(crate) fn shift_back(&mut self, interval: i32) {
        for time in self.times.iter_mut().filter(|t| **t != DISABLED) {
            *time -= interval;
        }
    }

    pub(crate) fn times(&self) -> &[i32] {
        &self.times
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = EventId> {
        (0..self.times.len() as u32).map(EventId)
    }
}
