//! Save/restore of scheduler state.
//!
//! Layout (little-endian, fixed width):
//!
//! ```text
//! capacity: u32 | cycles: i32 | next_event_id: u32 | events: [i32; capacity]
//! ```
//!
//! Only times are stored. Callbacks are process-local and must be re-registered by the host after
//! a restore, typically by walking ids with [`Scheduler::has_event`] /
//! [`Scheduler::event_cycles_absolute`] and calling [`Scheduler::add_absolute`]. The reserved
//! rebase event gets the built-in handler automatically.

use std::io::Cursor;

use crate::callback::CallbackTable;
use crate::error::{Result, SchedulerError};
use crate::event::{EventId, EventTable, DISABLED, REBASE_INTERVAL};
use crate::index::NextEventIndex;
use crate::io::{ReadLeExt, WriteLeExt};
use crate::scheduler::Scheduler;

/// Bytes preceding the event array: capacity, cycles, next_event_id.
pub const STATE_HEADER_LEN: usize = 12;

/// Encoded size for a table of `capacity` slots, or `None` if it does not fit in `usize`.
pub fn state_size_for(capacity: u32) -> Option<usize> {
    (capacity as usize)
        .checked_mul(4)?
        .checked_add(STATE_HEADER_LEN)
}

/// Plain-data view of a scheduler, as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    pub cycles: i32,
    /// Advisory: recomputed from `events` on restore.
    pub next_event_id: EventId,
    /// Absolute due time per id, [`crate::DISABLED`] for disabled slots.
    pub events: Vec<i32>,
}

impl SchedulerState {
    pub fn capacity(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn encoded_len(&self) -> usize {
        STATE_HEADER_LEN + self.events.len() * 4
    }

    /// Writes the encoding to the front of `buf` and returns the number of bytes written.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len();
        let available = buf.len();
        if available < needed {
            return Err(SchedulerError::BufferTooSmall { needed, available });
        }

        let mut w = &mut buf[..needed];
        w.write_u32_le(self.capacity())?;
        w.write_i32_le(self.cycles)?;
        w.write_u32_le(self.next_event_id.0)?;
        for &time in &self.events {
            w.write_i32_le(time)?;
        }
        Ok(needed)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.encoded_len()];
        let encoded = self.encode_into(&mut out);
        debug_assert!(encoded.is_ok(), "buffer is sized by encoded_len");
        out
    }

    /// Checks that the clock and every enabled time can go through dispatch and rebase without
    /// overflowing, and that the reserved rebase event is armed within one interval.
    pub fn validate(&self) -> Result<()> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Err(SchedulerError::Malformed("zero capacity"));
        }
        if self.next_event_id.0 >= capacity {
            return Err(SchedulerError::Malformed("next event id out of range"));
        }
        if self.cycles.checked_sub(REBASE_INTERVAL).is_none() {
            return Err(SchedulerError::Malformed("cycle counter out of range"));
        }

        let reserved = self.events[capacity as usize - 1];
        if reserved == DISABLED {
            return Err(SchedulerError::Malformed("reserved rebase event is disabled"));
        }
        if reserved > REBASE_INTERVAL {
            return Err(SchedulerError::Malformed(
                "reserved rebase event beyond the rebase interval",
            ));
        }

        for &time in self.events.iter().filter(|&&t| t != DISABLED) {
            if time.checked_sub(REBASE_INTERVAL).is_none() || self.cycles.checked_sub(time).is_none()
            {
                return Err(SchedulerError::Malformed("event time out of range"));
            }
        }
        Ok(())
    }

    /// Parses and validates an encoded state. Trailing bytes after the event array are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(bytes);
        let capacity = r
            .read_u32_le()
            .map_err(|_| SchedulerError::Malformed("missing capacity header"))?;
        if capacity == 0 {
            return Err(SchedulerError::Malformed("zero capacity"));
        }
        let needed = state_size_for(capacity)
            .ok_or(SchedulerError::Malformed("capacity does not fit in memory"))?;
        if bytes.len() < needed {
            return Err(SchedulerError::Malformed("truncated event table"));
        }

        let cycles = r.read_i32_le()?;
        let next_event_id = EventId(r.read_u32_le()?);
        if next_event_id.0 >= capacity {
            return Err(SchedulerError::Malformed("next event id out of range"));
        }

        let len = capacity as usize;
        let mut events = Vec::new();
        events
            .try_reserve_exact(len)
            .map_err(|_| SchedulerError::OutOfMemory { len })?;
        for _ in 0..len {
            events.push(r.read_i32_le()?);
        }

        Ok(Self {
            cycles,
            next_event_id,
            events,
        })
    }
}

impl<C> Scheduler<C> {
    /// Exact number of bytes [`Scheduler::save_state`] writes.
    pub fn state_size(&self) -> usize {
        STATE_HEADER_LEN + self.capacity() as usize * 4
    }

    pub fn snapshot(&self) -> SchedulerState {
        SchedulerState {
            cycles: self.ticks(),
            next_event_id: self.next_event_id(),
            events: self.events().times().to_vec(),
        }
    }

    /// Encodes the current state into `buf`. Fails without writing anything if `buf` is shorter
    /// than [`Scheduler::state_size`].
    pub fn save_state(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.state_size();
        if buf.len() < needed {
            return Err(SchedulerError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        self.snapshot().encode_into(buf)
    }

    pub fn save_state_vec(&self) -> Vec<u8> {
        self.snapshot().to_bytes()
    }

    /// Replaces this scheduler's state with `state`. The table is rebuilt off to the side and
    /// swapped in only on success; on error `self` is untouched.
    ///
    /// The capacity may differ from the current one. All callbacks except the reserved event's
    /// are dropped.
    pub fn restore(&mut self, state: SchedulerState) -> Result<()> {
        state.validate()?;
        let capacity = state.capacity();

        let callbacks = CallbackTable::new(capacity)?;
        let events = EventTable::from_times(state.events);
        let kind = self.configured_index().resolve(capacity);
        let mut index = NextEventIndex::new(kind, events.len())?;
        index.rebuild(&events);

        if index.earliest() != state.next_event_id {
            tracing::debug!(
                stored = %state.next_event_id,
                recomputed = %index.earliest(),
                "restored next event id differs from saved hint"
            );
        }
        tracing::debug!(capacity, cycles = state.cycles, "scheduler state restored");

        self.replace_tables(state.cycles, events, callbacks, index);
        Ok(())
    }

    /// Decodes and restores a buffer produced by [`Scheduler::save_state`].
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        let state = SchedulerState::decode(bytes)?;
        self.restore(state)
    }
}
