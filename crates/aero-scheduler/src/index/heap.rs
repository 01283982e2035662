use crate::error::{Result, SchedulerError};
use crate::event::{EventId, EventTable};

const NOT_QUEUED: u32 = u32::MAX;

/// Indexed binary min-heap of enabled ids, ordered by `(time, id)`.
///
/// The heap stores ids only and reads times from the [`EventTable`], so a uniform shift of all
/// enabled times (rebase) leaves it valid untouched. `pos[id]` is the heap slot holding `id`, or
/// `NOT_QUEUED`.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeapIndex {
    heap: Vec<EventId>,
    pos: Vec<u32>,
}

impl HeapIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        let mut heap = Vec::new();
        heap.try_reserve_exact(capacity)
            .map_err(|_| SchedulerError::OutOfMemory { len: capacity })?;
        let mut pos = Vec::new();
        pos.try_reserve_exact(capacity)
            .map_err(|_| SchedulerError::OutOfMemory { len: capacity })?;
        pos.resize(capacity, NOT_QUEUED);
        Ok(Self { heap, pos })
    }

    /// Earliest enabled id; id 0 when nothing is enabled, matching the linear scan.
    #[inline]
    pub(crate) fn earliest(&self) -> EventId {
        self.heap.first().copied().unwrap_or(EventId(0))
    }

    pub(crate) fn update(&mut self, events: &EventTable, id: EventId) {
        let slot = self.pos[id.index()];
        match (slot == NOT_QUEUED, events.is_enabled(id)) {
            (true, true) => {
                let slot = self.heap.len();
                self.heap.push(id);
                self.pos[id.index()] = slot as u32;
                self.sift_up(events, slot);
            }
            (false, true) => {
                let slot = self.sift_up(events, slot as usize);
                self.sift_down(events, slot);
            }
            (false, false) => self.remove_at(events, slot as usize),
            (true, false) => {}
        }
    }

    pub(crate) fn rebuild(&mut self, events: &EventTable) {
        self.heap.clear();
        self.pos.clear();
        self.pos.resize(events.len(), NOT_QUEUED);
        for id in events.ids().filter(|&id| events.is_enabled(id)) {
            self.pos[id.index()] = self.heap.len() as u32;
            self.heap.push(id);
        }
        for slot in (0..self.heap.len() / 2).rev() {
            self.sift_down(events, slot);
        }
    }

    fn remove_at(&mut self, events: &EventTable, slot: usize) {
        let last = self.heap.len() - 1;
        self.swap(slot, last);
        if let Some(removed) = self.heap.pop() {
            self.pos[removed.index()] = NOT_QUEUED;
        }
        if slot < self.heap.len() {
            let slot = self.sift_up(events, slot);
            self.sift_down(events, slot);
        }
    }

    fn sift_up(&mut self, events: &EventTable, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !events.fires_before(self.heap[slot], self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, events: &EventTable, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && events.fires_before(self.heap[left], self.heap[smallest]) {
                smallest = left;
            }
            if right < len && events.fires_before(self.heap[right], self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                return;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.pos[self.heap[a].index()] = a as u32;
        self.pos[self.heap[b].index()] = b as u32;
    }

    #[cfg(test)]
    fn is_consistent(&self, events: &EventTable) -> bool {
        let heap_ok = (1..self.heap.len())
            .all(|slot| !events.fires_before(self.heap[slot], self.heap[(slot - 1) / 2]));
        let pos_ok = self
            .heap
            .iter()
            .enumerate()
            .all(|(slot, id)| self.pos[id.index()] == slot as u32);
        let enabled = events.ids().filter(|&id| events.is_enabled(id)).count();
        heap_ok && pos_ok && enabled == self.heap.len()
    }
}
