//! Earliest-event index: answers "which enabled event fires next" in O(1).
//!
//! Both strategies order events by `(time, id)` and report id 0 when nothing is enabled, so they
//! are interchangeable without any observable difference in firing order or saved state.

mod heap;
mod linear;

use crate::config::IndexKind;
use crate::error::Result;
use crate::event::{EventId, EventTable};

use heap::HeapIndex;
use linear::LinearIndex;

#[derive(Debug, Clone)]
pub(crate) enum NextEventIndex {
    Linear(LinearIndex),
    Heap(HeapIndex),
}

impl NextEventIndex {
    /// `kind` must already be resolved (not [`IndexKind::Auto`]).
    pub(crate) fn new(kind: IndexKind, capacity: usize) -> Result<Self> {
        Ok(match kind {
            IndexKind::Heap => Self::Heap(HeapIndex::with_capacity(capacity)?),
            IndexKind::Linear | IndexKind::Auto => Self::Linear(LinearIndex::new()),
        })
    }

    pub(crate) fn kind(&self) -> IndexKind {
        match self {
            Self::Linear(_) => IndexKind::Linear,
            Self::Heap(_) => IndexKind::Heap,
        }
    }

    #[inline]
    pub(crate) fn earliest(&self) -> EventId {
        match self {
            Self::Linear(index) => index.earliest(),
            Self::Heap(index) => index.earliest(),
        }
    }

    /// Must be called after every write to `events[id]`.
    #[inline]
    pub(crate) fn update(&mut self, events: &EventTable, id: EventId) {
        match self {
            Self::Linear(index) => index.update(events, id),
            Self::Heap(index) => index.update(events, id),
        }
    }

    pub(crate) fn rebuild(&mut self, events: &EventTable) {
        match self {
            Self::Linear(index) => index.rebuild(events),
            Self::Heap(index) => index.rebuild(events),
        }
    }
}
