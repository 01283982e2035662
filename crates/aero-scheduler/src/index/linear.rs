use crate::event::{EventId, EventTable};

/// Cached earliest id, recomputed by a full scan only when the cached slot itself changes.
///
/// Disabled slots hold [`crate::DISABLED`] (`i32::MAX`), so the scan needs no enabled check: any
/// enabled slot compares below them. With every slot disabled the scan settles on id 0.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinearIndex {
    earliest: EventId,
}

impl LinearIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn earliest(&self) -> EventId {
        self.earliest
    }

    pub(crate) fn update(&mut self, events: &EventTable, id: EventId) {
        if id == self.earliest {
            self.rebuild(events);
        } else if events.fires_before(id, self.earliest) {
            self.earliest = id;
        }
    }

    pub(crate) fn rebuild(&mut self, events: &EventTable) {
        let mut earliest = EventId(0);
        for id in events.ids().skip(1) {
            if events.fires_before(id, earliest) {
                earliest = id;
            }
        }
        self.earliest = earliest;
    }
}
