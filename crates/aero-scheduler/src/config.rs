/// Largest capacity for which [`IndexKind::Auto`] picks the linear scan.
pub const LINEAR_INDEX_MAX_CAPACITY: u32 = 64;

/// Strategy used to track the earliest enabled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Cached id with a full rescan when the cached event changes. Best for small tables.
    Linear,
    /// Indexed binary heap keyed by `(time, id)`; O(log n) updates.
    Heap,
    /// `Linear` up to [`LINEAR_INDEX_MAX_CAPACITY`] slots, `Heap` above.
    #[default]
    Auto,
}

impl IndexKind {
    pub fn resolve(self, capacity: u32) -> IndexKind {
        match self {
            IndexKind::Auto if capacity <= LINEAR_INDEX_MAX_CAPACITY => IndexKind::Linear,
            IndexKind::Auto => IndexKind::Heap,
            kind => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Total number of event slots, including the reserved rebase slot (`capacity - 1`).
    pub capacity: u32,
    pub index: IndexKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: LINEAR_INDEX_MAX_CAPACITY,
            index: IndexKind::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_switches_to_heap_above_threshold() {
        assert_eq!(IndexKind::Auto.resolve(4), IndexKind::Linear);
        assert_eq!(
            IndexKind::Auto.resolve(LINEAR_INDEX_MAX_CAPACITY),
            IndexKind::Linear
        );
        assert_eq!(
            IndexKind::Auto.resolve(LINEAR_INDEX_MAX_CAPACITY + 1),
            IndexKind::Heap
        );
        assert_eq!(IndexKind::Heap.resolve(2), IndexKind::Heap);
        assert_eq!(IndexKind::Linear.resolve(4096), IndexKind::Linear);
    }
}
