use crate::callback::{Callback, CallbackTable};
use crate::config::{IndexKind, SchedulerConfig};
use crate::error::{Result, SchedulerError};
use crate::event::{EventId, EventTable, REBASE_INTERVAL};
use crate::index::NextEventIndex;

/// Deterministic single-threaded event scheduler over a fixed set of event ids.
///
/// Time is an `i32` cycle counter advanced by the host through [`Scheduler::tick`]. Each id owns
/// one slot holding an absolute due time or [`crate::DISABLED`]. The last slot
/// ([`Scheduler::reserved_event_id`]) is the rebase event: it is always armed, so the queue is
/// never empty, and every [`REBASE_INTERVAL`] cycles it shifts the clock and every enabled event
/// back by that interval so the counter never overflows.
///
/// `C` is the host context passed to [`Scheduler::fire`] and on to every callback.
pub struct Scheduler<C = ()> {
    cycles: i32,
    events: EventTable,
    callbacks: CallbackTable<C>,
    index: NextEventIndex,
    /// Strategy as configured; `Auto` is re-resolved whenever a restore changes the capacity.
    configured_index: IndexKind,
}

impl<C> Scheduler<C> {
    /// Creates a scheduler with `capacity` slots (ids `0..capacity`, the last one reserved) and
    /// resets it to cycle 0 with the default rebase handler.
    pub fn new(capacity: u32) -> Result<Self> {
        Self::with_config(SchedulerConfig {
            capacity,
            ..SchedulerConfig::default()
        })
    }

    pub fn with_config(config: SchedulerConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(SchedulerError::ZeroCapacity);
        }
        let kind = config.index.resolve(config.capacity);
        let events = EventTable::new(config.capacity)?;
        let callbacks = CallbackTable::new(config.capacity)?;
        let mut scheduler = Self {
            cycles: 0,
            index: NextEventIndex::new(kind, events.len())?,
            events,
            callbacks,
            configured_index: config.index,
        };
        scheduler.reset(0, None);
        Ok(scheduler)
    }

    /// Disables every event, drops every callback, sets the clock to
    /// `min(starting_cycles, REBASE_INTERVAL)` and arms the reserved event at `REBASE_INTERVAL`.
    ///
    /// A custom `rebase_callback` replaces [`Callback::Rebase`]. It must call
    /// [`Scheduler::rebase`] and re-arm the reserved event itself, or the overflow guarantee is
    /// lost.
    pub fn reset(&mut self, starting_cycles: i32, rebase_callback: Option<Callback<C>>) {
        self.events.disable_all();
        self.callbacks.clear();
        self.index.rebuild(&self.events);
        self.cycles = starting_cycles.min(REBASE_INTERVAL);
        tracing::debug!(
            cycles = self.cycles,
            capacity = self.events.len(),
            "scheduler reset"
        );
        let id = self.reserved_event_id();
        self.add_absolute(id, REBASE_INTERVAL, rebase_callback.unwrap_or(Callback::Rebase));
    }

    /// Schedules (or reschedules) `id` to fire `relative` cycles from now.
    #[inline]
    pub fn add(&mut self, id: EventId, relative: i32, callback: Callback<C>) {
        self.add_absolute(id, self.cycles + relative, callback);
    }

    /// Schedules (or reschedules) `id` at the absolute cycle `time`, replacing its callback.
    pub fn add_absolute(&mut self, id: EventId, time: i32, callback: Callback<C>) {
        self.check_id(id);
        self.events.set(id, time);
        self.callbacks.set(id, callback);
        self.index.update(&self.events, id);
    }

    /// Disables `id`. Does nothing if it is not enabled.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the reserved rebase event.
    pub fn remove(&mut self, id: EventId) {
        self.check_id(id);
        assert_ne!(
            id,
            self.reserved_event_id(),
            "the reserved rebase event cannot be removed"
        );
        if !self.events.is_enabled(id) {
            return;
        }
        self.events.disable(id);
        self.index.update(&self.events, id);
    }

    /// Advances the clock by `delta` cycles.
    ///
    /// Negative deltas are accepted but break the monotonic-time assumption that `cycles_late`
    /// and the rebase bound rely on.
    #[inline]
    pub fn tick(&mut self, delta: i32) {
        self.cycles += delta;
    }

    /// Returns true if at least one event is due, i.e. [`Scheduler::fire`] has work to do.
    #[inline]
    pub fn should_fire(&self) -> bool {
        self.next_event_cycles_absolute() <= self.cycles
    }

    /// Dispatches every due event in `(time, id)` order until none is due.
    ///
    /// Each event is disabled and the index updated before its callback runs, so callbacks see a
    /// consistent scheduler and may re-arm themselves. An event re-armed in the future is not
    /// dispatched again by this call.
    pub fn fire(&mut self, ctx: &mut C) {
        while self.should_fire() {
            let id = self.index.earliest();
            let time = self.events.time(id);
            let callback = self.callbacks.get(id).cloned();

            self.events.disable(id);
            self.index.update(&self.events, id);

            let late = (self.cycles - time) as u32;
            match callback {
                Some(callback) => callback.invoke(ctx, self, id, late),
                None => tracing::warn!(%id, late, "event fired with no registered callback"),
            }
        }
    }

    /// Jumps the clock forward to the next event if it lies in the future.
    pub fn advance_to_next_event(&mut self) {
        let next = self.next_event_cycles_absolute();
        if next > self.cycles {
            self.cycles = next;
        }
    }

    /// Shifts the clock and every enabled event back by [`REBASE_INTERVAL`].
    ///
    /// Custom rebase callbacks installed via [`Scheduler::reset`] must call this before
    /// re-arming the reserved event.
    pub fn rebase(&mut self) {
        self.events.shift_back(REBASE_INTERVAL);
        self.cycles -= REBASE_INTERVAL;
        tracing::trace!(cycles = self.cycles, "scheduler rebased");
    }

    pub(crate) fn rebase_and_rearm(&mut self, id: EventId) {
        self.rebase();
        self.add_absolute(id, REBASE_INTERVAL, Callback::Rebase);
    }

    /// Current time in cycles.
    #[inline]
    pub fn ticks(&self) -> i32 {
        self.cycles
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.events.len() as u32
    }

    #[inline]
    pub fn reserved_event_id(&self) -> EventId {
        EventId(self.capacity() - 1)
    }

    /// Strategy in use for the current capacity.
    pub fn index_kind(&self) -> IndexKind {
        self.index.kind()
    }

    pub(crate) fn configured_index(&self) -> IndexKind {
        self.configured_index
    }

    #[inline]
    pub fn has_event(&self, id: EventId) -> bool {
        self.check_id(id);
        self.events.is_enabled(id)
    }

    /// Cycles until `id` is due (negative if overdue).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not enabled; check [`Scheduler::has_event`] first.
    pub fn event_cycles(&self, id: EventId) -> i32 {
        self.event_cycles_absolute(id) - self.cycles
    }

    /// Absolute due time of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not enabled.
    pub fn event_cycles_absolute(&self, id: EventId) -> i32 {
        assert!(self.has_event(id), "event {id} isn't enabled");
        self.events.time(id)
    }

    pub fn try_event_cycles(&self, id: EventId) -> Option<i32> {
        self.try_event_cycles_absolute(id)
            .map(|time| time - self.cycles)
    }

    pub fn try_event_cycles_absolute(&self, id: EventId) -> Option<i32> {
        self.has_event(id).then(|| self.events.time(id))
    }

    /// Id of the event that fires next.
    #[inline]
    pub fn next_event_id(&self) -> EventId {
        self.index.earliest()
    }

    #[inline]
    pub fn next_event_cycles(&self) -> i32 {
        self.next_event_cycles_absolute() - self.cycles
    }

    #[inline]
    pub fn next_event_cycles_absolute(&self) -> i32 {
        self.events.time(self.index.earliest())
    }

    #[inline]
    fn check_id(&self, id: EventId) {
        assert!(
            id.index() < self.events.len(),
            "event id {id} out of range (capacity {})",
            self.events.len()
        );
    }

    pub(crate) fn events(&self) -> &EventTable {
        &self.events
    }

    /// Swaps in a restored table. Callbacks are dropped; the reserved slot gets the built-in
    /// rebase handler.
    pub(crate) fn replace_tables(
        &mut self,
        cycles: i32,
        events: EventTable,
        callbacks: CallbackTable<C>,
        index: NextEventIndex,
    ) {
        self.cycles = cycles;
        self.events = events;
        self.callbacks = callbacks;
        self.index = index;
        let id = self.reserved_event_id();
        self.callbacks.set(id, Callback::Rebase);
    }
}

impl<C> std::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cycles", &self.cycles)
            .field("next_event_id", &self.index.earliest())
            .field("capacity", &self.events.len())
            .field("index", &self.index.kind())
            .finish()
    }
}
