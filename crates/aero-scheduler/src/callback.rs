use std::fmt;
use std::rc::Rc;

use crate::error::{Result, SchedulerError};
use crate::event::EventId;
use crate::scheduler::Scheduler;

/// Plain callback: `(host context, scheduler, id, cycles_late)`.
pub type CallbackFn<C> = fn(&mut C, &mut Scheduler<C>, EventId, u32);

/// Callback with its own captured state (the per-event "user context").
pub type SharedCallback<C> = Rc<dyn Fn(&mut C, &mut Scheduler<C>, EventId, u32)>;

/// What to run when an event comes due.
///
/// `C` is the host context handed to [`Scheduler::fire`]. Callbacks receive the scheduler itself
/// and may add, re-add, or remove any event, including their own.
pub enum Callback<C> {
    /// Built-in overflow handler for the reserved event: [`Scheduler::rebase`], then re-arm at
    /// [`crate::REBASE_INTERVAL`].
    Rebase,
    /// Does nothing. Useful for events whose only purpose is to make `should_fire` return true,
    /// e.g. to break out of a host run loop.
    Noop,
    Fn(CallbackFn<C>),
    Shared(SharedCallback<C>),
}

impl<C> Callback<C> {
    pub fn from_fn(f: CallbackFn<C>) -> Self {
        Callback::Fn(f)
    }

    pub fn shared<F>(f: F) -> Self
    where
        F: Fn(&mut C, &mut Scheduler<C>, EventId, u32) + 'static,
    {
        Callback::Shared(Rc::new(f))
    }

    pub(crate) fn invoke(&self, ctx: &mut C, scheduler: &mut Scheduler<C>, id: EventId, late: u32) {
        match self {
            Callback::Rebase => scheduler.rebase_and_rearm(id),
            Callback::Noop => {}
            Callback::Fn(f) => f(ctx, scheduler, id, late),
            Callback::Shared(f) => f(ctx, scheduler, id, late),
        }
    }
}

impl<C> Clone for Callback<C> {
    fn clone(&self) -> Self {
        match self {
            Callback::Rebase => Callback::Rebase,
            Callback::Noop => Callback::Noop,
            Callback::Fn(f) => Callback::Fn(*f),
            Callback::Shared(f) => Callback::Shared(Rc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for Callback<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Rebase => f.write_str("Rebase"),
            Callback::Noop => f.write_str("Noop"),
            Callback::Fn(_) => f.write_str("Fn(..)"),
            Callback::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

impl<C> From<CallbackFn<C>> for Callback<C> {
    fn from(f: CallbackFn<C>) -> Self {
        Callback::Fn(f)
    }
}

/// Parallel to the event table: `slots[id]` is the callback registered for `id`.
pub(crate) struct CallbackTable<C> {
    slots: Vec<Option<Callback<C>>>,
}

impl<C> CallbackTable<C> {
    pub(crate) fn new(capacity: u32) -> Result<Self> {
        let len = capacity as usize;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| SchedulerError::OutOfMemory { len })?;
        slots.resize_with(len, || None);
        Ok(Self { slots })
    }

    #[inline]
    pub(crate) fn get(&self, id: EventId) -> Option<&Callback<C>> {
        self.slots[id.index()].as_ref()
    }

    #[inline]
    pub(crate) fn set(&mut self, id: EventId, callback: Callback<C>) {
        self.slots[id.index()] = Some(callback);
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}
