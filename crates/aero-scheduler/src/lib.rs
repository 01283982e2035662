//! Cycle-accurate event scheduler for CPU, timer and peripheral models.
//!
//! Devices register future events against a small, fixed set of ids ("timer IRQ in 512
//! cycles"); the host loop advances the cycle counter with [`Scheduler::tick`] and calls
//! [`Scheduler::fire`] whenever [`Scheduler::should_fire`] reports a due event. Dispatch order is
//! fully deterministic: by due time, then by lower id.
//!
//! Time is an `i32` cycle count. The last id is reserved for a rebase event that shifts the clock
//! and all pending events back by [`REBASE_INTERVAL`] every interval, so a simulation can run
//! forever without overflowing.
//!
//! ```
//! use aero_scheduler::{Callback, EventId, Scheduler};
//!
//! fn on_timer(fired: &mut Vec<u32>, _s: &mut Scheduler<Vec<u32>>, _id: EventId, late: u32) {
//!     fired.push(late);
//! }
//!
//! let mut scheduler = Scheduler::new(4).unwrap();
//! scheduler.add(EventId(0), 512, Callback::from_fn(on_timer));
//!
//! let mut fired = Vec::new();
//! scheduler.tick(520);
//! if scheduler.should_fire() {
//!     scheduler.fire(&mut fired);
//! }
//! assert_eq!(fired, vec![8]);
//! ```
//!
//! State can be saved to and restored from a flat byte buffer; see [`SchedulerState`].

mod callback;
mod config;
mod error;
mod event;
mod index;
mod io;
mod scheduler;
mod state;

pub use crate::callback::{Callback, CallbackFn, SharedCallback};
pub use crate::config::{IndexKind, SchedulerConfig, LINEAR_INDEX_MAX_CAPACITY};
pub use crate::error::{Result, SchedulerError};
pub use crate::event::{EventId, DISABLED, REBASE_INTERVAL};
pub use crate::scheduler::Scheduler;
pub use crate::state::{state_size_for, SchedulerState, STATE_HEADER_LEN};
