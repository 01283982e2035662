use std::cell::RefCell;
use std::rc::Rc;

use aero_scheduler::{Callback, EventId, IndexKind, Scheduler, SchedulerConfig};
use proptest::prelude::*;

type Log = Vec<(EventId, u32)>;

fn record(log: &mut Log, _s: &mut Scheduler<Log>, id: EventId, late: u32) {
    log.push((id, late));
}

fn scheduler(capacity: u32, index: IndexKind) -> Scheduler<Log> {
    Scheduler::with_config(SchedulerConfig { capacity, index }).unwrap()
}

#[test]
fn equal_times_fire_by_lower_id() {
    for kind in [IndexKind::Linear, IndexKind::Heap] {
        let mut s = scheduler(4, kind);
        assert_eq!(s.reserved_event_id(), EventId(3));

        s.add_absolute(EventId(0), 50, Callback::from_fn(record));
        s.add_absolute(EventId(1), 50, Callback::from_fn(record));
        s.add_absolute(EventId(2), 10, Callback::from_fn(record));
        s.tick(60);

        let mut log = Log::new();
        s.fire(&mut log);
        assert_eq!(
            log,
            vec![(EventId(2), 50), (EventId(0), 10), (EventId(1), 10)],
            "{kind:?}"
        );
        assert!(!s.should_fire());
    }
}

#[test]
fn lower_id_added_later_with_same_time_still_fires_first() {
    for kind in [IndexKind::Linear, IndexKind::Heap] {
        let mut s = scheduler(4, kind);
        s.add_absolute(EventId(2), 50, Callback::from_fn(record));
        s.add_absolute(EventId(0), 50, Callback::from_fn(record));
        assert_eq!(s.next_event_id(), EventId(0), "{kind:?}");

        s.tick(50);
        let mut log = Log::new();
        s.fire(&mut log);
        assert_eq!(log, vec![(EventId(0), 0), (EventId(2), 0)], "{kind:?}");
    }
}

#[test]
fn readding_overwrites_time_and_callback() {
    fn other(log: &mut Log, _s: &mut Scheduler<Log>, id: EventId, _late: u32) {
        log.push((id, u32::MAX));
    }

    let mut s = scheduler(4, IndexKind::Linear);
    s.add(EventId(1), 5, Callback::from_fn(record));
    s.add(EventId(1), 30, Callback::from_fn(other));
    assert_eq!(s.event_cycles(EventId(1)), 30);

    s.tick(10);
    let mut log = Log::new();
    s.fire(&mut log);
    assert!(log.is_empty());

    s.tick(20);
    s.fire(&mut log);
    assert_eq!(log, vec![(EventId(1), u32::MAX)]);
}

#[test]
fn each_add_fires_exactly_once() {
    let mut s = scheduler(4, IndexKind::Linear);
    let mut log = Log::new();

    s.add(EventId(0), 5, Callback::from_fn(record));
    s.tick(10);
    s.fire(&mut log);
    s.tick(10);
    s.fire(&mut log);
    assert_eq!(log, vec![(EventId(0), 5)]);
    assert!(!s.has_event(EventId(0)));

    s.add(EventId(0), 0, Callback::from_fn(record));
    s.fire(&mut log);
    assert_eq!(log, vec![(EventId(0), 5), (EventId(0), 0)]);
}

#[test]
fn self_rearm_waits_for_a_later_tick() {
    fn periodic(log: &mut Log, s: &mut Scheduler<Log>, id: EventId, late: u32) {
        log.push((id, late));
        s.add(id, 100, Callback::from_fn(periodic));
    }

    for kind in [IndexKind::Linear, IndexKind::Heap] {
        let mut s = scheduler(4, kind);
        let mut log = Log::new();
        s.add(EventId(0), 100, Callback::from_fn(periodic));

        s.tick(130);
        s.fire(&mut log);
        assert_eq!(log, vec![(EventId(0), 30)], "{kind:?}");
        assert_eq!(s.event_cycles(EventId(0)), 100);

        s.tick(99);
        s.fire(&mut log);
        assert_eq!(log.len(), 1);

        s.tick(1);
        s.fire(&mut log);
        assert_eq!(log, vec![(EventId(0), 30), (EventId(0), 0)]);
    }
}

#[test]
fn callback_can_remove_and_add_other_events() {
    fn cancel_next(log: &mut Log, s: &mut Scheduler<Log>, id: EventId, late: u32) {
        log.push((id, late));
        s.remove(EventId(1));
        // Already due: must still be dispatched by the same fire() call.
        s.add(EventId(2), -5, Callback::from_fn(record));
    }

    for kind in [IndexKind::Linear, IndexKind::Heap] {
        let mut s = scheduler(4, kind);
        s.add_absolute(EventId(0), 10, Callback::from_fn(cancel_next));
        s.add_absolute(EventId(1), 20, Callback::from_fn(record));
        s.tick(25);

        let mut log = Log::new();
        s.fire(&mut log);
        assert_eq!(log, vec![(EventId(0), 15), (EventId(2), 5)], "{kind:?}");
        assert!(!s.has_event(EventId(1)));
        assert_eq!(s.next_event_id(), s.reserved_event_id());
    }
}

#[test]
fn shared_callbacks_carry_their_own_context() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let mut s: Scheduler = Scheduler::new(4).unwrap();

    for (id, device) in [(0u32, "pit"), (1, "hpet")] {
        let hits = Rc::clone(&hits);
        s.add(
            EventId(id),
            10 * (id as i32 + 1),
            Callback::shared(move |_, _, _, late| hits.borrow_mut().push((device, late))),
        );
    }

    s.tick(25);
    s.fire(&mut ());
    assert_eq!(*hits.borrow(), vec![("pit", 15), ("hpet", 5)]);
}

#[test]
fn noop_event_breaks_run_loop() {
    let mut s: Scheduler<u32> = Scheduler::new(4).unwrap();
    s.add(EventId(0), 1000, Callback::Noop);

    let mut steps = 0;
    loop {
        s.tick(7);
        steps += 1;
        if s.should_fire() {
            s.fire(&mut steps);
            break;
        }
    }
    assert_eq!(steps, 143);
    assert_eq!(s.ticks(), 1001);
}

proptest! {
    #[test]
    fn fires_in_time_then_id_order(
        times in proptest::collection::vec(prop::option::of(0i32..200), 15),
        step in 1i32..50,
        heap in any::<bool>(),
    ) {
        let kind = if heap { IndexKind::Heap } else { IndexKind::Linear };
        let mut s = scheduler(16, kind);
        let mut expected = Vec::new();
        for (id, time) in times.iter().enumerate() {
            if let Some(time) = *time {
                s.add_absolute(EventId(id as u32), time, Callback::from_fn(record));
                expected.push((time, EventId(id as u32)));
            }
        }
        expected.sort();

        let mut log = Log::new();
        let mut fired_at = Vec::new();
        while s.ticks() < 250 {
            s.tick(step);
            s.fire(&mut log);
            prop_assert!(!s.should_fire());
            fired_at.extend(log.drain(..).map(|(id, late)| (s.ticks() - late as i32, id)));
        }

        prop_assert_eq!(fired_at, expected);
    }
}
