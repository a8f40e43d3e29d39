//! End-to-end tests of a host frame loop driving the bus and a machine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tickstate::core::{State, Value};
use tickstate::events::{EventBus, Identity, Listener, ManualClock, Message, ALWAYS_UPDATE_EVENT};
use tickstate::machine::StateMachine;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// One host frame: the update tick, then the delayed flush.
fn frame(bus: &EventBus, clock: &ManualClock, dt: f64) {
    clock.advance(dt);
    bus.tick();
    bus.tick_and_flush().unwrap();
}

#[test]
fn delayed_event_drives_an_action() {
    init_tracing();
    let clock = ManualClock::new(0.0);
    let bus = Rc::new(
        EventBus::builder()
            .time_source(clock.source())
            .verbose(true)
            .build(),
    );
    let idle_frames = Rc::new(Cell::new(0));
    let counter = Rc::clone(&idle_frames);

    let guard = Rc::new(
        StateMachine::builder()
            .event_bus(Rc::clone(&bus))
            .verbose(true)
            .state(State::new("patrol").on_update(move |_| counter.set(counter.get() + 1)))
            .state(State::new("chase"))
            .action("patrol", "spotted", "chase")
            .initial("patrol", None)
            .build()
            .unwrap(),
    );

    let weak = Rc::downgrade(&guard);
    let on_spotted = Listener::new(move |m: &Message| {
        if let Some(machine) = weak.upgrade() {
            let distance = m.downcast_ref::<i64>().copied().map(Value::Int);
            machine.do_action("spotted", distance).unwrap();
        }
    });
    bus.subscribe("enemy.spotted", &on_spotted, None).unwrap();
    bus.trigger_after(0.3125, "enemy.spotted", Message::new(40i64), None).unwrap();

    for _ in 0..4 {
        frame(&bus, &clock, 0.0625);
    }
    assert!(guard.is_state("patrol").unwrap());

    frame(&bus, &clock, 0.0625);
    assert!(guard.is_state("chase").unwrap());
    assert_eq!(guard.current_state().unwrap().value(), Some(&Value::Int(40)));

    // Patrol stopped updating once the machine left it.
    let frames_in_patrol = idle_frames.get();
    frame(&bus, &clock, 0.0625);
    assert_eq!(idle_frames.get(), frames_in_patrol);
    assert_eq!(frames_in_patrol, 5);
}

#[test]
fn targeted_timers_reach_only_their_entity() {
    init_tracing();
    let clock = ManualClock::new(10.0);
    let bus = EventBus::with_time_source(clock.source());
    let (left, right) = (Identity::new("left"), Identity::new("right"));
    let hits = Rc::new(RefCell::new(Vec::new()));

    for entity in [&left, &right] {
        let sink = Rc::clone(&hits);
        let name = entity.name().to_string();
        let listener = Listener::new(move |_| sink.borrow_mut().push(name.clone()));
        bus.subscribe_owned(entity, "door.open", &listener, Some(entity)).unwrap();
    }

    bus.trigger_after(1.0, "door.open", Message::empty(), Some(&right)).unwrap();
    bus.trigger_after(2.0, "door.open", Message::empty(), Some(&left)).unwrap();

    frame(&bus, &clock, 1.0);
    assert_eq!(*hits.borrow(), vec!["right"]);

    // Removing an entity does not cancel timers aimed at it; they fire into
    // an empty listener list.
    bus.unsubscribe_owner(&left);
    frame(&bus, &clock, 1.0);
    assert_eq!(*hits.borrow(), vec!["right"]);
    assert_eq!(bus.pending_delayed(), 0);
}

#[test]
fn always_update_runs_even_without_delayed_work() {
    let clock = ManualClock::new(0.0);
    let bus = EventBus::with_time_source(clock.source());
    let count = Rc::new(Cell::new(0));
    let sink = Rc::clone(&count);
    let listener = Listener::new(move |_| sink.set(sink.get() + 1));
    bus.subscribe(ALWAYS_UPDATE_EVENT, &listener, None).unwrap();

    for _ in 0..3 {
        bus.tick_and_flush().unwrap();
    }

    assert_eq!(count.get(), 3);
}

#[test]
fn listener_can_reschedule_itself() {
    let clock = ManualClock::new(0.0);
    let bus = Rc::new(EventBus::with_time_source(clock.source()));
    let fired = Rc::new(Cell::new(0));
    let (weak_bus, sink) = (Rc::downgrade(&bus), Rc::clone(&fired));
    let heartbeat = Listener::new(move |_| {
        sink.set(sink.get() + 1);
        if let Some(bus) = weak_bus.upgrade() {
            bus.trigger_after(1.0, "heartbeat", Message::empty(), None).unwrap();
        }
    });
    bus.subscribe("heartbeat", &heartbeat, None).unwrap();
    bus.trigger_after(1.0, "heartbeat", Message::empty(), None).unwrap();

    for _ in 0..5 {
        frame(&bus, &clock, 1.0);
    }

    assert_eq!(fired.get(), 5);
    assert_eq!(bus.pending_delayed(), 1);
}
