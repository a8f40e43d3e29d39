//! Frame Loop
//!
//! This example drives an event bus and a state machine from a simulated
//! host frame loop.
//!
//! Key concepts:
//! - `tick` runs the current state's update callback every frame
//! - `trigger_after` schedules an event in frame time
//! - A delayed event fires an action on the machine
//! - A deterministic `ManualClock` stands in for the host clock
//!
//! Run with: cargo run --example frame_loop

use std::cell::Cell;
use std::rc::Rc;
use tickstate::core::{State, Value};
use tickstate::events::{EventBus, Listener, ManualClock, Message};
use tickstate::machine::StateMachine;

const FRAME: f64 = 0.25;

fn main() {
    println!("=== Frame Loop ===\n");

    let clock = ManualClock::new(0.0);
    let bus = Rc::new(EventBus::with_time_source(clock.source()));

    let patrol_frames = Rc::new(Cell::new(0));
    let counter = Rc::clone(&patrol_frames);
    let guard = Rc::new(
        StateMachine::builder()
            .event_bus(Rc::clone(&bus))
            .state(State::new("patrol").on_update(move |_| counter.set(counter.get() + 1)))
            .state(State::new("chase").on_arrive(|s| {
                let distance = s.value().and_then(|v| v.as_int().ok()).unwrap_or(0);
                println!("  -> chasing, target {distance}m away");
            }))
            .action("patrol", "spotted", "chase")
            .initial("patrol", None)
            .build()
            .unwrap(),
    );

    // Bus listener that turns the sighting into an action.
    let weak = Rc::downgrade(&guard);
    let on_spotted = Listener::new(move |m: &Message| {
        if let Some(machine) = weak.upgrade() {
            let distance = m.downcast_ref::<i64>().copied().map(Value::Int);
            machine.do_action("spotted", distance).unwrap();
        }
    });
    bus.subscribe("enemy.spotted", &on_spotted, None).unwrap();

    println!("Enemy will be spotted in 1.0s (frame = {FRAME}s)\n");
    bus.trigger_after(1.0, "enemy.spotted", Message::new(40i64), None).unwrap();

    for frame in 1..=6 {
        clock.advance(FRAME);
        bus.tick();
        bus.tick_and_flush().unwrap();
        println!(
            "frame {frame}: t={:.2}s state={} pending={}",
            clock.now(),
            guard.current_state_name().unwrap(),
            bus.pending_delayed()
        );
    }

    println!("\nPatrol updated for {} frames", patrol_frames.get());
    println!("History: {:?}", guard.history().path());

    println!("\n=== Example Complete ===");
}
