//! Tickstate: a tick-driven event bus and guarded state machine
//!
//! Tickstate is built for frame loops. A host calls [`EventBus::tick_and_flush`]
//! once per frame; the bus dispatches its update events and delivers any
//! delayed events whose time has come. State machines subscribe to the
//! update tick so the current state's update callback runs every frame.
//!
//! # Core Concepts
//!
//! - **EventBus**: Named publish/subscribe with optional per-target routing
//!   and timer-scheduled delivery
//! - **StateMachine**: Named states, guarded transitions and string actions
//! - **Checkpoint**: Serializable snapshot of a machine's data
//!
//! Everything is single-threaded. Callbacks may re-enter the bus or the
//! machine that invoked them.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use tickstate::core::{State, Value};
//! use tickstate::events::{EventBus, ManualClock, Message};
//! use tickstate::machine::StateMachine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = ManualClock::new(0.0);
//! let bus = Rc::new(EventBus::with_time_source(clock.source()));
//!
//! let machine = StateMachine::builder()
//!     .event_bus(Rc::clone(&bus))
//!     .state(State::new("idle").on_update(|_| {}))
//!     .state(State::new("alert"))
//!     .action("idle", "spotted", "alert")
//!     .initial("idle", None)
//!     .build()?;
//!
//! bus.trigger_after(0.5, "enemy.spotted", Message::empty(), None)?;
//! bus.tick_and_flush()?;
//! assert_eq!(bus.pending_delayed(), 1);
//!
//! clock.advance(0.5);
//! bus.tick_and_flush()?;
//! assert_eq!(bus.pending_delayed(), 0);
//!
//! machine.do_action("spotted", Some(Value::Int(3)))?;
//! assert!(machine.is_state("alert")?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod events;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, EventBusBuilder, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{Guard, State, StateChange, StateHistory, Value, ValueError};
pub use events::{BusError, EventBus, Identity, Listener, ManualClock, Message, TimeSource};
pub use machine::{FsmError, MachineConfig, StateMachine};
