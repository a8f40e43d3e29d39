//! Core data types shared by the state machine and its checkpoints.
//!
//! This module contains plain values with no dependency on the event bus:
//! - `Value`, the tagged payload carried by states and by the machine
//! - `State` records and their callbacks
//! - Guard predicates for transition control
//! - History of completed state changes

mod guard;
mod history;
mod state;
mod value;

pub use guard::Guard;
pub use history::{StateChange, StateHistory};
pub use state::{State, StateCallback};
pub use value::{Value, ValueError};
