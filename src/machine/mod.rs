//! Guarded finite state machine.
//!
//! States are declared by name, transitions connect them, and string-named
//! actions select which transition to take from the current state. Update
//! callbacks are driven by the event bus tick.

mod config;
mod error;
#[allow(clippy::module_inception)]
mod machine;

pub use config::{MachineConfig, DEFAULT_HISTORY_LIMIT};
pub use error::FsmError;
pub use machine::StateMachine;
