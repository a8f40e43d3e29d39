//! Builder API for ergonomic bus and state machine construction.
//!
//! Builders collect configuration by value and validate it all at once in
//! `build()`, so a half-declared machine is never observable.

pub mod bus;
pub mod error;
pub mod machine;

pub use bus::EventBusBuilder;
pub use error::BuildError;
pub use machine::StateMachineBuilder;
