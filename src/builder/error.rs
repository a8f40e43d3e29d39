//! Build errors for the state machine builder.

use crate::machine::FsmError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("No states declared. Call .state(...) before .build()")]
    NoStates,

    #[error(transparent)]
    Machine(#[from] FsmError),
}
