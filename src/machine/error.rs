//! State machine errors.

use crate::events::BusError;
use thiserror::Error;

/// Errors raised by [`StateMachine`](super::StateMachine) operations.
///
/// Every variant is a contract violation reported at the offending call;
/// none leaves the machine partially updated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FsmError {
    #[error("State \"{0}\" already exists")]
    StateAlreadyExists(String),

    #[error("State \"{0}\" is unknown")]
    UnknownState(String),

    #[error("The state machine has already been initialized")]
    AlreadyInitialized,

    #[error("The state machine has not been initialized yet")]
    UninitializedMachine,

    #[error("Transition from \"{from}\" to \"{to}\" already defined")]
    TransitionAlreadyDefined { from: String, to: String },

    #[error("Action \"{action}\" for \"{state}\" state has already been defined")]
    ActionAlreadyExists { state: String, action: String },

    #[error("Unknown action \"{action}\" for state \"{state}\"")]
    UnknownAction { state: String, action: String },

    #[error("No event bus on this state machine to take care of update events")]
    NoEventBusConfigured,

    #[error("Guard rejected transition from \"{from}\" to \"{to}\"")]
    GuardRejected { from: String, to: String },

    #[error(transparent)]
    Bus(#[from] BusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_quote_names() {
        assert_eq!(
            FsmError::StateAlreadyExists("state".into()).to_string(),
            "State \"state\" already exists"
        );
        assert_eq!(
            FsmError::TransitionAlreadyDefined {
                from: "state".into(),
                to: "state2".into()
            }
            .to_string(),
            "Transition from \"state\" to \"state2\" already defined"
        );
        assert_eq!(
            FsmError::ActionAlreadyExists {
                state: "from state".into(),
                action: "doit".into()
            }
            .to_string(),
            "Action \"doit\" for \"from state\" state has already been defined"
        );
    }

    #[test]
    fn bus_errors_pass_through() {
        let err: FsmError = BusError::MissingTimeSource.into();
        assert_eq!(err.to_string(), BusError::MissingTimeSource.to_string());
    }
}
