//! Event bus errors.

use thiserror::Error;

/// Errors that can occur when subscribing to or triggering events.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BusError {
    /// The event name contains characters outside `[\w./:]`
    #[error("Invalid event name \"{0}\"")]
    InvalidEventName(String),

    /// A time-dependent operation ran on a bus built without a time source
    #[error("No time source has been provided for this event bus")]
    MissingTimeSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            BusError::InvalidEventName("event ".into()).to_string(),
            "Invalid event name \"event \""
        );
        assert_eq!(
            BusError::MissingTimeSource.to_string(),
            "No time source has been provided for this event bus"
        );
    }
}
