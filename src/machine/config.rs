//! Construction-time options for the state machine.

use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`StateMachine`](super::StateMachine).
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs to name what it changes:
///
/// ```rust
/// use tickstate::machine::MachineConfig;
///
/// let config: MachineConfig =
///     serde_json::from_str(r#"{ "ignore_unknown_actions": false }"#).unwrap();
/// assert!(!config.ignore_unknown_actions);
/// assert!(config.ignore_self_transitions);
/// assert!(config.strict_guarding);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// A guard that rejects a transition fails the action instead of
    /// silently ignoring it.
    pub strict_guarding: bool,

    /// Actions leading back to the current state fire no callbacks.
    pub ignore_self_transitions: bool,

    /// Actions undefined for the current state are no-ops instead of errors.
    pub ignore_unknown_actions: bool,

    /// Log initialization, actions and state changes at debug level.
    pub verbose: bool,

    /// Most recent state changes kept in the machine's history. `None`
    /// keeps every change.
    pub history_limit: Option<usize>,
}

/// History cap applied by [`MachineConfig::default`].
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            strict_guarding: true,
            ignore_self_transitions: true,
            ignore_unknown_actions: true,
            verbose: false,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ignore_self_transitions_and_unknown_actions() {
        let config = MachineConfig::default();
        assert!(config.strict_guarding);
        assert!(config.ignore_self_transitions);
        assert!(config.ignore_unknown_actions);
        assert!(!config.verbose);
        assert_eq!(config.history_limit, Some(DEFAULT_HISTORY_LIMIT));
    }

    #[test]
    fn null_history_limit_means_unbounded() {
        let config: MachineConfig = serde_json::from_str(r#"{ "history_limit": null }"#).unwrap();
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config: MachineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = MachineConfig {
            strict_guarding: false,
            verbose: true,
            ..MachineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MachineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
