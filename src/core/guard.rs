//! Guard predicates for controlling state transitions.
//!
//! Guards are boolean functions attached to a transition. They are evaluated
//! against the state being left, before any value, callback or current-state
//! change happens.

use super::state::State;
use std::fmt;
use std::rc::Rc;

/// Predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{Guard, State, Value};
///
/// let has_fuel = Guard::new(|s: &State| {
///     s.value().and_then(|v| v.as_int().ok()).unwrap_or(0) > 0
/// });
///
/// assert!(has_fuel.check(&State::new("parked").with_value(Some(Value::Int(5)))));
/// assert!(!has_fuel.check(&State::new("parked")));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Rc<dyn Fn(&State) -> bool>,
}

impl Guard {
    /// Create a guard from a predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&State) -> bool + 'static,
    {
        Guard {
            predicate: Rc::new(predicate),
        }
    }

    /// Guard that permits every transition.
    ///
    /// Used for transitions declared without a guard and for the ones
    /// created implicitly by `add_action`.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Check if the guard allows leaving `state`.
    pub fn check(&self, state: &State) -> bool {
        (self.predicate)(state)
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn always_guard_permits_everything() {
        let guard = Guard::always();
        assert!(guard.check(&State::new("a")));
        assert!(guard.check(&State::new("b").with_value(Some(Value::Bool(false)))));
    }

    #[test]
    fn guard_allows_matching_states() {
        let guard = Guard::new(|s: &State| s.name() == "idle");

        assert!(guard.check(&State::new("idle")));
        assert!(!guard.check(&State::new("running")));
    }

    #[test]
    fn guard_can_inspect_state_value() {
        let guard = Guard::new(|s: &State| matches!(s.value(), Some(Value::Bool(true))));

        assert!(guard.check(&State::new("door").with_value(Some(Value::Bool(true)))));
        assert!(!guard.check(&State::new("door").with_value(Some(Value::Bool(false)))));
        assert!(!guard.check(&State::new("door")));
    }

    #[test]
    fn guard_is_deterministic() {
        let state = State::new("processing");
        let guard = Guard::new(|s: &State| s.name().starts_with("proc"));

        assert_eq!(guard.check(&state), guard.check(&state));
    }
}
