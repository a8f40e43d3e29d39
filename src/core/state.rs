//! State records held by the state machine.
//!
//! A [`State`] is immutable once declared. Replacing its value produces a new
//! record that shares the original name and callbacks.

use super::value::Value;
use std::fmt;
use std::rc::Rc;

/// Callback invoked with a state snapshot (arrive, update and on-change hooks).
pub type StateCallback = Rc<dyn Fn(&State)>;

/// A named state with optional callbacks and an optional value.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{State, Value};
///
/// let idle = State::new("idle").with_value(Some(Value::Int(3)));
/// assert_eq!(idle.name(), "idle");
/// assert_eq!(idle.value().unwrap().as_int(), Ok(3));
///
/// let reset = idle.with_value(None);
/// assert!(reset.value().is_none());
/// assert_eq!(idle.value(), Some(&Value::Int(3)));
/// ```
#[derive(Clone)]
pub struct State {
    name: String,
    on_arrive: Option<StateCallback>,
    on_update: Option<StateCallback>,
    value: Option<Value>,
}

impl State {
    /// Create a state with no callbacks and no value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_arrive: None,
            on_update: None,
            value: None,
        }
    }

    /// Attach an arrive callback, consuming the state.
    pub fn on_arrive<F>(mut self, callback: F) -> Self
    where
        F: Fn(&State) + 'static,
    {
        self.on_arrive = Some(Rc::new(callback));
        self
    }

    /// Attach an update callback, consuming the state.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&State) + 'static,
    {
        self.on_update = Some(Rc::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn has_update(&self) -> bool {
        self.on_update.is_some()
    }

    pub(crate) fn arrive_callback(&self) -> Option<StateCallback> {
        self.on_arrive.clone()
    }

    pub(crate) fn update_callback(&self) -> Option<StateCallback> {
        self.on_update.clone()
    }

    /// New record with the same name and callbacks but a different value.
    pub fn with_value(&self, value: Option<Value>) -> Self {
        Self {
            name: self.name.clone(),
            on_arrive: self.on_arrive.clone(),
            on_update: self.on_update.clone(),
            value,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("on_arrive", &self.on_arrive.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("value", &self.value)
            .finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}
