//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Guard, State, StateCallback, Value};
use crate::events::EventBus;
use crate::machine::{MachineConfig, StateMachine};
use std::rc::Rc;

/// Builder for constructing a [`StateMachine`] with a fluent API.
///
/// Declarations are applied in a fixed order when [`build`](Self::build) runs:
/// states, explicit transitions, actions, the change callback and finally the
/// initial state. The first failing declaration aborts the build.
///
/// ```rust
/// use tickstate::core::{Guard, State};
/// use tickstate::machine::StateMachine;
///
/// # fn main() -> Result<(), tickstate::builder::BuildError> {
/// let light = StateMachine::builder()
///     .state(State::new("red"))
///     .state(State::new("green"))
///     .transition("red", "green", Guard::always())
///     .action("red", "go", "green")
///     .action("green", "stop", "red")
///     .initial("red", None)
///     .build()?;
///
/// assert_eq!(light.available_actions().unwrap(), vec!["go"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct StateMachineBuilder {
    bus: Option<Rc<EventBus>>,
    config: MachineConfig,
    states: Vec<State>,
    transitions: Vec<(String, String, Guard)>,
    actions: Vec<(String, String, String)>,
    on_change: Option<StateCallback>,
    initial: Option<(String, Option<Value>)>,
}

impl StateMachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose update tick drives the states' update callbacks.
    pub fn event_bus(mut self, bus: Rc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict_guarding(mut self, strict: bool) -> Self {
        self.config.strict_guarding = strict;
        self
    }

    pub fn ignore_self_transitions(mut self, ignore: bool) -> Self {
        self.config.ignore_self_transitions = ignore;
        self
    }

    pub fn ignore_unknown_actions(mut self, ignore: bool) -> Self {
        self.config.ignore_unknown_actions = ignore;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Most recent changes kept in the history; `None` keeps every change.
    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.config.history_limit = limit;
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    pub fn transition(mut self, from: &str, to: &str, guard: Guard) -> Self {
        self.transitions
            .push((from.to_string(), to.to_string(), guard));
        self
    }

    pub fn action(mut self, from: &str, action: &str, to: &str) -> Self {
        self.actions
            .push((from.to_string(), action.to_string(), to.to_string()));
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&State) + 'static,
    {
        self.on_change = Some(Rc::new(callback));
        self
    }

    /// State to initialize into after everything else is declared.
    /// Without one the machine is built uninitialized.
    pub fn initial(mut self, name: &str, value: Option<Value>) -> Self {
        self.initial = Some((name.to_string(), value));
        self
    }

    /// Build the state machine.
    /// Returns an error if no state was declared or any declaration is rejected.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let machine = StateMachine::from_parts(self.bus, self.config);
        for state in self.states {
            machine.add_state(state)?;
        }
        for (from, to, guard) in self.transitions {
            machine.add_transition(&from, &to, Some(guard))?;
        }
        for (from, action, to) in &self.actions {
            machine.add_action(from, action, to)?;
        }
        if let Some(on_change) = self.on_change {
            machine.set_on_change(move |state| on_change(state));
        }
        if let Some((name, value)) = self.initial {
            machine.initialize(&name, value)?;
        }

        Ok(machine)
    }
}
