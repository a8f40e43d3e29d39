//! Guarded finite state machine driven by action names.

use super::config::MachineConfig;
use super::error::FsmError;
use crate::builder::StateMachineBuilder;
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{Guard, State, StateCallback, StateChange, StateHistory, Value};
use crate::events::{EventBus, Listener, UPDATE_EVENT};
use chrono::Utc;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

#[derive(Default)]
struct MachineCore {
    states: HashMap<String, Rc<State>>,
    /// from -> to -> guard
    transitions: HashMap<String, HashMap<String, Guard>>,
    /// from -> action -> to
    actions: HashMap<String, HashMap<String, String>>,
    current: Option<Rc<State>>,
    value: Option<Value>,
    on_change: Option<StateCallback>,
    history: StateHistory,
}

impl MachineCore {
    fn state(&self, name: &str) -> Result<Rc<State>, FsmError> {
        self.states
            .get(name)
            .cloned()
            .ok_or_else(|| FsmError::UnknownState(name.to_string()))
    }

    fn current(&self) -> Result<Rc<State>, FsmError> {
        self.current.clone().ok_or(FsmError::UninitializedMachine)
    }

    /// Replace `name`'s record with one holding `value`, refreshing the
    /// current-state reference when it points at the same state.
    fn replace_value(&mut self, name: &str, value: Option<Value>) -> Result<Rc<State>, FsmError> {
        let replaced = Rc::new(self.state(name)?.with_value(value));
        self.states.insert(name.to_string(), Rc::clone(&replaced));
        if self.current.as_ref().is_some_and(|c| c.name() == name) {
            self.current = Some(Rc::clone(&replaced));
        }
        Ok(replaced)
    }

    fn has_transition(&self, from: &str, to: &str) -> bool {
        self.transitions
            .get(from)
            .is_some_and(|targets| targets.contains_key(to))
    }

    fn guard(&self, from: &str, to: &str) -> Option<Guard> {
        self.transitions.get(from)?.get(to).cloned()
    }

    fn action_target(&self, from: &str, action: &str) -> Option<&str> {
        self.actions.get(from)?.get(action).map(String::as_str)
    }
}

/// Finite state machine with named states, declared transitions and
/// string-named actions.
///
/// The machine starts uninitialized. [`initialize`](Self::initialize) sets the
/// first current state; from then on the state only changes through
/// [`do_action`](Self::do_action). States that declare an update callback are
/// driven by the [`UPDATE_EVENT`] tick of the event bus given at construction.
///
/// Mutators take `&self` and return `Result<&Self, FsmError>` so declarations
/// chain with `?`. No internal borrow is held while user callbacks run.
///
/// # Example
///
/// ```rust
/// use tickstate::core::State;
/// use tickstate::machine::StateMachine;
///
/// # fn main() -> Result<(), tickstate::machine::FsmError> {
/// let door = StateMachine::new();
/// door.add_plain_state("closed")?
///     .add_plain_state("open")?
///     .add_action("closed", "push", "open")?
///     .add_action("open", "pull", "closed")?
///     .initialize("closed", None)?;
///
/// door.do_action("push", None)?;
/// assert!(door.is_state("open")?);
/// # Ok(())
/// # }
/// ```
pub struct StateMachine {
    core: Rc<RefCell<MachineCore>>,
    bus: Option<Rc<EventBus>>,
    config: MachineConfig,
    update_listener: OnceCell<Listener>,
}

impl StateMachine {
    /// Machine with default configuration and no event bus.
    pub fn new() -> Self {
        Self::from_parts(None, MachineConfig::default())
    }

    /// Machine whose update callbacks are driven by `bus`.
    pub fn with_event_bus(bus: Rc<EventBus>) -> Self {
        Self::from_parts(Some(bus), MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Self::from_parts(None, config)
    }

    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    pub(crate) fn from_parts(bus: Option<Rc<EventBus>>, config: MachineConfig) -> Self {
        Self {
            core: Rc::new(RefCell::new(MachineCore::default())),
            bus,
            config,
            update_listener: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Declare a state.
    ///
    /// The first state declaring an update callback subscribes the machine to
    /// the bus's update tick; later ones reuse that subscription.
    pub fn add_state(&self, state: State) -> Result<&Self, FsmError> {
        if self.core.borrow().states.contains_key(state.name()) {
            return Err(FsmError::StateAlreadyExists(state.name().to_string()));
        }
        if state.has_update() {
            self.subscribe_to_update()?;
        }
        self.core
            .borrow_mut()
            .states
            .insert(state.name().to_string(), Rc::new(state));
        Ok(self)
    }

    /// Declare a state with no callbacks and no value.
    pub fn add_plain_state(&self, name: &str) -> Result<&Self, FsmError> {
        self.add_state(State::new(name))
    }

    /// Declare a state with no callbacks holding `value`.
    pub fn add_valued_state(&self, name: &str, value: Value) -> Result<&Self, FsmError> {
        self.add_state(State::new(name).with_value(Some(value)))
    }

    fn subscribe_to_update(&self) -> Result<(), FsmError> {
        if self.update_listener.get().is_some() {
            return Ok(());
        }
        let bus = self.bus.as_ref().ok_or(FsmError::NoEventBusConfigured)?;
        let listener = update_listener(Rc::downgrade(&self.core));
        bus.subscribe(UPDATE_EVENT, &listener, None)?;
        let _ = self.update_listener.set(listener);
        Ok(())
    }

    /// Set the first current state, optionally replacing its value.
    ///
    /// No callback fires. Fails once the machine already has a state.
    pub fn initialize(&self, name: &str, value: Option<Value>) -> Result<&Self, FsmError> {
        let mut core = self.core.borrow_mut();
        if core.current.is_some() {
            return Err(FsmError::AlreadyInitialized);
        }
        let state = match value {
            Some(value) => core.replace_value(name, Some(value))?,
            None => core.state(name)?,
        };
        core.current = Some(state);
        if self.config.verbose {
            debug!(state = name, "state machine initialized");
        }
        Ok(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.core.borrow().current.is_some()
    }

    /// Whether the current state is called `name`.
    pub fn is_state(&self, name: &str) -> Result<bool, FsmError> {
        Ok(self.core.borrow().current()?.name() == name)
    }

    pub fn current_state(&self) -> Result<Rc<State>, FsmError> {
        self.core.borrow().current()
    }

    pub fn current_state_name(&self) -> Result<String, FsmError> {
        Ok(self.core.borrow().current()?.name().to_string())
    }

    /// Look up a declared state.
    pub fn state(&self, name: &str) -> Result<Rc<State>, FsmError> {
        self.core.borrow().state(name)
    }

    /// Replace the value of state `name`, returning the new record.
    pub fn set_state_value(&self, name: &str, value: Option<Value>) -> Result<Rc<State>, FsmError> {
        self.core.borrow_mut().replace_value(name, value)
    }

    pub fn set_current_state_value(&self, value: Option<Value>) -> Result<Rc<State>, FsmError> {
        let mut core = self.core.borrow_mut();
        let name = core.current()?.name().to_string();
        core.replace_value(&name, value)
    }

    /// Machine-global value.
    pub fn value(&self) -> Option<Value> {
        self.core.borrow().value.clone()
    }

    pub fn set_value(&self, value: Option<Value>) -> &Self {
        self.core.borrow_mut().value = value;
        self
    }

    /// Declare the transition `from -> to`. Without a guard it always passes.
    pub fn add_transition(
        &self,
        from: &str,
        to: &str,
        guard: Option<Guard>,
    ) -> Result<&Self, FsmError> {
        let mut core = self.core.borrow_mut();
        if core.has_transition(from, to) {
            return Err(FsmError::TransitionAlreadyDefined {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        core.transitions
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), guard.unwrap_or_default());
        Ok(self)
    }

    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.core.borrow().has_transition(from, to)
    }

    /// Declare `action` as leading from `from` to `to`.
    ///
    /// Creates the `from -> to` transition with an always-true guard when it
    /// does not exist yet; an existing transition keeps its guard.
    pub fn add_action(&self, from: &str, action: &str, to: &str) -> Result<&Self, FsmError> {
        let mut core = self.core.borrow_mut();
        core.state(from)?;
        core.state(to)?;
        if core.action_target(from, action).is_some() {
            return Err(FsmError::ActionAlreadyExists {
                state: from.to_string(),
                action: action.to_string(),
            });
        }
        if !core.has_transition(from, to) {
            core.transitions
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string(), Guard::always());
        }
        core.actions
            .entry(from.to_string())
            .or_default()
            .insert(action.to_string(), to.to_string());
        Ok(self)
    }

    pub fn has_action(&self, from: &str, action: &str) -> bool {
        self.core.borrow().action_target(from, action).is_some()
    }

    /// Actions defined for the current state, sorted by name.
    pub fn available_actions(&self) -> Result<Vec<String>, FsmError> {
        let core = self.core.borrow();
        let current = core.current()?;
        let mut actions: Vec<String> = core
            .actions
            .get(current.name())
            .map(|defined| defined.keys().cloned().collect())
            .unwrap_or_default();
        actions.sort();
        Ok(actions)
    }

    /// Run `action` against the current state.
    ///
    /// On success the destination takes `value` (when given), becomes the
    /// current state, then its arrive callback and the on-change callback
    /// run, in that order.
    pub fn do_action(&self, action: &str, value: Option<Value>) -> Result<&Self, FsmError> {
        let (from, to) = {
            let core = self.core.borrow();
            let from = core.current()?;
            match core.action_target(from.name(), action) {
                Some(to) => {
                    let to = to.to_string();
                    (from, to)
                }
                None if self.config.ignore_unknown_actions => {
                    if self.config.verbose {
                        debug!(action, state = from.name(), "unknown action ignored");
                    }
                    return Ok(self);
                }
                None => {
                    return Err(FsmError::UnknownAction {
                        state: from.name().to_string(),
                        action: action.to_string(),
                    })
                }
            }
        };
        self.change_state(&from, &to, action, value)?;
        Ok(self)
    }

    fn change_state(
        &self,
        from: &State,
        to: &str,
        action: &str,
        value: Option<Value>,
    ) -> Result<(), FsmError> {
        if self.config.ignore_self_transitions && from.name() == to {
            return Ok(());
        }

        let guard = self.core.borrow().guard(from.name(), to);
        if guard.is_some_and(|g| !g.check(from)) {
            warn!(from = from.name(), to, action, "guard rejected transition");
            if self.config.strict_guarding {
                return Err(FsmError::GuardRejected {
                    from: from.name().to_string(),
                    to: to.to_string(),
                });
            }
            return Ok(());
        }

        let (arrived, on_change) = {
            let mut core = self.core.borrow_mut();
            let arrived = match value {
                Some(value) => core.replace_value(to, Some(value))?,
                None => core.state(to)?,
            };
            core.current = Some(Rc::clone(&arrived));
            core.history.push(StateChange {
                from: from.name().to_string(),
                to: to.to_string(),
                action: action.to_string(),
                timestamp: Utc::now(),
            });
            if let Some(limit) = self.config.history_limit {
                core.history.retain_last(limit);
            }
            (arrived, core.on_change.clone())
        };

        if self.config.verbose {
            debug!(action, from = from.name(), to, "action changed state");
        }
        if let Some(on_arrive) = arrived.arrive_callback() {
            on_arrive(&arrived);
        }
        if let Some(on_change) = on_change {
            on_change(&arrived);
        }
        Ok(())
    }

    /// Register the callback run after every completed state change,
    /// replacing any previous one.
    pub fn set_on_change<F>(&self, callback: F) -> &Self
    where
        F: Fn(&State) + 'static,
    {
        self.core.borrow_mut().on_change = Some(Rc::new(callback));
        self
    }

    /// Completed state changes, oldest first.
    pub fn history(&self) -> StateHistory {
        self.core.borrow().history.clone()
    }

    /// Snapshot the machine's data for later [`restore`](Self::restore).
    pub fn checkpoint(&self) -> Checkpoint {
        let core = self.core.borrow();
        let state_values = core
            .states
            .iter()
            .map(|(name, state)| (name.clone(), state.value().cloned()))
            .collect();
        Checkpoint::new(
            core.current.as_ref().map(|s| s.name().to_string()),
            state_values,
            core.value.clone(),
            core.history.clone(),
        )
    }

    /// Load a checkpoint taken from a machine with the same declared states.
    ///
    /// Values, the global value, the current state and the history are
    /// replaced. No callback fires. Nothing changes if the checkpoint is
    /// invalid or names an undeclared state.
    pub fn restore(&self, checkpoint: &Checkpoint) -> Result<&Self, CheckpointError> {
        checkpoint.validate()?;
        let mut core = self.core.borrow_mut();

        let unknown = checkpoint
            .state_values
            .keys()
            .chain(checkpoint.current_state.iter())
            .find(|name| !core.states.contains_key(name.as_str()));
        if let Some(name) = unknown {
            return Err(CheckpointError::UnknownState(name.clone()));
        }

        for (name, value) in &checkpoint.state_values {
            let replaced = core.states[name].with_value(value.clone());
            core.states.insert(name.clone(), Rc::new(replaced));
        }
        core.current = checkpoint
            .current_state
            .as_ref()
            .map(|name| Rc::clone(&core.states[name]));
        core.value = checkpoint.value.clone();
        core.history = checkpoint.history.clone();
        if let Some(limit) = self.config.history_limit {
            core.history.retain_last(limit);
        }

        if self.config.verbose {
            debug!(
                checkpoint = %checkpoint.id,
                state = checkpoint.current_state.as_deref(),
                "state machine restored"
            );
        }
        Ok(self)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StateMachine {
    fn drop(&mut self) {
        if let (Some(bus), Some(listener)) = (&self.bus, self.update_listener.get()) {
            bus.unsubscribe_listener(listener);
        }
    }
}

/// Listener running the current state's update callback on each tick.
fn update_listener(core: Weak<RefCell<MachineCore>>) -> Listener {
    Listener::new(move |_| {
        let Some(core) = core.upgrade() else {
            return;
        };
        let current = core.borrow().current.clone();
        if let Some(state) = current {
            if let Some(on_update) = state.update_callback() {
                on_update(&state);
            }
        }
    })
}
