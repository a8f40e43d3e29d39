//! Publish/subscribe bus with targeted addressing and delayed delivery.

use super::delayed::DelayedEvent;
use super::error::BusError;
use super::key::{validate_event_name, DispatchKey, Identity};
use super::listener::{Listener, Message};
use super::time::TimeSource;
use crate::builder::EventBusBuilder;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Event triggered by [`EventBus::tick`], once per host frame.
pub const UPDATE_EVENT: &str = "EventBus.update";

/// Event triggered by [`EventBus::tick_and_flush`] before delayed delivery.
pub const ALWAYS_UPDATE_EVENT: &str = "EventBus.alwaysUpdate";

/// One entry in a key's listener list.
#[derive(Clone, Debug)]
struct Registration {
    listener: Listener,
    owner: Option<Identity>,
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<DispatchKey, Vec<Registration>>,
    /// Keys under which each owner has registered. Registrations themselves
    /// carry their owner, so this only narrows the search.
    owners: HashMap<Identity, HashSet<DispatchKey>>,
    delayed: Vec<DelayedEvent>,
    next_seq: u64,
}

impl Registry {
    fn attach(&mut self, key: DispatchKey, registration: Registration) {
        if let Some(owner) = &registration.owner {
            self.owners
                .entry(owner.clone())
                .or_default()
                .insert(key.clone());
        }
        self.listeners.entry(key).or_default().push(registration);
    }

    /// Drop every registration in `key` matching `remove`; returns the count.
    ///
    /// An owner left with no registration under `key` loses that key from
    /// the owner index, and its entry once no keys remain.
    fn detach_where<F>(&mut self, key: &DispatchKey, mut remove: F) -> usize
    where
        F: FnMut(&Registration) -> bool,
    {
        let Some(list) = self.listeners.get_mut(key) else {
            return 0;
        };
        let mut removed = 0;
        let mut released: Vec<Identity> = Vec::new();
        list.retain(|r| {
            if !remove(r) {
                return true;
            }
            removed += 1;
            if let Some(owner) = &r.owner {
                if !released.contains(owner) {
                    released.push(owner.clone());
                }
            }
            false
        });
        released.retain(|owner| !list.iter().any(|r| r.owner.as_ref() == Some(owner)));
        if list.is_empty() {
            self.listeners.remove(key);
        }
        for owner in &released {
            self.release_owner_key(owner, key);
        }
        removed
    }

    fn release_owner_key(&mut self, owner: &Identity, key: &DispatchKey) {
        let Some(keys) = self.owners.get_mut(owner) else {
            return;
        };
        keys.remove(key);
        if keys.is_empty() {
            self.owners.remove(owner);
        }
    }
}

/// Delivers named messages to listeners.
///
/// Immediate triggers run synchronously on the caller's stack. Delayed
/// triggers are stored with a fire time read from the bus's [`TimeSource`]
/// and delivered by [`tick_and_flush`](Self::tick_and_flush) once due.
///
/// All methods take `&self`; listeners may subscribe, unsubscribe and trigger
/// on the same bus while a dispatch is in flight. A dispatch runs over the
/// listener list as it was when the trigger started.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tickstate::events::{EventBus, Listener, Message};
///
/// let bus = EventBus::new();
/// let total = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&total);
/// let listener = Listener::new(move |m: &Message| {
///     sink.set(sink.get() + m.downcast_ref::<i32>().copied().unwrap_or(0));
/// });
///
/// bus.subscribe("score.add", &listener, None).unwrap();
/// bus.trigger("score.add", Message::new(5), None).unwrap();
/// bus.trigger("score.add", Message::new(2), None).unwrap();
/// assert_eq!(total.get(), 7);
/// ```
pub struct EventBus {
    registry: RefCell<Registry>,
    time_source: Option<TimeSource>,
    verbose: Cell<bool>,
}

impl EventBus {
    /// Bus without a time source. Delayed delivery is unavailable.
    pub fn new() -> Self {
        Self::from_parts(None, false)
    }

    pub fn with_time_source(time_source: TimeSource) -> Self {
        Self::from_parts(Some(time_source), false)
    }

    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn from_parts(time_source: Option<TimeSource>, verbose: bool) -> Self {
        Self {
            registry: RefCell::new(Registry::default()),
            time_source,
            verbose: Cell::new(verbose),
        }
    }

    /// Toggle diagnostic logging of subscriptions, triggers and delayed events.
    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.set(verbose);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.get()
    }

    pub fn has_time_source(&self) -> bool {
        self.time_source.is_some()
    }

    /// Register `listener` for `event`, or for `event` addressed to `target`.
    ///
    /// A listener registered with a target only hears triggers naming that
    /// target; one registered without a target never hears targeted triggers.
    pub fn subscribe(
        &self,
        event: &str,
        listener: &Listener,
        target: Option<&Identity>,
    ) -> Result<(), BusError> {
        let key = DispatchKey::new(event, target)?;
        self.attach(key, listener, None);
        Ok(())
    }

    /// Like [`subscribe`](Self::subscribe), grouping the registration under
    /// `owner` so [`unsubscribe_owner`](Self::unsubscribe_owner) can revoke it.
    pub fn subscribe_owned(
        &self,
        owner: &Identity,
        event: &str,
        listener: &Listener,
        target: Option<&Identity>,
    ) -> Result<(), BusError> {
        let key = DispatchKey::new(event, target)?;
        self.attach(key, listener, Some(owner));
        Ok(())
    }

    fn attach(&self, key: DispatchKey, listener: &Listener, owner: Option<&Identity>) {
        if self.is_verbose() {
            debug!(key = %key, owner = owner.map(Identity::name), "event listener added");
        }
        self.registry.borrow_mut().attach(
            key,
            Registration {
                listener: listener.clone(),
                owner: owner.cloned(),
            },
        );
    }

    /// Remove one registration of `listener` for `event` and `target`.
    ///
    /// Removing a registration that does not exist is not an error.
    pub fn unsubscribe(
        &self,
        event: &str,
        listener: &Listener,
        target: Option<&Identity>,
    ) -> Result<(), BusError> {
        let key = DispatchKey::new(event, target)?;
        let mut first = true;
        let removed = self.registry.borrow_mut().detach_where(&key, |r| {
            let hit = first && r.listener == *listener;
            if hit {
                first = false;
            }
            hit
        });
        if self.is_verbose() && removed > 0 {
            debug!(key = %key, "event listener removed");
        }
        Ok(())
    }

    /// Remove every registration of `listener`, under any name or target.
    pub fn unsubscribe_listener(&self, listener: &Listener) {
        let removed = {
            let mut registry = self.registry.borrow_mut();
            let keys: Vec<DispatchKey> = registry.listeners.keys().cloned().collect();
            keys.iter()
                .map(|key| registry.detach_where(key, |r| r.listener == *listener))
                .sum::<usize>()
        };
        if self.is_verbose() && removed > 0 {
            debug!(listener = %listener.id(), removed, "listener removed from all events");
        }
    }

    /// Revoke every registration made through
    /// [`subscribe_owned`](Self::subscribe_owned) for `owner`.
    ///
    /// Registrations made without an owner, or by another owner, are kept.
    pub fn unsubscribe_owner(&self, owner: &Identity) {
        let removed = {
            let mut registry = self.registry.borrow_mut();
            let Some(keys) = registry.owners.remove(owner) else {
                return;
            };
            keys.iter()
                .map(|key| registry.detach_where(key, |r| r.owner.as_ref() == Some(owner)))
                .sum::<usize>()
        };
        if self.is_verbose() {
            debug!(owner = %owner, removed, "owner listeners removed");
        }
    }

    /// Deliver `message` to every listener registered for `event` and
    /// `target`, in registration order.
    pub fn trigger(
        &self,
        event: &str,
        message: Message,
        target: Option<&Identity>,
    ) -> Result<(), BusError> {
        let key = DispatchKey::new(event, target)?;
        self.dispatch(&key, &message);
        Ok(())
    }

    fn dispatch(&self, key: &DispatchKey, message: &Message) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .get(key)
            .map(|list| list.iter().map(|r| r.listener.clone()).collect())
            .unwrap_or_default();

        if self.is_verbose() {
            debug!(key = %key, listeners = listeners.len(), "event triggered");
        }
        for listener in &listeners {
            listener.call(message);
        }
    }

    /// Schedule `message` for delivery `delay` seconds from now.
    ///
    /// Nothing is dispatched until a [`tick_and_flush`](Self::tick_and_flush)
    /// runs at or after the fire time.
    pub fn trigger_after(
        &self,
        delay: f64,
        event: &str,
        message: Message,
        target: Option<&Identity>,
    ) -> Result<(), BusError> {
        validate_event_name(event)?;
        let fire_at = self.now()? + delay;

        let mut registry = self.registry.borrow_mut();
        let seq = registry.next_seq;
        registry.next_seq += 1;
        registry.delayed.push(DelayedEvent {
            event: event.to_string(),
            message,
            target: target.cloned(),
            fire_at,
            seq,
        });

        if self.is_verbose() {
            debug!(event, target = target.map(Identity::name), fire_at, "delayed event scheduled");
        }
        Ok(())
    }

    /// Cancel every pending delayed event for `event` and `target`.
    ///
    /// The target must match exactly: flushing without a target leaves
    /// targeted entries pending. Returns the number of entries removed.
    pub fn flush_delayed(&self, event: &str, target: Option<&Identity>) -> Result<usize, BusError> {
        validate_event_name(event)?;
        let removed = {
            let mut registry = self.registry.borrow_mut();
            let before = registry.delayed.len();
            registry.delayed.retain(|e| !e.matches(event, target));
            before - registry.delayed.len()
        };
        if self.is_verbose() && removed > 0 {
            debug!(event, removed, "delayed events flushed");
        }
        Ok(removed)
    }

    pub fn pending_delayed(&self) -> usize {
        self.registry.borrow().delayed.len()
    }

    pub fn listener_count(
        &self,
        event: &str,
        target: Option<&Identity>,
    ) -> Result<usize, BusError> {
        let key = DispatchKey::new(event, target)?;
        Ok(self
            .registry
            .borrow()
            .listeners
            .get(&key)
            .map_or(0, Vec::len))
    }

    /// Registrations across every name and target.
    pub fn total_listener_count(&self) -> usize {
        self.registry.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Trigger [`UPDATE_EVENT`] with an empty message.
    pub fn tick(&self) {
        self.dispatch(&DispatchKey::unchecked(UPDATE_EVENT, None), &Message::empty());
    }

    /// Trigger [`ALWAYS_UPDATE_EVENT`], then deliver every delayed event whose
    /// fire time has been reached.
    ///
    /// Due entries are removed from the pending list before any of them is
    /// delivered, and fire in order of fire time. Entries scheduled while the
    /// flush runs wait for the next call. A panicking listener aborts the rest
    /// of the pass; due entries not yet delivered are dropped.
    pub fn tick_and_flush(&self) -> Result<(), BusError> {
        let now = self.now()?;
        self.dispatch(
            &DispatchKey::unchecked(ALWAYS_UPDATE_EVENT, None),
            &Message::empty(),
        );

        let due = {
            let mut registry = self.registry.borrow_mut();
            let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut registry.delayed)
                .into_iter()
                .partition(|e| e.is_due(now));
            registry.delayed = pending;
            due.sort_by(DelayedEvent::fire_order);
            due
        };

        for entry in due {
            if self.is_verbose() {
                debug!(event = %entry.event, fire_at = entry.fire_at, now, "delayed event fired");
            }
            self.dispatch(&entry.key(), &entry.message);
        }
        Ok(())
    }

    fn now(&self) -> Result<f64, BusError> {
        self.time_source
            .as_ref()
            .map(TimeSource::now)
            .ok_or(BusError::MissingTimeSource)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
