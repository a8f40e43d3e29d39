//! Listener handles and message payloads.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Opaque payload passed to listeners.
///
/// The bus clones the handle, never the payload. Listeners downcast to the
/// type they expect and get `None` on a mismatch.
///
/// # Example
///
/// ```rust
/// use tickstate::events::Message;
///
/// let message = Message::new(String::from("test"));
/// assert_eq!(message.downcast_ref::<String>().map(String::as_str), Some("test"));
/// assert!(message.downcast_ref::<i32>().is_none());
/// assert!(Message::empty().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct Message(Option<Rc<dyn Any>>);

impl Message {
    /// Message with no payload, as sent by the tick events.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn new<T: Any>(payload: T) -> Self {
        Self(Some(Rc::new(payload)))
    }

    /// Wrap an already shared payload without copying it.
    pub fn from_shared(payload: Rc<dyn Any>) -> Self {
        Self(Some(payload))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|payload| payload.downcast_ref())
    }

    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Message(..)"),
            None => f.write_str("Message(empty)"),
        }
    }
}

/// Callback registered with the bus.
///
/// A listener has a stable identity: clones are the same listener for
/// unsubscribe purposes, while two listeners created separately never are.
#[derive(Clone)]
pub struct Listener {
    id: Uuid,
    callback: Rc<dyn Fn(&Message)>,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Message) + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn call(&self, message: &Message) {
        (self.callback)(message)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn empty_message_downcasts_to_nothing() {
        let message = Message::empty();
        assert!(message.is_empty());
        assert!(!message.is::<()>());
    }

    #[test]
    fn shared_payload_is_not_copied() {
        let payload: Rc<dyn Any> = Rc::new(42u8);
        let message = Message::from_shared(Rc::clone(&payload));
        let copy = message.clone();
        assert_eq!(copy.downcast_ref::<u8>(), Some(&42));
        assert_eq!(Rc::strong_count(&payload), 3);
    }

    #[test]
    fn clones_share_identity() {
        let listener = Listener::new(|_| {});
        let other = Listener::new(|_| {});
        assert_eq!(listener, listener.clone());
        assert_ne!(listener, other);
    }

    #[test]
    fn call_passes_the_message_through() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let listener = Listener::new(move |m| {
            sink.borrow_mut().push(m.downcast_ref::<i32>().copied());
        });

        listener.call(&Message::new(7i32));
        listener.call(&Message::empty());

        assert_eq!(*seen.borrow(), vec![Some(7), None]);
    }
}
