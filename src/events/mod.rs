//! Publish/subscribe event bus with timer-scheduled delivery.
//!
//! The bus owns every subscription, keyed by event name and optionally by a
//! target [`Identity`]. Immediate triggers dispatch synchronously; delayed
//! triggers are stored with a fire time and delivered by the periodic
//! [`EventBus::tick_and_flush`].
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tickstate::events::{EventBus, Identity, Listener, ManualClock, Message};
//!
//! let clock = ManualClock::new(1000.0);
//! let bus = EventBus::with_time_source(clock.source());
//! let door = Identity::new("door");
//!
//! let opened = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&opened);
//! let listener = Listener::new(move |m: &Message| {
//!     sink.borrow_mut().push(m.downcast_ref::<u32>().copied());
//! });
//! bus.subscribe("door.open", &listener, Some(&door)).unwrap();
//!
//! bus.trigger_after(1.0, "door.open", Message::new(7u32), Some(&door)).unwrap();
//! bus.tick_and_flush().unwrap();
//! assert!(opened.borrow().is_empty());
//!
//! clock.advance(1.0);
//! bus.tick_and_flush().unwrap();
//! assert_eq!(*opened.borrow(), vec![Some(7)]);
//! ```

mod bus;
mod delayed;
mod error;
mod key;
mod listener;
mod time;

pub use bus::{EventBus, ALWAYS_UPDATE_EVENT, UPDATE_EVENT};
pub use error::BusError;
pub use key::{validate_event_name, Identity};
pub use listener::{Listener, Message};
pub use time::{ManualClock, TimeSource};
