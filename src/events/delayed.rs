//! Pending deliveries scheduled with `trigger_after`.

use super::key::{DispatchKey, Identity};
use super::listener::Message;
use std::cmp::Ordering;

/// Event waiting for its fire time.
///
/// The payload is held by handle. Whatever it refers to must still make sense
/// to the listeners when the entry fires.
#[derive(Clone, Debug)]
pub(crate) struct DelayedEvent {
    pub event: String,
    pub message: Message,
    pub target: Option<Identity>,
    pub fire_at: f64,
    pub seq: u64,
}

impl DelayedEvent {
    pub fn is_due(&self, now: f64) -> bool {
        now >= self.fire_at
    }

    pub fn matches(&self, event: &str, target: Option<&Identity>) -> bool {
        self.event == event && self.target.as_ref() == target
    }

    pub fn key(&self) -> DispatchKey {
        DispatchKey::unchecked(&self.event, self.target.as_ref())
    }

    /// Earlier fire time first, then scheduling order.
    pub fn fire_order(&self, other: &Self) -> Ordering {
        self.fire_at
            .total_cmp(&other.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(event: &str, target: Option<&Identity>, fire_at: f64, seq: u64) -> DelayedEvent {
        DelayedEvent {
            event: event.to_string(),
            message: Message::empty(),
            target: target.cloned(),
            fire_at,
            seq,
        }
    }

    #[test]
    fn due_at_exact_fire_time() {
        let delayed = entry("event", None, 1001.0, 0);
        assert!(!delayed.is_due(1000.0));
        assert!(delayed.is_due(1001.0));
        assert!(delayed.is_due(10001.0));
    }

    #[test]
    fn matching_requires_same_target() {
        let target = Identity::new("target");
        let targeted = entry("event", Some(&target), 0.0, 0);

        assert!(targeted.matches("event", Some(&target)));
        assert!(!targeted.matches("event", None));
        assert!(!targeted.matches("other", Some(&target)));
        assert!(!targeted.matches("event", Some(&Identity::new("target"))));
    }

    #[test]
    fn fire_order_breaks_ties_by_sequence() {
        let mut entries = [
            entry("c", None, 2.0, 0),
            entry("b", None, 1.0, 2),
            entry("a", None, 1.0, 1),
        ];
        entries.sort_by(DelayedEvent::fire_order);
        let order: Vec<_> = entries.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
