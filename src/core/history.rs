//! State change history tracking.
//!
//! Every completed state change made by the machine is appended to a
//! [`StateHistory`]. Records are plain serializable values so a history can
//! travel inside a checkpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single completed state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Name of the state being left
    pub from: String,
    /// Name of the state arrived at
    pub to: String,
    /// Action that caused the change
    pub action: String,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state changes.
///
/// `record` returns a new history with the change added, leaving the
/// original untouched. The machine itself appends in place with `push` and
/// caps the log with `retain_last`.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{StateChange, StateHistory};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(StateChange {
///     from: "idle".into(),
///     to: "walking".into(),
///     action: "move".into(),
///     timestamp: Utc::now(),
/// });
/// let history = history.record(StateChange {
///     from: "walking".into(),
///     to: "idle".into(),
///     action: "stop".into(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["idle", "walking", "idle"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    changes: VecDeque<StateChange>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            changes: VecDeque::new(),
        }
    }

    /// Record a change, returning a new history.
    pub fn record(&self, change: StateChange) -> Self {
        let mut changes = self.changes.clone();
        changes.push_back(change);
        Self { changes }
    }

    /// Append a change in place.
    pub fn push(&mut self, change: StateChange) {
        self.changes.push_back(change);
    }

    /// Drop the oldest changes until at most `limit` remain.
    pub fn retain_last(&mut self, limit: usize) {
        while self.changes.len() > limit {
            self.changes.pop_front();
        }
    }

    /// Names of the states traversed: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.changes.len() + 1);
        if let Some(first) = self.changes.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.changes.iter().map(|c| c.to.as_str()));
        path
    }

    /// Time between the first and last recorded change.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.changes.front()?, self.changes.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Recorded changes, oldest first.
    pub fn changes(&self) -> impl Iterator<Item = &StateChange> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
