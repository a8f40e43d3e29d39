//! Identities, dispatch keys and event-name validation.
//!
//! Listener lists are indexed by a [`DispatchKey`]: the event name plus the
//! optional target it is addressed to. The key is a structured value rather
//! than a concatenated string, so a bare name never collides with a targeted
//! key and two distinct targets never collapse into one.

use super::error::BusError;
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use uuid::Uuid;

static EVENT_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w./:]+$").unwrap());

/// Fail with [`BusError::InvalidEventName`] unless `name` matches `[\w./:]+`.
pub fn validate_event_name(name: &str) -> Result<(), BusError> {
    if EVENT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(BusError::InvalidEventName(name.to_string()))
    }
}

/// Opaque identity used for event targets and listener owners.
///
/// Equality and hashing use the generated id only; the name is carried for
/// diagnostics. Clones compare equal, separately created identities never do.
///
/// # Example
///
/// ```rust
/// use tickstate::events::Identity;
///
/// let a = Identity::new("player");
/// let b = Identity::new("player");
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Debug)]
pub struct Identity {
    id: Uuid,
    name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// Key under which listeners are stored and looked up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DispatchKey {
    event: String,
    target: Option<Identity>,
}

impl DispatchKey {
    /// Validate `event` and build its key.
    pub(crate) fn new(event: &str, target: Option<&Identity>) -> Result<Self, BusError> {
        validate_event_name(event)?;
        Ok(Self::unchecked(event, target))
    }

    /// Build a key for a name that is already known to be valid.
    pub(crate) fn unchecked(event: &str, target: Option<&Identity>) -> Self {
        Self {
            event: event.to_string(),
            target: target.cloned(),
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}@{}", self.event, target),
            None => f.write_str(&self.event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn accepts_word_dot_slash_and_colon() {
        for name in ["event", "EventBus.update", "ui/button:click", "a_1.b/c"] {
            assert!(validate_event_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_spaces_and_punctuation() {
        for name in ["event ", "", "bad name", "at@sign", "dash-ed", "a(b)"] {
            assert_eq!(
                validate_event_name(name),
                Err(BusError::InvalidEventName(name.to_string()))
            );
        }
    }

    #[test]
    fn bare_and_targeted_keys_differ() {
        let target = Identity::new("target");
        let bare = DispatchKey::new("event", None).unwrap();
        let targeted = DispatchKey::new("event", Some(&target)).unwrap();
        assert_ne!(bare, targeted);
    }

    #[test]
    fn targets_with_equal_names_do_not_collide() {
        let first = Identity::new("enemy");
        let second = Identity::new("enemy");
        let keys: HashSet<_> = [
            DispatchKey::unchecked("hit", Some(&first)),
            DispatchKey::unchecked("hit", Some(&second)),
            DispatchKey::unchecked("hit", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn key_display_names_the_target() {
        let target = Identity::new("door");
        let key = DispatchKey::unchecked("open", Some(&target));
        assert_eq!(key.to_string(), format!("open@door({})", target.id()));
        assert_eq!(DispatchKey::unchecked("open", None).to_string(), "open");
    }

    #[test]
    fn invalid_name_fails_key_construction() {
        assert!(matches!(
            DispatchKey::new("no spaces", None),
            Err(BusError::InvalidEventName(_))
        ));
    }
}
