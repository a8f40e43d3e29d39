//! Checkpoint and restore support for state machines.
//!
//! A [`Checkpoint`] captures everything about a machine that is data: the
//! current state name, every state's value, the machine-global value and the
//! change history. Callbacks and guards are code and are not captured; a
//! checkpoint is restored into a machine whose states were declared the same
//! way as the one it was taken from.

use crate::core::{StateHistory, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Current state name, `None` for an uninitialized machine
    pub current_state: Option<String>,

    /// Value of every declared state
    pub state_values: BTreeMap<String, Option<Value>>,

    /// Machine-global value
    pub value: Option<Value>,

    /// Completed state changes
    pub history: StateHistory,
}

impl Checkpoint {
    pub(crate) fn new(
        current_state: Option<String>,
        state_values: BTreeMap<String, Option<Value>>,
        value: Option<Value>,
        history: StateHistory,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            current_state,
            state_values,
            value,
            history,
        }
    }

    /// Reject checkpoints written in a format this version cannot read.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateChange;

    fn sample() -> Checkpoint {
        let mut values = BTreeMap::new();
        values.insert("idle".to_string(), None);
        values.insert("running".to_string(), Some(Value::Float(2.5)));
        let history = StateHistory::new().record(StateChange {
            from: "idle".into(),
            to: "running".into(),
            action: "go".into(),
            timestamp: Utc::now(),
        });
        Checkpoint::new(
            Some("running".into()),
            values,
            Some(Value::Text("global".into())),
            history,
        )
    }

    #[test]
    fn new_checkpoint_has_current_version() {
        let checkpoint = sample();
        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert!(checkpoint.validate().is_ok());
        assert!(Uuid::parse_str(&checkpoint.id).is_ok());
    }

    #[test]
    fn json_preserves_contents() {
        let checkpoint = sample();
        let json = checkpoint.to_json().unwrap();
        assert_eq!(Checkpoint::from_json(&json).unwrap(), checkpoint);
    }

    #[test]
    fn binary_preserves_contents() {
        let checkpoint = sample();
        let bytes = checkpoint.to_bytes().unwrap();
        assert_eq!(Checkpoint::from_bytes(&bytes).unwrap(), checkpoint);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut checkpoint = sample();
        checkpoint.version = 99;
        let json = serde_json::to_string(&checkpoint).unwrap();

        assert_eq!(
            Checkpoint::from_json(&json),
            Err(CheckpointError::UnsupportedVersion {
                found: 99,
                supported: CHECKPOINT_VERSION
            })
        );
    }

    #[test]
    fn garbage_input_is_a_deserialization_error() {
        assert!(matches!(
            Checkpoint::from_json("not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
        assert!(matches!(
            Checkpoint::from_bytes(&[0xff, 0x01]),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
