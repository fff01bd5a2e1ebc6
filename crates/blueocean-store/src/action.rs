//! Dispatchable actions
//!
//! An action is a flat mapping with a mandatory `type` discriminator plus any
//! payload fields, e.g. `{"type": "ADD_PIPELINE", "pipeline": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An intended state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Discriminator used to pick the reducer
    #[serde(rename = "type")]
    action_type: String,

    /// Everything else carried by the action
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
        }
    }

    /// Builder-style payload field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// A payload field that must be a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}
