use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A `{name, event_type}` pair from the `dress_codes` reference table.
/// Unknown fields are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DressCode {
    pub name: String,
    pub event_type: String,
}

impl DressCode {
    pub fn new(name: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self { name: name.into(), event_type: event_type.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name is required".into()));
        }
        if self.event_type.trim().is_empty() {
            return Err(ModelError::Validation("event_type is required".into()));
        }
        Ok(())
    }
}
