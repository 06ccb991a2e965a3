//! Config-flow schema contributed by the lock platform.
//!
//! The schema only declares which optional settings a lock entity accepts and
//! which values they may take. Rendering and validating forms belongs to the
//! config flow.

use localtuya_core::{keys, DpId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::commands::LockCommandSet;

/// One setting of a platform schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub key: String,
    pub required: bool,
    /// Allowed values; empty means free-form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// Settings a platform recognises for its entities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowSchema {
    pub fields: Vec<SchemaField>,
}

impl FlowSchema {
    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Check `settings` against the schema.
    ///
    /// Returns a message per violation. Keys the schema does not know are
    /// left to other platforms.
    pub fn validate(&self, settings: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        for field in &self.fields {
            match settings.get(&field.key) {
                None if field.required => errors.push(format!("{} is required", field.key)),
                None => {}
                Some(value) if !field.choices.is_empty() => {
                    let allowed = value
                        .as_str()
                        .is_some_and(|v| field.choices.iter().any(|c| c == v));
                    if !allowed {
                        errors.push(format!(
                            "{} must be one of [{}], got {}",
                            field.key,
                            field.choices.join(", "),
                            value
                        ));
                    }
                }
                Some(_) => {}
            }
        }
        errors
    }
}

/// Schema of the optional lock settings.
///
/// `_dps` lists the device's data points; locks offer no data point pickers
/// beyond the entity's own.
pub fn flow_schema(_dps: &[DpId]) -> FlowSchema {
    FlowSchema {
        fields: vec![SchemaField {
            key: keys::LOCK_COMMANDS_SET.to_string(),
            required: false,
            choices: LockCommandSet::ALL
                .iter()
                .map(|set| set.as_str().to_string())
                .collect(),
        }],
    }
}
