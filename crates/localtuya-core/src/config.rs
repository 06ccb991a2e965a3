//! Device and entity configuration.
//!
//! A config entry describes one device and the entities exposed from its data
//! points. Entries are written in TOML or JSON:
//!
//! ```toml
//! device_id = "bf0123456789abcdef"
//! host = "192.168.1.40"
//! local_key = "0123456789abcdef"
//! friendly_name = "Front door"
//!
//! [[entities]]
//! id = "1"
//! friendly_name = "Front door lock"
//! platform = "lock"
//! lock_commands_set = "open_close"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dp::DpId;

/// Well-known option keys.
pub mod keys {
    /// Command preset used by lock entities.
    pub const LOCK_COMMANDS_SET: &str = "lock_commands_set";
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One configured device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Tuya device id
    pub device_id: String,
    /// Address of the device on the local network
    pub host: String,
    /// Local encryption key
    #[serde(default)]
    pub local_key: String,
    /// Tuya protocol version
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Human-readable device name
    #[serde(default)]
    pub friendly_name: String,
    /// Entities exposed by this device
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

fn default_protocol_version() -> String {
    "3.3".to_string()
}

impl ConfigEntry {
    pub fn new(device_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            host: host.into(),
            local_key: String::new(),
            protocol_version: default_protocol_version(),
            friendly_name: String::new(),
            entities: Vec::new(),
        }
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = name.into();
        self
    }

    pub fn with_local_key(mut self, key: impl Into<String>) -> Self {
        self.local_key = key.into();
        self
    }

    pub fn with_entity(mut self, entity: EntityConfig) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let entry: Self = toml::from_str(s)?;
        entry.validate()?;
        Ok(entry)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let entry: Self = serde_json::from_str(s)?;
        entry.validate()?;
        Ok(entry)
    }

    /// Load an entry from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Entities configured for `platform`.
    pub fn entities_for<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a EntityConfig> {
        self.entities.iter().filter(move |e| e.platform == platform)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.device_id.is_empty() {
            return Err(ConfigError::Invalid("device_id is empty".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            if !seen.insert(&entity.id) {
                return Err(ConfigError::Invalid(format!(
                    "data point {} configured twice",
                    entity.id
                )));
            }
        }
        Ok(())
    }
}

/// One entity bound to a data point of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Data point the entity reads and writes
    pub id: DpId,
    /// Human-readable entity name
    #[serde(default)]
    pub friendly_name: String,
    /// Entity platform ("lock", "switch", ...)
    pub platform: String,
    /// Platform-specific optional settings
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl EntityConfig {
    pub fn new(id: impl Into<DpId>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            friendly_name: String::new(),
            platform: platform.into(),
            options: Map::new(),
        }
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = name.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}
