//! Configured device entities.
//!
//! [`DeviceEntity`] is the part every platform entity shares: the device
//! handle, its configuration and the data point it is bound to. Platform
//! types (locks, switches, ...) embed it and implement [`Entity`] so the
//! device layer can notify them.

use std::sync::Arc;

use serde_json::Value;
use tracing::Span;

use crate::config::{ConfigEntry, EntityConfig};
use crate::device::TuyaDevice;
use crate::dp::{DpId, DpValue};

/// Entity driven by device status notifications.
pub trait Entity: Send + Sync {
    /// Data point the entity mirrors.
    fn dp_id(&self) -> &DpId;

    /// Called when fresh status data arrived for the entity's data point.
    fn status_updated(&self);
}

/// Shared state of an entity bound to one data point of a device.
#[derive(Clone)]
pub struct DeviceEntity {
    device: Arc<dyn TuyaDevice>,
    config_entry: Arc<ConfigEntry>,
    dp_id: DpId,
    config: EntityConfig,
    span: Span,
}

impl DeviceEntity {
    /// Bind an entity to `dp_id`.
    ///
    /// `config` defaults to a bare entity config for `dp_id` when the entry
    /// has no settings for it. `span` is the logging context for everything
    /// the entity does.
    pub fn new(
        device: Arc<dyn TuyaDevice>,
        config_entry: Arc<ConfigEntry>,
        dp_id: DpId,
        config: Option<EntityConfig>,
        span: Span,
    ) -> Self {
        let config = config
            .or_else(|| {
                config_entry
                    .entities
                    .iter()
                    .find(|e| e.id == dp_id)
                    .cloned()
            })
            .unwrap_or_else(|| EntityConfig::new(dp_id.clone(), ""));
        Self {
            device,
            config_entry,
            dp_id,
            config,
            span,
        }
    }

    /// Entity name, falling back to the device name and data point.
    pub fn name(&self) -> String {
        if !self.config.friendly_name.is_empty() {
            self.config.friendly_name.clone()
        } else if !self.config_entry.friendly_name.is_empty() {
            format!("{} {}", self.config_entry.friendly_name, self.dp_id)
        } else {
            format!("{} {}", self.config_entry.device_id, self.dp_id)
        }
    }

    /// Stable identifier of the entity across restarts.
    pub fn unique_id(&self) -> String {
        format!("local_{}_{}", self.config_entry.device_id, self.dp_id)
    }

    pub fn dp_id(&self) -> &DpId {
        &self.dp_id
    }

    pub fn device(&self) -> &Arc<dyn TuyaDevice> {
        &self.device
    }

    pub fn config_entry(&self) -> &ConfigEntry {
        &self.config_entry
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn has_config(&self, key: &str) -> bool {
        self.config.has_option(key)
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.option(key)
    }

    /// Last reported value of `dp_id` on this entity's device.
    pub fn dps(&self, dp_id: &DpId) -> Option<DpValue> {
        self.device.dps(dp_id)
    }
}

impl std::fmt::Debug for DeviceEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceEntity")
            .field("device_id", &self.config_entry.device_id)
            .field("dp_id", &self.dp_id)
            .field("platform", &self.config.platform)
            .finish()
    }
}
