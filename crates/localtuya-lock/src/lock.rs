//! Lock entity backed by a single two-state data point.

use std::sync::Arc;

use async_trait::async_trait;
use localtuya_core::{keys, ConfigEntry, DeviceEntity, DpId, DpValue, Entity, EntityConfig, TuyaDevice};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Span};

use crate::commands::{CommandPair, LockCommandSet};
use crate::error::{LockError, LockResult};

/// Optional lock capabilities, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockFeatures(u32);

impl LockFeatures {
    /// The lock can open the door, not just unlock it.
    pub const OPEN: Self = Self(1);

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Lock capability exposed to the entity platform.
#[async_trait]
pub trait Lock: Entity {
    fn is_locked(&self) -> bool;

    fn supported_features(&self) -> LockFeatures;

    async fn lock(&self) -> LockResult<()>;

    async fn unlock(&self) -> LockResult<()>;

    async fn open(&self) -> LockResult<()>;
}

/// Lock mapped onto one data point of a Tuya device.
///
/// The entity mirrors the last value the device reported for its data point
/// and is locked while that value equals the preset's close command.
/// Commands never touch the mirror: it only changes on a status update.
pub struct LocalTuyaLock {
    entity: DeviceEntity,
    command_set: LockCommandSet,
    commands: CommandPair,
    state: RwLock<Option<DpValue>>,
}

impl LocalTuyaLock {
    /// Create a lock for `dp_id`.
    ///
    /// Fails if `lock_commands_set` is set to anything but a known preset.
    pub fn new(
        device: Arc<dyn TuyaDevice>,
        config_entry: Arc<ConfigEntry>,
        dp_id: DpId,
        config: Option<EntityConfig>,
        span: Span,
    ) -> LockResult<Self> {
        let entity = DeviceEntity::new(device, config_entry, dp_id, config, span);
        let command_set = match entity.config_value(keys::LOCK_COMMANDS_SET) {
            None => LockCommandSet::default(),
            Some(value) => value
                .as_str()
                .ok_or_else(|| LockError::InvalidCommandSet(value.to_string()))?
                .parse()?,
        };
        let commands = command_set.commands();

        entity.span().in_scope(|| {
            info!(entity = %entity.name(), commands = %command_set, "Initialized lock");
        });

        Ok(Self {
            state: RwLock::new(Some(commands.open.clone())),
            entity,
            command_set,
            commands,
        })
    }

    pub fn entity(&self) -> &DeviceEntity {
        &self.entity
    }

    pub fn name(&self) -> String {
        self.entity.name()
    }

    pub fn unique_id(&self) -> String {
        self.entity.unique_id()
    }

    pub fn command_set(&self) -> LockCommandSet {
        self.command_set
    }

    pub fn commands(&self) -> &CommandPair {
        &self.commands
    }

    /// Mirrored value of the data point, `None` if the device reported none.
    pub fn state(&self) -> Option<DpValue> {
        self.state.read().clone()
    }

    async fn send(&self, value: &DpValue, action: &str) -> LockResult<()> {
        self.entity.span().in_scope(|| {
            debug!("Launching command {} to {}", value, action);
        });
        self.entity
            .device()
            .set_dp(value.clone(), self.entity.dp_id())
            .await?;
        Ok(())
    }
}

impl Entity for LocalTuyaLock {
    fn dp_id(&self) -> &DpId {
        self.entity.dp_id()
    }

    fn status_updated(&self) {
        let value = self.entity.dps(self.entity.dp_id());
        self.entity.span().in_scope(|| {
            debug!(state = ?value, "Lock status update");
        });
        *self.state.write() = value;
    }
}

#[async_trait]
impl Lock for LocalTuyaLock {
    fn is_locked(&self) -> bool {
        self.state.read().as_ref() == Some(&self.commands.close)
    }

    fn supported_features(&self) -> LockFeatures {
        LockFeatures::OPEN
    }

    async fn lock(&self) -> LockResult<()> {
        self.send(&self.commands.close, "lock").await
    }

    async fn unlock(&self) -> LockResult<()> {
        self.send(&self.commands.open, "unlock").await
    }

    /// Same write as [`Lock::unlock`]: these locks have no separate strike.
    async fn open(&self) -> LockResult<()> {
        self.send(&self.commands.open, "open").await
    }
}

impl std::fmt::Debug for LocalTuyaLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTuyaLock")
            .field("entity", &self.entity)
            .field("command_set", &self.command_set)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localtuya_core::{DeviceError, InMemoryDevice};

    fn lock_with(set: Option<&str>, dp: &str) -> (Arc<InMemoryDevice>, LocalTuyaLock) {
        let device = Arc::new(InMemoryDevice::new("bf01"));
        let mut config = EntityConfig::new(dp, "lock");
        if let Some(set) = set {
            config = config.with_option(keys::LOCK_COMMANDS_SET, set);
        }
        let lock = LocalTuyaLock::new(
            device.clone(),
            Arc::new(ConfigEntry::new("bf01", "10.0.0.2")),
            DpId::from(dp),
            Some(config),
            Span::none(),
        )
        .unwrap();
        (device, lock)
    }

    #[test]
    fn test_starts_unlocked_for_every_preset() {
        for set in LockCommandSet::ALL {
            let (_, lock) = lock_with(Some(set.as_str()), "1");
            assert_eq!(lock.command_set(), set);
            assert_eq!(lock.state(), Some(set.commands().open));
            assert!(!lock.is_locked(), "{}", set);
        }
    }

    #[test]
    fn test_default_preset_is_true_false() {
        let (_, lock) = lock_with(None, "1");
        assert_eq!(lock.command_set(), LockCommandSet::TrueFalse);
        assert_eq!(lock.commands().close, DpValue::Boolean(false));
    }

    #[test]
    fn test_invalid_preset_rejected() {
        let device = Arc::new(InMemoryDevice::new("bf01"));
        let result = LocalTuyaLock::new(
            device,
            Arc::new(ConfigEntry::new("bf01", "10.0.0.2")),
            DpId::from("1"),
            Some(EntityConfig::new("1", "lock").with_option(keys::LOCK_COMMANDS_SET, "up_down")),
            Span::none(),
        );
        assert!(matches!(result, Err(LockError::InvalidCommandSet(s)) if s == "up_down"));
    }

    #[test]
    fn test_non_string_preset_rejected() {
        let device = Arc::new(InMemoryDevice::new("bf01"));
        let result = LocalTuyaLock::new(
            device,
            Arc::new(ConfigEntry::new("bf01", "10.0.0.2")),
            DpId::from("1"),
            Some(EntityConfig::new("1", "lock").with_option(keys::LOCK_COMMANDS_SET, 3)),
            Span::none(),
        );
        assert!(matches!(result, Err(LockError::InvalidCommandSet(_))));
    }

    #[test]
    fn test_status_updates_drive_locked_state() {
        for set in LockCommandSet::ALL {
            let (device, lock) = lock_with(Some(set.as_str()), "1");
            let pair = set.commands();

            device.update_status([(DpId::from("1"), pair.close.clone())]);
            lock.status_updated();
            assert!(lock.is_locked(), "{}", set);

            device.update_status([(DpId::from("1"), pair.open.clone())]);
            lock.status_updated();
            assert!(!lock.is_locked(), "{}", set);
        }
    }

    #[test]
    fn test_unexpected_value_reads_unlocked() {
        let (device, lock) = lock_with(Some("open_close"), "2");

        device.update_status([(DpId::from("2"), DpValue::from("jammed"))]);
        lock.status_updated();
        assert!(!lock.is_locked());
        assert_eq!(lock.state(), Some(DpValue::from("jammed")));

        // Right value, wrong type.
        let (device, lock) = lock_with(None, "1");
        device.update_status([(DpId::from("1"), DpValue::from("false"))]);
        lock.status_updated();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_missing_dp_reads_unlocked() {
        let (_, lock) = lock_with(Some("on_off"), "9");
        lock.status_updated();
        assert_eq!(lock.state(), None);
        assert!(!lock.is_locked());
    }

    #[tokio::test]
    async fn test_commands_write_preset_values() {
        for set in LockCommandSet::ALL {
            let (device, lock) = lock_with(Some(set.as_str()), "3");
            let pair = set.commands();

            lock.lock().await.unwrap();
            lock.unlock().await.unwrap();
            lock.open().await.unwrap();

            let written: Vec<_> = device
                .writes()
                .into_iter()
                .map(|w| (w.value, w.dp_id))
                .collect();
            assert_eq!(
                written,
                vec![
                    (pair.close.clone(), DpId::from("3")),
                    (pair.open.clone(), DpId::from("3")),
                    (pair.open.clone(), DpId::from("3")),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_lock_does_not_update_mirror() {
        let (_, lock) = lock_with(None, "1");
        lock.lock().await.unwrap();
        assert!(!lock.is_locked());
    }

    #[tokio::test]
    async fn test_device_error_propagates() {
        let (device, lock) = lock_with(None, "1");
        device.set_online(false);

        let err = lock.lock().await.unwrap_err();
        assert!(matches!(err, LockError::Device(DeviceError::NotConnected(_))));
        assert!(device.writes().is_empty());
    }

    #[test]
    fn test_supported_features_include_open() {
        for set in LockCommandSet::ALL {
            let (_, lock) = lock_with(Some(set.as_str()), "1");
            assert!(lock.supported_features().contains(LockFeatures::OPEN));
        }
        assert_eq!(serde_json::to_value(LockFeatures::OPEN).unwrap(), 1);
    }
}
