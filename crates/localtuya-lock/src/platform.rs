//! Lock platform setup.
//!
//! Builds the lock entities of a config entry and forwards the device's
//! status notifications to them.

use std::sync::Arc;

use localtuya_core::{ConfigEntry, Entity, TuyaDevice};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn};

use crate::error::LockResult;
use crate::lock::LocalTuyaLock;

/// Platform name used in entity configs.
pub const PLATFORM: &str = "lock";

/// Create a lock for every entity of `config_entry` on the lock platform.
///
/// Each lock logs inside its own span carrying the device id and data point.
/// The first entity with an invalid configuration aborts the setup.
pub fn setup_entry(
    device: Arc<dyn TuyaDevice>,
    config_entry: Arc<ConfigEntry>,
) -> LockResult<Vec<Arc<LocalTuyaLock>>> {
    config_entry
        .entities_for(PLATFORM)
        .map(|config| {
            let span = info_span!(
                "lock",
                device_id = %config_entry.device_id,
                dp_id = %config.id,
            );
            LocalTuyaLock::new(
                device.clone(),
                config_entry.clone(),
                config.id.clone(),
                Some(config.clone()),
                span,
            )
            .map(Arc::new)
        })
        .collect()
}

/// Forward status notifications from `device` to `entities`.
///
/// Each event refreshes the entities whose data point it reports. The task
/// runs until the device's status channel closes.
pub fn spawn_status_listener<E>(device: &dyn TuyaDevice, entities: Vec<Arc<E>>) -> JoinHandle<()>
where
    E: Entity + ?Sized + 'static,
{
    let mut rx = device.subscribe();
    let device_id = device.device_id().to_string();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let mut notified = 0;
                    for entity in entities.iter().filter(|e| event.concerns(e.dp_id())) {
                        entity.status_updated();
                        notified += 1;
                    }
                    debug!(device_id = %device_id, changed = ?event.changed, notified, "status dispatched");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(device_id = %device_id, skipped, "status listener lagged, refreshing all entities");
                    for entity in &entities {
                        entity.status_updated();
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(device_id = %device_id, "status listener stopped");
    })
}
