//! Device abstraction shared by every entity of a physical device.
//!
//! A [`TuyaDevice`] owns the connection to one device. Entities never talk to
//! the transport directly: they write data points with [`TuyaDevice::set_dp`],
//! read the last reported snapshot with [`TuyaDevice::dps`], and are notified
//! of fresh data through the [`StatusEvent`] broadcast.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::dp::{DpId, DpValue};

/// Errors raised by the device layer.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Device is not connected
    #[error("Device not connected: {0}")]
    NotConnected(String),

    /// Communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Data point rejected by the device
    #[error("Invalid data point: {0}")]
    InvalidDataPoint(String),

    /// Transport-specific error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Notification that fresh status data arrived from a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Device the status belongs to
    pub device_id: String,
    /// Data points whose values were reported. Empty means a full refresh.
    pub changed: Vec<DpId>,
    /// When the status was received
    pub received_at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(device_id: impl Into<String>, changed: Vec<DpId>) -> Self {
        Self {
            device_id: device_id.into(),
            changed,
            received_at: Utc::now(),
        }
    }

    /// Whether an entity bound to `dp_id` should refresh for this event.
    pub fn concerns(&self, dp_id: &DpId) -> bool {
        self.changed.is_empty() || self.changed.contains(dp_id)
    }
}

/// Connection to a single device, shared by all of its entities.
#[async_trait]
pub trait TuyaDevice: Send + Sync {
    /// Identifier of the device (its Tuya `devId`).
    fn device_id(&self) -> &str;

    /// Write `value` to the data point `dp_id`.
    ///
    /// Completes when the device layer considers the write acknowledged.
    async fn set_dp(&self, value: DpValue, dp_id: &DpId) -> DeviceResult<()>;

    /// Last known value of `dp_id` from the most recent status snapshot.
    fn dps(&self, dp_id: &DpId) -> Option<DpValue>;

    /// Subscribe to status notifications.
    fn subscribe(&self) -> broadcast::Receiver<StatusEvent>;
}
