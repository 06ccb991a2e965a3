//! In-memory device.
//!
//! Keeps a status snapshot, records recent writes and broadcasts status events
//! the same way a connected device does. Used by tests and by hosts that feed
//! device status from their own transport.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::device::{DeviceError, DeviceResult, StatusEvent, TuyaDevice};
use crate::dp::{DpId, DpSnapshot, DpValue};

/// Default capacity of the status broadcast channel.
pub const DEFAULT_STATUS_CAPACITY: usize = 64;

/// Default number of writes kept in the history.
pub const DEFAULT_MAX_WRITES: usize = 100;

/// A write issued through [`TuyaDevice::set_dp`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub dp_id: DpId,
    pub value: DpValue,
    pub at: DateTime<Utc>,
}

/// Device whose state lives entirely in memory.
pub struct InMemoryDevice {
    device_id: String,
    snapshot: RwLock<DpSnapshot>,
    writes: RwLock<VecDeque<WriteRecord>>,
    max_writes: usize,
    online: RwLock<bool>,
    /// Reflect accepted writes into the snapshot, like firmware that reports
    /// every change back.
    echo_writes: bool,
    status_tx: broadcast::Sender<StatusEvent>,
}

impl InMemoryDevice {
    pub fn new(device_id: impl Into<String>) -> Self {
        let (status_tx, _) = broadcast::channel(DEFAULT_STATUS_CAPACITY);
        Self {
            device_id: device_id.into(),
            snapshot: RwLock::new(HashMap::new()),
            writes: RwLock::new(VecDeque::new()),
            max_writes: DEFAULT_MAX_WRITES,
            online: RwLock::new(true),
            echo_writes: false,
            status_tx,
        }
    }

    /// Report every accepted write back as a status update.
    pub fn with_echo(mut self) -> Self {
        self.echo_writes = true;
        self
    }

    /// Keep at most `max_writes` writes; older ones are dropped first.
    pub fn with_max_writes(mut self, max_writes: usize) -> Self {
        self.max_writes = max_writes;
        self
    }

    /// Buffer up to `capacity` status events per subscriber.
    ///
    /// Must be called before anything subscribes.
    pub fn with_status_capacity(mut self, capacity: usize) -> Self {
        self.status_tx = broadcast::channel(capacity).0;
        self
    }

    /// Seed the snapshot without broadcasting.
    pub fn with_status(self, values: impl IntoIterator<Item = (DpId, DpValue)>) -> Self {
        self.snapshot.write().extend(values);
        self
    }

    /// Merge a reported status into the snapshot and notify subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn update_status(&self, values: impl IntoIterator<Item = (DpId, DpValue)>) -> usize {
        let mut changed = Vec::new();
        {
            let mut snapshot = self.snapshot.write();
            for (dp_id, value) in values {
                changed.push(dp_id.clone());
                snapshot.insert(dp_id, value);
            }
        }
        trace!(device_id = %self.device_id, ?changed, "status updated");
        self.notify(changed)
    }

    /// Broadcast a full refresh without changing the snapshot.
    pub fn refresh(&self) -> usize {
        self.notify(Vec::new())
    }

    /// Mark the device reachable or not. Writes fail while offline.
    pub fn set_online(&self, online: bool) {
        *self.online.write() = online;
    }

    pub fn is_online(&self) -> bool {
        *self.online.read()
    }

    /// Retained writes, oldest first.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.read().iter().cloned().collect()
    }

    pub fn last_write(&self) -> Option<WriteRecord> {
        self.writes.read().back().cloned()
    }

    pub fn snapshot(&self) -> DpSnapshot {
        self.snapshot.read().clone()
    }

    fn notify(&self, changed: Vec<DpId>) -> usize {
        // No subscribers is not an error for a device.
        self.status_tx
            .send(StatusEvent::new(self.device_id.clone(), changed))
            .unwrap_or(0)
    }
}

#[async_trait]
impl TuyaDevice for InMemoryDevice {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    async fn set_dp(&self, value: DpValue, dp_id: &DpId) -> DeviceResult<()> {
        if !self.is_online() {
            return Err(DeviceError::NotConnected(self.device_id.clone()));
        }

        debug!(device_id = %self.device_id, dp_id = %dp_id, value = %value, "set_dp");
        {
            let mut writes = self.writes.write();
            writes.push_back(WriteRecord {
                dp_id: dp_id.clone(),
                value: value.clone(),
                at: Utc::now(),
            });
            while writes.len() > self.max_writes {
                writes.pop_front();
            }
        }

        if self.echo_writes {
            self.update_status([(dp_id.clone(), value)]);
        }
        Ok(())
    }

    fn dps(&self, dp_id: &DpId) -> Option<DpValue> {
        self.snapshot.read().get(dp_id).cloned()
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.status_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_dp_records_write() {
        let device = InMemoryDevice::new("bf01");
        device
            .set_dp(DpValue::Boolean(false), &DpId::from("1"))
            .await
            .unwrap();

        let writes = device.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].dp_id, DpId::from("1"));
        assert_eq!(writes[0].value, DpValue::Boolean(false));
        // Without echo the snapshot is untouched.
        assert_eq!(device.dps(&DpId::from("1")), None);
    }

    #[tokio::test]
    async fn test_write_history_is_capped() {
        let device = InMemoryDevice::new("bf01");
        for i in 0..1_000i64 {
            device
                .set_dp(DpValue::Integer(i), &DpId::from("1"))
                .await
                .unwrap();
        }

        let writes = device.writes();
        assert_eq!(writes.len(), DEFAULT_MAX_WRITES);
        assert_eq!(writes[0].value, DpValue::Integer(900));
        assert_eq!(device.last_write().unwrap().value, DpValue::Integer(999));

        let device = InMemoryDevice::new("bf01").with_max_writes(2);
        for value in ["open", "close", "open"] {
            device
                .set_dp(DpValue::from(value), &DpId::from("2"))
                .await
                .unwrap();
        }
        let values: Vec<_> = device.writes().into_iter().map(|w| w.value).collect();
        assert_eq!(values, vec![DpValue::from("close"), DpValue::from("open")]);
    }

    #[tokio::test]
    async fn test_set_dp_offline_fails() {
        let device = InMemoryDevice::new("bf01");
        device.set_online(false);

        let result = device.set_dp(DpValue::from("open"), &DpId::from("2")).await;
        assert!(matches!(result, Err(DeviceError::NotConnected(id)) if id == "bf01"));
        assert!(device.writes().is_empty());
    }

    #[tokio::test]
    async fn test_echo_broadcasts_status() {
        let device = InMemoryDevice::new("bf01").with_echo();
        let mut rx = device.subscribe();

        device
            .set_dp(DpValue::from("close"), &DpId::from("2"))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.device_id, "bf01");
        assert_eq!(event.changed, vec![DpId::from("2")]);
        assert_eq!(device.dps(&DpId::from("2")), Some(DpValue::from("close")));
    }

    #[test]
    fn test_update_status_merges() {
        let device = InMemoryDevice::new("bf01")
            .with_status([(DpId::from("1"), DpValue::Boolean(true))]);
        let receivers = device.update_status([(DpId::from("3"), DpValue::Integer(80))]);

        assert_eq!(receivers, 0);
        let snapshot = device.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&DpId::from("3")], DpValue::Integer(80));
    }
}
