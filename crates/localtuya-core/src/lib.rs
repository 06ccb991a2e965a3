//! Local Tuya Core Crate
//!
//! Device, data point and entity abstractions shared by the localtuya entity
//! platforms.
//!
//! ## Architecture
//!
//! - **TuyaDevice**: connection to one device; writes data points and
//!   broadcasts status notifications
//! - **DeviceEntity**: the configuration and device handle every platform
//!   entity embeds
//! - **Entity**: the callback surface the device layer drives
//! - **ConfigEntry**: device and entity configuration, loaded from TOML or JSON
//!
//! Transports are out of scope; [`InMemoryDevice`] is the reference device.

pub mod config;
pub mod device;
pub mod dp;
pub mod entity;
pub mod logging;
pub mod memory;

pub use config::{keys, ConfigEntry, ConfigError, ConfigResult, EntityConfig};
pub use device::{DeviceError, DeviceResult, StatusEvent, TuyaDevice};
pub use dp::{DpId, DpSnapshot, DpValue};
pub use entity::{DeviceEntity, Entity};
pub use logging::init_logging;
pub use memory::{InMemoryDevice, WriteRecord, DEFAULT_MAX_WRITES, DEFAULT_STATUS_CAPACITY};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
