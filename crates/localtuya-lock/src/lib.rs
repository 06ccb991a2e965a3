//! Local Tuya Lock Platform
//!
//! Exposes a two-state data point of a Tuya device as a lock entity.
//!
//! A lock writes one of three command presets to its data point:
//!
//! | Preset | Unlock / open | Lock |
//! |--------|---------------|------|
//! | `true_false` (default) | `true` | `false` |
//! | `open_close` | `"open"` | `"close"` |
//! | `on_off` | `"on"` | `"off"` |
//!
//! The locked state is the last value the device reported, compared with the
//! preset's lock command.

pub mod commands;
pub mod error;
pub mod lock;
pub mod platform;
pub mod schema;

pub use commands::{CommandPair, LockCommandSet};
pub use error::{LockError, LockResult};
pub use lock::{LocalTuyaLock, Lock, LockFeatures};
pub use platform::{setup_entry, spawn_status_listener, PLATFORM};
pub use schema::{flow_schema, FlowSchema, SchemaField};
