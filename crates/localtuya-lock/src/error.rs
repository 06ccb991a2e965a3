//! Lock platform errors.

use localtuya_core::{ConfigError, DeviceError};

/// Errors raised by lock entities.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// `lock_commands_set` is not one of the known presets
    #[error("Invalid lock command set: {0}")]
    InvalidCommandSet(String),

    /// Device write failed
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
