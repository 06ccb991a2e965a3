//! Command presets: how "unlocked" and "locked" are encoded on a data point.

use std::fmt;
use std::str::FromStr;

use localtuya_core::DpValue;
use serde::{Deserialize, Serialize};

use crate::error::LockError;

/// Preset selecting the values written for unlock and lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockCommandSet {
    /// `true` unlocks, `false` locks
    #[default]
    TrueFalse,
    /// `"open"` unlocks, `"close"` locks
    OpenClose,
    /// `"on"` unlocks, `"off"` locks
    OnOff,
}

impl LockCommandSet {
    pub const ALL: [LockCommandSet; 3] = [Self::TrueFalse, Self::OpenClose, Self::OnOff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrueFalse => "true_false",
            Self::OpenClose => "open_close",
            Self::OnOff => "on_off",
        }
    }

    pub fn commands(&self) -> CommandPair {
        match self {
            Self::TrueFalse => CommandPair::new(true, false),
            Self::OpenClose => CommandPair::new("open", "close"),
            Self::OnOff => CommandPair::new("on", "off"),
        }
    }
}

impl fmt::Display for LockCommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockCommandSet {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|set| set.as_str() == s)
            .ok_or_else(|| LockError::InvalidCommandSet(s.to_string()))
    }
}

/// The values written to unlock (`open`) and lock (`close`).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPair {
    pub open: DpValue,
    pub close: DpValue,
}

impl CommandPair {
    fn new(open: impl Into<DpValue>, close: impl Into<DpValue>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}
