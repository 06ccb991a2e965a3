//! Data points: the addressable attributes of a Tuya device.
//!
//! A device exposes its state as a flat map of data point ids ("1", "2", ...)
//! to values. Entities read and write single data points through the device
//! abstraction in [`crate::device`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a data point on a device.
///
/// Opaque to this crate. Tuya firmware uses small integers, but any string
/// key is accepted so that cloud-style codes (`"switch_1"`) work too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DpId(String);

impl DpId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DpId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DpId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for DpId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

/// Value carried by a data point.
///
/// Serialized untagged so a status payload such as
/// `{"1": true, "2": "open", "3": 25}` maps directly onto the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DpValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    Null,
}

impl DpValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for DpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for DpValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for DpValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<String> for DpValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for DpValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Snapshot of every data point a device has reported.
pub type DpSnapshot = HashMap<DpId, DpValue>;
