//! AMF value types
//!
//! Subset of the AMF0 value model needed to describe a stream in an
//! `onMetaData` script packet.

use std::collections::HashMap;

/// AMF0 value representation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AmfValue {
    /// Null value (0x05)
    #[default]
    Null,

    /// Boolean value (0x01)
    Boolean(bool),

    /// IEEE 754 double-precision floating point (0x00)
    Number(f64),

    /// UTF-8 string (0x02, or 0x0C when longer than 65535 bytes)
    String(String),

    /// Associative array (0x08), the container `onMetaData` uses
    EcmaArray(HashMap<String, AmfValue>),
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<u32> for AmfValue {
    fn from(v: u32) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<u8> for AmfValue {
    fn from(v: u8) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}
