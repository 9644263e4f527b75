// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded value type system.
//!
//! Provides the dynamic value representation for decoded bag messages,
//! plus the wire-faithful time and duration types. All variants are
//! serde-serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Nanoseconds per second for time/duration conversion.
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A ROS instant: seconds and nanoseconds since the Unix epoch.
///
/// The wire encoding is two consecutive little-endian u32 values. The pair
/// is kept raw rather than collapsed into a single integer, so seconds past
/// the 2106 u32 rollover remain representable exactly as recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub sec: u32,
    /// Nanoseconds past `sec`
    pub nsec: u32,
}

impl Timestamp {
    /// Create a timestamp from a seconds/nanoseconds pair.
    pub const fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Total nanoseconds since the Unix epoch.
    pub const fn as_nanos(&self) -> u64 {
        self.sec as u64 * NANOS_PER_SEC + self.nsec as u64
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nsec)
    }
}

/// A ROS duration: a seconds/nanoseconds pair.
///
/// The wire encodes both halves as unsigned u32 values; no sign convention
/// exists at this layer, so the API mirrors the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RosDuration {
    /// Whole seconds
    pub sec: u32,
    /// Nanoseconds past `sec`
    pub nsec: u32,
}

impl RosDuration {
    /// Create a duration from a seconds/nanoseconds pair.
    pub const fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Total nanoseconds.
    pub const fn as_nanos(&self) -> u64 {
        self.sec as u64 * NANOS_PER_SEC + self.nsec as u64
    }
}

impl fmt::Display for RosDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.sec, self.nsec)
    }
}

/// Type alias for a decoded message as a field name -> value mapping.
pub type DecodedMessage = HashMap<String, FieldValue>;

/// Dynamic value for a decoded message field.
///
/// This is the owned target of dynamic decoding: every message field maps
/// to one of these variants. `uint8[]`/`byte[]` payloads land in `Bytes`
/// (image frames and point clouds would be wasteful as per-element arrays);
/// every other array kind lands in `Array`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    // Boolean
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8)
    String(String),

    // Raw byte payload (uint8[] fields)
    Bytes(Vec<u8>),

    // Instant since the Unix epoch
    Time(Timestamp),

    // Elapsed span
    Duration(RosDuration),

    // Homogeneous array of values
    Array(Vec<FieldValue>),

    // Nested message
    Struct(DecodedMessage),
}

impl FieldValue {
    /// Check if this value is a numeric type (integers or floats).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldValue::Int8(_)
                | FieldValue::Int16(_)
                | FieldValue::Int32(_)
                | FieldValue::Int64(_)
                | FieldValue::UInt8(_)
                | FieldValue::UInt16(_)
                | FieldValue::UInt32(_)
                | FieldValue::UInt64(_)
                | FieldValue::Float32(_)
                | FieldValue::Float64(_)
        )
    }

    /// Check if this value is an integer type (signed or unsigned).
    pub fn is_integer(&self) -> bool {
        self.is_numeric() && !matches!(self, FieldValue::Float32(_) | FieldValue::Float64(_))
    }

    /// Check if this value is a temporal type (time or duration).
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldValue::Time(_) | FieldValue::Duration(_))
    }

    /// Check if this value is a container type (array, bytes, or struct).
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            FieldValue::Array(_) | FieldValue::Bytes(_) | FieldValue::Struct(_)
        )
    }

    /// Try to convert this value to i64 (integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int8(v) => Some(*v as i64),
            FieldValue::Int16(v) => Some(*v as i64),
            FieldValue::Int32(v) => Some(*v as i64),
            FieldValue::Int64(v) => Some(*v),
            FieldValue::UInt8(v) => Some(*v as i64),
            FieldValue::UInt16(v) => Some(*v as i64),
            FieldValue::UInt32(v) => Some(*v as i64),
            FieldValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to f64 (numeric types only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float32(v) => Some(*v as f64),
            FieldValue::Float64(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner byte payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner timestamp.
    pub fn as_time(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get the inner duration.
    pub fn as_duration(&self) -> Option<RosDuration> {
        match self {
            FieldValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner struct.
    pub fn as_struct(&self) -> Option<&DecodedMessage> {
        match self {
            FieldValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int8(_) => "int8",
            FieldValue::Int16(_) => "int16",
            FieldValue::Int32(_) => "int32",
            FieldValue::Int64(_) => "int64",
            FieldValue::UInt8(_) => "uint8",
            FieldValue::UInt16(_) => "uint16",
            FieldValue::UInt32(_) => "uint32",
            FieldValue::UInt64(_) => "uint64",
            FieldValue::Float32(_) => "float32",
            FieldValue::Float64(_) => "float64",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Time(_) => "time",
            FieldValue::Duration(_) => "duration",
            FieldValue::Array(_) => "array",
            FieldValue::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int8(v) => write!(f, "{v}"),
            FieldValue::Int16(v) => write!(f, "{v}"),
            FieldValue::Int32(v) => write!(f, "{v}"),
            FieldValue::Int64(v) => write!(f, "{v}"),
            FieldValue::UInt8(v) => write!(f, "{v}"),
            FieldValue::UInt16(v) => write!(f, "{v}"),
            FieldValue::UInt32(v) => write!(f, "{v}"),
            FieldValue::UInt64(v) => write!(f, "{v}"),
            FieldValue::Float32(v) => write!(f, "{v}"),
            FieldValue::Float64(v) => write!(f, "{v}"),
            FieldValue::String(v) => write!(f, "\"{v}\""),
            FieldValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            FieldValue::Time(t) => write!(f, "{t}"),
            FieldValue::Duration(d) => write!(f, "{d}"),
            FieldValue::Array(v) => write!(f, "[{} elements]", v.len()),
            FieldValue::Struct(v) => write!(f, "{{{} fields}}", v.len()),
        }
    }
}
