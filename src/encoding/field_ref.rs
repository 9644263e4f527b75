// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Borrowed field values handed to decoding sinks.
//!
//! A [`FieldRef`] carries one decoded field. Scalars are by value; strings
//! and primitive arrays borrow from the record's buffer when the decoder
//! could alias them (see [`crate::encoding::codecs`]), falling back to
//! owned storage otherwise. Borrowed variants are only valid while the
//! owning record is alive; the lifetime parameter enforces that.

use std::borrow::Cow;

use crate::core::{FieldValue, RosDuration, Timestamp};

/// One decoded message field, possibly borrowing the source buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef<'a> {
    /// Boolean scalar
    Bool(bool),
    /// int8 scalar
    Int8(i8),
    /// int16 scalar
    Int16(i16),
    /// int32 scalar
    Int32(i32),
    /// int64 scalar
    Int64(i64),
    /// uint8 scalar
    UInt8(u8),
    /// uint16 scalar
    UInt16(u16),
    /// uint32 scalar
    UInt32(u32),
    /// uint64 scalar
    UInt64(u64),
    /// float32 scalar
    Float32(f32),
    /// float64 scalar
    Float64(f64),
    /// UTF-8 string
    String(Cow<'a, str>),
    /// Instant since the Unix epoch
    Time(Timestamp),
    /// Elapsed span
    Duration(RosDuration),

    /// bool[] as its raw wire bytes (nonzero is true)
    BoolArray(Cow<'a, [u8]>),
    /// int8[] / byte[]
    Int8Array(Cow<'a, [i8]>),
    /// uint8[] / char[]
    UInt8Array(Cow<'a, [u8]>),
    /// int16[]
    Int16Array(Cow<'a, [i16]>),
    /// uint16[]
    UInt16Array(Cow<'a, [u16]>),
    /// int32[]
    Int32Array(Cow<'a, [i32]>),
    /// uint32[]
    UInt32Array(Cow<'a, [u32]>),
    /// int64[]
    Int64Array(Cow<'a, [i64]>),
    /// uint64[]
    UInt64Array(Cow<'a, [u64]>),
    /// float32[]
    Float32Array(Cow<'a, [f32]>),
    /// float64[]
    Float64Array(Cow<'a, [f64]>),
    /// string[]
    StringArray(Vec<Cow<'a, str>>),
    /// time[]
    TimeArray(Vec<Timestamp>),
    /// duration[]
    DurationArray(Vec<RosDuration>),
}

impl<'a> FieldRef<'a> {
    /// Name of the carried kind, for mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldRef::Bool(_) => "bool",
            FieldRef::Int8(_) => "int8",
            FieldRef::Int16(_) => "int16",
            FieldRef::Int32(_) => "int32",
            FieldRef::Int64(_) => "int64",
            FieldRef::UInt8(_) => "uint8",
            FieldRef::UInt16(_) => "uint16",
            FieldRef::UInt32(_) => "uint32",
            FieldRef::UInt64(_) => "uint64",
            FieldRef::Float32(_) => "float32",
            FieldRef::Float64(_) => "float64",
            FieldRef::String(_) => "string",
            FieldRef::Time(_) => "time",
            FieldRef::Duration(_) => "duration",
            FieldRef::BoolArray(_) => "bool[]",
            FieldRef::Int8Array(_) => "int8[]",
            FieldRef::UInt8Array(_) => "uint8[]",
            FieldRef::Int16Array(_) => "int16[]",
            FieldRef::UInt16Array(_) => "uint16[]",
            FieldRef::Int32Array(_) => "int32[]",
            FieldRef::UInt32Array(_) => "uint32[]",
            FieldRef::Int64Array(_) => "int64[]",
            FieldRef::UInt64Array(_) => "uint64[]",
            FieldRef::Float32Array(_) => "float32[]",
            FieldRef::Float64Array(_) => "float64[]",
            FieldRef::StringArray(_) => "string[]",
            FieldRef::TimeArray(_) => "time[]",
            FieldRef::DurationArray(_) => "duration[]",
        }
    }

    /// Convert into an owned [`FieldValue`] (the dynamic-map representation).
    ///
    /// `uint8[]` becomes [`FieldValue::Bytes`]; every other array becomes a
    /// [`FieldValue::Array`] of scalars.
    pub fn into_value(self) -> FieldValue {
        match self {
            FieldRef::Bool(v) => FieldValue::Bool(v),
            FieldRef::Int8(v) => FieldValue::Int8(v),
            FieldRef::Int16(v) => FieldValue::Int16(v),
            FieldRef::Int32(v) => FieldValue::Int32(v),
            FieldRef::Int64(v) => FieldValue::Int64(v),
            FieldRef::UInt8(v) => FieldValue::UInt8(v),
            FieldRef::UInt16(v) => FieldValue::UInt16(v),
            FieldRef::UInt32(v) => FieldValue::UInt32(v),
            FieldRef::UInt64(v) => FieldValue::UInt64(v),
            FieldRef::Float32(v) => FieldValue::Float32(v),
            FieldRef::Float64(v) => FieldValue::Float64(v),
            FieldRef::String(v) => FieldValue::String(v.into_owned()),
            FieldRef::Time(v) => FieldValue::Time(v),
            FieldRef::Duration(v) => FieldValue::Duration(v),
            FieldRef::BoolArray(v) => {
                FieldValue::Array(v.iter().map(|b| FieldValue::Bool(*b != 0)).collect())
            }
            FieldRef::Int8Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Int8(*x)).collect())
            }
            FieldRef::UInt8Array(v) => FieldValue::Bytes(v.into_owned()),
            FieldRef::Int16Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Int16(*x)).collect())
            }
            FieldRef::UInt16Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::UInt16(*x)).collect())
            }
            FieldRef::Int32Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Int32(*x)).collect())
            }
            FieldRef::UInt32Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::UInt32(*x)).collect())
            }
            FieldRef::Int64Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Int64(*x)).collect())
            }
            FieldRef::UInt64Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::UInt64(*x)).collect())
            }
            FieldRef::Float32Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Float32(*x)).collect())
            }
            FieldRef::Float64Array(v) => {
                FieldValue::Array(v.iter().map(|x| FieldValue::Float64(*x)).collect())
            }
            FieldRef::StringArray(v) => FieldValue::Array(
                v.into_iter()
                    .map(|s| FieldValue::String(s.into_owned()))
                    .collect(),
            ),
            FieldRef::TimeArray(v) => {
                FieldValue::Array(v.into_iter().map(FieldValue::Time).collect())
            }
            FieldRef::DurationArray(v) => {
                FieldValue::Array(v.into_iter().map(FieldValue::Duration).collect())
            }
        }
    }

    /// Build a field reference from a parsed constant.
    ///
    /// Constants are scalar primitives by construction, so the result never
    /// borrows and can be emitted under any buffer lifetime.
    pub(crate) fn from_constant(value: &FieldValue) -> Option<FieldRef<'a>> {
        match value {
            FieldValue::Bool(v) => Some(FieldRef::Bool(*v)),
            FieldValue::Int8(v) => Some(FieldRef::Int8(*v)),
            FieldValue::Int16(v) => Some(FieldRef::Int16(*v)),
            FieldValue::Int32(v) => Some(FieldRef::Int32(*v)),
            FieldValue::Int64(v) => Some(FieldRef::Int64(*v)),
            FieldValue::UInt8(v) => Some(FieldRef::UInt8(*v)),
            FieldValue::UInt16(v) => Some(FieldRef::UInt16(*v)),
            FieldValue::UInt32(v) => Some(FieldRef::UInt32(*v)),
            FieldValue::UInt64(v) => Some(FieldRef::UInt64(*v)),
            FieldValue::Float32(v) => Some(FieldRef::Float32(*v)),
            FieldValue::Float64(v) => Some(FieldRef::Float64(*v)),
            FieldValue::String(v) => Some(FieldRef::String(Cow::Owned(v.clone()))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_into_value() {
        assert_eq!(FieldRef::Bool(true).into_value(), FieldValue::Bool(true));
        assert_eq!(FieldRef::Int32(-1).into_value(), FieldValue::Int32(-1));
        assert_eq!(
            FieldRef::String(Cow::Borrowed("hi")).into_value(),
            FieldValue::String("hi".to_string())
        );
        assert_eq!(
            FieldRef::Time(Timestamp::new(1, 2)).into_value(),
            FieldValue::Time(Timestamp::new(1, 2))
        );
    }

    #[test]
    fn test_uint8_array_becomes_bytes() {
        let v = FieldRef::UInt8Array(Cow::Borrowed(&[1, 2, 3]));
        assert_eq!(v.into_value(), FieldValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_bool_array_into_value() {
        let v = FieldRef::BoolArray(Cow::Borrowed(&[0, 1, 2]));
        assert_eq!(
            v.into_value(),
            FieldValue::Array(vec![
                FieldValue::Bool(false),
                FieldValue::Bool(true),
                FieldValue::Bool(true),
            ])
        );
    }

    #[test]
    fn test_numeric_array_into_value() {
        let v = FieldRef::Int16Array(Cow::Owned(vec![-1, 2]));
        assert_eq!(
            v.into_value(),
            FieldValue::Array(vec![FieldValue::Int16(-1), FieldValue::Int16(2)])
        );
    }

    #[test]
    fn test_string_array_into_value() {
        let v = FieldRef::StringArray(vec![Cow::Borrowed("a"), Cow::Borrowed("b")]);
        assert_eq!(
            v.into_value(),
            FieldValue::Array(vec![
                FieldValue::String("a".to_string()),
                FieldValue::String("b".to_string()),
            ])
        );
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(FieldRef::Float64(0.0).kind_name(), "float64");
        assert_eq!(
            FieldRef::UInt8Array(Cow::Borrowed(&[])).kind_name(),
            "uint8[]"
        );
        assert_eq!(FieldRef::StringArray(vec![]).kind_name(), "string[]");
    }

    #[test]
    fn test_from_constant() {
        assert_eq!(
            FieldRef::from_constant(&FieldValue::Int32(-1)),
            Some(FieldRef::Int32(-1))
        );
        assert_eq!(
            FieldRef::from_constant(&FieldValue::String("x".to_string())),
            Some(FieldRef::String(Cow::Owned("x".to_string())))
        );
        assert_eq!(FieldRef::from_constant(&FieldValue::Array(vec![])), None);
    }
}
