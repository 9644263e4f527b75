// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Primitive field codecs.
//!
//! Two decode families exist for primitive arrays:
//! - the fast family aliases the source buffer (`Cow::Borrowed`) via an
//!   alignment-checked slice cast, available when the host byte order
//!   matches the file's little-endian order;
//! - the safe family decodes element-by-element into an owned vector,
//!   used on big-endian hosts and for misaligned regions.
//!
//! The family split is compile-time: on big-endian hosts the cast path is
//! not built at all. 1-byte kinds (`bool`, `int8`, `uint8`) alias
//! unconditionally.

use std::borrow::Cow;

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::core::{BagError, Result};
use crate::encoding::cursor::MsgCursor;
use crate::encoding::field_ref::FieldRef;
use crate::schema::FieldKind;

/// Decode one scalar primitive at the cursor.
pub(crate) fn decode_scalar<'a>(
    kind: FieldKind,
    cursor: &mut MsgCursor<'a>,
    field: &str,
) -> Result<FieldRef<'a>> {
    match kind {
        FieldKind::Bool => Ok(FieldRef::Bool(cursor.read_u8(field)? != 0)),
        FieldKind::Int8 => Ok(FieldRef::Int8(cursor.read_i8(field)?)),
        FieldKind::Int16 => Ok(FieldRef::Int16(cursor.read_i16(field)?)),
        FieldKind::Int32 => Ok(FieldRef::Int32(cursor.read_i32(field)?)),
        FieldKind::Int64 => Ok(FieldRef::Int64(cursor.read_i64(field)?)),
        FieldKind::UInt8 => Ok(FieldRef::UInt8(cursor.read_u8(field)?)),
        FieldKind::UInt16 => Ok(FieldRef::UInt16(cursor.read_u16(field)?)),
        FieldKind::UInt32 => Ok(FieldRef::UInt32(cursor.read_u32(field)?)),
        FieldKind::UInt64 => Ok(FieldRef::UInt64(cursor.read_u64(field)?)),
        FieldKind::Float32 => Ok(FieldRef::Float32(cursor.read_f32(field)?)),
        FieldKind::Float64 => Ok(FieldRef::Float64(cursor.read_f64(field)?)),
        FieldKind::String => Ok(FieldRef::String(Cow::Borrowed(cursor.read_str(field)?))),
        FieldKind::Time => Ok(FieldRef::Time(cursor.read_time(field)?)),
        FieldKind::Duration => Ok(FieldRef::Duration(cursor.read_duration(field)?)),
        FieldKind::Complex => Err(BagError::definition(
            "decode",
            format!("field '{field}': complex kinds have no scalar codec"),
        )),
    }
}

/// Decode a homogeneous primitive array of `len` elements at the cursor.
pub(crate) fn decode_array<'a>(
    kind: FieldKind,
    cursor: &mut MsgCursor<'a>,
    len: usize,
    field: &str,
) -> Result<FieldRef<'a>> {
    match kind {
        FieldKind::Bool => {
            let bytes = cursor.take(len, field)?;
            Ok(FieldRef::BoolArray(Cow::Borrowed(bytes)))
        }
        FieldKind::Int8 => {
            let bytes = cursor.take(len, field)?;
            Ok(FieldRef::Int8Array(i8_array(bytes)))
        }
        FieldKind::UInt8 => {
            let bytes = cursor.take(len, field)?;
            Ok(FieldRef::UInt8Array(Cow::Borrowed(bytes)))
        }
        FieldKind::Int16 => {
            let bytes = cursor.take(span(len, 2, cursor, field)?, field)?;
            Ok(FieldRef::Int16Array(i16_array(bytes)))
        }
        FieldKind::UInt16 => {
            let bytes = cursor.take(span(len, 2, cursor, field)?, field)?;
            Ok(FieldRef::UInt16Array(u16_array(bytes)))
        }
        FieldKind::Int32 => {
            let bytes = cursor.take(span(len, 4, cursor, field)?, field)?;
            Ok(FieldRef::Int32Array(i32_array(bytes)))
        }
        FieldKind::UInt32 => {
            let bytes = cursor.take(span(len, 4, cursor, field)?, field)?;
            Ok(FieldRef::UInt32Array(u32_array(bytes)))
        }
        FieldKind::Int64 => {
            let bytes = cursor.take(span(len, 8, cursor, field)?, field)?;
            Ok(FieldRef::Int64Array(i64_array(bytes)))
        }
        FieldKind::UInt64 => {
            let bytes = cursor.take(span(len, 8, cursor, field)?, field)?;
            Ok(FieldRef::UInt64Array(u64_array(bytes)))
        }
        FieldKind::Float32 => {
            let bytes = cursor.take(span(len, 4, cursor, field)?, field)?;
            Ok(FieldRef::Float32Array(f32_array(bytes)))
        }
        FieldKind::Float64 => {
            let bytes = cursor.take(span(len, 8, cursor, field)?, field)?;
            Ok(FieldRef::Float64Array(f64_array(bytes)))
        }
        FieldKind::String => {
            let mut out = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                out.push(Cow::Borrowed(cursor.read_str(field)?));
            }
            Ok(FieldRef::StringArray(out))
        }
        FieldKind::Time => {
            let mut out = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                out.push(cursor.read_time(field)?);
            }
            Ok(FieldRef::TimeArray(out))
        }
        FieldKind::Duration => {
            let mut out = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                out.push(cursor.read_duration(field)?);
            }
            Ok(FieldRef::DurationArray(out))
        }
        FieldKind::Complex => Err(BagError::definition(
            "decode",
            format!("field '{field}': complex kinds have no primitive array codec"),
        )),
    }
}

/// Byte span of `len` elements of `width` bytes, guarding against overflow.
fn span(len: usize, width: usize, cursor: &MsgCursor<'_>, field: &str) -> Result<usize> {
    len.checked_mul(width)
        .ok_or_else(|| BagError::invalid_body(field, usize::MAX, cursor.remaining()))
}

/// int8 aliases unconditionally: width 1 has no alignment or byte order.
fn i8_array(bytes: &[u8]) -> Cow<'_, [i8]> {
    match <[i8]>::ref_from_bytes(bytes) {
        Ok(aliased) => Cow::Borrowed(aliased),
        Err(_) => Cow::Owned(bytes.iter().map(|b| *b as i8).collect()),
    }
}

macro_rules! le_array_codec {
    ($name:ident, $ty:ty, $width:expr, $read:expr) => {
        fn $name(bytes: &[u8]) -> Cow<'_, [$ty]> {
            #[cfg(target_endian = "little")]
            {
                if let Ok(aliased) = <[$ty]>::ref_from_bytes(bytes) {
                    return Cow::Borrowed(aliased);
                }
            }
            let mut out: Vec<$ty> = Vec::with_capacity(bytes.len() / $width);
            for chunk in bytes.chunks_exact($width) {
                out.push($read(chunk));
            }
            Cow::Owned(out)
        }
    };
}

le_array_codec!(i16_array, i16, 2, LittleEndian::read_i16);
le_array_codec!(u16_array, u16, 2, LittleEndian::read_u16);
le_array_codec!(i32_array, i32, 4, LittleEndian::read_i32);
le_array_codec!(u32_array, u32, 4, LittleEndian::read_u32);
le_array_codec!(i64_array, i64, 8, LittleEndian::read_i64);
le_array_codec!(u64_array, u64, 8, LittleEndian::read_u64);
le_array_codec!(f32_array, f32, 4, LittleEndian::read_f32);
le_array_codec!(f64_array, f64, 8, LittleEndian::read_f64);
