// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record header-field iteration.
//!
//! A record header is a sequence of `<field_len: u32><key>=<value>` fields.
//! The same layout reappears in the data portion of connection records, so
//! the iteration helpers here serve both layers.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{BagError, Result, Timestamp};

/// Width in bytes of a field length prefix.
const LEN_IN_BYTES: usize = 4;

/// Key/value delimiter inside a header field.
const FIELD_DELIMITER: u8 = b'=';

/// Visit each `key`/`value` pair in `header`.
///
/// The visitor returns whether iteration should continue; returning `false`
/// stops early without error.
pub fn iterate_header_fields<'a, F>(header: &'a [u8], mut visitor: F) -> Result<()>
where
    F: FnMut(&'a [u8], &'a [u8]) -> bool,
{
    let mut rest = header;
    while !rest.is_empty() {
        if rest.len() < LEN_IN_BYTES {
            return Err(BagError::malformed_header(
                "missing header field length prefix",
            ));
        }

        let field_len = LittleEndian::read_u32(rest) as usize;
        rest = &rest[LEN_IN_BYTES..];
        if rest.len() < field_len {
            return Err(BagError::truncated("header field", field_len, rest.len()));
        }

        let field = &rest[..field_len];
        let delim = field
            .iter()
            .position(|&b| b == FIELD_DELIMITER)
            .ok_or_else(|| {
                BagError::malformed_header("header field has no '=' between key and value")
            })?;

        if field_len < delim + 1 {
            return Err(BagError::malformed_header(format!(
                "header field length {field_len} is shorter than its key"
            )));
        }

        if !visitor(&field[..delim], &field[delim + 1..]) {
            break;
        }
        rest = &rest[field_len..];
    }

    Ok(())
}

/// Find the value of `key` in `header`, if present.
pub fn find_field<'a>(header: &'a [u8], key: &[u8]) -> Result<Option<&'a [u8]>> {
    let mut value = None;
    iterate_header_fields(header, |current_key, current_value| {
        if current_key == key {
            value = Some(current_value);
            return false;
        }
        true
    })?;
    Ok(value)
}

/// Find a required field, failing with a malformed-header error otherwise.
fn find_required<'a>(header: &'a [u8], key: &str) -> Result<&'a [u8]> {
    find_field(header, key.as_bytes())?.ok_or_else(|| {
        BagError::malformed_header(format!("'{key}' field doesn't exist in the header"))
    })
}

/// Find a required u32 field.
pub fn find_field_u32(header: &[u8], key: &str) -> Result<u32> {
    let value = find_required(header, key)?;
    if value.len() < 4 {
        return Err(BagError::malformed_header(format!(
            "'{key}' field is {} bytes, expected 4",
            value.len()
        )));
    }
    Ok(LittleEndian::read_u32(value))
}

/// Find a required u64 field.
pub fn find_field_u64(header: &[u8], key: &str) -> Result<u64> {
    let value = find_required(header, key)?;
    if value.len() < 8 {
        return Err(BagError::malformed_header(format!(
            "'{key}' field is {} bytes, expected 8",
            value.len()
        )));
    }
    Ok(LittleEndian::read_u64(value))
}

/// Find a required time field (u32 seconds then u32 nanoseconds).
pub fn find_field_time(header: &[u8], key: &str) -> Result<Timestamp> {
    let value = find_required(header, key)?;
    extract_time(key, value)
}

/// Find a required text field.
pub fn find_field_str<'a>(header: &'a [u8], key: &str) -> Result<&'a str> {
    let value = find_required(header, key)?;
    std::str::from_utf8(value)
        .map_err(|e| BagError::malformed_header(format!("'{key}' field is not UTF-8: {e}")))
}

/// Interpret a header value as a timestamp.
pub(crate) fn extract_time(key: &str, value: &[u8]) -> Result<Timestamp> {
    if value.len() < 8 {
        return Err(BagError::malformed_header(format!(
            "'{key}' field is {} bytes, expected 8",
            value.len()
        )));
    }
    Ok(Timestamp::new(
        LittleEndian::read_u32(&value[..4]),
        LittleEndian::read_u32(&value[4..8]),
    ))
}
