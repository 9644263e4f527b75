// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked cursor over a serialized message body.
//!
//! ROS1 message bodies are packed little-endian with no alignment padding
//! and no encapsulation header, so the cursor is a plain offset over the
//! body slice. Every read names the field being decoded so shortage errors
//! carry useful context.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{BagError, Result, RosDuration, Timestamp};

/// Read cursor over a message body slice.
#[derive(Debug)]
pub struct MsgCursor<'a> {
    /// The body bytes
    data: &'a [u8],
    /// Current read position
    offset: usize,
}

impl<'a> MsgCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current position from the start of the body.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// The unread tail of the body.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    /// Consume exactly `n` bytes, failing with the field's name on shortage.
    pub fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(BagError::invalid_body(field, n, self.remaining()));
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    /// Read one signed byte.
    #[inline]
    pub fn read_i8(&mut self, field: &str) -> Result<i8> {
        Ok(self.take(1, field)?[0] as i8)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self, field: &str) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2, field)?))
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self, field: &str) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2, field)?))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self, field: &str) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4, field)?))
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self, field: &str) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4, field)?))
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self, field: &str) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8, field)?))
    }

    /// Read a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self, field: &str) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8, field)?))
    }

    /// Read an IEEE-754 binary32 from little-endian bits.
    #[inline]
    pub fn read_f32(&mut self, field: &str) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4, field)?))
    }

    /// Read an IEEE-754 binary64 from little-endian bits.
    #[inline]
    pub fn read_f64(&mut self, field: &str) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8, field)?))
    }

    /// Read a u32 length prefix.
    #[inline]
    pub fn read_length_prefix(&mut self, field: &str) -> Result<usize> {
        Ok(self.read_u32(field)? as usize)
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// The wire is a u32 length followed by exactly that many bytes; there
    /// is no terminator.
    pub fn read_str(&mut self, field: &str) -> Result<&'a str> {
        let len = self.read_length_prefix(field)?;
        let bytes = self.take(len, field)?;
        std::str::from_utf8(bytes).map_err(|e| {
            BagError::definition("string utf8", format!("field '{field}': {e}"))
        })
    }

    /// Read an instant: u32 seconds then u32 nanoseconds.
    pub fn read_time(&mut self, field: &str) -> Result<Timestamp> {
        let bytes = self.take(8, field)?;
        Ok(Timestamp::new(
            LittleEndian::read_u32(&bytes[..4]),
            LittleEndian::read_u32(&bytes[4..]),
        ))
    }

    /// Read a duration: u32 seconds then u32 nanoseconds.
    pub fn read_duration(&mut self, field: &str) -> Result<RosDuration> {
        let bytes = self.take(8, field)?;
        Ok(RosDuration::new(
            LittleEndian::read_u32(&bytes[..4]),
            LittleEndian::read_u32(&bytes[4..]),
        ))
    }
}
