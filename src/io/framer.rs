// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Streaming record framer.
//!
//! Reconstructs `<hdrlen><hdr><datalen><data>` frames from a one-pass byte
//! source into pooled scratch buffers. Chunk records are special: their
//! body is left unread in the source so the driver can wrap it in a
//! decompressing sub-stream.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{BagError, Result};
use crate::io::header::find_field;
use crate::io::record::{Op, RawRecord};
use crate::types::BufferPool;

/// Outcome of framing one record.
#[derive(Debug)]
pub(crate) enum FramedRecord {
    /// Header and data fully read into scratch
    Complete(RawRecord),
    /// A chunk record: header read, body left in the source
    ChunkShell {
        /// The record (data slice is empty)
        record: RawRecord,
        /// Length in bytes of the compressed body still in the source
        data_len: u32,
    },
}

/// Read one record from `reader`, drawing scratch from `pool`.
///
/// Returns `Ok(None)` on a clean end of stream (EOF before the first
/// length byte). EOF anywhere else is a truncated frame.
pub(crate) fn read_record<R: Read>(
    reader: &mut R,
    pool: &BufferPool,
) -> Result<Option<FramedRecord>> {
    let header_len = match read_len_prefix(reader, "record header length")? {
        Some(len) => len as usize,
        None => return Ok(None),
    };

    let mut buf = pool.acquire(header_len);
    buf.as_mut_vec().resize(header_len, 0);
    read_full(reader, &mut buf.as_mut_vec()[..], "record header")?;

    let op = find_op(&buf[..header_len])?;

    let data_len = match read_len_prefix(reader, "record data length")? {
        Some(len) => len,
        None => return Err(BagError::truncated("record data length", 4, 0)),
    };

    if op == Op::Chunk {
        // The chunk body stays in the source; the driver consumes it
        // through a length-limited decompressing reader.
        let record = RawRecord::new(buf, header_len, 0, op);
        return Ok(Some(FramedRecord::ChunkShell { record, data_len }));
    }

    let total = header_len + data_len as usize;
    buf.as_mut_vec().resize(total, 0);
    read_full(reader, &mut buf.as_mut_vec()[header_len..], "record data")?;

    Ok(Some(FramedRecord::Complete(RawRecord::new(
        buf,
        header_len,
        data_len as usize,
        op,
    ))))
}

/// Scan the header for the `op` field.
fn find_op(header: &[u8]) -> Result<Op> {
    let value = find_field(header, b"op")?
        .ok_or_else(|| BagError::invalid_op("'op' field missing from record header"))?;

    if value.len() != 1 {
        return Err(BagError::invalid_op(format!(
            "'op' field is {} bytes, expected exactly 1",
            value.len()
        )));
    }

    Op::from_u8(value[0])
        .ok_or_else(|| BagError::invalid_op(format!("unknown op byte {:#04x}", value[0])))
}

/// Read a u32 length prefix.
///
/// `Ok(None)` when the source is exhausted before the first byte; a
/// truncated-frame error when EOF lands inside the prefix.
fn read_len_prefix<R: Read>(reader: &mut R, context: &str) -> Result<Option<u32>> {
    let mut bytes = [0u8; 4];
    let mut filled = 0;

    while filled < 4 {
        let n = reader
            .read(&mut bytes[filled..])
            .map_err(|e| BagError::io(context.to_string(), e.to_string()))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(BagError::truncated(context.to_string(), 4, filled));
        }
        filled += n;
    }

    Ok(Some(LittleEndian::read_u32(&bytes)))
}

/// Fill `buf` exactly, reporting how far we got on a short source.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8], context: &str) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .map_err(|e| BagError::io(context.to_string(), e.to_string()))?;
        if n == 0 {
            return Err(BagError::truncated(context.to_string(), buf.len(), filled));
        }
        filled += n;
    }
    Ok(())
}
