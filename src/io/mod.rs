// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record-layer I/O: header iteration, framing, typed views, chunk
//! decompression, and the pull-based stream driver.

pub mod header;
pub mod record;
pub mod stream;

pub(crate) mod chunk;
pub(crate) mod framer;

pub use header::{
    find_field, find_field_str, find_field_time, find_field_u32, find_field_u64,
    iterate_header_fields,
};
pub use record::{
    BagHeaderRecord, ChunkInfoRecord, ChunkRecord, ConnectionHeader, ConnectionRecord,
    IndexDataRecord, MessageDataRecord, Op, RawRecord, Record,
};
pub use stream::BagReader;
