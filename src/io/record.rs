// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Raw records and their typed views.
//!
//! A [`RawRecord`] owns one pooled scratch buffer holding `<hdr><data>`.
//! The per-op view types wrap it and extract named header fields lazily,
//! converting to their semantic types on access. Closing (or dropping) a
//! record returns its scratch buffer to the pool; borrowed values decoded
//! out of the record must not outlive it.

use std::sync::Arc;

use crate::core::{BagError, Compression, DecodedMessage, Result, Timestamp};
use crate::encoding::{decode_message, decode_to_map, MessageSink};
use crate::io::header::{
    find_field_str, find_field_time, find_field_u32, find_field_u64, iterate_header_fields,
};
use crate::schema::{parse_definition, MessageDefinition};
use crate::types::PooledBuffer;

/// Record kind, as carried in the `op` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Sentinel for an op that could not be determined
    Invalid = 0x00,
    /// One serialized message
    MessageData = 0x02,
    /// The first record in the file
    BagHeader = 0x03,
    /// Message offsets for the preceding chunk
    IndexData = 0x04,
    /// Compressed run of connection and message records
    Chunk = 0x05,
    /// Chunk metadata in the trailing index
    ChunkInfo = 0x06,
    /// Topic, type, and definition for a connection id
    Connection = 0x07,
}

impl Op {
    /// Map an op byte to its kind. Unknown bytes are framing errors at the
    /// call site.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x02 => Some(Op::MessageData),
            0x03 => Some(Op::BagHeader),
            0x04 => Some(Op::IndexData),
            0x05 => Some(Op::Chunk),
            0x06 => Some(Op::ChunkInfo),
            0x07 => Some(Op::Connection),
            _ => None,
        }
    }

    /// The wire byte for this kind.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One framed record: header and data sub-ranges of a pooled scratch buffer.
#[derive(Debug)]
pub struct RawRecord {
    /// Scratch buffer laid out `<header><data>`
    buf: PooledBuffer,
    /// Header length in bytes
    header_len: usize,
    /// Data length in bytes
    data_len: usize,
    /// Record kind, determined during framing
    op: Op,
}

impl RawRecord {
    pub(crate) fn new(buf: PooledBuffer, header_len: usize, data_len: usize, op: Op) -> Self {
        Self {
            buf,
            header_len,
            data_len,
            op,
        }
    }

    /// Record kind.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Raw header bytes (the key/value field sequence).
    pub fn header(&self) -> &[u8] {
        &self.buf[..self.header_len]
    }

    /// Raw data bytes. Empty for chunk records: the chunk body is consumed
    /// through the decompressing sub-stream instead.
    pub fn data(&self) -> &[u8] {
        &self.buf[self.header_len..self.header_len + self.data_len]
    }

    /// Release the scratch buffer back to the pool.
    ///
    /// Dropping the record has the same effect; `close` exists to make the
    /// release point explicit at call sites.
    pub fn close(self) {}
}

/// Resolved metadata for one connection.
#[derive(Debug, Clone)]
pub struct ConnectionHeader {
    /// Topic the connection publishes on
    pub topic: String,
    /// Message type, e.g. `std_msgs/Int32`
    pub message_type: String,
    /// MD5 checksum of the message definition
    pub md5sum: String,
    /// Publishing node, when recorded
    pub caller_id: Option<String>,
    /// Parsed message definition
    pub definition: MessageDefinition,
}

macro_rules! record_view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            base: RawRecord,
        }

        impl $name {
            pub(crate) fn new(base: RawRecord) -> Self {
                Self { base }
            }

            /// Raw header bytes.
            pub fn header(&self) -> &[u8] {
                self.base.header()
            }

            /// Raw data bytes.
            pub fn data(&self) -> &[u8] {
                self.base.data()
            }

            /// Release the record's scratch buffer back to the pool.
            pub fn close(self) {}
        }
    };
}

record_view! {
    /// The first record in the file, describing the trailing index.
    BagHeaderRecord
}

impl BagHeaderRecord {
    /// Offset of the first record after the chunk section.
    pub fn index_pos(&self) -> Result<u64> {
        find_field_u64(self.base.header(), "index_pos")
    }

    /// Number of unique connections in the file.
    pub fn conn_count(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "conn_count")
    }

    /// Number of chunk records in the file.
    pub fn chunk_count(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "chunk_count")
    }
}

record_view! {
    /// A record whose body is a compressed run of connection and message
    /// records. The body is not stored here; the driver drains it through
    /// a decompressing sub-stream before the next outer record.
    ChunkRecord
}

impl ChunkRecord {
    /// Compression applied to the chunk body.
    pub fn compression(&self) -> Result<Compression> {
        let name = find_field_str(self.base.header(), "compression")?;
        name.parse()
            .map_err(|_| BagError::unsupported_compression(name))
    }

    /// Uncompressed size of the chunk body in bytes.
    pub fn size(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "size")
    }
}

record_view! {
    /// Metadata about message data on one connection. The data portion is
    /// itself a header-format blob carrying the topic, type, checksum, and
    /// the textual message definition.
    ConnectionRecord
}

impl ConnectionRecord {
    /// Unique connection id within the bag.
    pub fn conn(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "conn")
    }

    /// Topic from the outer record header.
    pub fn topic(&self) -> Result<String> {
        Ok(find_field_str(self.base.header(), "topic")?.to_string())
    }

    /// Parse the data portion into a resolved [`ConnectionHeader`].
    pub fn connection_header(&self) -> Result<ConnectionHeader> {
        let data = self.base.data();

        let mut topic = None;
        let mut message_type = None;
        let mut md5sum = None;
        let mut caller_id = None;
        let mut definition_text = None;

        iterate_header_fields(data, |key, value| {
            match key {
                b"topic" => topic = Some(value.to_vec()),
                b"type" => message_type = Some(value.to_vec()),
                b"md5sum" => md5sum = Some(value.to_vec()),
                b"callerid" => caller_id = Some(value.to_vec()),
                b"message_definition" => definition_text = Some(value.to_vec()),
                _ => {}
            }
            true
        })?;

        let text_of = |key: &str, value: Option<Vec<u8>>| -> Result<String> {
            match value {
                Some(bytes) => String::from_utf8(bytes).map_err(|e| {
                    BagError::malformed_header(format!(
                        "connection '{key}' field is not UTF-8: {e}"
                    ))
                }),
                None => Ok(String::new()),
            }
        };

        let topic = text_of("topic", topic)?;
        let message_type = text_of("type", message_type)?;
        let md5sum = text_of("md5sum", md5sum)?;
        let caller_id = match caller_id {
            Some(bytes) => Some(text_of("callerid", Some(bytes))?),
            None => None,
        };
        let definition_text = text_of("message_definition", definition_text)?;

        let type_name = (!message_type.is_empty()).then_some(message_type.as_str());
        let definition = parse_definition(type_name, &definition_text)?;

        Ok(ConnectionHeader {
            topic,
            message_type,
            md5sum,
            caller_id,
            definition,
        })
    }
}

/// One serialized message, bound to its connection's definition.
#[derive(Debug)]
pub struct MessageDataRecord {
    base: RawRecord,
    connection: Arc<ConnectionHeader>,
}

impl MessageDataRecord {
    pub(crate) fn new(base: RawRecord, connection: Arc<ConnectionHeader>) -> Self {
        Self { base, connection }
    }

    /// Raw header bytes.
    pub fn header(&self) -> &[u8] {
        self.base.header()
    }

    /// Raw serialized message body.
    pub fn data(&self) -> &[u8] {
        self.base.data()
    }

    /// Unique connection id within the bag.
    pub fn conn(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "conn")
    }

    /// Timestamp at which the message was recorded (not sent).
    pub fn time(&self) -> Result<Timestamp> {
        find_field_time(self.base.header(), "time")
    }

    /// The connection header this message was recorded under.
    pub fn connection_header(&self) -> &ConnectionHeader {
        &self.connection
    }

    /// Decode the message body into `sink`.
    ///
    /// Borrowed values handed to the sink alias this record's buffer and
    /// cannot outlive it; the borrow on `self` enforces that. A caller that
    /// needs values past the record's close must copy them out.
    pub fn view_as<'rec, S: MessageSink<'rec>>(&'rec self, sink: &mut S) -> Result<()> {
        decode_message(&self.connection.definition, self.base.data(), sink)?;
        Ok(())
    }

    /// Decode the message body into a dynamic map.
    pub fn view_as_map(&self) -> Result<DecodedMessage> {
        decode_to_map(&self.connection.definition, self.base.data())
    }

    /// Release the record's scratch buffer back to the pool.
    pub fn close(self) {}
}

record_view! {
    /// Index entries for messages on one connection in the preceding chunk.
    /// Surfaced as data only; this decoder does not seek.
    IndexDataRecord
}

impl IndexDataRecord {
    /// Index record version.
    pub fn ver(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "ver")
    }

    /// Connection id the entries belong to.
    pub fn conn(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "conn")
    }

    /// Number of messages on the connection in the preceding chunk.
    pub fn count(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "count")
    }
}

record_view! {
    /// Chunk metadata from the trailing index. Surfaced as data only.
    ChunkInfoRecord
}

impl ChunkInfoRecord {
    /// Chunk-info record version.
    pub fn ver(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "ver")
    }

    /// Offset of the chunk record this entry describes.
    pub fn chunk_pos(&self) -> Result<u64> {
        find_field_u64(self.base.header(), "chunk_pos")
    }

    /// Timestamp of the earliest message in the chunk.
    pub fn start_time(&self) -> Result<Timestamp> {
        find_field_time(self.base.header(), "start_time")
    }

    /// Timestamp of the latest message in the chunk.
    pub fn end_time(&self) -> Result<Timestamp> {
        find_field_time(self.base.header(), "end_time")
    }

    /// Number of connections in the chunk.
    pub fn count(&self) -> Result<u32> {
        find_field_u32(self.base.header(), "count")
    }
}

/// A decoded record, tagged by kind.
#[derive(Debug)]
pub enum Record {
    /// File-level metadata, first record in the file
    BagHeader(BagHeaderRecord),
    /// Compressed run of inner records (body follows via the sub-stream)
    Chunk(ChunkRecord),
    /// Connection declaration
    Connection(ConnectionRecord),
    /// One serialized message
    MessageData(MessageDataRecord),
    /// Per-chunk message index
    IndexData(IndexDataRecord),
    /// Trailing chunk metadata
    ChunkInfo(ChunkInfoRecord),
}

impl Record {
    /// Record kind.
    pub fn op(&self) -> Op {
        match self {
            Record::BagHeader(_) => Op::BagHeader,
            Record::Chunk(_) => Op::Chunk,
            Record::Connection(_) => Op::Connection,
            Record::MessageData(_) => Op::MessageData,
            Record::IndexData(_) => Op::IndexData,
            Record::ChunkInfo(_) => Op::ChunkInfo,
        }
    }

    /// Raw header bytes.
    pub fn header(&self) -> &[u8] {
        match self {
            Record::BagHeader(r) => r.header(),
            Record::Chunk(r) => r.header(),
            Record::Connection(r) => r.header(),
            Record::MessageData(r) => r.header(),
            Record::IndexData(r) => r.header(),
            Record::ChunkInfo(r) => r.header(),
        }
    }

    /// Raw data bytes (empty for chunk records).
    pub fn data(&self) -> &[u8] {
        match self {
            Record::BagHeader(r) => r.data(),
            Record::Chunk(r) => r.data(),
            Record::Connection(r) => r.data(),
            Record::MessageData(r) => r.data(),
            Record::IndexData(r) => r.data(),
            Record::ChunkInfo(r) => r.data(),
        }
    }

    /// Release the record's scratch buffer back to the pool.
    pub fn close(self) {}
}
