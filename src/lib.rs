// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Bagstream
//!
//! Streaming decoder for ROS bag files, format version 2.0
//! (<http://wiki.ros.org/Bags/Format/2.0>).
//!
//! A bag is a framed sequence of heterogeneous records: a bag header,
//! compressed chunks embedding connection and message records, and a
//! trailing index. This library walks that structure in one pass:
//! - **Framing** in [`io`]: length-prefixed records with pooled scratch
//!   buffers; chunk bodies drain through a decompressing sub-stream
//!   (`none`, `bz2`, `lz4`).
//! - **Schemas** in [`schema`]: the textual `.msg` definition carried by
//!   each connection record, parsed and resolved into a
//!   [`MessageDefinition`].
//! - **Message decoding** in [`encoding`]: bodies interpreted against the
//!   definition into a dynamic map or any [`MessageSink`] target, with
//!   zero-copy primitive arrays where the host byte order allows.
//!
//! Decoding is pull-based and single-threaded; records surface in exact
//! file order, and chunk contents surface between the chunk record and the
//! next outer record. The decoder is streaming-only: the trailing index
//! records are surfaced as data but never used to seek.
//!
//! ## Example: dump message fields
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bagstream::{BagReader, Record};
//!
//! let mut reader = BagReader::open("session.bag")?;
//! while let Some(record) = reader.read_next()? {
//!     if let Record::MessageData(message) = record {
//!         let fields = message.view_as_map()?;
//!         println!("{} @ {}: {:?}",
//!             message.connection_header().topic,
//!             message.time()?,
//!             fields.keys());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Buffer ownership
//!
//! Each record owns a pooled scratch buffer. Values decoded with
//! [`MessageDataRecord::view_as`] may alias that buffer; the borrow
//! checker pins them to the record's lifetime, so closing (dropping) the
//! record ends them. Copy fields out before closing if they must live
//! longer.

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    BagError, Compression, DecodedMessage, FieldValue, Result, RosDuration, Timestamp, Version,
    SUPPORTED_VERSION,
};

// Message definition parsing
pub mod schema;

pub use schema::{ArrayKind, FieldDefinition, FieldKind, MessageDefinition};

// Message body decoding
pub mod encoding;

pub use encoding::{decode_message, decode_to_map, DynamicSink, FieldRef, MessageSink};

// Record-layer I/O
pub mod io;

pub use io::{
    BagHeaderRecord, BagReader, ChunkInfoRecord, ChunkRecord, ConnectionHeader, ConnectionRecord,
    IndexDataRecord, MessageDataRecord, Op, Record,
};

// Scratch buffer pooling
pub mod types;
