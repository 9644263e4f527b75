// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message-body decoding.
//!
//! ROS1 message bodies are packed little-endian blobs interpreted against
//! the connection's parsed definition. This module holds the body cursor,
//! the primitive codecs (zero-copy where the host byte order allows), and
//! the schema-driven decoder with its sink abstraction.

pub mod codecs;
pub mod cursor;
pub mod decoder;
pub mod field_ref;

pub use cursor::MsgCursor;
pub use decoder::{decode_message, decode_to_map, DynamicSink, MessageSink};
pub use field_ref::FieldRef;
