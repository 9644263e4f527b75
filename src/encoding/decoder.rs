// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven message-data decoder.
//!
//! Walks a resolved [`MessageDefinition`] against a message body and emits
//! every field, in declaration order, into a [`MessageSink`]. The sink is
//! the single decoding entry point: [`DynamicSink`] builds a nested
//! [`DecodedMessage`] map, and user types implement the trait to receive
//! fields directly (matching on the wire field name, skipping names they
//! do not carry, and reporting a schema mismatch when a name matches but
//! the value kind does not).
//!
//! Constant fields are emitted without consuming body bytes. Complex
//! fields recurse through `begin_message`/`end_message`; complex arrays
//! additionally wrap their elements in `begin_message_array`/
//! `end_message_array`.

use crate::core::{BagError, DecodedMessage, FieldValue, Result};
use crate::encoding::codecs;
use crate::encoding::cursor::MsgCursor;
use crate::encoding::field_ref::FieldRef;
use crate::schema::{ArrayKind, FieldDefinition, FieldKind, MessageDefinition};

/// Maximum allowed array or string-sequence length, to keep corrupt length
/// prefixes from ballooning allocations.
const MAX_ARRAY_LENGTH: usize = 10_000_000;

/// Receiver of decoded message fields.
///
/// The decoder calls `field` once per leaf field in declaration order.
/// Nested messages are bracketed by `begin_message`/`end_message`; arrays
/// of nested messages are additionally bracketed by `begin_message_array`/
/// `end_message_array`, with one `begin_message`/`end_message` pair per
/// element.
///
/// Borrowed values in [`FieldRef`] alias the record's scratch buffer; they
/// must not outlive the record they were decoded from.
pub trait MessageSink<'a> {
    /// Receive one leaf field.
    fn field(&mut self, name: &str, value: FieldRef<'a>) -> Result<()>;

    /// Enter a nested message under `name` (or an element of the enclosing
    /// message array).
    fn begin_message(&mut self, name: &str) -> Result<()> {
        let _ = name;
        Ok(())
    }

    /// Leave the most recently entered nested message.
    fn end_message(&mut self) -> Result<()> {
        Ok(())
    }

    /// Enter an array of `len` nested messages under `name`.
    fn begin_message_array(&mut self, name: &str, len: usize) -> Result<()> {
        let _ = (name, len);
        Ok(())
    }

    /// Leave the most recently entered message array.
    fn end_message_array(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Decode `bytes` against `def`, emitting fields into `sink`.
///
/// Returns the unconsumed tail of `bytes`. A well-formed message consumes
/// the body exactly, so the tail is normally empty.
pub fn decode_message<'a, S: MessageSink<'a>>(
    def: &MessageDefinition,
    bytes: &'a [u8],
    sink: &mut S,
) -> Result<&'a [u8]> {
    let mut cursor = MsgCursor::new(bytes);
    walk_fields(def, &def.fields, &mut cursor, sink)?;
    Ok(cursor.rest())
}

/// Decode `bytes` against `def` into a dynamic map.
pub fn decode_to_map(def: &MessageDefinition, bytes: &[u8]) -> Result<DecodedMessage> {
    let mut sink = DynamicSink::new();
    decode_message(def, bytes, &mut sink)?;
    sink.into_message()
}

/// Walk one field list in declaration order.
fn walk_fields<'a, S: MessageSink<'a>>(
    def: &MessageDefinition,
    fields: &[FieldDefinition],
    cursor: &mut MsgCursor<'a>,
    sink: &mut S,
) -> Result<()> {
    for field in fields {
        // Constants never consume wire bytes.
        if let Some(constant) = &field.const_value {
            let value = FieldRef::from_constant(constant).ok_or_else(|| {
                BagError::definition(
                    "decode",
                    format!("constant '{}' has a non-scalar value", field.name),
                )
            })?;
            sink.field(&field.name, value)?;
            continue;
        }

        if field.kind == FieldKind::Complex {
            walk_complex(def, field, cursor, sink)?;
            continue;
        }

        match field.array {
            ArrayKind::Scalar => {
                let value = codecs::decode_scalar(field.kind, cursor, &field.name)?;
                sink.field(&field.name, value)?;
            }
            ArrayKind::Fixed(len) => {
                let value = codecs::decode_array(field.kind, cursor, len, &field.name)?;
                sink.field(&field.name, value)?;
            }
            ArrayKind::Dynamic => {
                let len = read_array_length(cursor, &field.name)?;
                let value = codecs::decode_array(field.kind, cursor, len, &field.name)?;
                sink.field(&field.name, value)?;
            }
        }
    }
    Ok(())
}

/// Decode a complex field: a nested message, or an array of them.
fn walk_complex<'a, S: MessageSink<'a>>(
    def: &MessageDefinition,
    field: &FieldDefinition,
    cursor: &mut MsgCursor<'a>,
    sink: &mut S,
) -> Result<()> {
    let nested = field
        .complex
        .and_then(|idx| def.nested.get(idx))
        .ok_or_else(|| {
            BagError::definition(
                "decode",
                format!("complex field '{}' was not resolved", field.name),
            )
        })?;

    match field.array {
        ArrayKind::Scalar => {
            sink.begin_message(&field.name)?;
            walk_fields(def, &nested.fields, cursor, sink)?;
            sink.end_message()
        }
        ArrayKind::Fixed(len) => walk_message_array(def, field, nested, len, cursor, sink),
        ArrayKind::Dynamic => {
            let len = read_array_length(cursor, &field.name)?;
            walk_message_array(def, field, nested, len, cursor, sink)
        }
    }
}

/// Decode `len` consecutive nested messages.
fn walk_message_array<'a, S: MessageSink<'a>>(
    def: &MessageDefinition,
    field: &FieldDefinition,
    nested: &MessageDefinition,
    len: usize,
    cursor: &mut MsgCursor<'a>,
    sink: &mut S,
) -> Result<()> {
    sink.begin_message_array(&field.name, len)?;
    for _ in 0..len {
        sink.begin_message(&field.name)?;
        walk_fields(def, &nested.fields, cursor, sink)?;
        sink.end_message()?;
    }
    sink.end_message_array()
}

/// Read and sanity-check a dynamic array length prefix.
fn read_array_length(cursor: &mut MsgCursor<'_>, field: &str) -> Result<usize> {
    let len = cursor.read_length_prefix(field)?;
    if len > MAX_ARRAY_LENGTH {
        return Err(BagError::invalid_body(field, len, cursor.remaining()));
    }
    Ok(len)
}

/// Container being filled by [`DynamicSink`].
enum Frame {
    /// A nested message under construction
    Message { name: String, map: DecodedMessage },
    /// A complex array under construction
    Sequence { name: String, items: Vec<FieldValue> },
}

/// Sink that assembles a nested [`DecodedMessage`].
///
/// Leaf values are converted to owned [`FieldValue`]s; nested messages
/// become [`FieldValue::Struct`] and complex arrays [`FieldValue::Array`].
#[derive(Default)]
pub struct DynamicSink {
    root: DecodedMessage,
    stack: Vec<Frame>,
}

impl DynamicSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish and return the assembled message.
    ///
    /// Fails if nested scopes were left open, which indicates the decoder
    /// and sink disagreed about bracketing.
    pub fn into_message(self) -> Result<DecodedMessage> {
        if !self.stack.is_empty() {
            return Err(BagError::definition(
                "decode",
                "message scopes left open in dynamic sink",
            ));
        }
        Ok(self.root)
    }

    fn insert(&mut self, name: &str, value: FieldValue) {
        match self.stack.last_mut() {
            Some(Frame::Message { map, .. }) => {
                map.insert(name.to_string(), value);
            }
            Some(Frame::Sequence { items, .. }) => items.push(value),
            None => {
                self.root.insert(name.to_string(), value);
            }
        }
    }
}

impl<'a> MessageSink<'a> for DynamicSink {
    fn field(&mut self, name: &str, value: FieldRef<'a>) -> Result<()> {
        self.insert(name, value.into_value());
        Ok(())
    }

    fn begin_message(&mut self, name: &str) -> Result<()> {
        self.stack.push(Frame::Message {
            name: name.to_string(),
            map: DecodedMessage::new(),
        });
        Ok(())
    }

    fn end_message(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Message { name, map }) => {
                self.insert(&name, FieldValue::Struct(map));
                Ok(())
            }
            _ => Err(BagError::definition(
                "decode",
                "end_message without matching begin_message",
            )),
        }
    }

    fn begin_message_array(&mut self, name: &str, len: usize) -> Result<()> {
        self.stack.push(Frame::Sequence {
            name: name.to_string(),
            items: Vec::with_capacity(len.min(1024)),
        });
        Ok(())
    }

    fn end_message_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Sequence { name, items }) => {
                self.insert(&name, FieldValue::Array(items));
                Ok(())
            }
            _ => Err(BagError::definition(
                "decode",
                "end_message_array without matching begin_message_array",
            )),
        }
    }
}
