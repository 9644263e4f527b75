// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests: an in-memory bag builder and a
//! definition-driven message encoder for round-trip checks.

#![allow(dead_code)]

use std::io::Write;

use bagstream::{ArrayKind, DecodedMessage, FieldKind, FieldValue, MessageDefinition};

/// Install a test subscriber so decoder diagnostics show up when debugging
/// failures. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Record-layer encoding
// ============================================================================

/// Encode one `<len><key>=<value>` header field.
pub fn field(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((key.len() + 1 + value.len()) as u32).to_le_bytes());
    out.extend_from_slice(key);
    out.push(b'=');
    out.extend_from_slice(value);
    out
}

/// Encode a full `<hdrlen><hdr><datalen><data>` record.
pub fn record(header_fields: &[Vec<u8>], data: &[u8]) -> Vec<u8> {
    let header: Vec<u8> = header_fields.concat();
    let mut out = Vec::new();
    out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Little-endian u32 header value.
pub fn u32v(v: u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// Little-endian u64 header value.
pub fn u64v(v: u64) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// 8-byte time header value: u32 sec then u32 nsec.
pub fn timev(sec: u32, nsec: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&sec.to_le_bytes());
    out.extend_from_slice(&nsec.to_le_bytes());
    out
}

/// Bag header record (op 0x03).
pub fn bag_header_record(index_pos: u64, conn_count: u32, chunk_count: u32) -> Vec<u8> {
    record(
        &[
            field(b"op", &[0x03]),
            field(b"index_pos", &u64v(index_pos)),
            field(b"conn_count", &u32v(conn_count)),
            field(b"chunk_count", &u32v(chunk_count)),
        ],
        &[],
    )
}

/// Connection record (op 0x07) with its data-portion metadata blob.
pub fn connection_record(
    conn: u32,
    topic: &str,
    message_type: &str,
    md5sum: &str,
    definition: &str,
) -> Vec<u8> {
    let data: Vec<u8> = [
        field(b"topic", topic.as_bytes()),
        field(b"type", message_type.as_bytes()),
        field(b"md5sum", md5sum.as_bytes()),
        field(b"message_definition", definition.as_bytes()),
    ]
    .concat();

    record(
        &[
            field(b"op", &[0x07]),
            field(b"conn", &u32v(conn)),
            field(b"topic", topic.as_bytes()),
        ],
        &data,
    )
}

/// Message data record (op 0x02).
pub fn message_record(conn: u32, time: (u32, u32), body: &[u8]) -> Vec<u8> {
    record(
        &[
            field(b"op", &[0x02]),
            field(b"conn", &u32v(conn)),
            field(b"time", &timev(time.0, time.1)),
        ],
        body,
    )
}

/// Chunk record (op 0x05): compresses `uncompressed` per `compression` and
/// declares the uncompressed size in the header.
pub fn chunk_record(compression: &str, uncompressed: &[u8]) -> Vec<u8> {
    let body = match compression {
        "none" => uncompressed.to_vec(),
        "bz2" => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(uncompressed).unwrap();
            encoder.finish().unwrap()
        }
        "lz4" => {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
            encoder.write_all(uncompressed).unwrap();
            encoder.finish().unwrap()
        }
        other => panic!("unsupported test compression {other}"),
    };

    record(
        &[
            field(b"op", &[0x05]),
            field(b"compression", compression.as_bytes()),
            field(b"size", &u32v(uncompressed.len() as u32)),
        ],
        &body,
    )
}

/// Chunk record with an explicitly wrong declared size.
pub fn chunk_record_with_size(compression: &str, uncompressed: &[u8], declared: u32) -> Vec<u8> {
    assert_eq!(compression, "none", "size override only used uncompressed");
    record(
        &[
            field(b"op", &[0x05]),
            field(b"compression", compression.as_bytes()),
            field(b"size", &u32v(declared)),
        ],
        uncompressed,
    )
}

/// Index data record (op 0x04).
pub fn index_record(ver: u32, conn: u32, count: u32, entries: &[u8]) -> Vec<u8> {
    record(
        &[
            field(b"op", &[0x04]),
            field(b"ver", &u32v(ver)),
            field(b"conn", &u32v(conn)),
            field(b"count", &u32v(count)),
        ],
        entries,
    )
}

/// Chunk info record (op 0x06).
pub fn chunk_info_record(
    ver: u32,
    chunk_pos: u64,
    start_time: (u32, u32),
    end_time: (u32, u32),
    count: u32,
) -> Vec<u8> {
    record(
        &[
            field(b"op", &[0x06]),
            field(b"ver", &u32v(ver)),
            field(b"chunk_pos", &u64v(chunk_pos)),
            field(b"start_time", &timev(start_time.0, start_time.1)),
            field(b"end_time", &timev(end_time.0, end_time.1)),
            field(b"count", &u32v(count)),
        ],
        &[],
    )
}

/// A complete bag: version preamble followed by the given records.
pub fn bag(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"#ROSBAG V2.0\n".to_vec();
    for r in records {
        out.extend_from_slice(r);
    }
    out
}

// ============================================================================
// Definition-driven message encoding (round-trip checks)
// ============================================================================

/// Encode a dynamic map back into wire bytes under `def`.
///
/// Walks the definition in declaration order, mirroring the decoder, so
/// `encode_message(def, decode_to_map(def, bytes)) == bytes` for any
/// well-formed body.
pub fn encode_message(def: &MessageDefinition, map: &DecodedMessage) -> Vec<u8> {
    let mut out = Vec::new();
    encode_fields(def, &def.fields, map, &mut out);
    out
}

fn encode_fields(
    def: &MessageDefinition,
    fields: &[bagstream::FieldDefinition],
    map: &DecodedMessage,
    out: &mut Vec<u8>,
) {
    for field_def in fields {
        if field_def.const_value.is_some() {
            continue; // constants are never on the wire
        }
        let value = map
            .get(&field_def.name)
            .unwrap_or_else(|| panic!("map missing field '{}'", field_def.name));

        if field_def.kind == FieldKind::Complex {
            let nested = &def.nested[field_def.complex.expect("unresolved complex field")];
            match field_def.array {
                ArrayKind::Scalar => {
                    let sub = value.as_struct().expect("expected struct");
                    encode_fields(def, &nested.fields, sub, out);
                }
                ArrayKind::Fixed(_) | ArrayKind::Dynamic => {
                    let items = value.as_array().expect("expected array of structs");
                    if field_def.array == ArrayKind::Dynamic {
                        out.extend_from_slice(&(items.len() as u32).to_le_bytes());
                    }
                    for item in items {
                        let sub = item.as_struct().expect("expected struct element");
                        encode_fields(def, &nested.fields, sub, out);
                    }
                }
            }
            continue;
        }

        match field_def.array {
            ArrayKind::Scalar => encode_scalar(value, out),
            ArrayKind::Fixed(_) => encode_array_elements(value, out),
            ArrayKind::Dynamic => {
                let len = match value {
                    FieldValue::Bytes(b) => b.len(),
                    FieldValue::Array(a) => a.len(),
                    other => panic!("expected array value, got {other}"),
                };
                out.extend_from_slice(&(len as u32).to_le_bytes());
                encode_array_elements(value, out);
            }
        }
    }
}

fn encode_array_elements(value: &FieldValue, out: &mut Vec<u8>) {
    match value {
        FieldValue::Bytes(bytes) => out.extend_from_slice(bytes),
        FieldValue::Array(items) => {
            for item in items {
                encode_scalar(item, out);
            }
        }
        other => panic!("expected array value, got {other}"),
    }
}

fn encode_scalar(value: &FieldValue, out: &mut Vec<u8>) {
    match value {
        FieldValue::Bool(v) => out.push(u8::from(*v)),
        FieldValue::Int8(v) => out.push(*v as u8),
        FieldValue::UInt8(v) => out.push(*v),
        FieldValue::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::String(s) => {
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        FieldValue::Time(t) => {
            out.extend_from_slice(&t.sec.to_le_bytes());
            out.extend_from_slice(&t.nsec.to_le_bytes());
        }
        FieldValue::Duration(d) => {
            out.extend_from_slice(&d.sec.to_le_bytes());
            out.extend_from_slice(&d.nsec.to_le_bytes());
        }
        other => panic!("cannot encode {other} as a scalar"),
    }
}
