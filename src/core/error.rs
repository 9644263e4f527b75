// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for bagstream.
//!
//! Provides error types for every stage of bag decoding:
//! - Record framing and header parsing
//! - Chunk decompression
//! - Message definition parsing
//! - Message body decoding

use std::fmt;

/// Errors that can occur while decoding a bag stream.
#[derive(Debug, Clone)]
pub enum BagError {
    /// I/O error from the underlying reader
    Io {
        /// What was being read
        context: String,
        /// Error message
        message: String,
    },

    /// Bag format version other than 2.0
    UnsupportedVersion {
        /// The version line (or fragment) that was found
        found: String,
    },

    /// Insufficient bytes for a declared length at the record layer
    TruncatedFrame {
        /// What was being read
        context: String,
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
    },

    /// Malformed record header field sequence
    MalformedHeader {
        /// Why the header could not be parsed
        reason: String,
    },

    /// Unknown op-code byte, or `op` field missing/empty
    InvalidOp {
        /// Why the op could not be determined
        reason: String,
    },

    /// Chunk declares a compression other than none/bz2/lz4
    UnsupportedCompression {
        /// The compression name from the chunk header
        name: String,
    },

    /// MessageData references a connection id absent from the registry
    ConnectionNotFound {
        /// Connection id from the record header
        conn: u32,
    },

    /// Syntactic or semantic failure in the message definition grammar
    DefinitionParse {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Typed decoding target disagrees with the definition
    SchemaMismatch {
        /// Field name
        field: String,
        /// Kind declared by the definition
        expected: String,
        /// Kind held by the target
        found: String,
    },

    /// Not enough bytes to satisfy a message field
    InvalidMessageBody {
        /// Field name (or what was being decoded)
        field: String,
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
    },

    /// Decompressed chunk length disagrees with the chunk's `size` field
    ChunkSizeMismatch {
        /// Uncompressed size declared by the chunk header
        declared: u64,
        /// Bytes actually produced by the decompressor
        actual: u64,
    },
}

impl BagError {
    /// Create an I/O error.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        BagError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-version error.
    pub fn unsupported_version(found: impl Into<String>) -> Self {
        BagError::UnsupportedVersion {
            found: found.into(),
        }
    }

    /// Create a truncated-frame error.
    pub fn truncated(context: impl Into<String>, requested: usize, available: usize) -> Self {
        BagError::TruncatedFrame {
            context: context.into(),
            requested,
            available,
        }
    }

    /// Create a malformed-header error.
    pub fn malformed_header(reason: impl Into<String>) -> Self {
        BagError::MalformedHeader {
            reason: reason.into(),
        }
    }

    /// Create an invalid-op error.
    pub fn invalid_op(reason: impl Into<String>) -> Self {
        BagError::InvalidOp {
            reason: reason.into(),
        }
    }

    /// Create an unsupported-compression error.
    pub fn unsupported_compression(name: impl Into<String>) -> Self {
        BagError::UnsupportedCompression { name: name.into() }
    }

    /// Create a connection-not-found error.
    pub fn connection_not_found(conn: u32) -> Self {
        BagError::ConnectionNotFound { conn }
    }

    /// Create a definition-parse error.
    pub fn definition(context: impl Into<String>, message: impl Into<String>) -> Self {
        BagError::DefinitionParse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a schema-mismatch error.
    pub fn schema_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        BagError::SchemaMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid-message-body error.
    pub fn invalid_body(field: impl Into<String>, requested: usize, available: usize) -> Self {
        BagError::InvalidMessageBody {
            field: field.into(),
            requested,
            available,
        }
    }

    /// Create a chunk-size-mismatch error.
    pub fn chunk_size_mismatch(declared: u64, actual: u64) -> Self {
        BagError::ChunkSizeMismatch { declared, actual }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            BagError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            BagError::UnsupportedVersion { found } => vec![("found", found.clone())],
            BagError::TruncatedFrame {
                context,
                requested,
                available,
            } => vec![
                ("context", context.clone()),
                ("requested", requested.to_string()),
                ("available", available.to_string()),
            ],
            BagError::MalformedHeader { reason } => vec![("reason", reason.clone())],
            BagError::InvalidOp { reason } => vec![("reason", reason.clone())],
            BagError::UnsupportedCompression { name } => vec![("name", name.clone())],
            BagError::ConnectionNotFound { conn } => vec![("conn", conn.to_string())],
            BagError::DefinitionParse { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            BagError::SchemaMismatch {
                field,
                expected,
                found,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.clone()),
                ("found", found.clone()),
            ],
            BagError::InvalidMessageBody {
                field,
                requested,
                available,
            } => vec![
                ("field", field.clone()),
                ("requested", requested.to_string()),
                ("available", available.to_string()),
            ],
            BagError::ChunkSizeMismatch { declared, actual } => vec![
                ("declared", declared.to_string()),
                ("actual", actual.to_string()),
            ],
        }
    }
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BagError::Io { context, message } => {
                write!(f, "I/O error in {context}: {message}")
            }
            BagError::UnsupportedVersion { found } => {
                write!(f, "Unsupported bag version: expected 2.0, found '{found}'")
            }
            BagError::TruncatedFrame {
                context,
                requested,
                available,
            } => write!(
                f,
                "Truncated frame while reading {context}: requested {requested} bytes, but only {available} available"
            ),
            BagError::MalformedHeader { reason } => {
                write!(f, "Malformed record header: {reason}")
            }
            BagError::InvalidOp { reason } => {
                write!(f, "Invalid record op: {reason}")
            }
            BagError::UnsupportedCompression { name } => {
                write!(f, "Unsupported chunk compression: '{name}'")
            }
            BagError::ConnectionNotFound { conn } => {
                write!(f, "Connection header not found for conn {conn}")
            }
            BagError::DefinitionParse { context, message } => {
                write!(f, "Definition parse error in {context}: {message}")
            }
            BagError::SchemaMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Schema mismatch on field '{field}': definition says {expected}, target has {found}"
            ),
            BagError::InvalidMessageBody {
                field,
                requested,
                available,
            } => write!(
                f,
                "Invalid message body at field '{field}': requested {requested} bytes, but only {available} remain"
            ),
            BagError::ChunkSizeMismatch { declared, actual } => write!(
                f,
                "Chunk size mismatch: header declares {declared} uncompressed bytes, decompressor produced {actual}"
            ),
        }
    }
}

impl std::error::Error for BagError {}

impl From<std::io::Error> for BagError {
    fn from(err: std::io::Error) -> Self {
        BagError::Io {
            context: "reader".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for bagstream operations.
pub type Result<T> = std::result::Result<T, BagError>;
