// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout bagstream.
//!
//! This module provides the foundational types for the library:
//! - [`BagError`] / [`Result`] - error handling
//! - [`FieldValue`] / [`DecodedMessage`] - dynamic value representation
//! - [`Version`] - bag format version
//! - [`Compression`] - chunk compression identifier

pub mod error;
pub mod value;

pub use error::{BagError, Result};
pub use value::{DecodedMessage, FieldValue, RosDuration, Timestamp};

use std::fmt;

/// Bag format version pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

/// The only bag format version this decoder accepts.
pub const SUPPORTED_VERSION: Version = Version { major: 2, minor: 0 };

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Chunk compression identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Identity (chunk body is raw framed records)
    None,
    /// bzip2 stream
    Bz2,
    /// lz4 frame stream
    Lz4,
}

/// Error returned when parsing a `Compression` from string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCompressionError {
    _private: (),
}

impl fmt::Display for ParseCompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid compression name, expected 'none', 'bz2', or 'lz4'"
        )
    }
}

impl std::error::Error for ParseCompressionError {}

impl std::str::FromStr for Compression {
    type Err = ParseCompressionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Compression::None),
            "bz2" => Ok(Compression::Bz2),
            "lz4" => Ok(Compression::Lz4),
            _ => Err(ParseCompressionError { _private: () }),
        }
    }
}

impl Compression {
    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Bz2 => "bz2",
            Compression::Lz4 => "lz4",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
