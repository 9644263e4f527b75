// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk body decompression.
//!
//! A chunk's body is a length-limited region of the outer stream holding a
//! compressed concatenation of framed records. [`ChunkDecoder`] wraps that
//! region in the decompressor named by the chunk header and counts the
//! bytes it produces, so the driver can verify the chunk's declared
//! uncompressed size when the sub-stream drains.

use std::io::{self, Read, Take};

use bzip2::read::BzDecoder;
use lz4_flex::frame::FrameDecoder;

use crate::core::{BagError, Compression, Result};

/// Decompressor selected by the chunk's `compression` header field.
enum Decomp<R: Read> {
    /// `none`: identity over the limited region
    Plain(Take<R>),
    /// `bz2`: bzip2 stream
    Bz2(BzDecoder<Take<R>>),
    /// `lz4`: lz4 frame stream
    Lz4(Box<FrameDecoder<Take<R>>>),
}

/// Decompressing reader over one chunk body.
pub(crate) struct ChunkDecoder<R: Read> {
    inner: Decomp<R>,
    /// Decompressed bytes handed out so far
    produced: u64,
    /// Uncompressed size declared by the chunk header
    declared_size: u32,
}

impl<R: Read> ChunkDecoder<R> {
    /// Wrap `reader`, limited to `compressed_len` bytes, in the
    /// decompressor for `compression`.
    pub fn new(
        reader: R,
        compressed_len: u64,
        compression: Compression,
        declared_size: u32,
    ) -> Self {
        let limited = reader.take(compressed_len);
        let inner = match compression {
            Compression::None => Decomp::Plain(limited),
            Compression::Bz2 => Decomp::Bz2(BzDecoder::new(limited)),
            Compression::Lz4 => Decomp::Lz4(Box::new(FrameDecoder::new(limited))),
        };
        Self {
            inner,
            produced: 0,
            declared_size,
        }
    }

    /// Decompressed bytes produced so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Finish the chunk: verify the declared uncompressed size, skip any
    /// compressed bytes the decompressor did not consume, and hand back
    /// the outer reader.
    pub fn finish(self) -> Result<R> {
        if self.produced != u64::from(self.declared_size) {
            return Err(BagError::chunk_size_mismatch(
                u64::from(self.declared_size),
                self.produced,
            ));
        }

        let mut limited = match self.inner {
            Decomp::Plain(take) => take,
            Decomp::Bz2(decoder) => decoder.into_inner(),
            Decomp::Lz4(decoder) => decoder.into_inner(),
        };

        // Drain whatever the decompressor left behind so the outer reader
        // resumes exactly at the next record boundary.
        io::copy(&mut limited, &mut io::sink())
            .map_err(|e| BagError::io("chunk body", e.to_string()))?;

        Ok(limited.into_inner())
    }
}

impl<R: Read> Read for ChunkDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.inner {
            Decomp::Plain(r) => r.read(buf)?,
            Decomp::Bz2(r) => r.read(buf)?,
            Decomp::Lz4(r) => r.read(buf)?,
        };
        self.produced += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    fn bz2_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn lz4_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_pass_through() {
        let payload = b"record bytes".to_vec();
        let mut stream = payload.clone();
        stream.extend_from_slice(b"NEXT");

        let mut decoder = ChunkDecoder::new(
            Cursor::new(stream),
            payload.len() as u64,
            Compression::None,
            payload.len() as u32,
        );

        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload);
        assert_eq!(decoder.produced(), payload.len() as u64);

        // the outer reader resumes right after the chunk body
        let mut rest = decoder.finish().unwrap();
        let mut tail = Vec::new();
        rest.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"NEXT");
    }

    #[test]
    fn test_bz2_round_trip() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let compressed = bz2_compress(&payload);
        let mut stream = compressed.clone();
        stream.extend_from_slice(b"AFTER");

        let mut decoder = ChunkDecoder::new(
            Cursor::new(stream),
            compressed.len() as u64,
            Compression::Bz2,
            payload.len() as u32,
        );

        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload);

        let mut rest = decoder.finish().unwrap();
        let mut tail = Vec::new();
        rest.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"AFTER");
    }

    #[test]
    fn test_lz4_round_trip() {
        let payload = b"sensor sample ".repeat(32);
        let compressed = lz4_compress(&payload);
        let mut stream = compressed.clone();
        stream.extend_from_slice(b"TAIL");

        let mut decoder = ChunkDecoder::new(
            Cursor::new(stream),
            compressed.len() as u64,
            Compression::Lz4,
            payload.len() as u32,
        );

        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload);

        let mut rest = decoder.finish().unwrap();
        let mut tail = Vec::new();
        rest.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"TAIL");
    }

    #[test]
    fn test_empty_plain_chunk() {
        let decoder = ChunkDecoder::new(Cursor::new(Vec::new()), 0, Compression::None, 0);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_size_mismatch_detected() {
        let payload = b"12345".to_vec();
        let mut decoder = ChunkDecoder::new(
            Cursor::new(payload.clone()),
            payload.len() as u64,
            Compression::None,
            99, // wrong declared size
        );

        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();

        let err = decoder.finish().unwrap_err();
        match err {
            BagError::ChunkSizeMismatch { declared, actual } => {
                assert_eq!(declared, 99);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
