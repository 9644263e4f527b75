// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Pull-based bag stream driver.
//!
//! [`BagReader`] validates the version preamble, frames records, classifies
//! them by op, maintains the connection registry, and transparently drains
//! chunk bodies through a decompressing sub-stream. Single-threaded: the
//! caller pulls one record at a time, and records surface in exact file
//! order (chunk contents between the chunk record and the next outer one).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::core::{BagError, Result, Version, SUPPORTED_VERSION};
use crate::io::chunk::ChunkDecoder;
use crate::io::framer::{read_record, FramedRecord};
use crate::io::header::iterate_header_fields;
use crate::io::record::{
    BagHeaderRecord, ChunkInfoRecord, ChunkRecord, ConnectionHeader, ConnectionRecord,
    IndexDataRecord, MessageDataRecord, Op, RawRecord, Record,
};
use crate::types::BufferPool;

/// Longest accepted version line, including some slack for diagnostics.
const MAX_VERSION_LINE: usize = 64;

/// Current byte source of the driver.
enum Source<R: Read> {
    /// Reading outer records
    Outer(BufReader<R>),
    /// Draining a chunk body through its decompressor
    Chunk(ChunkDecoder<BufReader<R>>),
    /// Transient state while swapping sources; never observed by callers
    Poisoned,
}

/// Streaming decoder for one bag.
///
/// Records are surfaced in exact file order. Errors latch: after any
/// failure, every subsequent [`read_next`](Self::read_next) call reports
/// the same error. Dropping the reader releases the source, the
/// decompressor, and all pooled scratch deterministically.
///
/// The reader is not thread-safe; concurrent callers must serialise
/// externally.
pub struct BagReader<R: Read> {
    source: Source<R>,
    pool: BufferPool,
    connections: HashMap<u32, Arc<ConnectionHeader>>,
    version: Option<Version>,
    fatal: Option<BagError>,
}

impl BagReader<File> {
    /// Open a bag file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| BagError::io(path.as_ref().display().to_string(), e.to_string()))?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BagReader<R> {
    /// Wrap a byte source in a bag decoder.
    ///
    /// No bytes are read until the first [`read_next`](Self::read_next)
    /// call, which validates the `#ROSBAG V2.0` preamble.
    pub fn new(reader: R) -> Self {
        Self {
            source: Source::Outer(BufReader::new(reader)),
            pool: BufferPool::new(),
            connections: HashMap::new(),
            version: None,
            fatal: None,
        }
    }

    /// The validated format version, once the preamble has been read.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// The connection registry accumulated so far.
    ///
    /// Entries stay valid for the reader's lifetime. A connection record
    /// re-registered under an existing id replaces the earlier entry;
    /// subsequent messages decode against the replacement.
    pub fn connections(&self) -> &HashMap<u32, Arc<ConnectionHeader>> {
        &self.connections
    }

    /// Pull the next record.
    ///
    /// Returns `Ok(None)` at end of stream. While a chunk is being
    /// drained, its embedded records surface here, in their encoded order,
    /// before the next outer record.
    ///
    /// Values decoded out of a returned record may alias its scratch
    /// buffer; they end with the record (see
    /// [`MessageDataRecord::view_as`]).
    pub fn read_next(&mut self) -> Result<Option<Record>> {
        if let Some(err) = &self.fatal {
            return Err(err.clone());
        }
        match self.read_next_inner() {
            Ok(record) => Ok(record),
            Err(err) => {
                self.fatal = Some(err.clone());
                Err(err)
            }
        }
    }

    fn read_next_inner(&mut self) -> Result<Option<Record>> {
        if self.version.is_none() {
            self.check_version()?;
        }

        loop {
            let in_chunk = matches!(self.source, Source::Chunk(_));
            let framed = match &mut self.source {
                Source::Outer(reader) => read_record(reader, &self.pool)?,
                Source::Chunk(reader) => read_record(reader, &self.pool)?,
                Source::Poisoned => {
                    return Err(BagError::io("bag stream", "source lost during chunk swap"))
                }
            };

            match framed {
                Some(framed) => return self.classify(framed, in_chunk),
                None if in_chunk => {
                    self.finish_chunk()?;
                    continue;
                }
                None => return Ok(None),
            }
        }
    }

    /// Validate the `#ROSBAG V<major>.<minor>\n` preamble.
    fn check_version(&mut self) -> Result<()> {
        let reader = match &mut self.source {
            Source::Outer(reader) => reader,
            _ => return Err(BagError::io("bag stream", "version check after chunk entry")),
        };

        let mut line = Vec::with_capacity(16);
        loop {
            let mut byte = [0u8; 1];
            let n = reader
                .read(&mut byte)
                .map_err(|e| BagError::io("version line", e.to_string()))?;
            if n == 0 {
                return Err(BagError::truncated("version line", line.len() + 1, line.len()));
            }
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
            if line.len() > MAX_VERSION_LINE {
                return Err(BagError::unsupported_version(String::from_utf8_lossy(
                    &line,
                )));
            }
        }

        let text = std::str::from_utf8(&line)
            .map_err(|_| BagError::unsupported_version(String::from_utf8_lossy(&line)))?;

        let version = parse_version_line(text)
            .ok_or_else(|| BagError::unsupported_version(text.to_string()))?;
        if version != SUPPORTED_VERSION {
            return Err(BagError::unsupported_version(text.to_string()));
        }

        trace!(%version, "validated bag preamble");
        self.version = Some(version);
        Ok(())
    }

    /// Build the typed view for one framed record and update driver state.
    fn classify(&mut self, framed: FramedRecord, in_chunk: bool) -> Result<Option<Record>> {
        match framed {
            FramedRecord::ChunkShell { record, data_len } => {
                if in_chunk {
                    return Err(BagError::invalid_op("chunk record inside a chunk"));
                }
                log_unknown_keys(&record);

                let chunk = ChunkRecord::new(record);
                let compression = chunk.compression()?;
                let declared_size = chunk.size()?;
                self.enter_chunk(u64::from(data_len), compression, declared_size)?;

                debug!(%compression, compressed_len = data_len, declared_size, "entering chunk");
                Ok(Some(Record::Chunk(chunk)))
            }
            FramedRecord::Complete(record) => {
                log_unknown_keys(&record);
                match record.op() {
                    Op::BagHeader => Ok(Some(Record::BagHeader(BagHeaderRecord::new(record)))),
                    Op::Connection => {
                        let view = ConnectionRecord::new(record);
                        let conn = view.conn()?;
                        let header = Arc::new(view.connection_header()?);
                        if self.connections.insert(conn, header).is_some() {
                            debug!(conn, "replaced connection header");
                        } else {
                            trace!(conn, "registered connection header");
                        }
                        Ok(Some(Record::Connection(view)))
                    }
                    Op::MessageData => {
                        let conn = crate::io::header::find_field_u32(record.header(), "conn")?;
                        let header = self
                            .connections
                            .get(&conn)
                            .cloned()
                            .ok_or_else(|| BagError::connection_not_found(conn))?;
                        Ok(Some(Record::MessageData(MessageDataRecord::new(
                            record, header,
                        ))))
                    }
                    Op::IndexData => Ok(Some(Record::IndexData(IndexDataRecord::new(record)))),
                    Op::ChunkInfo => Ok(Some(Record::ChunkInfo(ChunkInfoRecord::new(record)))),
                    // the framer returns chunks as shells and rejects
                    // unknown op bytes before this point
                    Op::Chunk | Op::Invalid => {
                        Err(BagError::invalid_op("malformed record classification"))
                    }
                }
            }
        }
    }

    /// Swap the source into the chunk's decompressing sub-stream.
    fn enter_chunk(
        &mut self,
        compressed_len: u64,
        compression: crate::core::Compression,
        declared_size: u32,
    ) -> Result<()> {
        match std::mem::replace(&mut self.source, Source::Poisoned) {
            Source::Outer(reader) => {
                self.source = Source::Chunk(ChunkDecoder::new(
                    reader,
                    compressed_len,
                    compression,
                    declared_size,
                ));
                Ok(())
            }
            other => {
                self.source = other;
                Err(BagError::io("bag stream", "chunk entry without outer source"))
            }
        }
    }

    /// The chunk sub-stream hit end of stream: verify it and resume the
    /// outer reader.
    fn finish_chunk(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.source, Source::Poisoned) {
            Source::Chunk(decoder) => {
                debug!(produced = decoder.produced(), "chunk drained");
                let reader = decoder.finish()?;
                self.source = Source::Outer(reader);
                Ok(())
            }
            other => {
                self.source = other;
                Err(BagError::io("bag stream", "chunk finish without chunk source"))
            }
        }
    }
}

/// Parse `#ROSBAG V<major>.<minor>` (the newline is already consumed).
fn parse_version_line(line: &str) -> Option<Version> {
    let rest = line.strip_prefix("#ROSBAG V")?;
    let (major, minor) = rest.split_once('.')?;
    Some(Version {
        major: major.parse().ok()?,
        minor: minor.parse().ok()?,
    })
}

/// Known header keys per op. Anything else is tolerated for forward
/// compatibility, but reported at debug level.
fn known_keys(op: Op) -> &'static [&'static [u8]] {
    match op {
        Op::BagHeader => &[b"op", b"index_pos", b"conn_count", b"chunk_count"],
        Op::Chunk => &[b"op", b"compression", b"size"],
        Op::Connection => &[b"op", b"conn", b"topic"],
        Op::MessageData => &[b"op", b"conn", b"time"],
        Op::IndexData => &[b"op", b"ver", b"conn", b"count"],
        Op::ChunkInfo => &[
            b"op",
            b"ver",
            b"chunk_pos",
            b"start_time",
            b"end_time",
            b"count",
        ],
        Op::Invalid => &[b"op"],
    }
}

/// Log unknown header keys for forward compatibility diagnostics.
fn log_unknown_keys(record: &RawRecord) {
    let known = known_keys(record.op());
    // the header already framed successfully, so iteration cannot fail here
    let _ = iterate_header_fields(record.header(), |key, _| {
        if !known.contains(&key) {
            debug!(
                op = ?record.op(),
                key = %String::from_utf8_lossy(key),
                "ignoring unknown header field"
            );
        }
        true
    });
}
