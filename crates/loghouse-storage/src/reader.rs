//! Snapshot Reader - Streaming the Raw Log Bytes
//!
//! `LogReader` implements `std::io::Read` over the concatenation of every
//! segment's store file, in segment order, from position 0 to the end. The
//! stream carries the raw store bytes - length prefixes included - so a
//! replication layer can ship it as a snapshot and restore it byte for byte.
//!
//! The reader snapshots the segment list when it is created. Segments
//! truncated away afterwards stay readable through the reader's shared store
//! handles until it is dropped.

use std::io::{self, Read};
use std::sync::Arc;

use loghouse_core::Error;

use crate::store::Store;

/// A finite, non-restartable reader over every store in the log
pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,

    /// Read position within the current store
    pos: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            pos: 0,
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.current < self.stores.len() {
            let n = self.stores[self.current]
                .read_at(buf, self.pos)
                .map_err(into_io)?;
            if n > 0 {
                self.pos += n as u64;
                return Ok(n);
            }
            // Current store exhausted, move on to the next one
            self.current += 1;
            self.pos = 0;
        }

        Ok(0)
    }
}

fn into_io(err: Error) -> io::Error {
    match err {
        Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}
