//! Record Data Structure
//!
//! This module defines the core `Record` type - the fundamental unit of data
//! in a LogHouse log.
//!
//! ## What is a Record?
//! A record is a single entry in a commit log, similar to:
//! - A Kafka message
//! - A replicated state machine command
//! - An event in an event stream
//!
//! ## Structure
//! Each record contains:
//! - **value**: the payload (arbitrary bytes, opaque to the storage engine)
//! - **offset**: unique, monotonically increasing ID assigned by the log on
//!   append
//!
//! ## Design Decisions
//! - Uses `bytes::Bytes` for zero-copy operations (no allocations when
//!   slicing)
//! - The payload's internal schema belongs to the caller; the engine only
//!   guarantees a byte-identical round-trip
//! - Offset is u64 to support very large logs
//!
//! ## Codec
//! `to_bytes` / `from_bytes` produce the byte form the storage engine writes
//! into segment store files. The encoding is bincode over the serde derive,
//! so the offset travels with the payload and survives reopen.
//!
//! ## Example
//! ```ignore
//! let mut record = Record::new(Bytes::from("hello world"));
//! let offset = log.append(&mut record)?;
//! assert_eq!(record.offset, offset);
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single record in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Value (payload)
    pub value: Bytes,

    /// Offset of this record in the log, assigned on append
    pub offset: u64,
}

impl Record {
    /// Create a record with an unassigned offset. The log overwrites the
    /// offset when the record is appended.
    pub fn new(value: Bytes) -> Self {
        Self { value, offset: 0 }
    }

    /// Encode this record to the byte form stored on disk.
    pub fn to_bytes(&self) -> Result<Bytes> {
        bincode::serialize(self)
            .map(Bytes::from)
            .map_err(|e| Error::Codec(e.to_string()))
    }

    /// Decode a record from its stored byte form.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| Error::Codec(e.to_string()))
    }
}
