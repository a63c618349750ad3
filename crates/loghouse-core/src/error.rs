//! Error Types for LogHouse
//!
//! This module defines all error types that can occur in LogHouse operations.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - `Io`: any filesystem or memory-map failure, propagated verbatim from
//!   the operating system
//!
//! ### Lookup Errors
//! - `OffsetOutOfRange`: the requested offset is not held by any segment
//!
//! ### Capacity Signals
//! - `IndexFull`: a segment's pre-mapped index region is exhausted; the log
//!   consumes this internally by rolling a new segment
//! - `EndOfData`: an index read past the last written entry; used internally
//!   to detect empty segments when recovering `next_offset`
//!
//! ### Codec Errors
//! - `Codec`: a record failed to encode or decode
//!
//! ## Usage
//! All fallible functions in LogHouse return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows using the `?` operator for error
//! propagation.
//!
//! ## Example
//! ```ignore
//! use loghouse_core::{Error, Result};
//!
//! fn lookup(offset: u64, highest: u64) -> Result<u64> {
//!     if offset > highest {
//!         return Err(Error::OffsetOutOfRange(offset));
//!     }
//!     Ok(offset)
//! }
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    #[error("index is full")]
    IndexFull,

    #[error("end of data")]
    EndOfData,

    #[error("record codec error: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, Error>;
