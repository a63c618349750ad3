//! LogHouse Storage Engine
//!
//! This crate implements the on-disk commit log for LogHouse - the storage
//! primitive the rest of the service (replication, serving, discovery) is
//! layered on.
//!
//! ## What is the Storage Engine?
//!
//! A persistent, append-only log. Records are written in order, assigned
//! monotonically increasing 64-bit offsets, and are randomly readable by
//! offset. The engine handles:
//!
//! 1. **Appending**: framing record bytes into segment store files
//! 2. **Indexing**: memory-mapped offset indexes for O(1) offset lookup
//! 3. **Rollover**: sealing the active segment and opening a fresh one when
//!    either the store or the index reaches its size threshold
//! 4. **Truncation**: dropping whole segments from the front of the log
//! 5. **Snapshots**: a streaming reader over the raw store bytes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Log                                  │
//! │ - ordered segment list               │
//! │ - routes appends to the active tail  │
//! │ - routes reads by offset lookup      │
//! ├──────────────┬───────────────────────┤
//! │ Segment      │ Segment (active)      │
//! │ ┌──────────┐ │ ┌──────────┐          │
//! │ │ Store    │ │ │ Store    │  .store  │
//! │ ├──────────┤ │ ├──────────┤          │
//! │ │ Index    │ │ │ Index    │  .index  │
//! │ └──────────┘ │ └──────────┘          │
//! └──────────────┴───────────────────────┘
//! ```
//!
//! Data flow on append:
//! `Log -> active Segment -> Store (bytes at position) -> Index (relative
//! offset -> position) -> next_offset advances`.
//!
//! Data flow on read:
//! `Log (locate segment) -> Index (offset -> position) -> Store (position ->
//! bytes) -> Record`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use bytes::Bytes;
//! use loghouse_core::Record;
//! use loghouse_storage::{Log, LogConfig};
//!
//! let log = Log::open("./data/orders-0", LogConfig::default())?;
//!
//! let mut record = Record::new(Bytes::from("hello"));
//! let offset = log.append(&mut record)?;
//!
//! let read = log.read(offset)?;
//! assert_eq!(read.value, Bytes::from("hello"));
//! ```
//!
//! ## Durability
//!
//! Appends land in a buffered writer and become readable immediately (the
//! store flushes before every read). Data is fsynced when a segment's index
//! is closed or the log is truncated, not per-append. Callers that need
//! stronger guarantees close the log explicitly.
//!
//! ## Thread Safety
//!
//! `Log` is safe to share across threads: reads take a shared lock, every
//! mutation takes the exclusive lock, and each store additionally serializes
//! its own file access behind a mutex.

pub mod config;
pub mod log;
pub mod reader;

mod index;
mod segment;
mod store;

pub use config::{LogConfig, SegmentConfig};
pub use index::ENTRY_WIDTH;
pub use log::Log;
pub use reader::LogReader;
pub use store::LEN_WIDTH;
