//! Segment - A Store/Index Pair Under One Base Offset
//!
//! A segment covers a contiguous range of absolute offsets starting at its
//! base offset. It owns one store file and one index file, both named after
//! the base offset:
//!
//! ```text
//! {dir}/{base_offset}.store   length-prefixed record bytes
//! {dir}/{base_offset}.index   relative offset -> store position
//! ```
//!
//! Keeping the base offset in the filename lets the log reconstruct segment
//! ordering from a directory listing without opening any file. Offsets
//! stored in the index are relative to the base offset so every entry fits
//! in 12 bytes regardless of how large absolute offsets grow; a single
//! segment therefore holds at most 2^32 records.
//!
//! `next_offset` is recovered on open by reading the last index entry: an
//! empty index means the segment starts at its base offset.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use loghouse_core::{Error, Record, Result};

use crate::config::SegmentConfig;
use crate::index::Index;
use crate::store::Store;

/// A contiguous slice of the log: one store plus one index
pub(crate) struct Segment {
    store: Arc<Store>,
    index: Index,

    store_path: PathBuf,
    index_path: PathBuf,

    /// Absolute offset of the first record in this segment, fixed at
    /// creation
    base_offset: u64,

    /// Absolute offset the next append will be assigned
    next_offset: u64,

    config: SegmentConfig,
}

impl Segment {
    /// Open (or create) the segment files for `base_offset` in `dir` and
    /// recover `next_offset` from the index.
    pub(crate) fn open(dir: &Path, base_offset: u64, config: &SegmentConfig) -> Result<Self> {
        let store_path = dir.join(format!("{}.store", base_offset));
        let store_file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&store_path)?;
        let store = Arc::new(Store::open(store_file)?);

        let index_path = dir.join(format!("{}.index", base_offset));
        let index_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&index_path)?;
        let index = Index::open(index_file, config.max_index_bytes)?;

        let next_offset = match index.read(-1) {
            Ok((rel, _)) => base_offset + rel as u64 + 1,
            Err(Error::EndOfData) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            index,
            store_path,
            index_path,
            base_offset,
            next_offset,
            config: config.clone(),
        })
    }

    /// Append a record: assign it the next offset, write its bytes to the
    /// store, and index the position under the relative offset. Returns the
    /// assigned absolute offset.
    pub(crate) fn append(&mut self, record: &mut Record) -> Result<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let p = record.to_bytes()?;
        let (_, pos) = self.store.append(&p)?;
        self.index.write((offset - self.base_offset) as u32, pos)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at the given absolute offset. The caller guarantees
    /// the offset falls in `[base_offset, next_offset)`.
    pub(crate) fn read(&self, offset: u64) -> Result<Record> {
        let (_, pos) = self.index.read((offset - self.base_offset) as i64)?;
        let data = self.store.read(pos)?;
        Record::from_bytes(&data)
    }

    /// Whether either file has reached its size threshold. The index
    /// condition triggers rollover for small records, the store condition
    /// for large ones.
    pub(crate) fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Close the index before the store so the index file is truncated back
    /// to its entry count while the store is still flushable.
    pub(crate) fn close(&mut self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close the segment and delete both files.
    pub(crate) fn remove(&mut self) -> Result<()> {
        self.close()?;
        fs::remove_file(&self.index_path)?;
        fs::remove_file(&self.store_path)?;
        Ok(())
    }

    pub(crate) fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub(crate) fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Shared handle to the store for the log's snapshot reader.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }
}
