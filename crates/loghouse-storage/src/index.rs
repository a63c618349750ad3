//! Index File - Memory-Mapped Offset Lookup
//!
//! The index maps a segment-relative offset to the position of its record in
//! the store file. Entries have a fixed width, so looking up an offset is
//! pure arithmetic - no searching.
//!
//! ## File Format
//!
//! ```text
//! Entry i lives at byte i * 12:
//! ┌──────────────────────────┬────────────────────────┐
//! │ Relative offset (u32 be) │ Store position (u64 be)│
//! └──────────────────────────┴────────────────────────┘
//!          4 bytes                    8 bytes
//! ```
//!
//! Entries are written in strictly increasing relative-offset order
//! (0, 1, 2, ...), one per appended record.
//!
//! ## Memory Mapping
//!
//! The file is grown to `max_index_bytes` before mapping because the mapping
//! cannot be resized afterwards. The mapped region is a fixed arena; `size`
//! is the write cursor within it. On close the mapping is flushed, the file
//! is synced and then truncated back to `size`, so the file length of a
//! cleanly closed index equals its entry count times the entry width - which
//! is how `size` is recovered on reopen.
//!
//! After an unclean shutdown the file may still be at the full arena length
//! with zeroed trailing bytes. The engine does not scrub these; establishing
//! a recovery protocol is the caller's concern.

use std::fs::File;

use loghouse_core::{Error, Result};
use memmap2::MmapMut;

/// Width of the relative offset field
const OFF_WIDTH: u64 = 4;

/// Width of the store position field
const POS_WIDTH: u64 = 8;

/// Width of one index entry
pub const ENTRY_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// Memory-mapped fixed-stride offset index for one segment
pub(crate) struct Index {
    file: File,
    mmap: MmapMut,

    /// Bytes of valid entries written so far; always a multiple of
    /// ENTRY_WIDTH
    size: u64,
}

impl Index {
    /// Wrap an open file: recover `size` from the current file length, grow
    /// the file to the arena length, then map it read/write.
    pub(crate) fn open(file: File, max_index_bytes: u64) -> Result<Self> {
        let size = file.metadata()?.len();

        // The mapping cannot grow later, so the file must reach its full
        // arena length before it is mapped.
        file.set_len(max_index_bytes)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self { file, mmap, size })
    }

    /// Append an entry. Fails with `IndexFull` when the arena has no room
    /// for another entry, which is the segment's signal to roll.
    pub(crate) fn write(&mut self, off: u32, pos: u64) -> Result<()> {
        if (self.mmap.len() as u64) < self.size + ENTRY_WIDTH {
            return Err(Error::IndexFull);
        }

        let at = self.size as usize;
        self.mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&off.to_be_bytes());
        self.mmap[at + OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&pos.to_be_bytes());

        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Read the entry for the given relative offset; `-1` reads the last
    /// entry. Returns the stored relative offset and store position, or
    /// `EndOfData` when the index is empty or the offset is past the last
    /// entry.
    pub(crate) fn read(&self, in_off: i64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::EndOfData);
        }

        let out = if in_off == -1 {
            (self.size / ENTRY_WIDTH - 1) as u32
        } else {
            in_off as u32
        };

        let at = out as u64 * ENTRY_WIDTH;
        if self.size < at + ENTRY_WIDTH {
            return Err(Error::EndOfData);
        }

        let at = at as usize;
        let mut off_buf = [0u8; OFF_WIDTH as usize];
        off_buf.copy_from_slice(&self.mmap[at..at + OFF_WIDTH as usize]);
        let mut pos_buf = [0u8; POS_WIDTH as usize];
        pos_buf.copy_from_slice(&self.mmap[at + OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]);

        Ok((u32::from_be_bytes(off_buf), u64::from_be_bytes(pos_buf)))
    }

    /// Bytes of valid entries written so far.
    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    /// Flush the mapping, sync the file, and truncate it back to `size` so
    /// the next open recovers the entry count from the file length.
    pub(crate) fn close(&mut self) -> Result<()> {
        self.mmap.flush()?;
        self.file.sync_all()?;
        self.file.set_len(self.size)?;
        Ok(())
    }
}
