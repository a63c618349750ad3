//! Log - The Segmented Commit Log
//!
//! The log ties an ordered list of segments together behind one interface.
//! Appends go to the active segment (the last in the list); reads locate the
//! segment covering the requested offset; when the active segment fills up,
//! a fresh one is rolled at the next offset.
//!
//! ## Directory Layout
//!
//! Each segment contributes a `{base_offset}.store` / `{base_offset}.index`
//! pair to the log directory. On open the directory is scanned, the store
//! file stems are parsed as base offsets and sorted numerically (a
//! lexicographic sort would put 10 before 2), and one segment is opened per
//! base offset. An empty directory gets a single segment at the configured
//! initial offset.
//!
//! ## Locking
//!
//! One reader/writer lock guards the segment list. `read`, `lowest_offset`
//! and `highest_offset` take it shared; everything that can change the list
//! or the active segment takes it exclusive. Stores carry their own mutex on
//! top, so snapshot readers handed out by `reader()` stay safe after the log
//! lock is released.
//!
//! ## Truncation
//!
//! `truncate(lowest)` drops every segment whose highest offset is at or
//! below `lowest` and deletes its files. Replication layers call this
//! periodically once records have been applied everywhere and snapshotted.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use loghouse_core::{Error, Record, Result};
use tracing::{debug, info, warn};

use crate::config::LogConfig;
use crate::reader::LogReader;
use crate::segment::Segment;

/// A persistent, append-only commit log over a directory of segments
pub struct Log {
    dir: PathBuf,
    config: LogConfig,

    /// Segments ordered by ascending base offset; the last one is active.
    /// Never empty between `open` and `remove`.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open the log in `dir`, creating the directory and an initial segment
    /// if needed. Zero size limits fall back to their defaults.
    pub fn open(dir: impl AsRef<Path>, mut config: LogConfig) -> Result<Self> {
        if config.segment.max_store_bytes == 0 {
            config.segment.max_store_bytes = 1024;
        }
        if config.segment.max_index_bytes == 0 {
            config.segment.max_index_bytes = 1024;
        }

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let segments = Self::load_segments(&dir, &config)?;
        info!(dir = ?dir, segments = segments.len(), "log opened");

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Scan the directory and open one segment per store file, sorted by
    /// base offset. Index files are implied by their store companion.
    fn load_segments(dir: &Path, config: &LogConfig) -> Result<Vec<Segment>> {
        let mut base_offsets = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("store") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                Some(base) => base_offsets.push(base),
                None => warn!(file = ?path, "skipping non-segment file"),
            }
        }
        base_offsets.sort_unstable();

        let mut segments = Vec::with_capacity(base_offsets.len().max(1));
        for base in base_offsets {
            segments.push(Segment::open(dir, base, &config.segment)?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                dir,
                config.segment.initial_offset,
                &config.segment,
            )?);
        }
        Ok(segments)
    }

    /// Append a record to the active segment and return its assigned
    /// offset, rolling a new segment when the active one fills up.
    pub fn append(&self, record: &mut Record) -> Result<u64> {
        let mut segments = self.write_lock();

        // A segment re-opened at capacity must roll before it can accept
        // anything; otherwise its index would reject the write.
        if active(&segments).is_maxed() {
            let base = active(&segments).next_offset();
            roll(&self.dir, &self.config, &mut segments, base)?;
        }

        let offset = active_mut(&mut segments).append(record)?;

        if active(&segments).is_maxed() {
            roll(&self.dir, &self.config, &mut segments, offset + 1)?;
        }

        Ok(offset)
    }

    /// Read the record stored at the given offset.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.read_lock();

        // Segment counts stay small (tens), so a linear scan is fine here.
        let segment = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset());

        match segment {
            Some(s) => s.read(offset),
            None => Err(Error::OffsetOutOfRange(offset)),
        }
    }

    /// Offset of the oldest record still in the log (the first segment's
    /// base offset).
    pub fn lowest_offset(&self) -> u64 {
        let segments = self.read_lock();
        active_first(&segments).base_offset()
    }

    /// Offset of the newest record in the log. An empty log returns 0,
    /// which is indistinguishable from a log holding exactly offset 0;
    /// callers disambiguate with `lowest_offset` and a probing `read`.
    pub fn highest_offset(&self) -> u64 {
        let segments = self.read_lock();
        let next = active(&segments).next_offset();
        if next == 0 {
            0
        } else {
            next - 1
        }
    }

    /// Drop every segment whose highest offset is at or below `lowest` and
    /// delete its files. If that leaves nothing, a fresh segment is created
    /// at `lowest + 1` so the log stays usable.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.write_lock();

        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(segments.len());
        for segment in segments.drain(..) {
            if segment.next_offset() <= lowest + 1 {
                dropped.push(segment);
            } else {
                kept.push(segment);
            }
        }
        *segments = kept;

        // Delete the dropped segments' files before any replacement is
        // created: an empty active segment at `lowest + 1` may be among
        // them, and its files must not outlive it under the same name.
        let removed = dropped.len();
        for mut segment in dropped {
            segment.remove()?;
        }

        // Everything was truncated away: start a fresh segment past the cut
        if segments.is_empty() {
            segments.push(Segment::open(&self.dir, lowest + 1, &self.config.segment)?);
        }

        info!(lowest, removed, "log truncated");
        Ok(())
    }

    /// A reader over the raw bytes of every store in segment order, length
    /// prefixes included. Intended for snapshot export; the stream is finite
    /// and not restartable.
    pub fn reader(&self) -> LogReader {
        let segments = self.write_lock();
        LogReader::new(segments.iter().map(|s| s.store()).collect())
    }

    /// Flush and close every segment in order.
    pub fn close(&self) -> Result<()> {
        let mut segments = self.write_lock();
        for segment in segments.iter_mut() {
            segment.close()?;
        }
        Ok(())
    }

    /// Close the log and delete its directory. Consumes the log: no segment
    /// survives, so no further operation is possible.
    pub fn remove(self) -> Result<()> {
        {
            let mut segments = self.write_lock();
            for segment in segments.iter_mut() {
                segment.close()?;
            }
            segments.clear();
        }
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Delete all data and start over with one empty segment at the
    /// configured initial offset.
    pub fn reset(&self) -> Result<()> {
        let mut segments = self.write_lock();

        for segment in segments.iter_mut() {
            segment.close()?;
        }
        segments.clear();

        fs::remove_dir_all(&self.dir)?;
        fs::create_dir_all(&self.dir)?;
        segments.push(Segment::open(
            &self.dir,
            self.config.segment.initial_offset,
            &self.config.segment,
        )?);

        debug!(dir = ?self.dir, "log reset");
        Ok(())
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Vec<Segment>> {
        self.segments.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Vec<Segment>> {
        self.segments.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Open a fresh segment at `base` and make it the active one.
fn roll(dir: &Path, config: &LogConfig, segments: &mut Vec<Segment>, base: u64) -> Result<()> {
    segments.push(Segment::open(dir, base, &config.segment)?);
    debug!(base_offset = base, "segment rolled");
    Ok(())
}

// The segment list is never empty between open and remove; these keep that
// invariant in one place.

fn active(segments: &[Segment]) -> &Segment {
    segments.last().expect("log has at least one segment")
}

fn active_mut(segments: &mut [Segment]) -> &mut Segment {
    segments.last_mut().expect("log has at least one segment")
}

fn active_first(segments: &[Segment]) -> &Segment {
    segments.first().expect("log has at least one segment")
}
