//! Store File - Append-Only Record Bytes
//!
//! The store is the file that holds the actual record data. It knows nothing
//! about offsets; the index maps offsets to positions in this file.
//!
//! ## File Format
//!
//! Records are packed back to back, each one length-prefixed:
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────┬─────────┐
//! │ Length (u64) │ Payload (N bytes)│ Length (u64) │ Payload │ ...
//! └──────────────┴──────────────────┴──────────────┴─────────┘
//!     big-endian
//! ```
//!
//! The length prefix makes the store self-delimiting: the index accelerates
//! lookups but is not required to find record boundaries.
//!
//! ## Buffering
//!
//! Appends go through a `BufWriter` to amortize small writes. `size` tracks
//! the logical append position including buffered bytes, so positions handed
//! to the index are correct before any flush happens. Every read flushes the
//! buffer first - a record is readable the moment `append` returns.
//!
//! ## Thread Safety
//!
//! All operations serialize on an internal mutex. This is required because
//! reads flush the shared buffered writer, which would otherwise race with
//! concurrent appends.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use loghouse_core::Result;

/// Number of bytes used to store a record's length prefix
pub const LEN_WIDTH: u64 = 8;

/// Append-only byte file holding length-prefixed record payloads
pub(crate) struct Store {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    /// Handle used for positional reads
    file: File,

    /// Buffered writer over a cloned handle of the same file
    writer: BufWriter<File>,

    /// Logical size: bytes appended so far, including buffered bytes
    size: u64,
}

impl Store {
    /// Wrap an open file. The current file length becomes the logical size,
    /// so re-opening an existing store resumes where it left off.
    pub(crate) fn open(file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        let writer = BufWriter::new(file.try_clone()?);
        Ok(Self {
            inner: Mutex::new(StoreInner { file, writer, size }),
        })
    }

    /// Append the given bytes as one length-prefixed record. Returns the
    /// number of bytes written (payload plus prefix) and the position the
    /// record starts at.
    pub(crate) fn append(&self, p: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.lock();

        let pos = inner.size;

        inner.writer.write_all(&(p.len() as u64).to_be_bytes())?;
        inner.writer.write_all(p)?;

        let written = p.len() as u64 + LEN_WIDTH;
        inner.size += written;

        Ok((written, pos))
    }

    /// Read the record stored at the given position.
    pub(crate) fn read(&self, pos: u64) -> Result<Bytes> {
        let mut inner = self.lock();

        // Make sure any buffered data reaches the file first.
        inner.writer.flush()?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        inner.file.read_exact_at(&mut len_buf, pos)?;

        let mut payload = vec![0u8; u64::from_be_bytes(len_buf) as usize];
        inner.file.read_exact_at(&mut payload, pos + LEN_WIDTH)?;

        Ok(Bytes::from(payload))
    }

    /// Positional read of raw store bytes into `buf`. Returns the number of
    /// bytes read, which is 0 at end of file. Used by the log's snapshot
    /// reader.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.lock();
        inner.writer.flush()?;
        Ok(inner.file.read_at(buf, offset)?)
    }

    /// Logical size in bytes, including buffered but unflushed appends.
    pub(crate) fn size(&self) -> u64 {
        self.lock().size
    }

    /// Flush buffered data to the file. The underlying handles close when
    /// the store is dropped.
    pub(crate) fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir, name: &str) -> Store {
        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(dir.path().join(name))
            .unwrap();
        Store::open(file).unwrap()
    }

    // ---------------------------------------------------------------
    // Append / read round-trip
    // ---------------------------------------------------------------

    #[test]
    fn test_append_then_read() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        let payload = b"hello world";
        let (written, pos) = store.append(payload).unwrap();
        assert_eq!(written, payload.len() as u64 + LEN_WIDTH);
        assert_eq!(pos, 0);

        let read = store.read(pos).unwrap();
        assert_eq!(read, Bytes::from(&payload[..]));
    }

    #[test]
    fn test_append_advances_position() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        let mut expected_pos = 0u64;
        for i in 0..10u8 {
            let payload = vec![i; (i as usize) + 1];
            let (written, pos) = store.append(&payload).unwrap();
            assert_eq!(pos, expected_pos);
            expected_pos += written;
        }
        assert_eq!(store.size(), expected_pos);
    }

    #[test]
    fn test_read_is_visible_immediately_after_append() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        // No explicit flush between append and read
        let (_, pos) = store.append(b"unflushed").unwrap();
        assert_eq!(store.read(pos).unwrap(), Bytes::from("unflushed"));
    }

    #[test]
    fn test_read_empty_payload() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        let (written, pos) = store.append(b"").unwrap();
        assert_eq!(written, LEN_WIDTH);
        assert!(store.read(pos).unwrap().is_empty());
    }

    #[test]
    fn test_read_past_end_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        store.append(b"only record").unwrap();
        assert!(store.read(store.size()).is_err());
    }

    // ---------------------------------------------------------------
    // read_at
    // ---------------------------------------------------------------

    #[test]
    fn test_read_at_returns_raw_frame() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        let payload = b"abc";
        store.append(payload).unwrap();

        let mut buf = vec![0u8; LEN_WIDTH as usize + payload.len()];
        let n = store.read_at(&mut buf, 0).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(&buf[..LEN_WIDTH as usize], &(payload.len() as u64).to_be_bytes());
        assert_eq!(&buf[LEN_WIDTH as usize..], payload);
    }

    #[test]
    fn test_read_at_past_end_returns_zero() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "test.store");

        store.append(b"x").unwrap();
        let mut buf = [0u8; 16];
        let n = store.read_at(&mut buf, store.size()).unwrap();
        assert_eq!(n, 0);
    }

    // ---------------------------------------------------------------
    // Reopen
    // ---------------------------------------------------------------

    #[test]
    fn test_reopen_recovers_size() {
        let dir = TempDir::new().unwrap();

        let store = open_store(&dir, "test.store");
        let (written, _) = store.append(b"persisted").unwrap();
        store.close().unwrap();
        drop(store);

        let store = open_store(&dir, "test.store");
        assert_eq!(store.size(), written);
        assert_eq!(store.read(0).unwrap(), Bytes::from("persisted"));
    }

    #[test]
    fn test_reopen_appends_after_existing_data() {
        let dir = TempDir::new().unwrap();

        let store = open_store(&dir, "test.store");
        let (first_written, _) = store.append(b"first").unwrap();
        store.close().unwrap();
        drop(store);

        let store = open_store(&dir, "test.store");
        let (_, pos) = store.append(b"second").unwrap();
        assert_eq!(pos, first_written);
        assert_eq!(store.read(pos).unwrap(), Bytes::from("second"));
    }
}
