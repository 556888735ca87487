//! The memory-mapped backing store for a JSON document.
//!
//! A [`Store`] maps the document file read/write and hands the codec a plain
//! byte region. Growth happens in fixed increments; the zero bytes padding
//! the mapping out to the allocation boundary are trimmed off the file again
//! on [`flush`](Store::flush). Parser and generator duplicate a
//! [`SharedStore`] handle and keep independent cursors over the same bytes,
//! so writes through one view are visible to later scans through another.

use std::{
    cell::RefCell,
    fs::{File, OpenOptions},
    path::Path,
    rc::Rc,
};

use memmap2::MmapMut;
use tracing::{debug, trace};

use crate::error::Result;

/// Smallest size a backing file is allocated at.
const MIN_MAP: usize = 4096;

/// Fixed increment the mapping grows by.
const GROW_STEP: usize = 4096;

/// Single-threaded shared handle to a [`Store`]. Cursor state lives in the
/// parser/generator holding the handle, not in the store itself.
pub type SharedStore = Rc<RefCell<Store>>;

/// A growable, memory-mapped byte region backing one JSON document.
#[derive(Debug)]
pub struct Store {
    file: File,
    map: MmapMut,
    /// End of the document bytes; everything past it is zero padding.
    logical: usize,
}

impl Store {
    /// Opens (creating if absent) and maps the document at `path`.
    ///
    /// Zero-length files are pre-allocated to the minimum map size.
    ///
    /// # Errors
    ///
    /// Any I/O failure while opening, sizing or mapping the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();
        if len < MIN_MAP as u64 {
            file.set_len(MIN_MAP as u64)?;
        }
        // The mapping is private to this process for the session; callers
        // must not mutate the file underneath it.
        let map = unsafe { MmapMut::map_mut(&file)? };
        let logical = content_len(&map);
        debug!(path = %path.display(), mapped = map.len(), logical, "opened json store");
        Ok(Self { file, map, logical })
    }

    /// Wraps the store in the shared handle parser and generator duplicate.
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    /// Mapped length in bytes, including tail padding.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` when the store holds no document bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logical == 0
    }

    /// Length of the document bytes, excluding the zero tail padding.
    #[must_use]
    pub fn logical_size(&self) -> usize {
        self.logical
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.map
    }

    /// Copies `data` into the region at `pos`, growing the mapping first if
    /// the write lands past its end.
    pub(crate) fn write_at(&mut self, pos: usize, data: &[u8]) -> Result<()> {
        let end = pos + data.len();
        self.ensure(end)?;
        self.map[pos..end].copy_from_slice(data);
        if end > self.logical {
            self.logical = end;
        }
        Ok(())
    }

    /// Flushes dirty pages and trims the file to the logical size, so the
    /// document on disk ends at its last byte. Returns the logical size.
    ///
    /// # Errors
    ///
    /// Any I/O failure while flushing, truncating or remapping.
    pub fn flush(&mut self) -> Result<usize> {
        self.map.flush()?;
        let logical = content_len(&self.map);
        self.logical = logical;
        if logical > 0 && logical < self.map.len() {
            self.file.set_len(logical as u64)?;
            self.map = unsafe { MmapMut::map_mut(&self.file)? };
        }
        debug!(logical, "flushed json store");
        Ok(logical)
    }

    /// Flushes and releases the store. Returns the persisted size.
    ///
    /// # Errors
    ///
    /// As [`flush`](Store::flush).
    pub fn close(mut self) -> Result<usize> {
        self.flush()
    }

    fn ensure(&mut self, end: usize) -> Result<()> {
        if end <= self.map.len() {
            return Ok(());
        }
        let target = end.next_multiple_of(GROW_STEP);
        trace!(from = self.map.len(), to = target, "growing json store");
        self.map.flush()?;
        self.file.set_len(target as u64)?;
        self.map = unsafe { MmapMut::map_mut(&self.file)? };
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Best-effort persistence on every exit path, error paths included.
        let _ = self.map.flush();
    }
}

/// Document length: mapped length minus the trailing zero padding.
fn content_len(bytes: &[u8]) -> usize {
    let mut len = bytes.len();
    while len > 0 && bytes[len - 1] == 0 {
        len -= 1;
    }
    len
}
