//! In-memory filesystem for the `internal://` scheme.
//!
//! Used for testing code written against [`FileSystem`] without touching a
//! disk. All data is ephemeral.
//!
//! The key space is flat: each file is stored under its full path string and
//! directories exist only implicitly, as prefixes of those keys.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use urlfs_types::{FsError, FsResult};

use super::buffer::{BufferHandle, VirtualBuffer};
use super::traits::{FileReader, FileSystem, FileWriter, WatchCallback, WatchHandle};

/// In-memory filesystem: a registry of [`VirtualBuffer`]s keyed by path.
///
/// Handles returned by the `open_*` methods share the registry's buffer, so
/// writes through them are visible to later opens of the same path.
#[derive(Debug, Default)]
pub struct InternalFs {
    entries: RwLock<HashMap<String, BufferHandle>>,
}

impl InternalFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> RwLockReadGuard<'_, HashMap<String, BufferHandle>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, BufferHandle>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the buffer at `path` without rewinding it.
    ///
    /// Reading continues from wherever the last `close` or `seek` left the
    /// cursor.
    pub fn open_reader(&self, path: &str) -> FsResult<BufferHandle> {
        self.entries()
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::not_found(path))
    }

    /// Replace whatever is at `path` with a new empty buffer.
    pub fn open_writer(&self, path: &str) -> BufferHandle {
        let handle = BufferHandle::new();
        if self
            .entries_mut()
            .insert(path.to_string(), handle.clone())
            .is_some()
        {
            tracing::debug!(path, "truncated existing entry");
        } else {
            tracing::trace!(path, "created entry");
        }
        handle
    }

    /// Return the buffer at `path`, creating an empty one if absent.
    ///
    /// Writes always append, so existing contents are preserved.
    pub fn open_appender(&self, path: &str) -> BufferHandle {
        self.entries_mut()
            .entry(path.to_string())
            .or_insert_with(|| {
                tracing::trace!(path, "created entry");
                BufferHandle::new()
            })
            .clone()
    }

    /// Names of the immediate children under the directory prefix `path`.
    ///
    /// Every key starting with `path` contributes the segment that follows
    /// it, after skipping any leading `/`. Duplicates collapse; a key equal
    /// to `path` contributes nothing. Order is unspecified.
    pub fn list_entries(&self, path: &str) -> Vec<String> {
        let entries = self.entries();
        let children: HashSet<&str> = entries
            .keys()
            .filter_map(|key| key.strip_prefix(path))
            .filter_map(|rest| rest.trim_start_matches('/').split('/').next())
            .filter(|name| !name.is_empty())
            .collect();

        children.into_iter().map(str::to_string).collect()
    }

    /// Delete the entry at `path`. Deleting a missing path is not an error.
    ///
    /// Handles already returned for the path keep working but are no longer
    /// reachable through the registry.
    pub fn remove(&self, path: &str) {
        if self.entries_mut().remove(path).is_some() {
            tracing::trace!(path, "removed entry");
        }
    }

    /// Store `contents` at `path`, replacing any previous entry.
    pub fn seed(&self, path: &str, contents: impl Into<Vec<u8>>) -> BufferHandle {
        let handle = BufferHandle::from_buffer(VirtualBuffer::from_bytes(contents));
        self.entries_mut().insert(path.to_string(), handle.clone());
        handle
    }

    /// True if an entry exists at exactly `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.entries().contains_key(path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// All keys, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl FileSystem for InternalFs {
    async fn open_reader(&self, path: &str) -> FsResult<Box<dyn FileReader>> {
        let handle = InternalFs::open_reader(self, path)?;
        Ok(Box::new(handle))
    }

    async fn open_writer(&self, path: &str) -> FsResult<Box<dyn FileWriter>> {
        Ok(Box::new(InternalFs::open_writer(self, path)))
    }

    async fn open_appender(&self, path: &str) -> FsResult<Box<dyn FileWriter>> {
        Ok(Box::new(InternalFs::open_appender(self, path)))
    }

    async fn list_entries(&self, path: &str) -> FsResult<Vec<String>> {
        Ok(InternalFs::list_entries(self, path))
    }

    async fn watch_file(&self, _path: &str, _on_change: WatchCallback) -> FsResult<WatchHandle> {
        Err(FsError::unsupported("watch_file on internal filesystem"))
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        InternalFs::remove(self, path);
        Ok(())
    }
}
