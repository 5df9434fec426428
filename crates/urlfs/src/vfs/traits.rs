//! Core filesystem traits.
//!
//! A backend implements [`FileSystem`] over plain path strings; the scheme
//! and host of the URL have already been stripped by the router. Opened files
//! are returned as [`FileReader`] / [`FileWriter`] trait objects.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use urlfs_types::{FsError, FsResult};

/// Chunk size used by [`FileReader::read_to_end`].
const READ_CHUNK: usize = 4096;

/// A file opened for reading.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read up to `buf.len()` bytes at the cursor.
    ///
    /// Returns `Err(FsError::EndOfStream)` once no data remains.
    async fn read(&self, buf: &mut [u8]) -> FsResult<usize>;

    /// Move the cursor to an absolute offset.
    async fn seek(&self, offset: i64) -> FsResult<()>;

    /// Move the cursor forward by `delta` bytes.
    async fn skip(&self, delta: i64) -> FsResult<()>;

    /// Current cursor offset.
    async fn tell(&self) -> FsResult<u64>;

    /// Release the file. Backends may use this to rewind.
    async fn close(&self) -> FsResult<()>;

    /// Read everything from the cursor to the end, appending to `out`.
    ///
    /// End of stream terminates the loop rather than failing, so reading an
    /// already exhausted file appends nothing and returns `Ok(0)`. A reader
    /// that signals the end with `Ok(0)`, std style, also stops the loop.
    async fn read_to_end(&self, out: &mut Vec<u8>) -> FsResult<usize> {
        let mut chunk = vec![0u8; READ_CHUNK];
        let mut total = 0;
        loop {
            match self.read(&mut chunk).await {
                Ok(0) => return Ok(total),
                Ok(n) => {
                    out.extend_from_slice(&chunk[..n]);
                    total += n;
                }
                Err(FsError::EndOfStream) => return Ok(total),
                Err(e) => return Err(e),
            }
        }
    }
}

/// A file opened for writing.
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Write `data`, returning the number of bytes accepted.
    async fn write(&self, data: &[u8]) -> FsResult<usize>;

    /// Current cursor offset.
    async fn tell(&self) -> FsResult<u64>;

    /// Release the file.
    async fn close(&self) -> FsResult<()>;
}

/// Called with the path of a watched file when it changes.
pub type WatchCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Returned by a successful [`FileSystem::watch_file`]; cancels the watch.
pub struct WatchHandle {
    cancel: Box<dyn FnOnce() + Send>,
}

impl WatchHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Stop delivering change notifications.
    pub fn cancel(self) {
        (self.cancel)()
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle").finish_non_exhaustive()
    }
}

/// Abstract filesystem interface.
///
/// All paths are the path component of the addressed URL, e.g. `/a/b/c` for
/// `internal:///a/b/c`.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Open an existing file for reading.
    async fn open_reader(&self, path: &str) -> FsResult<Box<dyn FileReader>>;

    /// Open a file for writing, discarding any previous contents.
    async fn open_writer(&self, path: &str) -> FsResult<Box<dyn FileWriter>>;

    /// Open a file for writing after its existing contents, creating it if
    /// needed.
    async fn open_appender(&self, path: &str) -> FsResult<Box<dyn FileWriter>>;

    /// Names of the immediate children of the directory at `path`.
    async fn list_entries(&self, path: &str) -> FsResult<Vec<String>>;

    /// Register `on_change` to be called when the file at `path` changes.
    async fn watch_file(&self, path: &str, on_change: WatchCallback) -> FsResult<WatchHandle>;

    /// Remove the file at `path`.
    async fn remove(&self, path: &str) -> FsResult<()>;
}
