//! In-memory file contents with a read cursor.
//!
//! A [`VirtualBuffer`] stands in for one open file. Writes always append to
//! the end regardless of the cursor; reads, seeks and skips move the cursor
//! within `0..=len`. [`BufferHandle`] shares a buffer between the registry and
//! every caller that opened the same path.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use urlfs_types::{FsError, FsResult};

use super::traits::{FileReader, FileWriter};

/// An in-memory byte sequence plus a cursor.
///
/// Invariant: `position <= contents.len()` after every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualBuffer {
    contents: Vec<u8>,
    position: usize,
}

impl VirtualBuffer {
    /// Create a new empty buffer, not bound to any path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `bytes` with the cursor at the start.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: bytes.into(),
            position: 0,
        }
    }

    /// Append `data` to the end of the buffer.
    ///
    /// The cursor is ignored: there is no write-at-cursor. Returns the number
    /// of bytes appended, which is always `data.len()`.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.contents.extend_from_slice(data);
        data.len()
    }

    /// Read up to `buf.len()` bytes from the cursor into `buf`.
    ///
    /// Fails with [`FsError::EndOfStream`] when the cursor is already at the
    /// end, even if `buf` is empty.
    pub fn read(&mut self, buf: &mut [u8]) -> FsResult<usize> {
        if self.position >= self.contents.len() {
            return Err(FsError::EndOfStream);
        }

        let end = self
            .position
            .saturating_add(buf.len())
            .min(self.contents.len());
        let n = end - self.position;
        buf[..n].copy_from_slice(&self.contents[self.position..end]);
        self.position = end;
        Ok(n)
    }

    /// Move the cursor to an absolute offset in `0..=len`.
    ///
    /// On failure the cursor is left where it was.
    pub fn seek(&mut self, offset: i64) -> FsResult<()> {
        match usize::try_from(offset) {
            Ok(pos) if pos <= self.contents.len() => {
                self.position = pos;
                Ok(())
            }
            _ => Err(self.out_of_range(offset)),
        }
    }

    /// Move the cursor forward by `delta` bytes.
    ///
    /// Negative deltas are rejected even when the target would be valid.
    pub fn skip(&mut self, delta: i64) -> FsResult<()> {
        let current = i64::try_from(self.position).unwrap_or(i64::MAX);
        let target = current.saturating_add(delta);
        if delta < 0 {
            return Err(self.out_of_range(target));
        }
        self.seek(target)
    }

    /// Current cursor offset.
    pub fn tell(&self) -> u64 {
        self.position as u64
    }

    /// Total number of bytes held.
    pub fn len(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Rewind the cursor so the buffer can be read again from the start.
    pub fn close(&mut self) {
        self.position = 0;
    }

    /// The full contents, independent of the cursor.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    fn out_of_range(&self, offset: i64) -> FsError {
        FsError::OutOfRange {
            offset,
            len: self.len(),
        }
    }
}

// std adapters. `io::Read` signals end of data with `Ok(0)` rather than an
// error, so the end-of-stream condition is translated here.

impl io::Read for VirtualBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match VirtualBuffer::read(self, buf) {
            Ok(n) => Ok(n),
            Err(FsError::EndOfStream) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl io::Write for VirtualBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(VirtualBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for VirtualBuffer {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(n) => i64::try_from(n).unwrap_or(i64::MAX),
            io::SeekFrom::Current(d) => (self.position as i64).saturating_add(d),
            io::SeekFrom::End(d) => (self.contents.len() as i64).saturating_add(d),
        };
        VirtualBuffer::seek(self, target)?;
        Ok(self.tell())
    }
}

/// Shared handle to a [`VirtualBuffer`].
///
/// Clones refer to the same buffer: bytes written or cursor moves made
/// through one clone are seen by all of them. Each operation holds the lock
/// for its whole duration.
#[derive(Debug, Clone, Default)]
pub struct BufferHandle {
    inner: Arc<Mutex<VirtualBuffer>>,
}

impl BufferHandle {
    /// Create a handle to a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_buffer(buffer: VirtualBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    // No operation can leave a buffer half-updated, so a poisoned lock still
    // guards a consistent value.
    fn lock(&self) -> MutexGuard<'_, VirtualBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self, data: &[u8]) -> usize {
        self.lock().write(data)
    }

    pub fn read(&self, buf: &mut [u8]) -> FsResult<usize> {
        self.lock().read(buf)
    }

    pub fn seek(&self, offset: i64) -> FsResult<()> {
        self.lock().seek(offset)
    }

    pub fn skip(&self, delta: i64) -> FsResult<()> {
        self.lock().skip(delta)
    }

    pub fn tell(&self) -> u64 {
        self.lock().tell()
    }

    pub fn len(&self) -> u64 {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn close(&self) {
        self.lock().close()
    }

    /// Copy of the full contents.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().contents().to_vec()
    }

    /// True if both handles refer to the same buffer.
    pub fn ptr_eq(&self, other: &BufferHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[async_trait]
impl FileReader for BufferHandle {
    async fn read(&self, buf: &mut [u8]) -> FsResult<usize> {
        BufferHandle::read(self, buf)
    }

    async fn seek(&self, offset: i64) -> FsResult<()> {
        BufferHandle::seek(self, offset)
    }

    async fn skip(&self, delta: i64) -> FsResult<()> {
        BufferHandle::skip(self, delta)
    }

    async fn tell(&self) -> FsResult<u64> {
        Ok(BufferHandle::tell(self))
    }

    async fn close(&self) -> FsResult<()> {
        BufferHandle::close(self);
        Ok(())
    }
}

#[async_trait]
impl FileWriter for BufferHandle {
    async fn write(&self, data: &[u8]) -> FsResult<usize> {
        Ok(BufferHandle::write(self, data))
    }

    async fn tell(&self) -> FsResult<u64> {
        Ok(BufferHandle::tell(self))
    }

    async fn close(&self) -> FsResult<()> {
        BufferHandle::close(self);
        Ok(())
    }
}
