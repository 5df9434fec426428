//! urlfs: a URL-addressed filesystem abstraction with an in-memory backend.
//!
//! This crate provides:
//!
//! - **Traits**: `FileSystem`, `FileReader`, `FileWriter`
//! - **InternalFs**: ephemeral in-memory backend for the `internal://` scheme,
//!   meant for testing code that talks to a filesystem
//! - **SchemeRouter**: explicit scheme → backend registration and dispatch
//! - **Config**: TOML configuration with preloaded fixture files
//!
//! ```no_run
//! # async fn demo() -> urlfs::FsResult<()> {
//! use urlfs::SchemeRouter;
//!
//! let (router, _fs) = SchemeRouter::with_internal();
//! let out = router.open_writer("internal:///greeting").await?;
//! out.write(b"hello").await?;
//!
//! let input = router.open_reader("internal:///greeting").await?;
//! let mut buf = Vec::new();
//! input.read_to_end(&mut buf).await?;
//! assert_eq!(buf, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod vfs;

pub use config::{SeedContents, SeedFile, UrlfsConfig};
pub use urlfs_types::{FsError, FsResult, Location};
pub use vfs::{
    BufferHandle, FileReader, FileSystem, FileWriter, INTERNAL_SCHEME, InternalFs, SchemeRouter,
    VirtualBuffer, WatchCallback, WatchHandle,
};
