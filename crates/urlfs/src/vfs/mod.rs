//! Virtual filesystem layer for urlfs.
//!
//! - **VirtualBuffer** / **BufferHandle**: one in-memory file with a cursor
//! - **InternalFs**: path-keyed registry of buffers (the `internal://` backend)
//! - **SchemeRouter**: routes URLs to the backend registered for their scheme
//!
//! # Design
//!
//! Callers address files by URL. The router strips scheme and host and hands
//! the path to a backend:
//!
//! ```text
//! internal:///test/file/one
//! └──┬───┘   └─────┬──────┘
//!  scheme     registry key
//! ```
//!
//! Directories are not stored. Listing a directory derives child names from
//! the keys that start with its path.

mod buffer;
mod memory;
mod router;
mod traits;

pub use buffer::{BufferHandle, VirtualBuffer};
pub use memory::InternalFs;
pub use router::{INTERNAL_SCHEME, SchemeRouter};
pub use traits::{FileReader, FileSystem, FileWriter, WatchCallback, WatchHandle};
