//! Pure data types for urlfs — errors and URL locations.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. Backends
//! and callers share the error vocabulary defined here without pulling in the
//! filesystem traits.

pub mod error;
pub mod location;

pub use error::*;
pub use location::*;
