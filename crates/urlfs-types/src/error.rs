//! Error types returned by filesystem backends and the scheme router.

use std::io;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

/// Filesystem operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// No entry exists at the path.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend does not offer this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// The cursor is already at the end of the data.
    #[error("end of stream")]
    EndOfStream,
    /// A seek or skip targeted a position outside `0..=len`.
    #[error("offset {offset} out of range (length {len})")]
    OutOfRange { offset: i64, len: u64 },
    /// The URL could not be split into scheme and path.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The string cannot be used as a URL scheme.
    #[error("invalid scheme: {0:?}")]
    InvalidScheme(String),
    /// No backend is registered for the URL scheme.
    #[error("no backend registered for scheme: {0}")]
    NoBackend(String),
}

impl FsError {
    /// Shorthand for a `NotFound` error on a path.
    pub fn not_found(path: impl Into<String>) -> Self {
        FsError::NotFound(path.into())
    }

    /// Shorthand for an `Unsupported` error naming the operation.
    pub fn unsupported(what: impl Into<String>) -> Self {
        FsError::Unsupported(what.into())
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::NotFound(_) | FsError::NoBackend(_) => io::ErrorKind::NotFound,
            FsError::Unsupported(_) => io::ErrorKind::Unsupported,
            FsError::EndOfStream => io::ErrorKind::UnexpectedEof,
            FsError::OutOfRange { .. } | FsError::InvalidUrl(_) | FsError::InvalidScheme(_) => {
                io::ErrorKind::InvalidInput
            }
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FsError::not_found("/a/b").to_string(), "not found: /a/b");
        assert_eq!(FsError::EndOfStream.to_string(), "end of stream");
        assert_eq!(
            FsError::OutOfRange { offset: -1, len: 4 }.to_string(),
            "offset -1 out of range (length 4)"
        );
    }

    #[test]
    fn test_io_error_kinds() {
        let cases = [
            (FsError::not_found("x"), io::ErrorKind::NotFound),
            (FsError::unsupported("watch"), io::ErrorKind::Unsupported),
            (FsError::EndOfStream, io::ErrorKind::UnexpectedEof),
            (
                FsError::OutOfRange { offset: 9, len: 3 },
                io::ErrorKind::InvalidInput,
            ),
            (FsError::NoBackend("s3".into()), io::ErrorKind::NotFound),
            (
                FsError::InvalidScheme("my fs".into()),
                io::ErrorKind::InvalidInput,
            ),
        ];
        for (err, kind) in cases {
            let io_err: io::Error = err.clone().into();
            assert_eq!(io_err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io_err: io::Error = FsError::EndOfStream.into();
        let inner = io_err
            .get_ref()
            .and_then(|e| e.downcast_ref::<FsError>())
            .cloned();
        assert_eq!(inner, Some(FsError::EndOfStream));
    }
}
