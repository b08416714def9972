//! Error types for document reading

use thiserror::Error;

/// Result type for flexbuf operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while resolving a document
///
/// Builder misuse (unbalanced frames, mixed element types in a typed vector,
/// finishing with more than one root) is a programming error and panics
/// instead of surfacing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Buffer is too small to hold a document trailer
    #[error("buffer too small to hold a document")]
    BufferTooSmall,
    /// A packed type byte carries a tag outside the known set
    #[error("unknown type tag {0}")]
    UnknownType(u8),
    /// A byte width field is not one of 1, 2, 4, or 8
    #[error("invalid byte width {0}")]
    InvalidWidth(u8),
    /// A back-offset or length leaves the buffer
    #[error("offset leaves the buffer")]
    OffsetOutOfRange,
    /// A string field holds invalid UTF-8
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    /// Validation gave up: the document nests deeper or branches wider than
    /// the checked-read limits allow
    #[error("document structure exceeds validation limits")]
    NestingTooDeep,
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
