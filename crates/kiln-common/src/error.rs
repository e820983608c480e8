//! Error types for kiln-common.

use thiserror::Error;

/// Common error type for Kiln byte cursors.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {position:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// Seek target lies outside the buffer.
    #[error("offset {offset:#x} out of range (buffer length: {len:#x})")]
    OutOfRange { offset: u64, len: usize },

    /// Alignment is zero or not a power of two.
    #[error("invalid alignment: {0} (must be a non-zero power of two)")]
    InvalidAlignment(usize),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string at {position:#x} missing null terminator")]
    MissingNullTerminator { position: usize },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
