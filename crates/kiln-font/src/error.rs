//! Error types for font parsing and writing.

use thiserror::Error;

/// Errors that can occur when working with font files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Codec core error.
    #[error("{0}")]
    Codec(#[from] kiln_codec::Error),

    /// Unsupported font version.
    #[error("unsupported font version: {0} (expected 1)")]
    UnsupportedVersion(u16),
}

/// Result type for font operations.
pub type Result<T> = std::result::Result<T, Error>;
