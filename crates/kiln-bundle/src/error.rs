//! Error types for shader bundle parsing and writing.

use thiserror::Error;

/// Errors that can occur when working with shader bundles.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Codec core error.
    #[error("{0}")]
    Codec(#[from] kiln_codec::Error),

    /// Unsupported bundle version.
    #[error("unsupported bundle version: {0}")]
    UnsupportedVersion(u32),

    /// Header size smaller than the fixed header or past the end of data.
    #[error("invalid header size: {size:#x} (data length: {len})")]
    InvalidHeaderSize { size: u32, len: usize },

    /// A blob does not match its stored checksum.
    #[error("checksum mismatch for shader '{name}': stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },
}

/// Result type for shader bundle operations.
pub type Result<T> = std::result::Result<T, Error>;
