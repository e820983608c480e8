//! Error types for motion parsing and writing.

use thiserror::Error;

/// Errors that can occur when working with motions.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Codec core error.
    #[error("{0}")]
    Codec(#[from] kiln_codec::Error),

    /// Unsupported motion version.
    #[error("unsupported motion version: {0}")]
    UnsupportedVersion(u16),

    /// A node names a parent that does not precede it.
    #[error("node {node} has invalid parent {parent}")]
    InvalidParent { node: usize, parent: u32 },
}

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, Error>;
