//! Error types for navigation mesh parsing and writing.

use thiserror::Error;

/// Errors that can occur when working with navigation meshes.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Codec core error.
    #[error("{0}")]
    Codec(#[from] kiln_codec::Error),

    /// Unsupported mesh version.
    #[error("unsupported navmesh version: {0} (expected 1 or 2)")]
    UnsupportedVersion(u32),

    /// A polygon references a vertex that does not exist.
    #[error("polygon {polygon} references vertex {index} (vertex count: {count})")]
    InvalidVertexIndex {
        polygon: usize,
        index: u32,
        count: usize,
    },
}

/// Result type for navigation mesh operations.
pub type Result<T> = std::result::Result<T, Error>;
