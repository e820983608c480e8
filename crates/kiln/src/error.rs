//! Error types for format-independent asset handling.

use thiserror::Error;

/// Errors from [`Asset`](crate::Asset) and batch decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data starts with no known signature.
    #[error("unrecognized asset signature: {0:02X?}")]
    UnknownFormat(Vec<u8>),

    #[error("font: {0}")]
    Font(#[from] kiln_font::Error),

    #[error("navmesh: {0}")]
    NavMesh(#[from] kiln_navmesh::Error),

    #[error("shader bundle: {0}")]
    Bundle(#[from] kiln_bundle::Error),

    #[error("motion: {0}")]
    Motion(#[from] kiln_motion::Error),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, Error>;
