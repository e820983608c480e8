//! Error types for the codec core.

use thiserror::Error;

use crate::offsets::{OffsetHandle, OffsetKey};

/// Errors raised by reader and writer sessions.
///
/// Contract violations by a codec author (`DuplicateOffsetId`,
/// `UnknownOffsetId`, `UnresolvedOffset`, ...) and corrupt input
/// (`OffsetOutOfRange`, `UnexpectedEof`, `SizeMismatch`) are both fatal for
/// the file being processed.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header magic does not match the format.
    #[error("signature mismatch: expected {expected:?}, got {actual:?}")]
    SignatureMismatch { expected: Vec<u8>, actual: Vec<u8> },

    /// The same offset key was reserved twice in one session.
    #[error("offset id {0} reserved twice")]
    DuplicateOffsetId(OffsetKey),

    /// A handle was never issued by this session.
    #[error("unknown offset id {0:?}")]
    UnknownOffsetId(OffsetHandle),

    /// A handle was resolved a second time.
    #[error("offset {0:?} already resolved")]
    OffsetAlreadyResolved(OffsetHandle),

    /// The session was finalized with placeholders still pending.
    #[error("{count} offset(s) unresolved at finalize (first reserved at {first_position:#x})")]
    UnresolvedOffset { count: usize, first_position: u64 },

    /// A jump or pointer target lies outside the buffer.
    #[error("offset {offset:#x} out of range (buffer length: {len:#x})")]
    OffsetOutOfRange { offset: i64, len: usize },

    /// The input ended early.
    #[error("unexpected end of data at {position:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A declared element count does not fit the bytes available.
    #[error("size mismatch at {position:#x}: declared {expected} bytes but only {available} available")]
    SizeMismatch {
        position: usize,
        expected: u64,
        available: u64,
    },

    /// A resolved value does not fit the pointer slot.
    #[error("value {value:#x} does not fit a {width}-byte pointer at {position:#x}")]
    PointerOverflow {
        value: i64,
        width: usize,
        position: u64,
    },

    /// An element count exceeds the on-disk count field.
    #[error("count {0} exceeds u32 range")]
    CountOverflow(usize),

    /// Strings were interned after the table was written.
    #[error("string table already flushed")]
    StringTableFlushed,

    /// Alignment is zero or not a power of two.
    #[error("invalid alignment: {0}")]
    InvalidAlignment(usize),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string at {position:#x} missing null terminator")]
    MissingNullTerminator { position: usize },
}

impl From<kiln_common::Error> for Error {
    fn from(err: kiln_common::Error) -> Self {
        use kiln_common::Error as C;
        match err {
            C::UnexpectedEof {
                position,
                needed,
                available,
            } => Error::UnexpectedEof {
                position,
                needed,
                available,
            },
            C::OutOfRange { offset, len } => Error::OffsetOutOfRange {
                offset: offset as i64,
                len,
            },
            C::InvalidAlignment(n) => Error::InvalidAlignment(n),
            C::Utf8(e) => Error::Utf8(e),
            C::MissingNullTerminator { position } => Error::MissingNullTerminator { position },
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
