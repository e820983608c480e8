//! Deferred-offset binary codec core for Kiln.
//!
//! Asset formats often put a header in front of variable-length sections whose
//! positions are unknown while the header is written. This crate provides the
//! machinery every format codec shares:
//!
//! - [`OffsetTable`] - pending pointer slots, patched once their targets exist
//! - [`StringTable`] - per-file string interning with back-patched pointers
//! - [`ReaderSession`] - decoding with scoped, self-restoring jumps
//! - [`WriterSession`] - one encode pass: offsets, strings, alignment, size field
//! - [`block`] - "count + pointer" sub-blocks over any [`Record`]
//! - [`Codec`] - signature, `decode`/`encode`, `open`/`save`
//!
//! # Example
//!
//! ```
//! use kiln_codec::{ReaderSession, SessionOptions, WriterSession};
//!
//! let options = SessionOptions::default();
//! let mut w = WriterSession::new(options);
//! let body = w.reserve()?;        // header slot, target unknown
//! w.write_string("title")?;       // interned, patched at finish
//! w.resolve(body)?;               // body starts here
//! w.write_u32(42);
//! let bytes = w.finish()?;
//!
//! let mut r = ReaderSession::new(&bytes, &options);
//! let pointer = r.read_pointer()?;
//! let value: u32 = r.read_at(pointer, |r| r.read_u32())?;
//! assert_eq!(value, 42);
//! assert_eq!(r.read_string()?, "title");
//! # Ok::<(), kiln_codec::Error>(())
//! ```

mod codec;
mod error;
mod options;
mod reader;
mod writer;

pub mod block;
pub mod offsets;
pub mod strings;

pub use block::{BlockRef, Record};
pub use codec::{with_mapped_file, Codec};
pub use error::{Error, Result};
pub use offsets::{OffsetHandle, OffsetKey, OffsetTable, PendingOffset};
pub use options::{PointerWidth, SessionOptions, StringPointerMode};
pub use reader::{JumpScope, ReaderSession, SeekOrigin};
pub use strings::StringTable;
pub use writer::{SessionState, WriterSession};

pub use kiln_common::Endian;
