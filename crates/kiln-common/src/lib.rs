//! Common utilities for Kiln.
//!
//! This crate provides the byte-level primitives every Kiln codec builds on:
//!
//! - [`ByteReader`] - Endian-aware, zero-copy reading from byte slices
//! - [`ByteWriter`] - Endian-aware writing into a growable, seekable buffer
//! - [`Endian`] - Byte order selection shared by both cursors
//! - [`crc`] - CRC32C hashing utilities

mod endian;
mod error;
mod reader;
mod writer;

pub mod crc;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::ByteReader;
pub use writer::ByteWriter;
