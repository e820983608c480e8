//! Shader bundle container codec for Kiln.
//!
//! A bundle packs compiled shader blobs for every stage of a material. The
//! 16-byte header is not part of the pointer space: every pointer after it,
//! including string pointers, is relative to the end of the header.
//!
//! # File Format
//!
//! ```text
//! [0x00] Magic "KSHADERB"
//! [0x08] Version (1)                      (u32 LE)
//! [0x0C] HeaderSize (0x10)                (u32 LE)
//! ---- pointer zero ----
//! [0x10] Name                             (string pointer)
//! [0x14] EntryCount, EntryPtr             (u32, u32) -> Entry[]
//!
//! Entry: Name (string pointer), Stage (u8), Reserved (3 bytes),
//!        DataSize (u32), DataPtr (u32), Crc32c (u32)
//! ```
//!
//! Blobs are stored raw, 16-byte aligned, and checked against their CRC32C
//! on read.

mod bundle;
mod entry;
mod error;

pub use bundle::{ShaderBundle, BUNDLE_VERSION, HEADER_SIZE};
pub use entry::{ShaderEntry, ShaderStage};
pub use error::{Error, Result};
