//! Bitmap font codec for Kiln.
//!
//! A `.kfnt` file describes a bitmap font: glyph rectangles on one or more
//! texture pages, kerning pairs and a display name.
//!
//! # File Format
//!
//! ```text
//! [0x00] Magic "KFNT"
//! [0x04] Version (1)                     (u16 LE)
//! [0x06] Flags                           (u16 LE)
//! [0x08] LineHeight                      (u16 LE)
//! [0x0A] Baseline                        (u16 LE)
//! [0x0C] Name                            (string pointer)
//! [0x10] GlyphCount, GlyphPtr            (u32, u32) -> Glyph[20 bytes]
//! [0x18] KerningCount, KerningPtr        (u32, u32) -> Kerning[12 bytes]
//! [0x20] PageCount, PagePtr              (u32, u32) -> string pointer[]
//! [....] Bodies (4-aligned), string table, padding to 4
//! ```
//!
//! # Example
//!
//! ```no_run
//! use kiln_codec::Codec;
//! use kiln_font::Font;
//!
//! let font = Font::open("ui.kfnt")?;
//! if let Some(glyph) = font.glyph('A' as u32) {
//!     println!("A: {}x{} on page {}", glyph.width, glyph.height, glyph.page);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod font;
mod glyph;

pub use error::{Error, Result};
pub use font::{Font, FONT_VERSION};
pub use glyph::{Glyph, KerningPair};
