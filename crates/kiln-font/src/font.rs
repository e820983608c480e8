//! Font document and its codec.

use kiln_codec::block::{read_block, reserve_block, write_block_body};
use kiln_codec::{Codec, ReaderSession, SessionOptions, WriterSession};

use crate::{Error, Glyph, KerningPair, Result};

/// The only font version this crate reads and writes.
pub const FONT_VERSION: u16 = 1;

const BODY_ALIGNMENT: usize = 4;

/// A decoded bitmap font.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    /// Display name.
    pub name: String,
    /// Format flags (bit 0: smooth, bit 1: unicode).
    pub flags: u16,
    /// Distance between baselines, in pixels.
    pub line_height: u16,
    /// Distance from the top of a line to the baseline.
    pub baseline: u16,
    /// Glyphs, in file order.
    pub glyphs: Vec<Glyph>,
    /// Kerning pairs, in file order.
    pub kerning: Vec<KerningPair>,
    /// Texture page file names.
    pub pages: Vec<String>,
}

impl Font {
    /// Create an empty font with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find the glyph for a code point.
    pub fn glyph(&self, code: u32) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.code == code)
    }

    /// Kerning adjustment between two code points (0 when none is defined).
    pub fn kerning_amount(&self, first: u32, second: u32) -> i16 {
        self.kerning
            .iter()
            .find(|k| k.first == first && k.second == second)
            .map_or(0, |k| k.amount)
    }

    /// Texture page a glyph is drawn from.
    pub fn page_of(&self, glyph: &Glyph) -> Option<&str> {
        self.pages.get(glyph.page as usize).map(String::as_str)
    }
}

impl Codec for Font {
    const SIGNATURE: &'static [u8] = b"KFNT";
    type Error = Error;

    fn session_options(&self) -> SessionOptions {
        SessionOptions::default().with_alignment(BODY_ALIGNMENT)
    }

    fn read_body(r: &mut ReaderSession<'_>) -> Result<Self> {
        let version = r.read_u16()?;
        if version != FONT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let flags = r.read_u16()?;
        let line_height = r.read_u16()?;
        let baseline = r.read_u16()?;
        let name = r.read_string()?;

        let glyphs = read_block(r)?;
        let kerning = read_block(r)?;
        let pages = read_block(r)?;

        tracing::debug!(
            name = %name,
            glyphs = glyphs.len(),
            kerning = kerning.len(),
            pages = pages.len(),
            "font decoded"
        );

        Ok(Self {
            name,
            flags,
            line_height,
            baseline,
            glyphs,
            kerning,
            pages,
        })
    }

    fn write_body(&self, w: &mut WriterSession) -> Result<()> {
        w.write_u16(FONT_VERSION);
        w.write_u16(self.flags);
        w.write_u16(self.line_height);
        w.write_u16(self.baseline);
        w.write_string(&self.name)?;

        let glyphs = reserve_block(w, self.glyphs.len())?;
        let kerning = reserve_block(w, self.kerning.len())?;
        let pages = reserve_block(w, self.pages.len())?;

        write_block_body(w, glyphs, &self.glyphs, BODY_ALIGNMENT)?;
        write_block_body(w, kerning, &self.kerning, BODY_ALIGNMENT)?;
        write_block_body(w, pages, &self.pages, BODY_ALIGNMENT)?;
        Ok(())
    }
}
