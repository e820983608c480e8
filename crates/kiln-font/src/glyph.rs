//! Glyph and kerning records.

use kiln_codec::{PointerWidth, ReaderSession, Record, Result, WriterSession};
use zerocopy::byteorder::little_endian::{I16, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// On-disk glyph record (20 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RawGlyph {
    code: U32,
    x: U16,
    y: U16,
    width: U16,
    height: U16,
    x_offset: I16,
    y_offset: I16,
    advance: I16,
    page: u8,
    channel: u8,
}

/// On-disk kerning record (12 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RawKerning {
    first: U32,
    second: U32,
    amount: I16,
    _reserved: U16,
}

/// A single glyph on a texture page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// Unicode code point.
    pub code: u32,
    /// Left edge on the page, in pixels.
    pub x: u16,
    /// Top edge on the page, in pixels.
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Horizontal offset applied when drawing.
    pub x_offset: i16,
    /// Vertical offset applied when drawing.
    pub y_offset: i16,
    /// Pen advance after this glyph.
    pub advance: i16,
    /// Index into the font's page list.
    pub page: u8,
    /// Color channel mask the glyph lives in (0xF = all).
    pub channel: u8,
}

impl From<RawGlyph> for Glyph {
    fn from(raw: RawGlyph) -> Self {
        Self {
            code: raw.code.get(),
            x: raw.x.get(),
            y: raw.y.get(),
            width: raw.width.get(),
            height: raw.height.get(),
            x_offset: raw.x_offset.get(),
            y_offset: raw.y_offset.get(),
            advance: raw.advance.get(),
            page: raw.page,
            channel: raw.channel,
        }
    }
}

impl From<&Glyph> for RawGlyph {
    fn from(glyph: &Glyph) -> Self {
        Self {
            code: U32::new(glyph.code),
            x: U16::new(glyph.x),
            y: U16::new(glyph.y),
            width: U16::new(glyph.width),
            height: U16::new(glyph.height),
            x_offset: I16::new(glyph.x_offset),
            y_offset: I16::new(glyph.y_offset),
            advance: I16::new(glyph.advance),
            page: glyph.page,
            channel: glyph.channel,
        }
    }
}

impl Record for Glyph {
    type Deferred = ();

    fn encoded_size(_: PointerWidth) -> usize {
        std::mem::size_of::<RawGlyph>()
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        Ok(r.stream().read_struct::<RawGlyph>()?.into())
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        w.write_bytes(RawGlyph::from(self).as_bytes());
        Ok(())
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

/// Spacing adjustment between two code points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KerningPair {
    pub first: u32,
    pub second: u32,
    pub amount: i16,
}

impl Record for KerningPair {
    type Deferred = ();

    fn encoded_size(_: PointerWidth) -> usize {
        std::mem::size_of::<RawKerning>()
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let raw = r.stream().read_struct::<RawKerning>()?;
        Ok(Self {
            first: raw.first.get(),
            second: raw.second.get(),
            amount: raw.amount.get(),
        })
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        let raw = RawKerning {
            first: U32::new(self.first),
            second: U32::new(self.second),
            amount: I16::new(self.amount),
            _reserved: U16::new(0),
        };
        w.write_bytes(raw.as_bytes());
        Ok(())
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}
