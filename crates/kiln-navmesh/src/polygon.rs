//! Polygon records.

use kiln_codec::block::{read_block, reserve_block, write_block_body, BlockRef};
use kiln_codec::{PointerWidth, ReaderSession, Record, Result, WriterSession};

/// A convex polygon of the mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    /// Area type used for path costs.
    pub area: u8,
    /// Traversal flags.
    pub flags: u16,
    /// Optional designer tag.
    pub tag: String,
    /// Vertex indices, counter-clockwise.
    pub indices: Vec<u32>,
}

impl Record for Polygon {
    type Deferred = BlockRef;

    fn encoded_size(width: PointerWidth) -> usize {
        4 + width.bytes() + 4 + width.bytes()
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let area = r.read_u8()?;
        let _reserved = r.read_u8()?;
        let flags = r.read_u16()?;
        let tag = r.read_string()?;
        let indices = read_block(r)?;
        Ok(Self {
            area,
            flags,
            tag,
            indices,
        })
    }

    fn write(&self, w: &mut WriterSession) -> Result<BlockRef> {
        w.write_u8(self.area);
        w.write_u8(0);
        w.write_u16(self.flags);
        w.write_string(&self.tag)?;
        reserve_block(w, self.indices.len())
    }

    fn write_deferred(&self, w: &mut WriterSession, indices: BlockRef) -> Result<()> {
        write_block_body(w, indices, &self.indices, 4)
    }
}
