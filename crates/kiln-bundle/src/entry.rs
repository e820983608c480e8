//! Shader entries and their on-disk records.

use std::borrow::Cow;

use kiln_codec::{
    Error as CodecError, OffsetHandle, PointerWidth, ReaderSession, Record, Result, WriterSession,
};
use kiln_common::crc;

const BLOB_ALIGNMENT: usize = 16;

/// Pipeline stage a shader blob is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Compute,
    Geometry,
    Hull,
    Domain,
    /// Stage id this crate does not know; kept for round trips.
    Unknown(u8),
}

impl From<u8> for ShaderStage {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Vertex,
            1 => Self::Pixel,
            2 => Self::Compute,
            3 => Self::Geometry,
            4 => Self::Hull,
            5 => Self::Domain,
            other => Self::Unknown(other),
        }
    }
}

impl From<ShaderStage> for u8 {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => 0,
            ShaderStage::Pixel => 1,
            ShaderStage::Compute => 2,
            ShaderStage::Geometry => 3,
            ShaderStage::Hull => 4,
            ShaderStage::Domain => 5,
            ShaderStage::Unknown(raw) => raw,
        }
    }
}

/// One compiled shader.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaderEntry {
    /// Entry point or permutation name.
    pub name: String,
    pub stage: ShaderStage,
    /// Compiled bytecode.
    pub data: Vec<u8>,
}

impl ShaderEntry {
    pub fn new(name: impl Into<String>, stage: ShaderStage, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            stage,
            data: data.into(),
        }
    }

    /// CRC32C of the blob.
    pub fn checksum(&self) -> u32 {
        crc::hash_bytes(&self.data)
    }
}

/// An entry together with the checksum stored beside it.
///
/// Borrows the entry when encoding; owns it when decoding.
#[derive(Debug, Clone)]
pub(crate) struct StoredEntry<'e> {
    pub(crate) entry: Cow<'e, ShaderEntry>,
    pub(crate) checksum: u32,
}

impl<'e> StoredEntry<'e> {
    pub(crate) fn seal(entry: &'e ShaderEntry) -> Self {
        Self {
            checksum: entry.checksum(),
            entry: Cow::Borrowed(entry),
        }
    }

    /// Whether the stored checksum matches the blob.
    pub(crate) fn verify(&self) -> crate::Result<()> {
        let actual = self.entry.checksum();
        if actual != self.checksum {
            return Err(crate::Error::ChecksumMismatch {
                name: self.entry.name.clone(),
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}

impl Record for StoredEntry<'_> {
    type Deferred = OffsetHandle;

    fn encoded_size(width: PointerWidth) -> usize {
        width.bytes() + 4 + 4 + width.bytes() + 4
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let name = r.read_string()?;
        let stage = ShaderStage::from(r.read_u8()?);
        r.skip(3)?;

        let position = r.position();
        let size = r.read_u32()? as usize;
        let pointer = r.read_pointer()?;
        let checksum = r.read_u32()?;

        let data = match (size, pointer) {
            (0, _) => Vec::new(),
            (_, 0) => {
                return Err(CodecError::SizeMismatch {
                    position,
                    expected: size as u64,
                    available: 0,
                })
            }
            _ => r.read_at(pointer, |r| r.read_bytes(size))?.to_vec(),
        };

        Ok(Self {
            entry: Cow::Owned(ShaderEntry { name, stage, data }),
            checksum,
        })
    }

    fn write(&self, w: &mut WriterSession) -> Result<OffsetHandle> {
        w.write_string(&self.entry.name)?;
        w.write_u8(self.entry.stage.into());
        w.write_zeros(3);
        w.write_count(self.entry.data.len())?;
        let data = w.reserve()?;
        w.write_u32(self.checksum);
        Ok(data)
    }

    fn write_deferred(&self, w: &mut WriterSession, data: OffsetHandle) -> Result<()> {
        if self.entry.data.is_empty() {
            return w.resolve_null(data);
        }
        w.align(BLOB_ALIGNMENT)?;
        w.resolve(data)?;
        w.write_bytes(&self.entry.data);
        Ok(())
    }
}
