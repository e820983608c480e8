//! Shader bundle document and its codec.

use kiln_codec::block::{read_block, reserve_block, write_block_body};
use kiln_codec::{Codec, ReaderSession, SeekOrigin, SessionOptions, WriterSession};

use crate::entry::StoredEntry;
use crate::{Error, Result, ShaderEntry, ShaderStage};

/// The only bundle version this crate reads and writes.
pub const BUNDLE_VERSION: u32 = 1;

/// Size of the fixed header; pointers count from here.
pub const HEADER_SIZE: u32 = 0x10;

const FILE_ALIGNMENT: usize = 16;

/// A decoded shader bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaderBundle {
    /// Material or effect the shaders belong to.
    pub name: String,
    pub entries: Vec<ShaderEntry>,
}

impl ShaderBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Find an entry by name.
    pub fn entry(&self, name: &str) -> Option<&ShaderEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// All entries compiled for `stage`.
    pub fn entries_for(&self, stage: ShaderStage) -> impl Iterator<Item = &ShaderEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    /// Total blob bytes across all entries.
    pub fn data_size(&self) -> usize {
        self.entries.iter().map(|e| e.data.len()).sum()
    }
}

impl Codec for ShaderBundle {
    const SIGNATURE: &'static [u8] = b"KSHADERB";
    type Error = Error;

    fn read_options() -> SessionOptions {
        SessionOptions::default()
            .with_generic_offset(HEADER_SIZE as i64)
            .with_string_generic(true)
    }

    fn session_options(&self) -> SessionOptions {
        Self::read_options().with_alignment(FILE_ALIGNMENT)
    }

    fn read_body(r: &mut ReaderSession<'_>) -> Result<Self> {
        let version = r.read_u32()?;
        if version != BUNDLE_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        // the header states its own size; pointers are relative to its end
        let header_size = r.read_u32()?;
        if header_size < HEADER_SIZE || header_size as usize > r.len() {
            return Err(Error::InvalidHeaderSize {
                size: header_size,
                len: r.len(),
            });
        }
        r.set_generic_offset(header_size as i64);
        r.jump(0, SeekOrigin::Begin)?;

        let name = r.read_string()?;
        let stored: Vec<StoredEntry<'static>> = read_block(r)?;

        let mut entries = Vec::with_capacity(stored.len());
        for item in stored {
            item.verify()?;
            entries.push(item.entry.into_owned());
        }

        tracing::debug!(
            name = %name,
            entries = entries.len(),
            "shader bundle decoded"
        );
        Ok(Self { name, entries })
    }

    fn write_body(&self, w: &mut WriterSession) -> Result<()> {
        w.write_u32(BUNDLE_VERSION);
        w.write_u32(HEADER_SIZE);
        w.write_string(&self.name)?;

        let stored: Vec<_> = self.entries.iter().map(StoredEntry::seal).collect();
        let block = reserve_block(w, stored.len())?;
        write_block_body(w, block, &stored, 4)?;
        Ok(())
    }
}
