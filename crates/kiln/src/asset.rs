//! Signature detection and a format-independent asset value.

use std::fs;
use std::path::Path;

use kiln_bundle::ShaderBundle;
use kiln_codec::{with_mapped_file, Codec};
use kiln_font::Font;
use kiln_motion::Motion;
use kiln_navmesh::NavMesh;

use crate::{Error, Result};

/// The formats Kiln can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Font,
    NavMesh,
    ShaderBundle,
    Motion,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Font,
        AssetKind::NavMesh,
        AssetKind::ShaderBundle,
        AssetKind::Motion,
    ];

    /// Identify the format from the leading signature.
    pub fn detect(data: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| data.starts_with(kind.signature()))
    }

    /// Identify the format from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "kfnt" => Some(Self::Font),
            "navm" => Some(Self::NavMesh),
            "shaderb" => Some(Self::ShaderBundle),
            "motn" => Some(Self::Motion),
            _ => None,
        }
    }

    pub fn signature(self) -> &'static [u8] {
        match self {
            Self::Font => Font::SIGNATURE,
            Self::NavMesh => NavMesh::SIGNATURE,
            Self::ShaderBundle => ShaderBundle::SIGNATURE,
            Self::Motion => Motion::SIGNATURE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Font => "kfnt",
            Self::NavMesh => "navm",
            Self::ShaderBundle => "shaderb",
            Self::Motion => "motn",
        }
    }
}

/// A decoded asset of any supported format.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Font(Font),
    NavMesh(NavMesh),
    ShaderBundle(ShaderBundle),
    Motion(Motion),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Font(_) => AssetKind::Font,
            Self::NavMesh(_) => AssetKind::NavMesh,
            Self::ShaderBundle(_) => AssetKind::ShaderBundle,
            Self::Motion(_) => AssetKind::Motion,
        }
    }

    /// Decode `data`, picking the codec from its signature.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let kind = AssetKind::detect(data)
            .ok_or_else(|| Error::UnknownFormat(data.iter().take(8).copied().collect()))?;

        Ok(match kind {
            AssetKind::Font => Self::Font(Font::decode(data)?),
            AssetKind::NavMesh => Self::NavMesh(NavMesh::decode(data)?),
            AssetKind::ShaderBundle => Self::ShaderBundle(ShaderBundle::decode(data)?),
            AssetKind::Motion => Self::Motion(Motion::decode(data)?),
        })
    }

    /// Decode a file from disk (memory-mapped).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        with_mapped_file(path, Self::decode)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Self::Font(font) => font.encode()?,
            Self::NavMesh(mesh) => mesh.encode()?,
            Self::ShaderBundle(bundle) => bundle.encode()?,
            Self::Motion(motion) => motion.encode()?,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.encode()?)?;
        Ok(())
    }
}

impl From<Font> for Asset {
    fn from(font: Font) -> Self {
        Self::Font(font)
    }
}

impl From<NavMesh> for Asset {
    fn from(mesh: NavMesh) -> Self {
        Self::NavMesh(mesh)
    }
}

impl From<ShaderBundle> for Asset {
    fn from(bundle: ShaderBundle) -> Self {
        Self::ShaderBundle(bundle)
    }
}

impl From<Motion> for Asset {
    fn from(motion: Motion) -> Self {
        Self::Motion(motion)
    }
}
