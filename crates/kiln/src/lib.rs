//! Kiln - binary game asset codecs.
//!
//! This crate provides a unified interface to the Kiln codec crates.
//!
//! # Crates
//!
//! - [`kiln_common`] - Byte cursors, endianness, CRC32C
//! - [`kiln_codec`] - Deferred offsets, string interning, scoped jumps
//! - [`kiln_font`] - Bitmap fonts (`KFNT`)
//! - [`kiln_navmesh`] - Navigation meshes (`NAVM`)
//! - [`kiln_bundle`] - Shader bundles (`KSHADERB`)
//! - [`kiln_motion`] - Big-endian motions (`MOTN`)
//!
//! # Example
//!
//! ```no_run
//! use kiln::prelude::*;
//!
//! // Decode whatever format the file is in
//! match Asset::open("ui/body.kfnt")? {
//!     Asset::Font(font) => println!("{} glyphs", font.glyphs.len()),
//!     other => println!("not a font: {:?}", other.kind()),
//! }
//!
//! // Or decode a known format directly
//! let mesh = NavMesh::open("levels/courtyard.navm")?;
//! println!("{} polygons", mesh.polygons.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod asset;
mod error;

pub mod batch;

// Re-export all sub-crates
pub use kiln_bundle as bundle;
pub use kiln_codec as codec;
pub use kiln_common as common;
pub use kiln_font as font;
pub use kiln_motion as motion;
pub use kiln_navmesh as navmesh;

pub use asset::{Asset, AssetKind};
pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{decode_files, BatchItem, BatchSummary};
    pub use crate::{Asset, AssetKind};
    pub use kiln_bundle::{ShaderBundle, ShaderEntry, ShaderStage};
    pub use kiln_codec::{Codec, ReaderSession, SessionOptions, WriterSession};
    pub use kiln_font::{Font, Glyph, KerningPair};
    pub use kiln_motion::{Keyframe, Motion, MotionNode};
    pub use kiln_navmesh::{NavMesh, NavMeshVersion, Polygon};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
