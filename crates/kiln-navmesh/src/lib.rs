//! Navigation mesh codec for Kiln.
//!
//! A `.navm` file stores a convex-polygon navigation mesh: a shared vertex
//! pool and polygons that index into it. Version 2 widens every pointer to
//! 8 bytes; everything else is identical.
//!
//! # File Format
//!
//! ```text
//! [0x00] Magic "NAVM"
//! [0x04] Version (1 or 2)                  (u32 LE)
//! [0x08] FileSize                          (u32 LE, whole file)
//! [0x0C] CellSize                          (f32 LE)
//! [0x10] Name                              (string pointer, P bytes)
//! [....] VertexCount, VertexPtr            (u32, P) -> [f32; 3][]
//! [....] PolygonCount, PolygonPtr          (u32, P) -> Polygon[]
//!
//! Polygon: Area (u8), Reserved (u8), Flags (u16), Tag (string pointer, P),
//!          IndexCount (u32), IndexPtr (P) -> u32[]
//! ```
//!
//! `P` is 4 bytes in version 1 and 8 bytes in version 2. Vertex data is
//! 16-byte aligned and the file is padded to 16 bytes.

mod error;
mod mesh;
mod polygon;

pub use error::{Error, Result};
pub use mesh::{NavMesh, NavMeshVersion};
pub use polygon::Polygon;
