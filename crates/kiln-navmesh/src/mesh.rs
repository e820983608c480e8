//! Navigation mesh document and its codec.

use kiln_codec::block::{read_block, reserve_block, write_block_body};
use kiln_codec::{
    Codec, Error as CodecError, PointerWidth, ReaderSession, SessionOptions, WriterSession,
};

use crate::{Error, Polygon, Result};

const FILE_ALIGNMENT: usize = 16;

/// File version; selects the pointer width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavMeshVersion {
    /// 4-byte pointers.
    #[default]
    Compact = 1,
    /// 8-byte pointers.
    Wide = 2,
}

impl NavMeshVersion {
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            1 => Ok(Self::Compact),
            2 => Ok(Self::Wide),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }

    pub fn pointer_width(self) -> PointerWidth {
        match self {
            Self::Compact => PointerWidth::U32,
            Self::Wide => PointerWidth::U64,
        }
    }
}

/// A decoded navigation mesh.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavMesh {
    pub version: NavMeshVersion,
    pub name: String,
    /// Voxel size the mesh was built with.
    pub cell_size: f32,
    pub vertices: Vec<[f32; 3]>,
    pub polygons: Vec<Polygon>,
}

impl NavMesh {
    /// Corner positions of one polygon.
    pub fn polygon_vertices(&self, polygon: usize) -> Option<Vec<[f32; 3]>> {
        let polygon = self.polygons.get(polygon)?;
        polygon
            .indices
            .iter()
            .map(|&i| self.vertices.get(i as usize).copied())
            .collect()
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }

    /// Check that every polygon index addresses an existing vertex.
    pub fn validate(&self) -> Result<()> {
        for (p, polygon) in self.polygons.iter().enumerate() {
            if let Some(&index) = polygon
                .indices
                .iter()
                .find(|&&i| i as usize >= self.vertices.len())
            {
                return Err(Error::InvalidVertexIndex {
                    polygon: p,
                    index,
                    count: self.vertices.len(),
                });
            }
        }
        Ok(())
    }
}

impl Codec for NavMesh {
    const SIGNATURE: &'static [u8] = b"NAVM";
    type Error = Error;

    fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_pointer_width(self.version.pointer_width())
            .with_alignment(FILE_ALIGNMENT)
    }

    fn read_body(r: &mut ReaderSession<'_>) -> Result<Self> {
        let version = NavMeshVersion::from_raw(r.read_u32()?)?;
        r.set_pointer_width(version.pointer_width());

        let size_position = r.position();
        let declared = r.read_u32()?;
        if declared as usize != r.len() {
            return Err(CodecError::SizeMismatch {
                position: size_position,
                expected: declared as u64,
                available: r.len() as u64,
            }
            .into());
        }

        let cell_size = r.read_f32()?;
        let name = r.read_string()?;
        let vertices = read_block(r)?;
        let polygons = read_block(r)?;

        let mesh = Self {
            version,
            name,
            cell_size,
            vertices,
            polygons,
        };
        mesh.validate()?;

        tracing::debug!(
            version = version as u32,
            vertices = mesh.vertices.len(),
            polygons = mesh.polygons.len(),
            "navmesh decoded"
        );
        Ok(mesh)
    }

    fn write_body(&self, w: &mut WriterSession) -> Result<()> {
        self.validate()?;

        w.write_u32(self.version as u32);
        w.reserve_file_size(PointerWidth::U32);
        w.write_f32(self.cell_size);
        w.write_string(&self.name)?;

        let vertices = reserve_block(w, self.vertices.len())?;
        let polygons = reserve_block(w, self.polygons.len())?;

        // polygons first: their index lists trail them, vertices go last
        write_block_body(w, polygons, &self.polygons, 8)?;
        write_block_body(w, vertices, &self.vertices, FILE_ALIGNMENT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(version: NavMeshVersion) -> NavMesh {
        NavMesh {
            version,
            name: "courtyard".into(),
            cell_size: 0.25,
            vertices: vec![
                [0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [4.0, 0.0, 4.0],
                [0.0, 0.5, 4.0],
            ],
            polygons: vec![
                Polygon {
                    area: 1,
                    flags: 0x3,
                    tag: "grass".into(),
                    indices: vec![0, 1, 2],
                },
                Polygon {
                    area: 1,
                    flags: 0x1,
                    tag: String::new(),
                    indices: vec![0, 2, 3],
                },
                Polygon {
                    area: 7,
                    flags: 0,
                    tag: "grass".into(),
                    indices: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_round_trip_both_versions() {
        for version in [NavMeshVersion::Compact, NavMeshVersion::Wide] {
            let mesh = sample(version);
            let bytes = mesh.encode().unwrap();

            assert_eq!(bytes.len() % 16, 0);
            assert_eq!(
                u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize,
                bytes.len()
            );
            assert_eq!(NavMesh::decode(&bytes).unwrap(), mesh);
        }
    }

    #[test]
    fn test_wide_version_is_larger() {
        let compact = sample(NavMeshVersion::Compact).encode().unwrap();
        let wide = sample(NavMeshVersion::Wide).encode().unwrap();
        assert!(wide.len() > compact.len());
    }

    #[test]
    fn test_vertex_body_aligned() {
        let bytes = sample(NavMeshVersion::Compact).encode().unwrap();
        // header: magic, version, size, cell, name ptr, then vertex count + ptr
        let vertex_ptr = u32::from_le_bytes(bytes[0x18..0x1C].try_into().unwrap());
        assert_eq!(vertex_ptr % 16, 0);
    }

    #[test]
    fn test_tag_stored_once() {
        let bytes = sample(NavMeshVersion::Compact).encode().unwrap();
        assert_eq!(bytes.windows(6).filter(|w| w == b"grass\0").count(), 1);
    }

    #[test]
    fn test_file_size_mismatch() {
        let mut bytes = sample(NavMeshVersion::Compact).encode().unwrap();
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            NavMesh::decode(&bytes),
            Err(Error::Codec(CodecError::SizeMismatch { position: 8, .. }))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample(NavMeshVersion::Compact).encode().unwrap();
        bytes[4] = 9;
        assert!(matches!(
            NavMesh::decode(&bytes),
            Err(Error::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_invalid_index_rejected_before_writing() {
        let mut mesh = sample(NavMeshVersion::Compact);
        mesh.polygons[1].indices.push(42);
        assert!(matches!(
            mesh.encode(),
            Err(Error::InvalidVertexIndex {
                polygon: 1,
                index: 42,
                count: 4
            })
        ));
    }

    #[test]
    fn test_signature_mismatch() {
        assert!(matches!(
            NavMesh::decode(b"KFNT\x01\0\0\0"),
            Err(Error::Codec(CodecError::SignatureMismatch { .. }))
        ));
    }

    #[test]
    fn test_helpers() {
        let mesh = sample(NavMeshVersion::Wide);
        assert_eq!(
            mesh.polygon_vertices(1).unwrap(),
            vec![[0.0, 0.0, 0.0], [4.0, 0.0, 4.0], [0.0, 0.5, 4.0]]
        );
        assert!(mesh.polygon_vertices(9).is_none());
        assert_eq!(mesh.bounds(), Some(([0.0, 0.0, 0.0], [4.0, 0.5, 4.0])));
        assert_eq!(NavMesh::default().bounds(), None);
    }
}
