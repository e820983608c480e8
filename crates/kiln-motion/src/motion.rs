//! Motion document and its codec.

use kiln_codec::block::{read_block, reserve_block, write_block_body};
use kiln_codec::{
    Codec, Endian, Error as CodecError, ReaderSession, SeekOrigin, SessionOptions,
    StringPointerMode, WriterSession,
};

use crate::{Error, MotionNode, Result};

/// The only motion version this crate reads and writes.
pub const MOTION_VERSION: u16 = 1;

const RELOC_BASE_OFFSET: i64 = 0x1C;
const FILE_ALIGNMENT: usize = 8;

/// A decoded motion.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    pub name: String,
    /// Playback flags (bit 0: looping).
    pub flags: u16,
    /// Length in seconds.
    pub duration: f32,
    /// Nodes; parents always precede their children.
    pub nodes: Vec<MotionNode>,
}

impl Motion {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Default::default()
        }
    }

    /// Find a node by name.
    pub fn node(&self, name: &str) -> Option<&MotionNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Indices of the direct children of `parent`.
    pub fn children(&self, parent: u32) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(i, _)| i)
    }

    /// Check that every parent index refers to an earlier node.
    pub fn validate(&self) -> Result<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent as usize >= i {
                    return Err(Error::InvalidParent { node: i, parent });
                }
            }
        }
        Ok(())
    }

    /// Absolute positions of every pointer slot listed in the relocation
    /// table of an encoded motion, ascending.
    ///
    /// Only the header and the relocation table are read.
    pub fn read_relocations(data: &[u8]) -> Result<Vec<u64>> {
        let mut r = ReaderSession::new(data, &Self::read_options());
        r.expect_signature(Self::SIGNATURE)?;
        r.jump(RELOC_BASE_OFFSET, SeekOrigin::Begin)?;
        Ok(read_relocation_table(&mut r)?)
    }
}

/// Read `RelocBase` and the entry block behind it, checking that every
/// listed slot lies inside the data.
fn read_relocation_table(r: &mut ReaderSession<'_>) -> kiln_codec::Result<Vec<u64>> {
    let base = u64::from(r.read_u32()?);
    let entries: Vec<u32> = read_block(r)?;

    entries
        .into_iter()
        .map(|entry| {
            let slot = base + u64::from(entry);
            if slot + 4 > r.len() as u64 {
                return Err(CodecError::OffsetOutOfRange {
                    offset: slot as i64,
                    len: r.len(),
                });
            }
            Ok(slot)
        })
        .collect()
}

impl Codec for Motion {
    const SIGNATURE: &'static [u8] = b"MOTN";
    const ENDIAN: Endian = Endian::Big;
    type Error = Error;

    fn read_options() -> SessionOptions {
        SessionOptions::default()
            .with_endian(Self::ENDIAN)
            .with_string_mode(StringPointerMode::TableRelative)
    }

    fn session_options(&self) -> SessionOptions {
        Self::read_options()
            .with_relocations(true)
            .with_alignment(FILE_ALIGNMENT)
    }

    fn read_body(r: &mut ReaderSession<'_>) -> Result<Self> {
        let version = r.read_u16()?;
        if version != MOTION_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let flags = r.read_u16()?;
        let duration = r.read_f32()?;

        // the name precedes the table pointer it is relative to
        let name_at = r.position() as u64;
        r.skip(4)?;
        let table = r.read_u32()?;
        r.set_string_base(u64::from(table));
        let name = r.read_at(name_at, |r| r.read_string())?;

        let nodes = read_block(r)?;
        let relocations = read_relocation_table(r)?;

        let motion = Self {
            name,
            flags,
            duration,
            nodes,
        };
        motion.validate()?;

        tracing::debug!(
            name = %motion.name,
            nodes = motion.nodes.len(),
            relocations = relocations.len(),
            "motion decoded"
        );
        Ok(motion)
    }

    fn write_body(&self, w: &mut WriterSession) -> Result<()> {
        self.validate()?;

        w.write_u16(MOTION_VERSION);
        w.write_u16(self.flags);
        w.write_f32(self.duration);
        w.write_string(&self.name)?;
        let string_table = w.reserve()?;
        let nodes = reserve_block(w, self.nodes.len())?;
        let reloc_base = w.reserve()?;
        let reloc_count_at = w.position();
        w.write_u32(0);
        let relocs = w.reserve()?;

        // the node table is the relocation base; write_block_body lands on
        // the same aligned position
        w.align(4)?;
        let base = w.position();
        w.resolve(reloc_base)?;
        write_block_body(w, nodes, &self.nodes, 4)?;

        let mut entries: Vec<u32> = w
            .relocations()
            .iter()
            .filter(|&&slot| slot >= base)
            .map(|&slot| (slot - base) as u32)
            .collect();
        entries.sort_unstable();

        w.patch_u32(reloc_count_at, entries.len() as u32)?;
        if entries.is_empty() {
            w.resolve_null(relocs)?;
        } else {
            w.align(4)?;
            w.resolve(relocs)?;
            for entry in &entries {
                w.write_u32(*entry);
            }
        }

        w.resolve(string_table)?;
        w.flush_strings()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keyframe;

    fn sample() -> Motion {
        let mut motion = Motion::new("wave", 1.5);
        motion.flags = 1;

        let mut root = MotionNode::new("root", None);
        root.keys = vec![
            Keyframe {
                time: 0.0,
                value: [0.0, 0.0, 0.0, 1.0],
            },
            Keyframe {
                time: 1.5,
                value: [0.0, 0.7071, 0.0, 0.7071],
            },
        ];
        let mut arm = MotionNode::new("arm", Some(0));
        arm.translation = [0.0, 1.2, 0.0];
        let hand = MotionNode::new("", Some(1));

        motion.nodes = vec![root, arm, hand];
        motion
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_round_trip() {
        let motion = sample();
        let bytes = motion.encode().unwrap();

        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(Motion::decode(&bytes).unwrap(), motion);
    }

    #[test]
    fn test_big_endian_header() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..4], b"MOTN");
        assert_eq!(&bytes[4..8], &[0, 1, 0, 1]);
        assert_eq!(&bytes[8..12], &1.5f32.to_be_bytes());
        assert_eq!(u32_at(&bytes, 0x14), 3);
        assert_eq!(u32_at(&bytes, 0x1C), u32_at(&bytes, 0x18));
    }

    #[test]
    fn test_string_table_relative() {
        let bytes = sample().encode().unwrap();
        let table = u32_at(&bytes, 0x10) as usize;

        // leading empty string, then text addressed relative to the table
        assert_eq!(bytes[table], 0);
        let name = u32_at(&bytes, 0x0C) as usize;
        assert_ne!(name, 0);
        assert_eq!(&bytes[table + name..table + name + 5], b"wave\0");
    }

    #[test]
    fn test_relocations_cover_data_pointers() {
        let bytes = sample().encode().unwrap();
        let base = u64::from(u32_at(&bytes, 0x1C));
        let slots = Motion::read_relocations(&bytes).unwrap();

        // root name, root keys, arm name; "hand" has no name and arm and
        // hand have no keys
        assert_eq!(slots.len(), 3);
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(slots[0], base);
        for &slot in &slots {
            assert!(slot >= base);
            assert_ne!(u32_at(&bytes, slot as usize), 0);
        }
    }

    #[test]
    fn test_relocation_out_of_range() {
        let mut bytes = sample().encode().unwrap();
        let table = u32_at(&bytes, 0x24) as usize;
        bytes[table..table + 4].copy_from_slice(&0x00FF_FFFFu32.to_be_bytes());

        assert!(matches!(
            Motion::read_relocations(&bytes),
            Err(Error::Codec(CodecError::OffsetOutOfRange { .. }))
        ));
        assert!(matches!(
            Motion::decode(&bytes),
            Err(Error::Codec(CodecError::OffsetOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_empty_motion() {
        let motion = Motion::new("", 0.0);
        let bytes = motion.encode().unwrap();

        assert_eq!(u32_at(&bytes, 0x0C), 0);
        assert_eq!(u32_at(&bytes, 0x20), 0);
        assert_eq!(u32_at(&bytes, 0x24), 0);
        assert!(Motion::read_relocations(&bytes).unwrap().is_empty());
        assert_eq!(Motion::decode(&bytes).unwrap(), motion);
    }

    #[test]
    fn test_invalid_parent() {
        let mut motion = sample();
        motion.nodes[0].parent = Some(2);
        assert!(matches!(
            motion.encode(),
            Err(Error::InvalidParent { node: 0, parent: 2 })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample().encode().unwrap();
        bytes[5] = 4;
        assert!(matches!(
            Motion::decode(&bytes),
            Err(Error::UnsupportedVersion(4))
        ));
    }

    #[test]
    fn test_hierarchy_helpers() {
        let motion = sample();
        assert_eq!(motion.children(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(motion.children(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(motion.node("arm").map(|n| n.translation[1]), Some(1.2));
        assert!(motion.node("tail").is_none());
    }
}
