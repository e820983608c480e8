//! Big-endian motion codec for Kiln.
//!
//! A `.motn` file holds a transform hierarchy with per-node keyframes. The
//! format was built for consoles that patch pointers in place after loading,
//! so it carries a relocation table listing every pointer slot in its data
//! section.
//!
//! # File Format
//!
//! All values are big-endian.
//!
//! ```text
//! [0x00] Magic "MOTN"
//! [0x04] Version (1), Flags               (u16, u16)
//! [0x08] Duration in seconds              (f32)
//! [0x0C] Name                             (string pointer, table-relative)
//! [0x10] StringTablePtr                   (u32)
//! [0x14] NodeCount, NodePtr               (u32, u32) -> Node[]
//! [0x1C] RelocBase                        (u32, = NodePtr)
//! [0x20] RelocCount, RelocPtr             (u32, u32) -> u32[]
//!
//! Node: Name (string pointer), Parent (i32, -1 = root),
//!       Translation ([f32; 3]), Rotation ([f32; 4]),
//!       KeyCount (u32), KeyPtr (u32) -> Key[]
//! Key:  Time (f32), Value ([f32; 4])
//! ```
//!
//! String pointers are offsets into the string table, which opens with an
//! empty string so that 0 means "no name". Relocation entries are slot
//! positions relative to `RelocBase`, ascending. The file is padded to 8.

mod error;
mod motion;
mod node;

pub use error::{Error, Result};
pub use motion::{Motion, MOTION_VERSION};
pub use node::{Keyframe, MotionNode};
