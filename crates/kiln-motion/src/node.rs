//! Transform nodes and keyframes.

use kiln_codec::block::{read_block, reserve_block, write_block_body, BlockRef};
use kiln_codec::{PointerWidth, ReaderSession, Record, Result, WriterSession};

/// One keyframe of a node track.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Time in seconds from the start of the motion.
    pub time: f32,
    pub value: [f32; 4],
}

impl Record for Keyframe {
    type Deferred = ();

    fn encoded_size(width: PointerWidth) -> usize {
        4 + <[f32; 4]>::encoded_size(width)
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let time = r.read_f32()?;
        let value = <[f32; 4]>::read(r)?;
        Ok(Self { time, value })
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        w.write_f32(self.time);
        self.value.write(w)
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

/// A node of the transform hierarchy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionNode {
    pub name: String,
    /// Index of the parent node; `None` for roots.
    pub parent: Option<u32>,
    /// Rest translation.
    pub translation: [f32; 3],
    /// Rest rotation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    /// Keyframes ordered by time.
    pub keys: Vec<Keyframe>,
}

impl Default for MotionNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            keys: Vec::new(),
        }
    }
}

impl MotionNode {
    pub fn new(name: impl Into<String>, parent: Option<u32>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Default::default()
        }
    }

    /// Track value at `time`, linearly interpolated and clamped to the
    /// first and last key.
    pub fn value_at(&self, time: f32) -> Option<[f32; 4]> {
        let first = self.keys.first()?;
        if time <= first.time {
            return Some(first.value);
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                let t = if span > 0.0 { (time - a.time) / span } else { 1.0 };
                let mut value = [0.0; 4];
                for (i, v) in value.iter_mut().enumerate() {
                    *v = a.value[i] + (b.value[i] - a.value[i]) * t;
                }
                return Some(value);
            }
        }
        self.keys.last().map(|k| k.value)
    }
}

impl Record for MotionNode {
    type Deferred = BlockRef;

    fn encoded_size(width: PointerWidth) -> usize {
        width.bytes() + 4 + 12 + 16 + 4 + width.bytes()
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let name = r.read_string()?;
        let parent = u32::try_from(r.read_i32()?).ok();
        let translation = <[f32; 3]>::read(r)?;
        let rotation = <[f32; 4]>::read(r)?;
        let keys = read_block(r)?;
        Ok(Self {
            name,
            parent,
            translation,
            rotation,
            keys,
        })
    }

    fn write(&self, w: &mut WriterSession) -> Result<BlockRef> {
        w.write_string(&self.name)?;
        w.write_i32(self.parent.map_or(-1, |p| p as i32));
        self.translation.write(w)?;
        self.rotation.write(w)?;
        reserve_block(w, self.keys.len())
    }

    fn write_deferred(&self, w: &mut WriterSession, keys: BlockRef) -> Result<()> {
        write_block_body(w, keys, &self.keys, 4)
    }
}
