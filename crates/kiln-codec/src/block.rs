//! Indexed sub-blocks: a `u32` count followed by a pointer to the elements.
//!
//! Many formats describe a list as "count + deferred body pointer". The body
//! holds the fixed-size part of every element contiguously; sections an
//! element points to are written after the whole array.

use crate::offsets::OffsetHandle;
use crate::{Error, PointerWidth, ReaderSession, Result, WriterSession};

/// Element codec for use in indexed sub-blocks.
pub trait Record: Sized {
    /// State carried from [`Record::write`] to [`Record::write_deferred`],
    /// usually the handles of the element's own pending sections.
    type Deferred;

    /// Size of the fixed part of one element.
    fn encoded_size(width: PointerWidth) -> usize;

    fn read(r: &mut ReaderSession<'_>) -> Result<Self>;

    /// Write the fixed part of the element.
    fn write(&self, w: &mut WriterSession) -> Result<Self::Deferred>;

    /// Write the sections the fixed part points to. Called once every
    /// element of the block has been written.
    fn write_deferred(&self, w: &mut WriterSession, deferred: Self::Deferred) -> Result<()>;
}

/// The header half of a block: count written, pointer pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    count: usize,
    pointer: OffsetHandle,
}

impl BlockRef {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn pointer(&self) -> OffsetHandle {
        self.pointer
    }
}

/// Write the count and a placeholder pointer for a block of `count` elements.
pub fn reserve_block(w: &mut WriterSession, count: usize) -> Result<BlockRef> {
    w.write_count(count)?;
    let pointer = w.reserve()?;
    Ok(BlockRef { count, pointer })
}

/// Write the body of a reserved block at the current position.
///
/// The body is aligned to `alignment` first. An empty block gets a null
/// pointer and writes nothing.
pub fn write_block_body<T: Record>(
    w: &mut WriterSession,
    block: BlockRef,
    items: &[T],
    alignment: usize,
) -> Result<()> {
    if items.len() != block.count {
        return Err(Error::SizeMismatch {
            position: w.source_position(block.pointer)? as usize,
            expected: block.count as u64,
            available: items.len() as u64,
        });
    }
    if items.is_empty() {
        return w.resolve_null(block.pointer);
    }

    w.align(alignment)?;
    w.resolve(block.pointer)?;

    let deferred = items
        .iter()
        .map(|item| item.write(w))
        .collect::<Result<Vec<_>>>()?;
    for (item, pending) in items.iter().zip(deferred) {
        item.write_deferred(w, pending)?;
    }
    Ok(())
}

/// Read a count and pointer, then decode the elements in place.
///
/// The declared count is checked against the bytes available at the target
/// before any element is decoded.
pub fn read_block<T: Record>(r: &mut ReaderSession<'_>) -> Result<Vec<T>> {
    let position = r.position();
    let count = r.read_u32()? as usize;
    let pointer = r.read_pointer()?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let needed = count as u64 * T::encoded_size(r.pointer_width()) as u64;
    if pointer == 0 {
        return Err(Error::SizeMismatch {
            position,
            expected: needed,
            available: 0,
        });
    }

    r.read_at(pointer, |r| {
        let available = r.remaining() as u64;
        if needed > available {
            return Err(Error::SizeMismatch {
                position,
                expected: needed,
                available,
            });
        }
        (0..count).map(|_| T::read(r)).collect()
    })
}

impl Record for String {
    type Deferred = ();

    fn encoded_size(width: PointerWidth) -> usize {
        width.bytes()
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        r.read_string()
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        w.write_string(self)
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

impl Record for u32 {
    type Deferred = ();

    fn encoded_size(_: PointerWidth) -> usize {
        4
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        r.read_u32()
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        w.write_u32(*self);
        Ok(())
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

impl Record for f32 {
    type Deferred = ();

    fn encoded_size(_: PointerWidth) -> usize {
        4
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        r.read_f32()
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        w.write_f32(*self);
        Ok(())
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

impl<const N: usize> Record for [f32; N] {
    type Deferred = ();

    fn encoded_size(_: PointerWidth) -> usize {
        4 * N
    }

    fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = r.read_f32()?;
        }
        Ok(out)
    }

    fn write(&self, w: &mut WriterSession) -> Result<()> {
        for &v in self {
            w.write_f32(v);
        }
        Ok(())
    }

    fn write_deferred(&self, _: &mut WriterSession, _: ()) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionOptions;

    /// A record with a nested list, to check deferred ordering.
    #[derive(Debug, Clone, PartialEq)]
    struct Group {
        id: u32,
        members: Vec<u32>,
    }

    impl Record for Group {
        type Deferred = BlockRef;

        fn encoded_size(width: PointerWidth) -> usize {
            8 + width.bytes()
        }

        fn read(r: &mut ReaderSession<'_>) -> Result<Self> {
            let id = r.read_u32()?;
            let members = read_block(r)?;
            Ok(Self { id, members })
        }

        fn write(&self, w: &mut WriterSession) -> Result<BlockRef> {
            w.write_u32(self.id);
            reserve_block(w, self.members.len())
        }

        fn write_deferred(&self, w: &mut WriterSession, block: BlockRef) -> Result<()> {
            write_block_body(w, block, &self.members, 4)
        }
    }

    #[test]
    fn test_nested_blocks() {
        let groups = vec![
            Group {
                id: 1,
                members: vec![10, 11, 12],
            },
            Group {
                id: 2,
                members: vec![],
            },
            Group {
                id: 3,
                members: vec![30],
            },
        ];

        let options = SessionOptions::default();
        let mut w = WriterSession::new(options);
        let block = reserve_block(&mut w, groups.len()).unwrap();
        w.write_string("trailer").unwrap();
        write_block_body(&mut w, block, &groups, 4).unwrap();
        let bytes = w.finish().unwrap();

        // fixed parts of all three groups precede the first member list
        let body = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(body, 12);
        let first_members = u32::from_le_bytes(bytes[body + 8..body + 12].try_into().unwrap());
        assert_eq!(first_members as usize, body + 3 * 12);
        // empty member list is a null pointer
        assert_eq!(&bytes[body + 20..body + 24], &[0, 0, 0, 0]);

        let mut r = ReaderSession::new(&bytes, &options);
        let decoded: Vec<Group> = read_block(&mut r).unwrap();
        assert_eq!(decoded, groups);
        assert_eq!(r.read_string().unwrap(), "trailer");
    }

    #[test]
    fn test_declared_count_exceeds_data() {
        // count 100 at a target with 4 bytes left
        let mut bytes = vec![100, 0, 0, 0, 8, 0, 0, 0];
        bytes.extend_from_slice(&[1, 0, 0, 0]);

        let mut r = ReaderSession::new(&bytes, &SessionOptions::default());
        match read_block::<u32>(&mut r) {
            Err(Error::SizeMismatch {
                position,
                expected,
                available,
            }) => {
                assert_eq!(position, 0);
                assert_eq!(expected, 400);
                assert_eq!(available, 4);
            }
            other => panic!("expected size mismatch, got {other:?}"),
        }
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn test_count_mismatch_on_write() {
        let mut w = WriterSession::new(SessionOptions::default());
        let block = reserve_block(&mut w, 2).unwrap();
        assert!(matches!(
            write_block_body(&mut w, block, &[1u32], 4),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_wide_pointer_vectors() {
        let options = SessionOptions::default().with_pointer_width(PointerWidth::U64);
        let points = vec![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let mut w = WriterSession::new(options);
        let block = reserve_block(&mut w, points.len()).unwrap();
        write_block_body(&mut w, block, &points, 16).unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(u64::from_le_bytes(bytes[4..12].try_into().unwrap()), 16);

        let mut r = ReaderSession::new(&bytes, &options);
        assert_eq!(read_block::<[f32; 3]>(&mut r).unwrap(), points);
    }
}
