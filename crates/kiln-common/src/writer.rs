//! Endian-aware binary writer with random access.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{Endian, Error, Result};

macro_rules! write_scalar {
    ($name:ident, $ty:ty, $size:expr) => {
        #[doc = concat!("Write a `", stringify!($ty), "` in the writer's byte order.")]
        #[inline]
        pub fn $name(&mut self, value: $ty) {
            let mut buf = [0u8; $size];
            match self.endian {
                Endian::Little => LittleEndian::$name(&mut buf, value),
                Endian::Big => BigEndian::$name(&mut buf, value),
            }
            self.write_bytes(&buf);
        }
    };
}

/// A growable byte buffer with an independent write position.
///
/// Writing inside the buffer overwrites existing bytes; writing past the end
/// extends it. This lets callers seek back to patch earlier fields.
///
/// # Example
///
/// ```
/// use kiln_common::{ByteWriter, Endian};
///
/// let mut writer = ByteWriter::new(Endian::Little);
/// writer.write_u32(0);
/// writer.write_u16(7);
/// writer.seek(0).unwrap();
/// writer.write_u32(0xAABBCCDD);
///
/// assert_eq!(writer.into_inner(), [0xDD, 0xCC, 0xBB, 0xAA, 7, 0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
    position: usize,
    endian: Endian,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new(endian: Endian) -> Self {
        Self {
            data: Vec::new(),
            position: 0,
            endian,
        }
    }

    /// Byte order used for scalar writes.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Current write position.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes written so far.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Move the write position. Targets past the end are rejected.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::OutOfRange {
                offset: position as u64,
                len: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move the write position to the end of the buffer.
    #[inline]
    pub fn seek_end(&mut self) {
        self.position = self.data.len();
    }

    /// Write raw bytes at the current position.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    /// Write `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        let end = self.position + count;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].fill(0);
        self.position = end;
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    write_scalar!(write_u16, u16, 2);
    write_scalar!(write_i16, i16, 2);
    write_scalar!(write_u32, u32, 4);
    write_scalar!(write_i32, i32, 4);
    write_scalar!(write_u64, u64, 8);
    write_scalar!(write_f32, f32, 4);

    /// Pad with zero bytes until the position is a multiple of `alignment`.
    ///
    /// Returns the number of padding bytes written. The alignment is checked
    /// before anything is written.
    pub fn align(&mut self, alignment: usize) -> Result<usize> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment(alignment));
        }
        let padding = (alignment - self.position % alignment) % alignment;
        self.write_zeros(padding);
        Ok(padding)
    }

    /// Consume the writer and return the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_inside_buffer() {
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write_u32(1);
        writer.write_u32(2);
        writer.seek(0).unwrap();
        writer.write_u32(9);

        assert_eq!(writer.position(), 4);
        assert_eq!(writer.len(), 8);
        assert_eq!(writer.as_slice(), &[9, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_big_endian_scalars() {
        let mut writer = ByteWriter::new(Endian::Big);
        writer.write_u16(0x0102);
        writer.write_f32(1.0);
        assert_eq!(writer.into_inner(), [0x01, 0x02, 0x3F, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_align_pads_with_zeros() {
        for start in 0..20 {
            let mut writer = ByteWriter::new(Endian::Little);
            writer.write_bytes(&vec![0xAB; start]);
            let padding = writer.align(16).unwrap();

            assert_eq!((start + padding) % 16, 0);
            assert!(padding < 16);
            assert!(writer.as_slice()[start..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_align_rejects_bad_alignment() {
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write_u8(1);

        assert!(matches!(writer.align(3), Err(Error::InvalidAlignment(3))));
        assert!(matches!(writer.align(0), Err(Error::InvalidAlignment(0))));
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_seek_past_end_rejected() {
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write_u16(0);
        assert!(writer.seek(3).is_err());
        assert!(writer.seek(2).is_ok());
    }
}
