//! Endian-aware binary reader over byte slices.
//!
//! This module provides [`ByteReader`], a cursor-like type that reads binary
//! data from a byte slice without copying. Scalars honor the reader's
//! [`Endian`] setting bit-exactly.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Endian, Error, Result};

macro_rules! read_scalar {
    ($name:ident, $ty:ty, $size:expr) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the reader's byte order.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$name(bytes),
                Endian::Big => BigEndian::$name(bytes),
            })
        }
    };
}

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use kiln_common::{ByteReader, Endian};
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = ByteReader::new(&data, Endian::Little);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Byte order used for scalar reads.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// The whole underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Seek to an absolute position.
    ///
    /// Seeking to exactly `len()` is allowed (end of buffer); anything past
    /// that is rejected.
    #[inline]
    pub fn seek(&mut self, position: u64) -> Result<()> {
        if position > self.data.len() as u64 {
            return Err(Error::OutOfRange {
                offset: position,
                len: self.data.len(),
            });
        }
        self.position = position as usize;
        Ok(())
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.peek_bytes(count)?;
        self.position += count;
        Ok(())
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                position: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    read_scalar!(read_u16, u16, 2);
    read_scalar!(read_i16, i16, 2);
    read_scalar!(read_u32, u32, 4);
    read_scalar!(read_i32, i32, 4);
    read_scalar!(read_u64, u64, 8);
    read_scalar!(read_f32, f32, 4);

    /// Read a null-terminated UTF-8 string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let start = self.position;
        let remaining = &self.data[start.min(self.data.len())..];

        let null_pos = memchr::memchr(0, remaining)
            .ok_or(Error::MissingNullTerminator { position: start })?;

        let string_bytes = &remaining[..null_pos];
        self.position = start + null_pos + 1; // Skip the null terminator

        std::str::from_utf8(string_bytes).map_err(Error::Utf8)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct's in-memory layout is taken as-is, so this is only meaningful
    /// for little-endian records on little-endian hosts.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let position = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            position,
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = ByteReader::new(&data, Endian::Little);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_big_endian() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0x3F, 0x80, 0x00, 0x00];
        let mut reader = ByteReader::new(&data, Endian::Big);

        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.read_i16().unwrap(), 0x0304);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        let mut reader = ByteReader::new(data, Endian::Little);

        assert_eq!(reader.read_cstring().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "world");
        assert!(matches!(
            reader.read_cstring(),
            Err(Error::MissingNullTerminator { position: 12 })
        ));
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut reader = ByteReader::new(&data, Endian::Little);

        assert!(reader.seek(4).is_ok());
        assert!(reader.is_empty());
        assert!(matches!(
            reader.seek(5),
            Err(Error::OutOfRange { offset: 5, len: 4 })
        ));
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = ByteReader::new(&data, Endian::Little);

        match reader.read_u32() {
            Err(Error::UnexpectedEof {
                position,
                needed,
                available,
            }) => {
                assert_eq!((position, needed, available), (0, 4, 2));
            }
            other => panic!("expected eof, got {other:?}"),
        }
    }
}
