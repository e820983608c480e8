//! Read sessions and scoped jumps.
//!
//! Pointer-addressed sections are decoded in place with
//! [`ReaderSession::read_at`]: the current position is saved, the cursor jumps
//! to the target, the body runs, and the saved position is restored by a
//! guard however the body exits. Bodies may nest further `read_at` calls.

use std::ops::{Deref, DerefMut};

use kiln_common::ByteReader;

use crate::{Error, PointerWidth, Result, SessionOptions};

/// Origin for [`ReaderSession::jump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Begin,
    Current,
    End,
}

/// State of one decode pass.
#[derive(Debug, Clone)]
pub struct ReaderSession<'a> {
    reader: ByteReader<'a>,
    generic_offset: i64,
    string_base: u64,
    string_generic: bool,
    pointer_width: PointerWidth,
    jumps: usize,
}

impl<'a> ReaderSession<'a> {
    /// Start a session over `data`.
    pub fn new(data: &'a [u8], options: &SessionOptions) -> Self {
        Self {
            reader: ByteReader::new(data, options.endian),
            generic_offset: options.generic_offset,
            string_base: 0,
            string_generic: options.string_generic,
            pointer_width: options.pointer_width,
            jumps: 0,
        }
    }

    /// Direct access to the input cursor.
    pub fn stream(&mut self) -> &mut ByteReader<'a> {
        &mut self.reader
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn generic_offset(&self) -> i64 {
        self.generic_offset
    }

    /// Set the generic offset. Must happen before the first pointer jump.
    pub fn set_generic_offset(&mut self, offset: i64) {
        self.generic_offset = offset;
    }

    pub fn string_base(&self) -> u64 {
        self.string_base
    }

    /// Set the value added to every string pointer before jumping.
    pub fn set_string_base(&mut self, base: u64) {
        self.string_base = base;
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }

    /// Switch the default pointer width, typically after reading a version.
    pub fn set_pointer_width(&mut self, width: PointerWidth) {
        self.pointer_width = width;
    }

    /// Number of jumps performed so far.
    pub fn jumps(&self) -> usize {
        self.jumps
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        Ok(self.reader.read_bytes(count)?)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        Ok(self.reader.skip(count)?)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.reader.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.reader.read_u16()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.reader.read_i16()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.reader.read_u32()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.reader.read_i32()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.reader.read_u64()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.reader.read_f32()?)
    }

    /// Check the signature at the current position.
    ///
    /// A short buffer is reported as a mismatch too, so a foreign file is
    /// rejected before any field is parsed.
    pub fn expect_signature(&mut self, signature: &[u8]) -> Result<()> {
        let available = self.reader.remaining().min(signature.len());
        let actual = self.reader.peek_bytes(available)?;
        if actual != signature {
            return Err(Error::SignatureMismatch {
                expected: signature.to_vec(),
                actual: actual.to_vec(),
            });
        }
        self.reader.skip(signature.len())?;
        Ok(())
    }

    /// Read a pointer of the session's default width.
    pub fn read_pointer(&mut self) -> Result<u64> {
        self.read_pointer_with(self.pointer_width)
    }

    pub fn read_pointer_with(&mut self, width: PointerWidth) -> Result<u64> {
        match width {
            PointerWidth::U32 => self.read_u32().map(u64::from),
            PointerWidth::U64 => self.read_u64(),
        }
    }

    /// Move the cursor to `offset + generic_offset`, relative to `origin`.
    ///
    /// This is the only place the generic offset is applied on read.
    pub fn jump(&mut self, offset: i64, origin: SeekOrigin) -> Result<()> {
        let base = match origin {
            SeekOrigin::Begin => 0,
            SeekOrigin::Current => self.reader.position() as i64,
            SeekOrigin::End => self.reader.len() as i64,
        };
        let target = base
            .saturating_add(offset)
            .saturating_add(self.generic_offset);
        self.jump_absolute(target)
    }

    fn jump_absolute(&mut self, target: i64) -> Result<()> {
        if target < 0 || target > self.reader.len() as i64 {
            return Err(Error::OffsetOutOfRange {
                offset: target,
                len: self.reader.len(),
            });
        }
        tracing::trace!(from = self.reader.position(), to = target, "jump");
        self.reader.seek(target as u64)?;
        self.jumps += 1;
        Ok(())
    }

    /// Jump to the file pointer `offset` and return a guard that restores
    /// the current position when dropped.
    pub fn scoped_jump(&mut self, offset: u64) -> Result<JumpScope<'_, 'a>> {
        let target = to_signed(offset).saturating_add(self.generic_offset);
        self.scope_at(target)
    }

    fn scope_at(&mut self, target: i64) -> Result<JumpScope<'_, 'a>> {
        let saved = self.reader.position();
        self.jump_absolute(target)?;
        Ok(JumpScope {
            session: self,
            saved,
        })
    }

    /// Decode the section at file pointer `offset` without disturbing the
    /// current position.
    ///
    /// The position is restored whether `body` succeeds or fails.
    pub fn read_at<T, E>(
        &mut self,
        offset: u64,
        body: impl FnOnce(&mut ReaderSession<'a>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        let mut scope = self.scoped_jump(offset)?;
        body(&mut *scope)
    }

    /// Read a string pointer of the session's default width and generic
    /// policy.
    pub fn read_string(&mut self) -> Result<String> {
        self.read_string_pointer_with(self.pointer_width, self.string_generic)
    }

    /// Read a 4-byte string pointer and the text it addresses.
    pub fn read_string_pointer(&mut self, use_generic: bool) -> Result<String> {
        self.read_string_pointer_with(PointerWidth::U32, use_generic)
    }

    /// Read an 8-byte string pointer and the text it addresses.
    pub fn read_string_pointer_wide(&mut self, use_generic: bool) -> Result<String> {
        self.read_string_pointer_with(PointerWidth::U64, use_generic)
    }

    /// Read a string pointer of `width`.
    ///
    /// Zero means "empty string" and performs no jump. Otherwise the text is
    /// read at `pointer + string_base` (plus the generic offset when
    /// `use_generic` is set) and the cursor returns behind the pointer.
    pub fn read_string_pointer_with(
        &mut self,
        width: PointerWidth,
        use_generic: bool,
    ) -> Result<String> {
        let pointer = self.read_pointer_with(width)?;
        if pointer == 0 {
            return Ok(String::new());
        }

        let mut target = to_signed(pointer).saturating_add(to_signed(self.string_base));
        if use_generic {
            target = target.saturating_add(self.generic_offset);
        }

        let mut scope = self.scope_at(target)?;
        let text = scope.reader.read_cstring()?;
        Ok(text.to_owned())
    }
}

// Pointers past i64::MAX clamp there; saturated targets always fail the
// range check in jump_absolute.
fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Guard returned by [`ReaderSession::scoped_jump`].
///
/// Dereferences to the session; restores the saved position on drop.
#[derive(Debug)]
pub struct JumpScope<'s, 'a> {
    session: &'s mut ReaderSession<'a>,
    saved: usize,
}

impl<'s, 'a> JumpScope<'s, 'a> {
    /// Position that will be restored.
    pub fn saved_position(&self) -> usize {
        self.saved
    }
}

impl<'a> Deref for JumpScope<'_, 'a> {
    type Target = ReaderSession<'a>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<'a> DerefMut for JumpScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for JumpScope<'_, '_> {
    fn drop(&mut self) {
        // saved was a valid position when taken and the buffer never shrinks
        let _ = self.session.reader.seek(self.saved as u64);
    }
}
