//! Write sessions.
//!
//! A [`WriterSession`] owns the output buffer, the offset table and the
//! string table for one encode pass of one file. Headers can reference
//! sections that are written much later: a placeholder only needs a value by
//! the time [`WriterSession::finish`] runs, not when it is declared.

use kiln_common::ByteWriter;

use crate::offsets::{patch_pointer, OffsetHandle, OffsetKey, OffsetTable};
use crate::strings::StringTable;
use crate::{Error, PointerWidth, Result, SessionOptions};

/// Progress of a write session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing written yet.
    Open,
    /// Bytes written, no placeholder reserved.
    PreambleWritten,
    /// This many placeholders are still waiting for a target.
    SectionsPending(usize),
    /// Every reserved placeholder has a target.
    AllResolved,
    /// String table, padding and size field written.
    Finalized,
}

/// State of one encode pass.
#[derive(Debug)]
pub struct WriterSession {
    out: ByteWriter,
    offsets: OffsetTable,
    strings: StringTable,
    options: SessionOptions,
    size_field: Option<(u64, PointerWidth)>,
    relocations: Vec<u64>,
    finalized: bool,
}

impl WriterSession {
    /// Start a session with the given options.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            out: ByteWriter::new(options.endian),
            offsets: OffsetTable::new(),
            strings: StringTable::new(options.string_mode),
            options,
            size_field: None,
            relocations: Vec::new(),
            finalized: false,
        }
    }

    /// Options this session was created with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Direct access to the output cursor.
    pub fn stream(&mut self) -> &mut ByteWriter {
        &mut self.out
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        self.out.as_slice()
    }

    pub fn position(&self) -> u64 {
        self.out.position() as u64
    }

    pub fn state(&self) -> SessionState {
        if self.finalized {
            SessionState::Finalized
        } else if self.offsets.pending_count() > 0 {
            SessionState::SectionsPending(self.offsets.pending_count())
        } else if !self.offsets.is_empty() {
            SessionState::AllResolved
        } else if !self.out.is_empty() {
            SessionState::PreambleWritten
        } else {
            SessionState::Open
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.write_bytes(bytes);
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.out.write_zeros(count);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.out.write_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.out.write_u16(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.out.write_i16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.out.write_u32(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.out.write_i32(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.out.write_u64(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.out.write_f32(value);
    }

    /// Write an element count as `u32`, rejecting counts that do not fit.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| Error::CountOverflow(count))?;
        self.out.write_u32(count);
        Ok(())
    }

    /// Write the format signature at the current position.
    pub fn write_signature(&mut self, signature: &[u8]) {
        self.out.write_bytes(signature);
    }

    /// Reserve a zero placeholder of the session's default width.
    pub fn reserve(&mut self) -> Result<OffsetHandle> {
        self.reserve_with(None, self.options.pointer_width, true)
    }

    /// Reserve a placeholder under a structural key.
    pub fn reserve_keyed(&mut self, key: OffsetKey) -> Result<OffsetHandle> {
        self.reserve_with(Some(key), self.options.pointer_width, true)
    }

    /// Reserve a placeholder with full control over key, width and whether
    /// the zero bytes are emitted.
    pub fn reserve_with(
        &mut self,
        key: Option<OffsetKey>,
        width: PointerWidth,
        write_placeholder: bool,
    ) -> Result<OffsetHandle> {
        if self.strings.base().is_some() {
            return Err(Error::StringTableFlushed);
        }
        let handle = self
            .offsets
            .reserve(&mut self.out, key, width, write_placeholder)?;
        if self.options.track_relocations {
            self.relocations.push(self.offsets.source_position(handle)?);
        }
        Ok(handle)
    }

    /// Point a placeholder at the current position.
    ///
    /// The cursor is unchanged afterwards, so sequential writing continues
    /// where it left off.
    pub fn resolve(&mut self, handle: OffsetHandle) -> Result<u64> {
        self.offsets
            .resolve(&mut self.out, handle, self.options.generic_offset)
    }

    /// Mark an optional section as absent; its slot stays zero.
    pub fn resolve_null(&mut self, handle: OffsetHandle) -> Result<()> {
        let source = self.offsets.source_position(handle)?;
        self.offsets.resolve_null(handle)?;
        self.relocations.retain(|&p| p != source);
        Ok(())
    }

    /// Resolved target of a placeholder; `None` while pending.
    pub fn value(&self, handle: OffsetHandle) -> Result<Option<u64>> {
        self.offsets.value(handle)
    }

    /// Position of the placeholder itself.
    pub fn source_position(&self, handle: OffsetHandle) -> Result<u64> {
        self.offsets.source_position(handle)
    }

    /// Handle reserved under `key`.
    pub fn handle_for(&self, key: OffsetKey) -> Option<OffsetHandle> {
        self.offsets.handle_for(key)
    }

    /// Write a pointer to `text` using the session's default width and
    /// generic-offset policy.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.write_string_with(text, self.options.pointer_width, self.options.string_generic)
    }

    /// Write a pointer to `text` with an explicit width and generic flag.
    pub fn write_string_with(
        &mut self,
        text: &str,
        width: PointerWidth,
        generic: bool,
    ) -> Result<()> {
        let position = self.position();
        let issued = self
            .strings
            .intern_and_reserve_pointer(&mut self.out, text, width, generic)?;
        if issued.is_some() && self.options.track_relocations {
            self.relocations.push(position);
        }
        Ok(())
    }

    /// Append the string table at the current position.
    ///
    /// Returns the table position. `finish` calls this when the codec has
    /// not done so itself.
    pub fn flush_strings(&mut self) -> Result<u64> {
        self.strings.finish(&mut self.out, self.options.generic_offset)
    }

    /// Pad with zeros to `alignment`, returning the padding applied.
    pub fn align(&mut self, alignment: usize) -> Result<usize> {
        Ok(self.out.align(alignment)?)
    }

    /// Overwrite a `u32` written earlier, such as a count that was unknown
    /// at the time. The cursor is unchanged.
    pub fn patch_u32(&mut self, position: u64, value: u32) -> Result<()> {
        let end = position + 4;
        if end > self.out.len() as u64 {
            return Err(Error::OffsetOutOfRange {
                offset: position as i64,
                len: self.out.len(),
            });
        }
        let saved = self.out.position();
        self.out.seek(position as usize)?;
        self.out.write_u32(value);
        self.out.seek(saved)?;
        Ok(())
    }

    /// Declare a total-size field at the current position; `finish` patches
    /// it with the final file length.
    pub fn reserve_file_size(&mut self, width: PointerWidth) {
        self.size_field = Some((self.position(), width));
        self.out.write_zeros(width.bytes());
    }

    /// Positions of every non-null pointer slot, in the order written.
    ///
    /// Empty unless the session tracks relocations.
    pub fn relocations(&self) -> &[u64] {
        &self.relocations
    }

    /// Finalize the session and return the encoded bytes.
    ///
    /// Fails with [`Error::UnresolvedOffset`] while any placeholder is pending.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        Ok(self.out.into_inner())
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(first) = self.offsets.first_pending() {
            return Err(Error::UnresolvedOffset {
                count: self.offsets.pending_count(),
                first_position: first.source_position(),
            });
        }

        self.out.seek_end();
        self.flush_strings()?;
        self.out.seek_end();
        let padding = self.out.align(self.options.alignment)?;

        if let Some((position, width)) = self.size_field {
            let total = self.out.len() as i64;
            patch_pointer(&mut self.out, position, width, total)?;
        }

        tracing::debug!(
            bytes = self.out.len(),
            offsets = self.offsets.len(),
            strings = self.strings.len(),
            padding,
            "write session finalized"
        );
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kiln_common::Endian;

    use super::*;
    use crate::StringPointerMode;

    #[test]
    fn test_state_progression() {
        let mut w = WriterSession::new(SessionOptions::default());
        assert_eq!(w.state(), SessionState::Open);

        w.write_signature(b"TEST");
        assert_eq!(w.state(), SessionState::PreambleWritten);

        let a = w.reserve().unwrap();
        let b = w.reserve().unwrap();
        assert_eq!(w.state(), SessionState::SectionsPending(2));

        w.resolve(b).unwrap();
        w.write_u32(7);
        w.resolve(a).unwrap();
        assert_eq!(w.state(), SessionState::AllResolved);

        let bytes = w.finish().unwrap();
        assert_eq!(&bytes[4..8], &16u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &12u32.to_le_bytes());
    }

    #[test]
    fn test_finish_with_pending_fails() {
        let mut w = WriterSession::new(SessionOptions::default());
        w.write_u32(0);
        w.reserve_keyed(OffsetKey::new("body", 0)).unwrap();

        match w.finish() {
            Err(Error::UnresolvedOffset {
                count,
                first_position,
            }) => {
                assert_eq!(count, 1);
                assert_eq!(first_position, 4);
            }
            other => panic!("expected unresolved offset, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_reserve_writes_nothing() {
        let mut w = WriterSession::new(SessionOptions::default());
        let key = OffsetKey::new("pages", 0);
        w.reserve_keyed(key).unwrap();
        let before = w.as_slice().len();

        assert!(matches!(
            w.reserve_keyed(key),
            Err(Error::DuplicateOffsetId(_))
        ));
        assert_eq!(w.as_slice().len(), before);
    }

    #[test]
    fn test_resolve_keeps_cursor_and_content() {
        let mut w = WriterSession::new(SessionOptions::default());
        let slot = w.reserve().unwrap();
        w.write_u32(0x1111_1111);

        let before = w.position();
        w.resolve(slot).unwrap();
        assert_eq!(w.position(), before);
        assert_ne!(w.position(), w.source_position(slot).unwrap());

        w.write_u32(0x2222_2222);
        let bytes = w.finish().unwrap();
        assert_eq!(
            bytes,
            [8, 0, 0, 0, 0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22]
        );
    }

    #[test]
    fn test_interned_strings_share_offset() {
        let mut w = WriterSession::new(SessionOptions::default());
        w.write_string("shared").unwrap();
        w.write_string("shared").unwrap();
        let bytes = w.finish().unwrap();

        assert_eq!(&bytes[0..4], &bytes[4..8]);
        assert_eq!(&bytes[8..], b"shared\0");
        assert_eq!(bytes.windows(6).filter(|w| w == b"shared").count(), 1);
    }

    #[test]
    fn test_alignment_and_size_field() {
        let options = SessionOptions::default()
            .with_endian(Endian::Big)
            .with_alignment(16);
        let mut w = WriterSession::new(options);
        w.write_signature(b"SIZE");
        w.reserve_file_size(PointerWidth::U32);
        w.write_u8(0xFF);

        let bytes = w.finish().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 16]);
        assert!(bytes[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_relocations_tracked() {
        let options = SessionOptions::default()
            .with_relocations(true)
            .with_string_mode(StringPointerMode::TableRelative);
        let mut w = WriterSession::new(options);
        let a = w.reserve().unwrap();
        let b = w.reserve().unwrap();
        w.write_string("name").unwrap();
        w.write_string("").unwrap();
        w.resolve(a).unwrap();
        w.resolve_null(b).unwrap();

        assert_eq!(w.relocations(), &[0, 8]);
    }

    #[test]
    fn test_reserve_after_flush_rejected() {
        let mut w = WriterSession::new(SessionOptions::default());
        w.write_string("x").unwrap();
        w.flush_strings().unwrap();
        assert!(matches!(w.reserve(), Err(Error::StringTableFlushed)));
        assert!(matches!(w.write_string("y"), Err(Error::StringTableFlushed)));
    }

    #[test]
    fn test_patch_u32_keeps_cursor() {
        let mut w = WriterSession::new(SessionOptions::default().with_endian(Endian::Big));
        w.write_u32(0);
        w.write_u16(0xBEEF);
        w.patch_u32(0, 7).unwrap();

        assert_eq!(w.position(), 6);
        assert_eq!(w.as_slice(), &[0, 0, 0, 7, 0xBE, 0xEF]);
        assert!(matches!(
            w.patch_u32(4, 1),
            Err(Error::OffsetOutOfRange { offset: 4, len: 6 })
        ));
    }
}
