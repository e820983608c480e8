//! Offset table: pending pointer slots of a write session.
//!
//! A codec reserves a slot when it writes a header field whose target is not
//! known yet, and resolves it once the target body starts. Slots live in a
//! dense arena and are addressed by [`OffsetHandle`]; an optional structural
//! [`OffsetKey`] lets a codec look a slot up again and catches accidental
//! double reservations.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU32, Ordering};

use hashbrown::HashMap as FastHashMap;
use kiln_common::ByteWriter;
use rustc_hash::FxHasher;

use crate::{Error, PointerWidth, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(1);

/// Structural name of a pointer slot: a static section label plus an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub section: &'static str,
    pub index: u32,
}

impl OffsetKey {
    pub const fn new(section: &'static str, index: u32) -> Self {
        Self { section, index }
    }
}

impl fmt::Display for OffsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.section, self.index)
    }
}

/// Opaque handle to a reserved pointer slot.
///
/// Handles are only valid for the table that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetHandle {
    table: u32,
    index: u32,
}

/// A reserved pointer slot.
#[derive(Debug, Clone)]
pub struct PendingOffset {
    key: Option<OffsetKey>,
    source_position: u64,
    width: PointerWidth,
    resolved: Option<u64>,
}

impl PendingOffset {
    /// Structural key, if the slot was reserved with one.
    pub fn key(&self) -> Option<OffsetKey> {
        self.key
    }

    /// Position of the slot itself.
    pub fn source_position(&self) -> u64 {
        self.source_position
    }

    /// Slot width.
    pub fn width(&self) -> PointerWidth {
        self.width
    }

    /// Resolved target position; `Some(0)` for a null resolution.
    pub fn resolved(&self) -> Option<u64> {
        self.resolved
    }
}

/// Arena of pending offsets for one write session.
#[derive(Debug)]
pub struct OffsetTable {
    id: u32,
    entries: Vec<PendingOffset>,
    keys: FxHashMap<OffsetKey, OffsetHandle>,
    pending: usize,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetTable {
    pub fn new() -> Self {
        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
            keys: FxHashMap::default(),
            pending: 0,
        }
    }

    /// Reserve a slot at the writer's current position.
    ///
    /// With `write_placeholder`, `width` zero bytes are emitted; otherwise the
    /// caller is responsible for the slot bytes. A duplicate key fails before
    /// anything is written.
    pub fn reserve(
        &mut self,
        out: &mut ByteWriter,
        key: Option<OffsetKey>,
        width: PointerWidth,
        write_placeholder: bool,
    ) -> Result<OffsetHandle> {
        if let Some(key) = key {
            if self.keys.contains_key(&key) {
                return Err(Error::DuplicateOffsetId(key));
            }
        }

        let handle = OffsetHandle {
            table: self.id,
            index: self.entries.len() as u32,
        };
        let source_position = out.position() as u64;

        if write_placeholder {
            out.write_zeros(width.bytes());
        }
        if let Some(key) = key {
            self.keys.insert(key, handle);
        }
        self.entries.push(PendingOffset {
            key,
            source_position,
            width,
            resolved: None,
        });
        self.pending += 1;

        tracing::trace!(?key, position = source_position, width = width.bytes(), "reserved offset");
        Ok(handle)
    }

    /// Resolve a slot to the writer's current position.
    ///
    /// The slot receives `position - generic_offset`; afterwards the writer is
    /// back where it was before the call. Returns the target position.
    pub fn resolve(
        &mut self,
        out: &mut ByteWriter,
        handle: OffsetHandle,
        generic_offset: i64,
    ) -> Result<u64> {
        let target = out.position() as u64;
        let entry = self.entry(handle)?;
        if entry.resolved.is_some() {
            return Err(Error::OffsetAlreadyResolved(handle));
        }
        let (source, width) = (entry.source_position, entry.width);

        patch_pointer(out, source, width, target as i64 - generic_offset)?;

        self.pending -= 1;
        let entry = &mut self.entries[handle.index as usize];
        entry.resolved = Some(target);

        tracing::trace!(key = ?entry.key, source, target, "resolved offset");
        Ok(target)
    }

    /// Mark a slot as pointing nowhere. The placeholder keeps its zero value.
    pub fn resolve_null(&mut self, handle: OffsetHandle) -> Result<()> {
        let entry = self.entry(handle)?;
        if entry.resolved.is_some() {
            return Err(Error::OffsetAlreadyResolved(handle));
        }
        self.entries[handle.index as usize].resolved = Some(0);
        self.pending -= 1;
        Ok(())
    }

    /// Resolved target of a slot, `None` while still pending.
    pub fn value(&self, handle: OffsetHandle) -> Result<Option<u64>> {
        Ok(self.entry(handle)?.resolved)
    }

    /// Position of the slot itself.
    pub fn source_position(&self, handle: OffsetHandle) -> Result<u64> {
        Ok(self.entry(handle)?.source_position)
    }

    /// Look up the handle reserved under `key`.
    pub fn handle_for(&self, key: OffsetKey) -> Option<OffsetHandle> {
        self.keys.get(&key).copied()
    }

    /// Number of slots still waiting for a target.
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Total number of slots reserved.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First slot, in reservation order, that is still pending.
    pub fn first_pending(&self) -> Option<&PendingOffset> {
        self.entries.iter().find(|e| e.resolved.is_none())
    }

    /// All slots in reservation order.
    pub fn entries(&self) -> &[PendingOffset] {
        &self.entries
    }

    fn entry(&self, handle: OffsetHandle) -> Result<&PendingOffset> {
        if handle.table != self.id {
            return Err(Error::UnknownOffsetId(handle));
        }
        self.entries
            .get(handle.index as usize)
            .ok_or(Error::UnknownOffsetId(handle))
    }
}

/// Overwrite the pointer slot at `position` with `value`, then return the
/// writer to where it was.
pub(crate) fn patch_pointer(
    out: &mut ByteWriter,
    position: u64,
    width: PointerWidth,
    value: i64,
) -> Result<()> {
    if value < 0 || value as u64 > width.max_value() {
        return Err(Error::PointerOverflow {
            value,
            width: width.bytes(),
            position,
        });
    }

    let saved = out.position();
    out.seek(position as usize)?;
    match width {
        PointerWidth::U32 => out.write_u32(value as u32),
        PointerWidth::U64 => out.write_u64(value as u64),
    }
    out.seek(saved)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use kiln_common::Endian;

    use super::*;

    #[test]
    fn test_resolve_restores_position() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();

        out.write_u32(0xAAAA_AAAA);
        let handle = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        out.write_u32(0xBBBB_BBBB);

        let before = out.position();
        let target = table.resolve(&mut out, handle, 0).unwrap();
        assert_eq!(target, 12);
        assert_eq!(out.position(), before);

        out.write_u32(0xCCCC_CCCC);
        assert_eq!(
            out.as_slice(),
            &[
                0xAA, 0xAA, 0xAA, 0xAA, 12, 0, 0, 0, 0xBB, 0xBB, 0xBB, 0xBB, 0xCC, 0xCC, 0xCC,
                0xCC
            ]
        );
        assert_eq!(table.value(handle).unwrap(), Some(12));
        assert_eq!(table.source_position(handle).unwrap(), 4);
    }

    #[test]
    fn test_duplicate_key_writes_nothing() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();
        let key = OffsetKey::new("glyphs", 0);

        table.reserve(&mut out, Some(key), PointerWidth::U32, true).unwrap();
        let len = out.len();

        let err = table
            .reserve(&mut out, Some(key), PointerWidth::U32, true)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateOffsetId(k) if k == key));
        assert_eq!(out.len(), len);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nested_resolution_out_of_order() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();

        let outer = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        let second = table.reserve(&mut out, None, PointerWidth::U64, true).unwrap();
        assert_eq!(table.pending_count(), 2);

        // second body first, then the outer one which itself nests a slot
        table.resolve(&mut out, second, 0).unwrap();
        out.write_u16(1);
        table.resolve(&mut out, outer, 0).unwrap();
        let inner = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        table.resolve(&mut out, inner, 0).unwrap();

        assert_eq!(table.pending_count(), 0);
        assert_eq!(table.value(second).unwrap(), Some(12));
        assert_eq!(table.value(outer).unwrap(), Some(14));
        assert_eq!(table.value(inner).unwrap(), Some(18));
    }

    #[test]
    fn test_foreign_handle_is_unknown() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut a = OffsetTable::new();
        let b = OffsetTable::new();

        let handle = a.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        assert!(matches!(b.value(handle), Err(Error::UnknownOffsetId(_))));
    }

    #[test]
    fn test_double_resolve_rejected() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();
        let handle = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();

        table.resolve(&mut out, handle, 0).unwrap();
        assert!(matches!(
            table.resolve(&mut out, handle, 0),
            Err(Error::OffsetAlreadyResolved(_))
        ));
        assert!(matches!(
            table.resolve_null(handle),
            Err(Error::OffsetAlreadyResolved(_))
        ));
    }

    #[test]
    fn test_generic_offset_and_overflow() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();
        out.write_zeros(0x10);

        let handle = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        table.resolve(&mut out, handle, 0x10).unwrap();
        assert_eq!(&out.as_slice()[0x10..0x14], &[4, 0, 0, 0]);

        let handle = table.reserve(&mut out, None, PointerWidth::U32, true).unwrap();
        assert!(matches!(
            table.resolve(&mut out, handle, 0x100),
            Err(Error::PointerOverflow { .. })
        ));
    }

    #[test]
    fn test_handle_for_key() {
        let mut out = ByteWriter::new(Endian::Little);
        let mut table = OffsetTable::new();
        let key = OffsetKey::new("pages", 3);

        let handle = table.reserve(&mut out, Some(key), PointerWidth::U32, false).unwrap();
        assert_eq!(table.handle_for(key), Some(handle));
        assert_eq!(table.handle_for(OffsetKey::new("pages", 4)), None);
        // no placeholder requested
        assert!(out.is_empty());
    }
}
