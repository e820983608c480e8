//! String interning for write sessions.
//!
//! Every distinct string is stored once in a table of null-terminated
//! entries that is appended at the tail of the file. Pointer slots that
//! reference the table are written as zero placeholders and back-patched by
//! [`StringTable::finish`], once the table's position is known.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use kiln_common::ByteWriter;
use rustc_hash::FxHasher;

use crate::offsets::patch_pointer;
use crate::{Error, PointerWidth, Result, StringPointerMode};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A string pointer waiting for the table position.
#[derive(Debug, Clone, Copy)]
struct StringSlot {
    position: u64,
    relative: u64,
    width: PointerWidth,
    generic: bool,
}

/// Deduplicating string table for one write session.
#[derive(Debug)]
pub struct StringTable {
    data: Vec<u8>,
    offsets: FxHashMap<String, u64>,
    slots: Vec<StringSlot>,
    mode: StringPointerMode,
    base: Option<u64>,
}

impl StringTable {
    /// Create an empty table.
    ///
    /// In [`StringPointerMode::TableRelative`] the table opens with an empty
    /// string so no real text sits at relative offset 0, which readers treat
    /// as "no string".
    pub fn new(mode: StringPointerMode) -> Self {
        let mut table = Self {
            data: Vec::new(),
            offsets: FxHashMap::default(),
            slots: Vec::new(),
            mode,
            base: None,
        };
        if mode == StringPointerMode::TableRelative {
            table.intern("");
        }
        table
    }

    /// Add a string if not already present and return its table offset.
    pub fn intern(&mut self, text: &str) -> u64 {
        if let Some(&offset) = self.offsets.get(text) {
            return offset;
        }

        let offset = self.data.len() as u64;
        self.data.extend_from_slice(text.as_bytes());
        self.data.push(0); // null terminator
        self.offsets.insert(text.to_string(), offset);
        offset
    }

    /// Intern `text` and write a placeholder pointer to it at the writer's
    /// current position.
    ///
    /// Empty text is written as a zero pointer and never patched. Returns the
    /// table offset of the text, or `None` for the empty sentinel.
    pub fn intern_and_reserve_pointer(
        &mut self,
        out: &mut ByteWriter,
        text: &str,
        width: PointerWidth,
        generic: bool,
    ) -> Result<Option<u64>> {
        if self.base.is_some() {
            return Err(Error::StringTableFlushed);
        }

        if text.is_empty() {
            out.write_zeros(width.bytes());
            return Ok(None);
        }

        let relative = self.intern(text);
        let position = out.position() as u64;
        out.write_zeros(width.bytes());
        self.slots.push(StringSlot {
            position,
            relative,
            width,
            generic,
        });

        tracing::trace!(text, relative, position, "string pointer reserved");
        Ok(Some(relative))
    }

    /// Append the table at the writer's position and patch every pointer slot.
    ///
    /// Absolute slots receive `base + offset`, minus `generic_offset` when the
    /// slot asked for it. Table-relative slots receive the bare offset. Calling
    /// this again returns the existing base without writing anything.
    pub fn finish(&mut self, out: &mut ByteWriter, generic_offset: i64) -> Result<u64> {
        if let Some(base) = self.base {
            return Ok(base);
        }

        let base = out.position() as u64;
        out.write_bytes(&self.data);

        for slot in &self.slots {
            let value = match self.mode {
                StringPointerMode::Absolute => {
                    let absolute = (base + slot.relative) as i64;
                    if slot.generic {
                        absolute - generic_offset
                    } else {
                        absolute
                    }
                }
                StringPointerMode::TableRelative => slot.relative as i64,
            };
            patch_pointer(out, slot.position, slot.width, value)?;
        }

        tracing::debug!(
            base,
            bytes = self.data.len(),
            strings = self.offsets.len(),
            slots = self.slots.len(),
            "string table flushed"
        );
        self.base = Some(base);
        Ok(base)
    }

    /// Table offset of an already interned string.
    pub fn offset_of(&self, text: &str) -> Option<u64> {
        self.offsets.get(text).copied()
    }

    /// Position of the table once flushed.
    pub fn base(&self) -> Option<u64> {
        self.base
    }

    /// Size of the table in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw table bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of pointer slots issued so far.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Positions of every issued slot, in issue order.
    pub fn slot_positions(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().map(|s| s.position)
    }
}
