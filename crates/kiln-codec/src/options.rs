//! Session configuration.

use kiln_common::Endian;

/// On-disk width of a pointer slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerWidth {
    #[default]
    U32,
    U64,
}

impl PointerWidth {
    /// Size of the slot in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            PointerWidth::U32 => 4,
            PointerWidth::U64 => 8,
        }
    }

    /// Largest value the slot can hold.
    #[inline]
    pub const fn max_value(self) -> u64 {
        match self {
            PointerWidth::U32 => u32::MAX as u64,
            PointerWidth::U64 => u64::MAX,
        }
    }
}

/// How string pointer slots address the string table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringPointerMode {
    /// Slots hold the absolute file position of the text.
    #[default]
    Absolute,
    /// Slots hold the offset of the text inside the table; readers add the
    /// table position themselves.
    TableRelative,
}

/// Configuration for a reader or writer session.
///
/// Each codec builds one of these for its format; the defaults describe a
/// little-endian file with 4-byte absolute pointers and no alignment.
///
/// ```
/// use kiln_codec::{PointerWidth, SessionOptions};
/// use kiln_common::Endian;
///
/// let options = SessionOptions::default()
///     .with_endian(Endian::Big)
///     .with_pointer_width(PointerWidth::U64)
///     .with_alignment(16);
/// assert_eq!(options.alignment, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionOptions {
    /// Byte order of every scalar.
    pub endian: Endian,
    /// Default width for pointer slots.
    pub pointer_width: PointerWidth,
    /// Constant added to absolute jump targets (and removed from written
    /// pointers) to skip a header excluded from logical zero.
    pub generic_offset: i64,
    /// Final file alignment applied by `finish`.
    pub alignment: usize,
    /// Addressing used by string pointer slots.
    pub string_mode: StringPointerMode,
    /// Whether string slots are shifted by the generic offset.
    pub string_generic: bool,
    /// Record the position of every pointer slot written.
    pub track_relocations: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            pointer_width: PointerWidth::U32,
            generic_offset: 0,
            alignment: 1,
            string_mode: StringPointerMode::Absolute,
            string_generic: false,
            track_relocations: false,
        }
    }
}

impl SessionOptions {
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_pointer_width(mut self, width: PointerWidth) -> Self {
        self.pointer_width = width;
        self
    }

    pub fn with_generic_offset(mut self, offset: i64) -> Self {
        self.generic_offset = offset;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_string_mode(mut self, mode: StringPointerMode) -> Self {
        self.string_mode = mode;
        self
    }

    pub fn with_string_generic(mut self, enabled: bool) -> Self {
        self.string_generic = enabled;
        self
    }

    pub fn with_relocations(mut self, enabled: bool) -> Self {
        self.track_relocations = enabled;
        self
    }
}
