//! Byte order selection.

/// Byte order of scalar fields in a format.
///
/// Most formats are little-endian; some transform and motion formats force
/// big-endian regardless of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Whether this is little-endian.
    #[inline]
    pub const fn is_little(self) -> bool {
        matches!(self, Endian::Little)
    }
}
