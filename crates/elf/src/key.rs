//! Lookup keys for names and section contents.

use crate::Shdr;

/// What a lookup is keyed on: either a bare number, or a section header whose relevant field
/// provides the number.
///
/// For name lookups the number is an offset into the section header string table, and a
/// section header contributes its `name` field. For data lookups the number is a file offset,
/// and a section header contributes its `offset` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetKey<'k> {
    /// A raw offset.
    Offset(u64),
    /// A section header.
    Section(&'k Shdr),
}

impl OffsetKey<'_> {
    /// The offset to look up in a string table.
    pub(crate) fn name_offset(self) -> u64 {
        match self {
            Self::Offset(offset) => offset,
            Self::Section(shdr) => u64::from(shdr.name),
        }
    }

    /// The offset to look up among the sections of the file.
    pub(crate) fn file_offset(self) -> u64 {
        match self {
            Self::Offset(offset) => offset,
            Self::Section(shdr) => shdr.offset,
        }
    }
}

impl From<u64> for OffsetKey<'_> {
    #[inline]
    fn from(offset: u64) -> Self {
        Self::Offset(offset)
    }
}

impl<'k> From<&'k Shdr> for OffsetKey<'k> {
    #[inline]
    fn from(shdr: &'k Shdr) -> Self {
        Self::Section(shdr)
    }
}
