//! Access to the contents of sections.

use std::io;

use crate::translate::translate;
use crate::{ByteSource, Elf, Error, OffsetKey, Shdr, ShdrType};

/// Whether section contents are exactly as stored, or have been converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// The bytes are exactly as stored in the file.
    Raw,
    /// The multi-byte fields of the section's entries have been converted to the host byte
    /// order.
    Translated,
}

/// An owned copy of the contents of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionData {
    representation: Representation,
    section_type: ShdrType,
    bytes: Vec<u8>,
}

impl SectionData {
    /// Whether the bytes are raw or translated.
    #[inline]
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// The type of the section the bytes were read from.
    #[inline]
    pub fn section_type(&self) -> ShdrType {
        self.section_type
    }

    /// The contents of the section.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Takes ownership of the contents of the section.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The number of bytes in the section.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the section holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for SectionData {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<'a, S: ByteSource + ?Sized> Elf<'a, S> {
    /// Returns the first section, in table order, whose contents start at `offset` in the file.
    ///
    /// Sections with no bytes in the file (empty, at offset zero, or `NOBITS`) never match.
    pub fn section_at(&self, offset: u64) -> Result<Option<Shdr>, Error> {
        if offset == 0 {
            return Ok(None);
        }

        let found = self
            .section_headers()?
            .into_iter()
            .find(|shdr| shdr.has_file_data() && shdr.offset == offset);

        if found.is_none() {
            log::trace!("no section starts at file offset {offset:#x}");
        }

        Ok(found)
    }

    fn read_section(&self, shdr: &Shdr) -> Result<Vec<u8>, Error> {
        let size = usize::try_from(shdr.size)
            .map_err(|_| Error::Malformed("section does not fit in memory"))?;

        let end = shdr
            .offset
            .checked_add(shdr.size)
            .ok_or(Error::Malformed("section extends past the addressable range"))?;
        if self.source.len_hint().is_some_and(|len| end > len) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "section extends past the end of the file",
            )));
        }

        let mut bytes = vec![0; size];
        self.source.read_exact_at(shdr.offset, &mut bytes)?;
        Ok(bytes)
    }

    /// Returns the contents of the section found at `key`, exactly as they are stored.
    ///
    /// `key` is either a file offset, or a section header whose `offset` field is used. Returns
    /// [`None`] when no section with contents in the file starts at that offset.
    pub fn raw_data<'k>(
        &self,
        key: impl Into<OffsetKey<'k>>,
    ) -> Result<Option<SectionData>, Error> {
        let Some(shdr) = self.section_at(key.into().file_offset())? else {
            return Ok(None);
        };

        Ok(Some(SectionData {
            representation: Representation::Raw,
            section_type: shdr.ty,
            bytes: self.read_section(&shdr)?,
        }))
    }

    /// Returns the contents of the section found at `key`, with every multi-byte field of its
    /// entries converted to the host byte order.
    ///
    /// Which fields are converted depends on the type of the section (symbols, relocations,
    /// dynamic entries, hash tables, notes, ...). Sections that are plain bytes come back
    /// unchanged, and so does everything when the file already uses the host byte order.
    pub fn translated_data<'k>(
        &self,
        key: impl Into<OffsetKey<'k>>,
    ) -> Result<Option<SectionData>, Error> {
        let layout = self.layout()?;
        let Some(shdr) = self.section_at(key.into().file_offset())? else {
            return Ok(None);
        };

        let mut bytes = self.read_section(&shdr)?;
        translate(&shdr, layout, &mut bytes);

        Ok(Some(SectionData {
            representation: Representation::Translated,
            section_type: shdr.ty,
            bytes,
        }))
    }
}
