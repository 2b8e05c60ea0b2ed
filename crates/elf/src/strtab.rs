//! String table lookups.

use crate::{ByteSource, Elf, Error, OffsetKey, Shdr, ShdrType, SHN_UNDEF};

/// How many bytes are read at once while looking for the end of a string.
const SCAN_CHUNK: usize = 64;

impl<'a, S: ByteSource + ?Sized> Elf<'a, S> {
    /// Returns the name of a section.
    ///
    /// `key` is either an offset into the section header string table, or a section header whose
    /// `name` field is used. Empty names, offsets outside of the table, and files without a
    /// section header string table all resolve to [`None`].
    pub fn section_name<'k>(
        &self,
        key: impl Into<OffsetKey<'k>>,
    ) -> Result<Option<String>, Error> {
        let index = self.shstrndx()?;
        if index == u32::from(SHN_UNDEF) {
            return Ok(None);
        }

        self.string(index, key.into().name_offset())
    }

    /// Returns the string starting at `offset` in the string table stored in section `table`.
    ///
    /// Returns [`None`] if the section does not exist, is not a string table, or holds no string
    /// at `offset`. An empty string is also reported as [`None`].
    pub fn string(&self, table: u32, offset: u64) -> Result<Option<String>, Error> {
        let Some(shdr) = self.section(table as usize)? else {
            return Ok(None);
        };

        if shdr.ty != ShdrType::STRTAB || !shdr.has_file_data() {
            log::trace!("section {table} is not a string table ({:?})", shdr.ty);
            return Ok(None);
        }

        self.scan_string(&shdr, offset)
    }

    /// Reads the null-terminated string at `offset` within `table`, never reading past the end
    /// of the section.
    fn scan_string(&self, table: &Shdr, offset: u64) -> Result<Option<String>, Error> {
        if offset >= table.size {
            return Ok(None);
        }

        let (Some(mut pos), Some(end)) = (
            table.offset.checked_add(offset),
            table.offset.checked_add(table.size),
        ) else {
            return Ok(None);
        };

        let mut text = Vec::new();
        let mut chunk = [0u8; SCAN_CHUNK];

        while pos < end {
            let n = (end - pos).min(SCAN_CHUNK as u64) as usize;
            let chunk = &mut chunk[..n];
            self.source.read_exact_at(pos, chunk)?;

            if let Some(nul) = chunk.iter().position(|&b| b == 0) {
                text.extend_from_slice(&chunk[..nul]);
                if text.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(String::from_utf8_lossy(&text).into_owned()));
            }

            text.extend_from_slice(chunk);
            pos += n as u64;
        }

        // The string runs off the end of the table.
        Ok(None)
    }
}
