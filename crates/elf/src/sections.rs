//! The section header table.

use crate::codec::{Layout, Reader, Writer};
use crate::table::Table;
use crate::{ByteSource, Elf, Error, Shdr, ShdrFlags, ShdrType, SHN_XINDEX};

impl Shdr {
    /// Decodes a section header. `bytes` must hold at least `layout.shdr_size()` bytes.
    pub fn decode(layout: Layout, bytes: &[u8]) -> Self {
        let mut r = Reader::new(layout, bytes);

        Self {
            name: r.u32(),
            ty: ShdrType::from_raw(r.u32()),
            flags: ShdrFlags::from_bits_retain(r.word()),
            addr: r.word(),
            offset: r.word(),
            size: r.word(),
            link: r.u32(),
            info: r.u32(),
            addralign: r.word(),
            entsize: r.word(),
        }
    }

    /// Encodes the section header with the provided layout.
    pub fn encode(&self, layout: Layout) -> Result<Vec<u8>, Error> {
        let mut out = vec![0; layout.shdr_size()];
        let mut w = Writer::new(layout, &mut out);

        w.u32(self.name);
        w.u32(self.ty.as_raw());
        w.word(self.flags.bits())?;
        w.word(self.addr)?;
        w.word(self.offset)?;
        w.word(self.size)?;
        w.u32(self.link);
        w.u32(self.info);
        w.word(self.addralign)?;
        w.word(self.entsize)?;

        Ok(out)
    }
}

const SHENTSIZE_TOO_SMALL: &str = "e_shentsize is smaller than a section header";

impl<'a, S: ByteSource + ?Sized> Elf<'a, S> {
    /// Reads section 0, which holds the extended counts and indices, if the file has a section
    /// header table at all.
    pub(crate) fn first_section(&self) -> Result<Option<Shdr>, Error> {
        let hdr = self.header()?;
        if hdr.shoff == 0 {
            return Ok(None);
        }

        let layout = self.layout()?;
        let table = Table::new(
            hdr.shoff,
            hdr.shentsize,
            layout.shdr_size(),
            1,
            SHENTSIZE_TOO_SMALL,
        )?;
        table.read(self.source, 0, |b| Shdr::decode(layout, b)).map(Some)
    }

    /// Returns the number of sections.
    ///
    /// When the header field is zero while a section header table exists, the real count is read
    /// from the `size` field of section 0.
    pub fn section_count(&self) -> Result<usize, Error> {
        let hdr = self.header()?;
        if hdr.shnum != 0 {
            return Ok(usize::from(hdr.shnum));
        }

        match self.first_section()? {
            Some(first) => usize::try_from(first.size)
                .map_err(|_| Error::Malformed("section count does not fit in memory")),
            None => Ok(0),
        }
    }

    /// Returns the index of the section holding the section names.
    ///
    /// When the header field holds [`SHN_XINDEX`], the real index is read from the `link` field
    /// of section 0.
    pub fn shstrndx(&self) -> Result<u32, Error> {
        let hdr = self.header()?;
        if hdr.shstrndx != SHN_XINDEX {
            return Ok(u32::from(hdr.shstrndx));
        }

        Ok(self.first_section()?.map_or(0, |first| first.link))
    }

    fn section_header_table(&self) -> Result<Table, Error> {
        let hdr = self.header()?;
        let layout = self.layout()?;
        Table::new(
            hdr.shoff,
            hdr.shentsize,
            layout.shdr_size(),
            self.section_count()?,
            SHENTSIZE_TOO_SMALL,
        )
    }

    /// Returns the section header at `index`, or [`None`] if there is no such section.
    pub fn section(&self, index: usize) -> Result<Option<Shdr>, Error> {
        let layout = self.layout()?;
        let table = self.section_header_table()?;
        if index >= table.count() {
            return Ok(None);
        }

        table.read(self.source, index, |b| Shdr::decode(layout, b)).map(Some)
    }

    /// Returns the section headers of the file, indexed by section index.
    ///
    /// Either every header is decoded, or an error is returned.
    pub fn section_headers(&self) -> Result<Vec<Shdr>, Error> {
        let layout = self.layout()?;
        let table = self.section_header_table()?;

        log::trace!("reading {} section headers", table.count());

        table.read_all(self.source, |b| Shdr::decode(layout, b))
    }
}
