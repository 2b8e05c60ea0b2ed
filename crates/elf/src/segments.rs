//! The program header table.

use crate::codec::{Layout, Reader, Writer};
use crate::table::Table;
use crate::{ByteSource, Elf, Error, Phdr, PhdrFlags, PhdrType, PN_XNUM};

impl Phdr {
    /// Decodes a program header. `bytes` must hold at least `layout.phdr_size()` bytes.
    pub fn decode(layout: Layout, bytes: &[u8]) -> Self {
        let mut r = Reader::new(layout, bytes);
        let ty = PhdrType::from_raw(r.u32());

        if layout.word_size() == 8 {
            Self {
                ty,
                flags: PhdrFlags::from_bits_retain(r.u32()),
                offset: r.word(),
                vaddr: r.word(),
                paddr: r.word(),
                filesz: r.word(),
                memsz: r.word(),
                align: r.word(),
            }
        } else {
            // The flags moved after the sizes in the 32-bit layout.
            let offset = r.word();
            let vaddr = r.word();
            let paddr = r.word();
            let filesz = r.word();
            let memsz = r.word();
            let flags = PhdrFlags::from_bits_retain(r.u32());
            let align = r.word();
            Self {
                ty,
                flags,
                offset,
                vaddr,
                paddr,
                filesz,
                memsz,
                align,
            }
        }
    }

    /// Encodes the program header with the provided layout.
    pub fn encode(&self, layout: Layout) -> Result<Vec<u8>, Error> {
        let mut out = vec![0; layout.phdr_size()];
        let mut w = Writer::new(layout, &mut out);

        w.u32(self.ty.as_raw());
        if layout.word_size() == 8 {
            w.u32(self.flags.bits());
        }
        w.word(self.offset)?;
        w.word(self.vaddr)?;
        w.word(self.paddr)?;
        w.word(self.filesz)?;
        w.word(self.memsz)?;
        if layout.word_size() == 4 {
            w.u32(self.flags.bits());
        }
        w.word(self.align)?;

        Ok(out)
    }
}

impl<'a, S: ByteSource + ?Sized> Elf<'a, S> {
    /// Returns the number of program headers.
    ///
    /// When the header field holds [`PN_XNUM`], the real count is read from the `info` field of
    /// section 0.
    pub fn program_header_count(&self) -> Result<usize, Error> {
        let hdr = self.header()?;

        if hdr.phnum == PN_XNUM {
            if let Some(first) = self.first_section()? {
                return Ok(first.info as usize);
            }
        }

        Ok(usize::from(hdr.phnum))
    }

    fn program_header_table(&self) -> Result<Table, Error> {
        let hdr = self.header()?;
        let layout = self.layout()?;
        Table::new(
            hdr.phoff,
            hdr.phentsize,
            layout.phdr_size(),
            self.program_header_count()?,
            "e_phentsize is smaller than a program header",
        )
    }

    /// Returns the program headers of the file, in the order they are stored.
    ///
    /// Either every header is decoded, or an error is returned.
    pub fn program_headers(&self) -> Result<Vec<Phdr>, Error> {
        let layout = self.layout()?;
        let table = self.program_header_table()?;

        log::trace!("reading {} program headers", table.count());

        table.read_all(self.source, |b| Phdr::decode(layout, b))
    }
}
