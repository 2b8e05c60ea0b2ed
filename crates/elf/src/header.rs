//! The identification block and the file header.

use std::io;

use crate::codec::{Layout, Reader, Writer};
use crate::{
    Class, DataEncoding, Ehdr, Error, Machine, OsAbi, Type, Version, EI_CLASS, EI_DATA, EI_NIDENT,
    ELF_MAGIC,
};

fn truncated() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "the file is too small to hold an ELF header",
    ))
}

/// Returns whether the provided bytes start with the ELF magic.
#[inline]
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&ELF_MAGIC)
}

/// Checks the identification block and returns the class and data encoding it announces.
///
/// An unknown class is an error. An unknown data encoding is returned as is: it only becomes an
/// error once a multi-byte field has to be decoded.
pub(crate) fn check_ident(ident: &[u8; EI_NIDENT]) -> Result<(Class, DataEncoding), Error> {
    if !has_magic(ident) {
        return Err(Error::NotElf);
    }

    let class = Class::from_raw(ident[EI_CLASS]);
    if class.bits().is_none() {
        return Err(Error::UndeterminedFormat("class"));
    }

    Ok((class, DataEncoding::from_raw(ident[EI_DATA])))
}

impl Ehdr {
    /// Decodes a file header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < ELF_MAGIC.len() || !has_magic(bytes) {
            return Err(Error::NotElf);
        }

        let ident: &[u8; EI_NIDENT] = bytes
            .get(..EI_NIDENT)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(truncated)?;
        let (class, encoding) = check_ident(ident)?;
        let layout = Layout::new(class, encoding)?;

        let bytes = bytes.get(..layout.ehdr_size()).ok_or_else(truncated)?;
        Ok(Self::decode_with(layout, bytes))
    }

    /// Decodes a header whose identification block has already been validated.
    ///
    /// `bytes` must hold at least `layout.ehdr_size()` bytes.
    pub(crate) fn decode_with(layout: Layout, bytes: &[u8]) -> Self {
        let mut r = Reader::new(layout, bytes);

        Self {
            magic: r.bytes(),
            class: Class::from_raw(r.u8()),
            data_encoding: DataEncoding::from_raw(r.u8()),
            elf_version: Version::from_raw(r.u8()),
            os_abi: OsAbi::from_raw(r.u8()),
            abi_version: r.u8(),
            padding: r.bytes(),
            ty: Type::from_raw(r.u16()),
            machine: Machine::from_raw(r.u16()),
            version: r.u32(),
            entry_point: r.word(),
            phoff: r.word(),
            shoff: r.word(),
            flags: r.u32(),
            ehsize: r.u16(),
            phentsize: r.u16(),
            phnum: r.u16(),
            shentsize: r.u16(),
            shnum: r.u16(),
            shstrndx: r.u16(),
        }
    }

    /// Encodes the header using its own class and data encoding.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let layout = Layout::new(self.class, self.data_encoding)?;
        let mut out = vec![0; layout.ehdr_size()];
        let mut w = Writer::new(layout, &mut out);

        w.bytes(&self.ident());
        w.u16(self.ty.as_raw());
        w.u16(self.machine.as_raw());
        w.u32(self.version);
        w.word(self.entry_point)?;
        w.word(self.phoff)?;
        w.word(self.shoff)?;
        w.u32(self.flags);
        w.u16(self.ehsize);
        w.u16(self.phentsize);
        w.u16(self.phnum);
        w.u16(self.shentsize);
        w.u16(self.shnum);
        w.u16(self.shstrndx);

        Ok(out)
    }
}
