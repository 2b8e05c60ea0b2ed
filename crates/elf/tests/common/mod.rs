//! Builds small ELF files in memory for the integration tests.

#![allow(dead_code)]

use elf::{
    Class, DataEncoding, Ehdr, Layout, Machine, OsAbi, Phdr, Shdr, ShdrFlags, ShdrType, Type,
    Version, ELF_MAGIC, PN_XNUM, SHN_XINDEX,
};

struct Section {
    name: &'static str,
    ty: ShdrType,
    flags: ShdrFlags,
    data: Vec<u8>,
    /// For `NOBITS` sections, the size announced in the header.
    nobits_size: Option<u64>,
    link: u32,
    entsize: u64,
}

/// An ELF file under construction.
///
/// Sections are laid out right after the file header and the program headers, in the order
/// they are added, with no padding. The section header string table comes last, then the section
/// header table.
pub struct ObjectBuilder {
    layout: Layout,
    ty: Type,
    machine: Machine,
    sections: Vec<Section>,
    segments: Vec<Phdr>,
    extended_numbering: bool,
}

/// A built file.
pub struct Object {
    pub bytes: Vec<u8>,
    /// File offset of every added section, in the order they were added.
    pub offsets: Vec<u64>,
    /// Name offset of every added section, in the order they were added.
    pub names: Vec<u32>,
    /// Offset of the section header table.
    pub shoff: u64,
    /// Index of the section header string table.
    pub shstrndx: usize,
}

impl ObjectBuilder {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ty: Type::REL,
            machine: Machine::X86_64,
            sections: Vec::new(),
            segments: Vec::new(),
            extended_numbering: false,
        }
    }

    pub fn ty(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    pub fn machine(mut self, machine: Machine) -> Self {
        self.machine = machine;
        self
    }

    pub fn section(self, name: &'static str, ty: ShdrType, data: impl Into<Vec<u8>>) -> Self {
        self.section_with(name, ty, ShdrFlags::empty(), 0, 0, data)
    }

    pub fn section_with(
        mut self,
        name: &'static str,
        ty: ShdrType,
        flags: ShdrFlags,
        link: u32,
        entsize: u64,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.sections.push(Section {
            name,
            ty,
            flags,
            data: data.into(),
            nobits_size: None,
            link,
            entsize,
        });
        self
    }

    pub fn nobits(mut self, name: &'static str, size: u64) -> Self {
        self.sections.push(Section {
            name,
            ty: ShdrType::NOBITS,
            flags: ShdrFlags::ALLOC | ShdrFlags::WRITE,
            data: Vec::new(),
            nobits_size: Some(size),
            link: 0,
            entsize: 0,
        });
        self
    }

    pub fn segment(mut self, phdr: Phdr) -> Self {
        self.segments.push(phdr);
        self
    }

    /// Stores the section count, the string table index and the segment count in section 0.
    pub fn extended_numbering(mut self) -> Self {
        self.extended_numbering = true;
        self
    }

    pub fn build(self) -> Object {
        let layout = self.layout;
        let phoff = if self.segments.is_empty() {
            0
        } else {
            layout.ehdr_size() as u64
        };

        let mut bytes = vec![0u8; layout.ehdr_size()];
        for phdr in &self.segments {
            bytes.extend(phdr.encode(layout).unwrap());
        }

        let mut shstrtab = vec![0u8];
        let mut names = Vec::new();
        let mut offsets = Vec::new();
        let mut headers = vec![Shdr {
            name: 0,
            ty: ShdrType::NULL,
            flags: ShdrFlags::empty(),
            addr: 0,
            offset: 0,
            size: 0,
            link: 0,
            info: 0,
            addralign: 0,
            entsize: 0,
        }];

        for section in &self.sections {
            let name = shstrtab.len() as u32;
            shstrtab.extend_from_slice(section.name.as_bytes());
            shstrtab.push(0);

            let offset = bytes.len() as u64;
            bytes.extend_from_slice(&section.data);

            names.push(name);
            offsets.push(offset);
            headers.push(Shdr {
                name,
                ty: section.ty,
                flags: section.flags,
                addr: 0,
                offset,
                size: section.nobits_size.unwrap_or(section.data.len() as u64),
                link: section.link,
                info: 0,
                addralign: 1,
                entsize: section.entsize,
            });
        }

        let shstrndx = headers.len();
        let name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");
        headers.push(Shdr {
            name,
            ty: ShdrType::STRTAB,
            flags: ShdrFlags::empty(),
            addr: 0,
            offset: bytes.len() as u64,
            size: shstrtab.len() as u64,
            link: 0,
            info: 0,
            addralign: 1,
            entsize: 0,
        });
        bytes.extend_from_slice(&shstrtab);

        while bytes.len() % 8 != 0 {
            bytes.push(0);
        }
        let shoff = bytes.len() as u64;

        let (shnum, shstrndx_field, phnum) = if self.extended_numbering {
            headers[0].size = headers.len() as u64;
            headers[0].link = shstrndx as u32;
            headers[0].info = self.segments.len() as u32;
            (0, SHN_XINDEX, if self.segments.is_empty() { 0 } else { PN_XNUM })
        } else {
            (
                headers.len() as u16,
                shstrndx as u16,
                self.segments.len() as u16,
            )
        };

        for shdr in &headers {
            bytes.extend(shdr.encode(layout).unwrap());
        }

        let ehdr = Ehdr {
            magic: ELF_MAGIC,
            class: layout.class(),
            data_encoding: layout.encoding(),
            elf_version: Version::CURRENT,
            os_abi: OsAbi::SYSV,
            abi_version: 0,
            padding: [0; 7],
            ty: self.ty,
            machine: self.machine,
            version: 1,
            entry_point: 0,
            phoff,
            shoff,
            flags: 0,
            ehsize: layout.ehdr_size() as u16,
            phentsize: layout.phdr_size() as u16,
            phnum,
            shentsize: layout.shdr_size() as u16,
            shnum,
            shstrndx: shstrndx_field,
        };
        bytes[..layout.ehdr_size()].copy_from_slice(&ehdr.encode().unwrap());

        Object {
            bytes,
            offsets,
            names,
            shoff,
            shstrndx,
        }
    }
}

/// Every combination of class and data encoding.
pub fn all_layouts() -> [Layout; 4] {
    [
        Layout::ELF32_LE,
        Layout::ELF32_BE,
        Layout::ELF64_LE,
        Layout::ELF64_BE,
    ]
}

/// The layout of `class` whose byte order is not the host's.
pub fn foreign_layout(class: Class) -> Layout {
    let encoding = if DataEncoding::NATIVE == DataEncoding::LITTLE_ENDIAN {
        DataEncoding::BIG_ENDIAN
    } else {
        DataEncoding::LITTLE_ENDIAN
    };
    Layout::new(class, encoding).unwrap()
}
