use core::fmt;

use bitflags::bitflags;
use loose_enum::loose_enum;

/// The four bytes every ELF file starts with.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// The size of the identification block at the start of the file header.
pub const EI_NIDENT: usize = 16;
/// Index of the class byte within the identification block.
pub const EI_CLASS: usize = 4;
/// Index of the data encoding byte within the identification block.
pub const EI_DATA: usize = 5;
/// Index of the ELF version byte within the identification block.
pub const EI_VERSION: usize = 6;
/// Index of the OS/ABI byte within the identification block.
pub const EI_OSABI: usize = 7;
/// Index of the ABI version byte within the identification block.
pub const EI_ABIVERSION: usize = 8;
/// Index of the first padding byte within the identification block.
pub const EI_PAD: usize = 9;

/// The undefined section index. Section 0 is always the reserved NULL section.
pub const SHN_UNDEF: u16 = 0;
/// The lower bound of the range of reserved section indices.
pub const SHN_LORESERVE: u16 = 0xff00;
/// Escape value: the real section index lives in an extension field of section 0.
pub const SHN_XINDEX: u16 = 0xffff;
/// Escape value: the real program header count lives in `sh_info` of section 0.
pub const PN_XNUM: u16 = 0xffff;

/// The size of a 32-bit file header.
pub const ELF32_EHDR_SIZE: usize = 52;
/// The size of a 64-bit file header.
pub const ELF64_EHDR_SIZE: usize = 64;
/// The size of a 32-bit program header.
pub const ELF32_PHDR_SIZE: usize = 32;
/// The size of a 64-bit program header.
pub const ELF64_PHDR_SIZE: usize = 56;
/// The size of a 32-bit section header.
pub const ELF32_SHDR_SIZE: usize = 40;
/// The size of a 64-bit section header.
pub const ELF64_SHDR_SIZE: usize = 64;

loose_enum! {
    /// The class of an ELF file.
    pub struct Class: u8 {
        /// An invalid class.
        const NONE = 0 => "none";
        /// A 32-bit ELF file.
        const ELF32 = 1;
        /// A 64-bit ELF file.
        const ELF64 = 2;
    }
}

impl Class {
    /// Returns the address width of this class, in bits.
    pub fn bits(self) -> Option<u8> {
        match self {
            Self::ELF32 => Some(32),
            Self::ELF64 => Some(64),
            _ => None,
        }
    }
}

loose_enum! {
    /// The data encoding of an ELF file.
    pub struct DataEncoding: u8 {
        /// An invalid data encoding.
        const NONE = 0 => "none";
        /// Little endian, two's complement.
        const LITTLE_ENDIAN = 1 => "2's complement, little endian";
        /// Big endian, two's complement.
        const BIG_ENDIAN = 2 => "2's complement, big endian";
    }
}

impl DataEncoding {
    /// The current data encoding.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::LITTLE_ENDIAN;
    /// The current data encoding.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::BIG_ENDIAN;
}

loose_enum! {
    /// The version of ELF that a file uses.
    pub struct Version: u8 {
        /// An invalid version.
        const NONE = 0 => "0";
        /// The current version.
        const CURRENT = 1 => "1 (current)";
    }
}

loose_enum! {
    /// The operating system and ABI to which the object is targeted.
    pub struct OsAbi: u8 {
        const SYSV = 0 => "UNIX - System V";
        const HPUX = 1 => "UNIX - HP-UX";
        const NETBSD = 2 => "UNIX - NetBSD";
        const LINUX = 3 => "UNIX - GNU";
        const SOLARIS = 6 => "UNIX - Solaris";
        const AIX = 7 => "UNIX - AIX";
        const IRIX = 8 => "UNIX - IRIX";
        const FREEBSD = 9 => "UNIX - FreeBSD";
        const TRU64 = 10 => "UNIX - TRU64";
        const MODESTO = 11 => "Novell - Modesto";
        const OPENBSD = 12 => "UNIX - OpenBSD";
        const ARM_AEABI = 64 => "ARM EABI";
        const ARM = 97 => "ARM";
        const STANDALONE = 255 => "Standalone App";
    }
}

loose_enum! {
    /// The type of an ELF file.
    pub struct Type: u16 {
        /// An unknown type.
        const NONE = 0 => "NONE (None)";
        /// A relocatable file.
        const REL = 1 => "REL (Relocatable file)";
        /// An executable file.
        const EXEC = 2 => "EXEC (Executable file)";
        /// A shared object.
        const DYN = 3 => "DYN (Shared object file)";
        /// A core file.
        const CORE = 4 => "CORE (Core file)";
    }
}

loose_enum! {
    /// The required architecture of an ELF file.
    pub struct Machine: u16 {
        /// An unknown architecture.
        const NONE = 0 => "None";
        const M32 = 1 => "WE32100";
        const SPARC = 2 => "Sparc";
        const X86 = 3 => "Intel 80386";
        const M68K = 4 => "MC68000";
        const M88K = 5 => "MC88000";
        const MIPS = 8 => "MIPS R3000";
        const PARISC = 15 => "HPPA";
        const SPARC32PLUS = 18 => "Sparc v8+";
        const PPC = 20 => "PowerPC";
        const PPC64 = 21 => "PowerPC64";
        const S390 = 22 => "IBM S/390";
        const ARM = 40 => "ARM";
        const SH = 42 => "Renesas / SuperH SH";
        const SPARCV9 = 43 => "Sparc v9";
        const IA_64 = 50 => "Intel IA-64";
        /// The x86_64 architecture.
        const X86_64 = 0x3e => "Advanced Micro Devices X86-64";
        const AARCH64 = 183 => "AArch64";
        const RISCV = 243 => "RISC-V";
        const BPF = 247 => "Linux BPF";
        const LOONGARCH = 258 => "LoongArch";
    }
}

/// The header of an ELF file.
///
/// This is a decoded copy: the fields are in host byte order and widened to 64 bits regardless
/// of the class of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ehdr {
    /// An array of bytes that describe how to interpret the file.
    pub magic: [u8; 4],
    /// The class of the ELF file.
    pub class: Class,
    /// The data encoding used by the ELF file.
    pub data_encoding: DataEncoding,
    /// The version of ELF that the file uses.
    pub elf_version: Version,
    /// The operating system and ABI to which the object is targeted.
    pub os_abi: OsAbi,
    /// The version of the above ABI.
    pub abi_version: u8,

    /// The remaining bytes of the identification block. Normally zero.
    pub padding: [u8; 7],

    /// The type of the ELF file.
    pub ty: Type,
    /// The machine architecture that the file is encoded for.
    pub machine: Machine,
    /// The file version.
    pub version: u32,

    /// The virtual address of the entry point of the program.
    pub entry_point: u64,

    /// The offset of the program header table within the file.
    pub phoff: u64,
    /// The offset of the section header table within the file.
    pub shoff: u64,

    /// Some processor-specific flags.
    pub flags: u32,

    /// The size of the elf header, in bytes.
    pub ehsize: u16,

    /// The size of one entry in the program header table.
    pub phentsize: u16,
    /// The number of entries in the program header table.
    ///
    /// [`PN_XNUM`] means the real count is stored in section 0.
    pub phnum: u16,

    /// The size of one entry in the section header table.
    pub shentsize: u16,
    /// The number of entries in the section header table.
    ///
    /// Zero with a non-zero `shoff` means the real count is stored in section 0.
    pub shnum: u16,
    /// The index of the section header table entry that contains the string table.
    ///
    /// [`SHN_XINDEX`] means the real index is stored in section 0.
    pub shstrndx: u16,
}

impl Ehdr {
    /// Returns the identification block of the header, as it appears in the file.
    pub fn ident(&self) -> [u8; EI_NIDENT] {
        let mut ident = [0; EI_NIDENT];
        ident[..4].copy_from_slice(&self.magic);
        ident[EI_CLASS] = self.class.as_raw();
        ident[EI_DATA] = self.data_encoding.as_raw();
        ident[EI_VERSION] = self.elf_version.as_raw();
        ident[EI_OSABI] = self.os_abi.as_raw();
        ident[EI_ABIVERSION] = self.abi_version;
        ident[EI_PAD..].copy_from_slice(&self.padding);
        ident
    }
}

loose_enum! {
    /// The type of a program header.
    pub struct PhdrType: u32 {
        /// A null program header.
        ///
        /// The other fields should be ignored, the header is effectively unused.
        const NULL = 0;

        /// A loadable segment.
        ///
        /// If the in-memory size of the segment is larger than its in-file size, the extra bytes
        /// are zero.
        const LOAD = 1;

        /// The segment provides dynamic linker information.
        const DYNAMIC = 2;

        /// The location and size of a null-terminated path name to invoke as an interpreter.
        const INTERP = 3;

        /// The segment contains the location of notes.
        const NOTE = 4;

        /// Reserved.
        const SHLIB = 5;

        /// The segment contains the location and size of the program header table itself.
        const PHDR = 6;

        /// The thread-local storage template.
        const TLS = 7;

        /// The location of the `.eh_frame_hdr` section.
        const GNU_EH_FRAME = 0x6474e550;

        /// If present, indicates that the the stack should mapped with the given permissions.
        const GNU_STACK = 0x6474e551;

        /// If present, indicates that the the read-only relocations should be made writable.
        const GNU_RELRO = 0x6474e552;

        /// The location of the `.note.gnu.property` section.
        const GNU_PROPERTY = 0x6474e553;
    }
}

bitflags! {
    /// Describes how a segment should be accessed.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct PhdrFlags: u32 {
        /// The segment is executable.
        const EXECUTABLE = 1 << 0;
        /// The segment is writable.
        const WRITABLE = 1 << 1;
        /// The segment is readable.
        const READABLE = 1 << 2;
    }
}

impl fmt::Display for PhdrFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.contains(Self::READABLE) { 'R' } else { ' ' };
        let w = if self.contains(Self::WRITABLE) { 'W' } else { ' ' };
        let x = if self.contains(Self::EXECUTABLE) { 'E' } else { ' ' };
        write!(f, "{r}{w}{x}")
    }
}

/// A program header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phdr {
    /// The kind of the segment described by this header.
    pub ty: PhdrType,

    /// The access flags of the segment.
    pub flags: PhdrFlags,

    /// The offset of the segment within the file.
    pub offset: u64,

    /// The virtual address where the segment must be loaded in memory.
    pub vaddr: u64,
    /// The physical address where the segment must be loaded in memory.
    ///
    /// This can usually be ignored.
    pub paddr: u64,

    /// The size of the segment in the file.
    pub filesz: u64,
    /// The size of the segment in memory.
    pub memsz: u64,

    /// The alignment of the segment in memory.
    ///
    /// There is always the following constraint: `vaddr % align == offset % align`.
    pub align: u64,
}

loose_enum! {
    /// The type of a section header.
    pub struct ShdrType: u32 {
        /// An inactive section header.
        const NULL = 0;
        /// Information defined by the program.
        const PROGBITS = 1;
        /// A full symbol table.
        const SYMTAB = 2;
        /// A string table.
        const STRTAB = 3;
        /// Relocation entries with explicit addends.
        const RELA = 4;
        /// A symbol hash table.
        const HASH = 5;
        /// Dynamic linking information.
        const DYNAMIC = 6;
        /// Notes.
        const NOTE = 7;
        /// Occupies no space in the file.
        const NOBITS = 8;
        /// Relocation entries without explicit addends.
        const REL = 9;
        /// Reserved.
        const SHLIB = 10;
        /// A minimal symbol table for dynamic linking.
        const DYNSYM = 11;
        /// An array of initialization function pointers.
        const INIT_ARRAY = 14;
        /// An array of termination function pointers.
        const FINI_ARRAY = 15;
        /// An array of pre-initialization function pointers.
        const PREINIT_ARRAY = 16;
        /// A section group.
        const GROUP = 17;
        /// Extended section indices associated with a symbol table.
        const SYMTAB_SHNDX = 18;
        /// Object attributes.
        const GNU_ATTRIBUTES = 0x6ffffff5;
        /// The GNU-style symbol hash table.
        const GNU_HASH = 0x6ffffff6;
        /// Version definitions.
        const GNU_VERDEF = 0x6ffffffd => "VERDEF";
        /// Version requirements.
        const GNU_VERNEED = 0x6ffffffe => "VERNEED";
        /// The symbol version table.
        const GNU_VERSYM = 0x6fffffff => "VERSYM";
    }
}

bitflags! {
    /// Attributes of a section.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct ShdrFlags: u64 {
        /// The section contains writable data.
        const WRITE = 0x1;
        /// The section occupies memory during execution.
        const ALLOC = 0x2;
        /// The section contains executable instructions.
        const EXECINSTR = 0x4;
        /// The data in the section may be merged to eliminate duplication.
        const MERGE = 0x10;
        /// The section consists of null-terminated strings.
        const STRINGS = 0x20;
        /// `sh_info` holds a section index.
        const INFO_LINK = 0x40;
        /// Ordering requirements must be preserved when linking.
        const LINK_ORDER = 0x80;
        /// OS-specific processing is required.
        const OS_NONCONFORMING = 0x100;
        /// The section is a member of a section group.
        const GROUP = 0x200;
        /// The section holds thread-local storage.
        const TLS = 0x400;
        /// The section holds compressed data.
        const COMPRESSED = 0x800;
        /// OS-specific bits.
        const MASKOS = 0x0ff0_0000;
        /// Processor-specific bits.
        const MASKPROC = 0xf000_0000;
    }
}

impl fmt::Display for ShdrFlags {
    /// Writes the flags using the letters of the usual flag key (`WAX`, ...).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [(ShdrFlags, char); 11] = [
            (ShdrFlags::WRITE, 'W'),
            (ShdrFlags::ALLOC, 'A'),
            (ShdrFlags::EXECINSTR, 'X'),
            (ShdrFlags::MERGE, 'M'),
            (ShdrFlags::STRINGS, 'S'),
            (ShdrFlags::INFO_LINK, 'I'),
            (ShdrFlags::LINK_ORDER, 'L'),
            (ShdrFlags::OS_NONCONFORMING, 'O'),
            (ShdrFlags::GROUP, 'G'),
            (ShdrFlags::TLS, 'T'),
            (ShdrFlags::COMPRESSED, 'C'),
        ];

        for (flag, letter) in LETTERS {
            if self.contains(flag) {
                fmt::Write::write_char(f, letter)?;
            }
        }

        if self.intersects(Self::MASKOS) {
            f.write_str("o")?;
        }
        if self.intersects(Self::MASKPROC) {
            f.write_str("p")?;
        }
        if self.bits() & !Self::all().bits() != 0 {
            f.write_str("x")?;
        }

        Ok(())
    }
}

/// A section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shdr {
    /// The offset of the name of the section within the section header string table.
    pub name: u32,
    /// The kind of the section.
    pub ty: ShdrType,
    /// The attributes of the section.
    pub flags: ShdrFlags,
    /// The address of the section in memory, if it is loaded.
    pub addr: u64,
    /// The offset of the section within the file.
    pub offset: u64,
    /// The size of the section, in bytes.
    pub size: u64,
    /// A section index whose interpretation depends on the type of the section.
    pub link: u32,
    /// Extra information whose interpretation depends on the type of the section.
    pub info: u32,
    /// The required alignment of the section.
    pub addralign: u64,
    /// The size of one entry, for sections that hold a table of fixed-size entries.
    pub entsize: u64,
}

impl Shdr {
    /// Returns whether the section has bytes stored in the file.
    #[inline]
    pub fn has_file_data(&self) -> bool {
        self.ty != ShdrType::NOBITS && self.size != 0 && self.offset != 0
    }
}
