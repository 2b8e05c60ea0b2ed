//! A read-only ELF parser.
//!
//! The entry point is [`Elf::open`], which validates the identification block of a
//! [`ByteSource`] and decodes its file header. Every other table (program headers, section
//! headers, string tables, section contents) is read on demand, every time it is requested.
//!
//! ```no_run
//! # fn main() -> Result<(), elf::Error> {
//! let bytes = std::fs::read("/proc/self/exe")?;
//! let file = elf::Elf::open(&bytes[..])?;
//!
//! for shdr in file.section_headers()? {
//!     let name = file.section_name(&shdr)?;
//!     println!("{:<20} {:?}", name.as_deref().unwrap_or(""), shdr.ty);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Everything returned by the parser is an owned copy: headers, names and section contents all
//! outlive the [`Elf`] handle they were read from.

mod abi;
mod codec;
mod data;
mod error;
mod header;
mod key;
mod sections;
mod segments;
mod source;
mod strtab;
mod table;
mod translate;

pub use self::abi::*;
pub use self::codec::Layout;
pub use self::data::{Representation, SectionData};
pub use self::error::*;
pub use self::header::has_magic;
pub use self::key::OffsetKey;
pub use self::source::{ByteSource, SeekSource};

/// A parsable ELF file.
///
/// The handle borrows its [`ByteSource`]; it never opens nor closes it.
pub struct Elf<'a, S: ?Sized> {
    /// Where the bytes of the file come from.
    source: &'a S,
    /// The identification block, as read from the file.
    ident: [u8; EI_NIDENT],
    /// The class announced by the identification block. Always known.
    class: Class,
    /// The data encoding announced by the identification block. May be unknown.
    encoding: DataEncoding,
    /// The decoded file header, if the data encoding is known.
    header: Option<Ehdr>,
}

impl<'a, S: ?Sized> Clone for Elf<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: ?Sized> Copy for Elf<'a, S> {}

impl<'a, S: ?Sized> core::fmt::Debug for Elf<'a, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Elf")
            .field("class", &self.class)
            .field("encoding", &self.encoding)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl<'a, S: ByteSource + ?Sized> Elf<'a, S> {
    /// Validates the identification block of `source` and decodes its file header.
    ///
    /// Fails with [`Error::NotElf`] if the magic is missing (nothing else is read in that case)
    /// and with [`Error::UndeterminedFormat`] if the class is neither 32 nor 64 bit. An unknown
    /// data encoding does not make this function fail, but every operation that needs to decode
    /// a multi-byte field will.
    pub fn open(source: &'a S) -> Result<Self, Error> {
        let mut magic = [0; 4];
        match source.read_exact_at(0, &mut magic) {
            Ok(()) if magic == ELF_MAGIC => (),
            Ok(()) => return Err(Error::NotElf),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Error::NotElf)
            }
            Err(err) => return Err(Error::Io(err)),
        }

        let mut ident = [0; EI_NIDENT];
        source.read_exact_at(0, &mut ident)?;
        let (class, encoding) = header::check_ident(&ident)?;

        let header = match Layout::new(class, encoding) {
            Ok(layout) => {
                let mut buf = [0; ELF64_EHDR_SIZE];
                let buf = &mut buf[..layout.ehdr_size()];
                source.read_exact_at(0, buf)?;
                Some(Ehdr::decode_with(layout, buf))
            }
            Err(_) => {
                log::warn!(
                    "unknown ELF data encoding {:#x}, multi-byte fields cannot be decoded",
                    encoding.as_raw()
                );
                None
            }
        };

        log::debug!(
            "opened an ELF file: class={:?}, encoding={:?}, type={:?}",
            class,
            encoding,
            header.map(|h| h.ty),
        );

        Ok(Self {
            source,
            ident,
            class,
            encoding,
            header,
        })
    }

    /// Returns the byte source this handle reads from.
    #[inline]
    pub fn source(&self) -> &'a S {
        self.source
    }
}

impl<'a, S: ?Sized> Elf<'a, S> {
    /// Returns the layout of the multi-byte fields of the file.
    #[inline]
    pub fn layout(&self) -> Result<Layout, Error> {
        Layout::new(self.class, self.encoding)
    }

    /// Returns the decoded file header.
    ///
    /// Fails if the data encoding of the file is unknown.
    #[inline]
    pub fn header(&self) -> Result<Ehdr, Error> {
        self.header.ok_or(Error::UndeterminedFormat("data encoding"))
    }

    /// Returns the identification block of the file, as it is stored.
    #[inline]
    pub fn ident(&self) -> [u8; EI_NIDENT] {
        self.ident
    }

    /// Returns the class of the file.
    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the width of addresses in the file, in bits.
    pub fn bits(&self) -> Result<u8, Error> {
        self.class.bits().ok_or(Error::UndeterminedFormat("class"))
    }

    /// Returns the data encoding of the file. It may be unknown.
    #[inline]
    pub fn data_encoding(&self) -> DataEncoding {
        self.encoding
    }

    /// Returns the ELF version found in the identification block.
    #[inline]
    pub fn version(&self) -> Version {
        Version::from_raw(self.ident[EI_VERSION])
    }

    /// Returns the operating system and ABI the file targets.
    #[inline]
    pub fn os_abi(&self) -> OsAbi {
        OsAbi::from_raw(self.ident[EI_OSABI])
    }

    /// Returns the version of the ABI the file targets.
    #[inline]
    pub fn abi_version(&self) -> u8 {
        self.ident[EI_ABIVERSION]
    }

    /// Returns the type of the file (relocatable, executable, shared object, core).
    pub fn kind(&self) -> Result<Type, Error> {
        self.header().map(|h| h.ty)
    }

    /// Returns the architecture the file is built for.
    pub fn machine(&self) -> Result<Machine, Error> {
        self.header().map(|h| h.machine)
    }

    /// Returns the virtual address of the entry point, or 0 if there is none.
    pub fn entry_point(&self) -> Result<u64, Error> {
        self.header().map(|h| h.entry_point)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn minimal(layout: Layout) -> Vec<u8> {
        let ehdr = Ehdr {
            magic: ELF_MAGIC,
            class: layout.class(),
            data_encoding: layout.encoding(),
            elf_version: Version::CURRENT,
            os_abi: OsAbi::SYSV,
            abi_version: 0,
            padding: [0; 7],
            ty: Type::EXEC,
            machine: Machine::RISCV,
            version: 1,
            entry_point: 0x8000_0000,
            phoff: 0,
            shoff: 0,
            flags: 0,
            ehsize: layout.ehdr_size() as u16,
            phentsize: layout.phdr_size() as u16,
            phnum: 0,
            shentsize: layout.shdr_size() as u16,
            shnum: 0,
            shstrndx: 0,
        };
        ehdr.encode().unwrap()
    }

    /// A byte source that records how many reads were made.
    struct Counting<'b> {
        bytes: &'b [u8],
        reads: std::cell::Cell<usize>,
    }

    impl ByteSource for Counting<'_> {
        fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
            self.reads.set(self.reads.get() + 1);
            self.bytes.read_exact_at(offset, buf)
        }
    }

    #[test]
    fn every_class_and_encoding() {
        let cases = [
            (Layout::ELF32_LE, 32, DataEncoding::LITTLE_ENDIAN),
            (Layout::ELF32_BE, 32, DataEncoding::BIG_ENDIAN),
            (Layout::ELF64_LE, 64, DataEncoding::LITTLE_ENDIAN),
            (Layout::ELF64_BE, 64, DataEncoding::BIG_ENDIAN),
        ];

        for (layout, bits, encoding) in cases {
            let bytes = minimal(layout);
            let file = Elf::open(&bytes[..]).unwrap();
            assert_eq!(file.bits().unwrap(), bits);
            assert_eq!(file.data_encoding(), encoding);
            assert_eq!(file.kind().unwrap(), Type::EXEC);
            assert_eq!(file.machine().unwrap().label(), Some("RISC-V"));
            assert_eq!(file.entry_point().unwrap(), 0x8000_0000);
        }
    }

    #[test]
    fn not_elf_stops_after_the_magic() {
        let bytes = b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00\xff\xff\x00\x00";
        let source = Counting {
            bytes,
            reads: std::cell::Cell::new(0),
        };

        let err = Elf::open(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotElf);
        assert_eq!(source.reads.get(), 1);
    }

    #[test]
    fn tiny_inputs_are_not_elf() {
        for bytes in [&b""[..], &b"\x7f"[..], &b"\x7fEL"[..]] {
            let err = Elf::open(bytes).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotElf);
        }
    }

    #[test]
    fn unknown_class_fails_open() {
        let mut bytes = minimal(Layout::ELF64_LE);
        bytes[EI_CLASS] = 7;
        let err = Elf::open(&bytes[..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndeterminedFormat);
    }

    #[test]
    fn unknown_encoding_is_reported_lazily() {
        let mut bytes = minimal(Layout::ELF64_BE);
        bytes[EI_DATA] = 0x42;

        let file = Elf::open(&bytes[..]).unwrap();
        assert_eq!(file.bits().unwrap(), 64);
        assert_eq!(file.data_encoding().label(), None);
        assert_eq!(file.os_abi(), OsAbi::SYSV);

        assert_eq!(file.header().unwrap_err().kind(), ErrorKind::UndeterminedFormat);
        assert_eq!(file.kind().unwrap_err().kind(), ErrorKind::UndeterminedFormat);
        assert_eq!(
            file.program_headers().unwrap_err().kind(),
            ErrorKind::UndeterminedFormat
        );
        assert_eq!(
            file.section_headers().unwrap_err().kind(),
            ErrorKind::UndeterminedFormat
        );
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let bytes = minimal(Layout::ELF64_LE);
        let err = Elf::open(&bytes[..30]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn works_over_a_seekable_reader() {
        let source = SeekSource::new(Cursor::new(minimal(Layout::ELF32_BE)));
        let file = Elf::open(&source).unwrap();
        assert_eq!(file.bits().unwrap(), 32);
        assert_eq!(file.ident()[..4], ELF_MAGIC);
        assert_eq!(file.version(), Version::CURRENT);
    }
}
