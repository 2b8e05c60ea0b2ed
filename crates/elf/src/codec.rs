//! Field-level decoding and encoding, parameterized by class and data encoding.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{
    Class, DataEncoding, Error, ELF32_EHDR_SIZE, ELF32_PHDR_SIZE, ELF32_SHDR_SIZE,
    ELF64_EHDR_SIZE, ELF64_PHDR_SIZE, ELF64_SHDR_SIZE,
};

/// How the multi-byte fields of a file are laid out: their width and their byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    is_64: bool,
    big_endian: bool,
}

impl Layout {
    /// 32-bit, little endian.
    pub const ELF32_LE: Self = Self::from_parts(false, false);
    /// 32-bit, big endian.
    pub const ELF32_BE: Self = Self::from_parts(false, true);
    /// 64-bit, little endian.
    pub const ELF64_LE: Self = Self::from_parts(true, false);
    /// 64-bit, big endian.
    pub const ELF64_BE: Self = Self::from_parts(true, true);

    const fn from_parts(is_64: bool, big_endian: bool) -> Self {
        Self { is_64, big_endian }
    }

    /// Returns the layout described by the provided class and data encoding.
    ///
    /// No byte order is ever guessed: an unknown class or encoding is an error.
    pub fn new(class: Class, encoding: DataEncoding) -> Result<Self, Error> {
        let is_64 = match class {
            Class::ELF32 => false,
            Class::ELF64 => true,
            _ => return Err(Error::UndeterminedFormat("class")),
        };
        let big_endian = match encoding {
            DataEncoding::LITTLE_ENDIAN => false,
            DataEncoding::BIG_ENDIAN => true,
            _ => return Err(Error::UndeterminedFormat("data encoding")),
        };
        Ok(Self { is_64, big_endian })
    }

    /// The class of this layout.
    pub fn class(self) -> Class {
        if self.is_64 {
            Class::ELF64
        } else {
            Class::ELF32
        }
    }

    /// The data encoding of this layout.
    pub fn encoding(self) -> DataEncoding {
        if self.big_endian {
            DataEncoding::BIG_ENDIAN
        } else {
            DataEncoding::LITTLE_ENDIAN
        }
    }

    /// Whether fields already are in host byte order.
    #[inline]
    pub fn is_native(self) -> bool {
        self.encoding() == DataEncoding::NATIVE
    }

    /// The width of addresses and offsets, in bytes.
    #[inline]
    pub fn word_size(self) -> usize {
        if self.is_64 {
            8
        } else {
            4
        }
    }

    /// The size of the file header.
    pub fn ehdr_size(self) -> usize {
        if self.is_64 {
            ELF64_EHDR_SIZE
        } else {
            ELF32_EHDR_SIZE
        }
    }

    /// The size of a program header.
    pub fn phdr_size(self) -> usize {
        if self.is_64 {
            ELF64_PHDR_SIZE
        } else {
            ELF32_PHDR_SIZE
        }
    }

    /// The size of a section header.
    pub fn shdr_size(self) -> usize {
        if self.is_64 {
            ELF64_SHDR_SIZE
        } else {
            ELF32_SHDR_SIZE
        }
    }

    pub(crate) fn read_u16(self, b: &[u8]) -> u16 {
        if self.big_endian {
            BigEndian::read_u16(b)
        } else {
            LittleEndian::read_u16(b)
        }
    }

    pub(crate) fn read_u32(self, b: &[u8]) -> u32 {
        if self.big_endian {
            BigEndian::read_u32(b)
        } else {
            LittleEndian::read_u32(b)
        }
    }

    pub(crate) fn read_u64(self, b: &[u8]) -> u64 {
        if self.big_endian {
            BigEndian::read_u64(b)
        } else {
            LittleEndian::read_u64(b)
        }
    }

    fn write_u16(self, b: &mut [u8], v: u16) {
        if self.big_endian {
            BigEndian::write_u16(b, v);
        } else {
            LittleEndian::write_u16(b, v);
        }
    }

    fn write_u32(self, b: &mut [u8], v: u32) {
        if self.big_endian {
            BigEndian::write_u32(b, v);
        } else {
            LittleEndian::write_u32(b, v);
        }
    }

    fn write_u64(self, b: &mut [u8], v: u64) {
        if self.big_endian {
            BigEndian::write_u64(b, v);
        } else {
            LittleEndian::write_u64(b, v);
        }
    }
}

/// Reads consecutive fields from a buffer that is known to be large enough.
pub(crate) struct Reader<'b> {
    layout: Layout,
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    pub fn new(layout: Layout, bytes: &'b [u8]) -> Self {
        Self {
            layout,
            bytes,
            pos: 0,
        }
    }

    fn take(&mut self, n: usize) -> &'b [u8] {
        let bytes = self.bytes;
        let field = &bytes[self.pos..self.pos + n];
        self.pos += n;
        field
    }

    pub fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    pub fn u16(&mut self) -> u16 {
        let layout = self.layout;
        layout.read_u16(self.take(2))
    }

    pub fn u32(&mut self) -> u32 {
        let layout = self.layout;
        layout.read_u32(self.take(4))
    }

    /// An address or offset: 4 or 8 bytes depending on the class, widened to 64 bits.
    pub fn word(&mut self) -> u64 {
        let layout = self.layout;
        if layout.is_64 {
            layout.read_u64(self.take(8))
        } else {
            u64::from(layout.read_u32(self.take(4)))
        }
    }

    pub fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N));
        out
    }
}

/// Writes consecutive fields into a buffer that is known to be large enough.
pub(crate) struct Writer<'b> {
    layout: Layout,
    bytes: &'b mut [u8],
    pos: usize,
}

impl<'b> Writer<'b> {
    pub fn new(layout: Layout, bytes: &'b mut [u8]) -> Self {
        Self {
            layout,
            bytes,
            pos: 0,
        }
    }

    fn take(&mut self, n: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += n;
        &mut self.bytes[start..start + n]
    }

    pub fn u16(&mut self, v: u16) {
        let layout = self.layout;
        layout.write_u16(self.take(2), v);
    }

    pub fn u32(&mut self, v: u32) {
        let layout = self.layout;
        layout.write_u32(self.take(4), v);
    }

    /// Fails when a 32-bit layout cannot represent the value.
    pub fn word(&mut self, v: u64) -> Result<(), Error> {
        let layout = self.layout;
        if layout.is_64 {
            layout.write_u64(self.take(8), v);
        } else {
            let v = u32::try_from(v)
                .map_err(|_| Error::Malformed("value does not fit in a 32-bit field"))?;
            layout.write_u32(self.take(4), v);
        }
        Ok(())
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.take(v.len()).copy_from_slice(v);
    }
}
