//! Fixed-stride tables of headers located by the file header.

use std::io;

use crate::{ByteSource, Error};

/// The location of a table of fixed-size entries within the file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Table {
    /// The offset of the first entry.
    offset: u64,
    /// The distance between two entries, as announced by the file header.
    stride: u64,
    /// The number of bytes actually decoded from each entry.
    entry_size: usize,
    /// The number of entries.
    count: usize,
}

impl Table {
    /// Describes a table, checking that its announced entry size can hold `entry_size` bytes.
    pub fn new(
        offset: u64,
        stride: u16,
        entry_size: usize,
        count: usize,
        too_small: &'static str,
    ) -> Result<Self, Error> {
        if count != 0 && usize::from(stride) < entry_size {
            return Err(Error::Malformed(too_small));
        }

        Ok(Self {
            offset,
            stride: u64::from(stride),
            entry_size,
            count,
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    fn entry_offset(&self, index: usize) -> Result<u64, Error> {
        (index as u64)
            .checked_mul(self.stride)
            .and_then(|off| off.checked_add(self.offset))
            .ok_or(Error::Malformed("table extends past the addressable range"))
    }

    /// Reads and decodes the entry at `index`, which may be past `count`.
    pub fn read<S, T>(
        &self,
        source: &S,
        index: usize,
        decode: impl Fn(&[u8]) -> T,
    ) -> Result<T, Error>
    where
        S: ByteSource + ?Sized,
    {
        let mut buf = [0; 64];
        let buf = &mut buf[..self.entry_size];
        source.read_exact_at(self.entry_offset(index)?, buf)?;
        Ok(decode(buf))
    }

    /// Reads and decodes every entry, in order. The first failure aborts the whole read.
    pub fn read_all<S, T>(
        &self,
        source: &S,
        decode: impl Fn(&[u8]) -> T,
    ) -> Result<Vec<T>, Error>
    where
        S: ByteSource + ?Sized,
    {
        if self.count == 0 {
            return Ok(Vec::new());
        }

        // The last entry must end inside the file.
        let end = self
            .entry_offset(self.count - 1)?
            .checked_add(self.entry_size as u64)
            .ok_or(Error::Malformed("table extends past the addressable range"))?;
        if source.len_hint().is_some_and(|len| end > len) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "header table extends past the end of the file",
            )));
        }

        let mut out = Vec::with_capacity(self.count.min(4096));
        for index in 0..self.count {
            out.push(self.read(source, index, &decode)?);
        }
        Ok(out)
    }
}
