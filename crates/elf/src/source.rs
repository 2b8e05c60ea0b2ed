//! Where the bytes of an ELF file come from.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// An already-opened input that can be read at arbitrary offsets.
///
/// Readers never open or close the source; its lifetime is managed by the caller. Sources that
/// perform positioned reads (slices, files on Unix) can be shared between threads. Sources that
/// only have a shared cursor must be wrapped in a [`SeekSource`], which cannot be shared.
pub trait ByteSource {
    /// Fills `buf` with the bytes found at `offset`.
    ///
    /// Reading past the end of the source fails with [`io::ErrorKind::UnexpectedEof`].
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// Returns the total length of the source, if it is cheap to know.
    ///
    /// This is only used to reject impossible sizes before allocating buffers for them.
    fn len_hint(&self) -> Option<u64> {
        None
    }
}

fn eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "read past the end of the ELF file")
}

impl ByteSource for [u8] {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset).map_err(|_| eof())?;
        let end = start.checked_add(buf.len()).ok_or_else(eof)?;
        let src = self.get(start..end).ok_or_else(eof)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    #[inline]
    fn len_hint(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl ByteSource for Vec<u8> {
    #[inline]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_exact_at(offset, buf)
    }

    #[inline]
    fn len_hint(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl ByteSource for File {
    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        std::os::unix::fs::FileExt::read_exact_at(self, buf, offset)
    }

    #[cfg(not(unix))]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }

    fn len_hint(&self) -> Option<u64> {
        self.metadata().ok().map(|m| m.len())
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    #[inline]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_at(offset, buf)
    }

    #[inline]
    fn len_hint(&self) -> Option<u64> {
        (**self).len_hint()
    }
}

/// Adapts a reader with a single shared cursor (anything [`Read`] + [`Seek`]) into a
/// [`ByteSource`].
///
/// Every read seeks first, so the position of the wrapped reader is unspecified afterwards. The
/// adapter is `!Sync`: callers that need concurrent access must use one adapter per thread or
/// put their own lock around it.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: RefCell<R>,
}

impl<R: Read + Seek> SeekSource<R> {
    /// Wraps the provided reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner: RefCell::new(inner),
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| io::Error::new(io::ErrorKind::WouldBlock, "byte source is busy"))?;
        inner.seek(SeekFrom::Start(offset))?;
        inner.read_exact(buf)
    }
}
