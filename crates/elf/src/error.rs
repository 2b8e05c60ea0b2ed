use std::io;

use thiserror::Error;

/// An error that might occur while reading an ELF file.
#[derive(Debug, Error)]
pub enum Error {
    /// The input does not start with the ELF magic bytes.
    #[error("not a valid ELF object")]
    NotElf,
    /// The class or the data encoding of the file is not recognized, and the requested operation
    /// needs it.
    #[error("undetermined ELF format: unknown {0}")]
    UndeterminedFormat(&'static str),
    /// A table described by the file header cannot be decoded.
    #[error("malformed ELF file: {0}")]
    Malformed(&'static str),
    /// The byte source failed, or the file ended too early.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::NotElf`].
    NotElf,
    /// See [`Error::UndeterminedFormat`].
    UndeterminedFormat,
    /// See [`Error::Malformed`].
    Malformed,
    /// See [`Error::Io`].
    Io,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotElf => ErrorKind::NotElf,
            Self::UndeterminedFormat(_) => ErrorKind::UndeterminedFormat,
            Self::Malformed(_) => ErrorKind::Malformed,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns whether this error was caused by the input ending before a structure it
    /// describes.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof)
    }
}
