//! The logging module of the tool.
//!
//! Messages emitted through the `log` facade (by the tool itself or by the `elf` crate) are
//! printed on the standard error stream, with colors if the `ansi-log` feature is enabled.

use core::fmt::Arguments;
use core::str::FromStr;
use std::io::Write;

mod display;
pub use self::display::*;

pub use ::log::{error, info, warn};

/// A message that the tool can print.
pub struct Message<'a> {
    /// The message itself.
    pub message: Arguments<'a>,
    /// The verbosity level of the message.
    pub verbosity: Verbosity,
    /// The module in which the message was generated.
    pub target: &'a str,
}

impl<'a> Message<'a> {
    /// Returns a [`WithAnsiColors`] wrapper around this message.
    #[inline]
    pub fn with_ansi_colors(&self) -> &WithAnsiColors<'a> {
        WithAnsiColors::wrap(self)
    }

    /// Logs this message.
    pub fn log(self) {
        let mut stderr = std::io::stderr().lock();

        #[cfg(feature = "ansi-log")]
        let _ = writeln!(stderr, "{}", self.with_ansi_colors());

        #[cfg(not(feature = "ansi-log"))]
        let _ = writeln!(
            stderr,
            "{:>7}  {}: {}",
            self.verbosity.name(),
            self.target,
            self.message
        );
    }
}

/// The verbosity level of a [`Message`].
///
/// # Remarks
///
/// The ordering of the variants is important, as it is used to determine whether a message should
/// be printed or not.
///
/// Messages that are *more verbose* are *greater* than messages that are *less verbose* (e.g.
/// `Trace` > `Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// Indicates that a file could not be displayed.
    Error,
    /// Indicates something odd about a file that did not prevent displaying it.
    Warn,
    /// Notifies the user of what the tool and the parser are doing.
    Info,
    /// Provides verbose information about every table read.
    Trace,
}

impl Verbosity {
    /// Returns the lowercase name of the level.
    #[cfg(not(feature = "ansi-log"))]
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Trace => "trace",
        }
    }

    /// Returns the verbosity selected by repeating `-v` on the command line.
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            _ => Self::Trace,
        }
    }

    fn level_filter(self) -> ::log::LevelFilter {
        match self {
            Self::Error => ::log::LevelFilter::Error,
            Self::Warn => ::log::LevelFilter::Warn,
            Self::Info => ::log::LevelFilter::Debug,
            Self::Trace => ::log::LevelFilter::Trace,
        }
    }
}

impl From<::log::Level> for Verbosity {
    fn from(level: ::log::Level) -> Self {
        match level {
            ::log::Level::Error => Self::Error,
            ::log::Level::Warn => Self::Warn,
            ::log::Level::Info | ::log::Level::Debug => Self::Info,
            ::log::Level::Trace => Self::Trace,
        }
    }
}

/// An error returned when a verbosity level cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVerbosity;

impl FromStr for Verbosity {
    type Err = UnknownVerbosity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" | "debug" => Ok(Self::Info),
            "trace" => Ok(Self::Trace),
            _ => Err(UnknownVerbosity),
        }
    }
}

/// The backend of the `log` facade.
struct Logger;

impl ::log::Log for Logger {
    fn enabled(&self, metadata: &::log::Metadata) -> bool {
        metadata.level() <= ::log::max_level()
    }

    fn log(&self, record: &::log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        Message {
            message: *record.args(),
            verbosity: record.level().into(),
            target: record.target(),
        }
        .log();
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: Logger = Logger;

/// Installs the logger, printing messages up to the provided verbosity.
///
/// Calling this function more than once only changes the verbosity.
pub fn init(verbosity: Verbosity) {
    let _ = ::log::set_logger(&LOGGER);
    ::log::set_max_level(verbosity.level_filter());
}
