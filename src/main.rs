//! Displays the structure of ELF object files.
//!
//! Every file named on the command line is opened and parsed on its own. When one of them cannot
//! be displayed, the error is reported and the next file is processed.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use elf::Elf;

mod dump;
mod log;

use self::dump::SectionSelector;
use self::log::Verbosity;

/// The environment variable that selects the verbosity of the logs.
const LOG_ENV: &str = "READELF_LOG";

/// Displays information about ELF files.
#[derive(Debug, Parser)]
#[command(name = "readelf", version, about, disable_help_flag = true)]
struct Args {
    /// Display the ELF file header.
    #[arg(short = 'h', long)]
    file_header: bool,

    /// Display the section header table.
    #[arg(short = 'S', long, visible_alias = "sections")]
    section_headers: bool,

    /// Display the program header table.
    #[arg(short = 'l', long, visible_alias = "segments")]
    program_headers: bool,

    /// Equivalent to -h -S -l.
    #[arg(short, long)]
    all: bool,

    /// Dump the contents of a section, designated by its index or its name.
    #[arg(short = 'x', long, value_name = "SECTION")]
    hex_dump: Vec<SectionSelector>,

    /// Convert the entries of dumped sections to the byte order of the host.
    #[arg(short = 'R', long, requires = "hex_dump")]
    translate: bool,

    /// Print more logs. May be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print help.
    #[arg(short = 'H', long, action = ArgAction::Help)]
    help: Option<bool>,

    /// The files to display.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Args {
    /// Whether none of the tables was explicitly requested.
    fn nothing_selected(&self) -> bool {
        !self.file_header && !self.section_headers && !self.program_headers
    }

    fn show_file_header(&self) -> bool {
        self.file_header || self.all || (self.nothing_selected() && self.hex_dump.is_empty())
    }

    fn show_section_headers(&self) -> bool {
        self.section_headers || self.all || (self.nothing_selected() && self.hex_dump.is_empty())
    }

    fn show_program_headers(&self) -> bool {
        self.program_headers || self.all || (self.nothing_selected() && self.hex_dump.is_empty())
    }
}

/// Prints everything requested by `args` about the file at `path`.
fn display(out: &mut impl Write, path: &Path, args: &Args) -> anyhow::Result<()> {
    let source = File::open(path).context("cannot open the file")?;
    let file = Elf::open(&source)?;
    log::info!("{}: {file:?}", path.display());

    if args.files.len() > 1 {
        writeln!(out, "\nFile: {}", path.display())?;
    }

    if args.show_file_header() {
        dump::file_header(out, &file)?;
    }
    if args.show_section_headers() {
        dump::section_headers(out, &file)?;
    }
    if args.show_program_headers() {
        dump::program_headers(out, &file)?;
    }
    for selector in &args.hex_dump {
        dump::hex_dump(out, &file, selector, args.translate)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let from_env = std::env::var(LOG_ENV).ok();
    let verbosity = match from_env.as_deref().map(str::parse::<Verbosity>) {
        Some(Ok(verbosity)) if args.verbose == 0 => verbosity,
        _ => Verbosity::from_occurrences(args.verbose),
    };
    log::init(verbosity);

    if let Some(value) = from_env.filter(|value| value.parse::<Verbosity>().is_err()) {
        log::warn!("ignoring {LOG_ENV}={value:?}, expected one of error, warn, info, trace");
    }

    let mut failed = false;
    let mut out = io::stdout().lock();
    for path in &args.files {
        if let Err(err) = display(&mut out, path, &args) {
            let _ = out.flush();
            log::error!("{}: {err:#}", path.display());
            failed = true;
        }
    }

    if out.flush().is_err() {
        failed = true;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
