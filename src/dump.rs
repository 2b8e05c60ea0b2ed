//! Renders the tables of an ELF file as text.

use core::fmt;
use core::str::FromStr;
use std::io::{self, Write};

use anyhow::Context;
use elf::{ByteSource, Class, Elf, Shdr};

/// Displays the label of a value, or its raw value if the value is not known.
struct Label<T>(Option<&'static str>, T);

impl<T: fmt::LowerHex> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(label) => f.pad(label),
            None => f.pad(&format!("<unknown: {:#x}>", self.1)),
        }
    }
}

/// The legend printed after the section header table.
const FLAG_KEY: &str = "\
Key to Flags:
  W (write), A (alloc), X (execute), M (merge), S (strings), I (info),
  L (link order), O (extra OS processing required), G (group), T (TLS),
  C (compressed), x (unknown), o (OS specific), p (processor specific)";

fn field(out: &mut impl Write, name: &str, value: impl fmt::Display) -> io::Result<()> {
    writeln!(out, "  {name:<35}{value}")
}

/// Prints the identification block and the file header.
pub fn file_header<S>(out: &mut impl Write, file: &Elf<S>) -> anyhow::Result<()>
where
    S: ByteSource + ?Sized,
{
    writeln!(out, "ELF Header:")?;
    write!(out, "  Magic:  ")?;
    for byte in file.ident() {
        write!(out, " {byte:02x}")?;
    }
    writeln!(out)?;

    let class = file.class();
    let encoding = file.data_encoding();
    let version = file.version();
    let os_abi = file.os_abi();
    field(out, "Class:", Label(class.label(), class.as_raw()))?;
    field(out, "Data:", Label(encoding.label(), encoding.as_raw()))?;
    field(out, "Version:", Label(version.label(), version.as_raw()))?;
    field(out, "OS/ABI:", Label(os_abi.label(), os_abi.as_raw()))?;
    field(out, "ABI Version:", file.abi_version())?;

    let header = file.header().context("cannot decode the file header")?;
    field(out, "Type:", Label(header.ty.label(), header.ty.as_raw()))?;
    field(out, "Machine:", Label(header.machine.label(), header.machine.as_raw()))?;
    field(out, "Version:", format_args!("{:#x}", header.version))?;
    field(out, "Entry point address:", format_args!("{:#x}", header.entry_point))?;
    field(
        out,
        "Start of program headers:",
        format_args!("{} (bytes into file)", header.phoff),
    )?;
    field(
        out,
        "Start of section headers:",
        format_args!("{} (bytes into file)", header.shoff),
    )?;
    field(out, "Flags:", format_args!("{:#x}", header.flags))?;
    field(out, "Size of this header:", format_args!("{} (bytes)", header.ehsize))?;
    field(
        out,
        "Size of program headers:",
        format_args!("{} (bytes)", header.phentsize),
    )?;
    field(out, "Number of program headers:", file.program_header_count()?)?;
    field(
        out,
        "Size of section headers:",
        format_args!("{} (bytes)", header.shentsize),
    )?;
    field(out, "Number of section headers:", file.section_count()?)?;
    field(out, "Section header string table index:", file.shstrndx()?)?;

    Ok(())
}

/// The number of hexadecimal digits used to display an address of `class`.
fn address_width(class: Class) -> usize {
    if class == Class::ELF64 {
        16
    } else {
        8
    }
}

/// Prints the section header table, followed by the flag key.
pub fn section_headers<S>(out: &mut impl Write, file: &Elf<S>) -> anyhow::Result<()>
where
    S: ByteSource + ?Sized,
{
    let sections = file
        .section_headers()
        .context("cannot read the section header table")?;

    writeln!(out)?;
    if sections.is_empty() {
        writeln!(out, "There are no sections in this file.")?;
        return Ok(());
    }

    let width = address_width(file.class());
    writeln!(out, "Section Headers:")?;
    writeln!(
        out,
        "  [Nr] {:<17} {:<15} {:<width$} {:<6} {:<6} ES Flg Lk Inf Al",
        "Name", "Type", "Address", "Off", "Size",
    )?;

    for (index, shdr) in sections.iter().enumerate() {
        let name = file.section_name(shdr)?.unwrap_or_default();
        writeln!(
            out,
            "  [{index:>2}] {:<17} {:<15} {:0width$x} {:06x} {:06x} {:02x} {:>3} {:>2} {:>3} {:>2}",
            truncated(&name, 17),
            Label(shdr.ty.label(), shdr.ty.as_raw()),
            shdr.addr,
            shdr.offset,
            shdr.size,
            shdr.entsize,
            shdr.flags.to_string(),
            shdr.link,
            shdr.info,
            shdr.addralign,
        )?;
    }

    writeln!(out, "{FLAG_KEY}")?;
    Ok(())
}

/// Shortens `name` to at most `max` characters.
fn truncated(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

/// Prints the program header table.
pub fn program_headers<S>(out: &mut impl Write, file: &Elf<S>) -> anyhow::Result<()>
where
    S: ByteSource + ?Sized,
{
    let segments = file
        .program_headers()
        .context("cannot read the program header table")?;

    writeln!(out)?;
    if segments.is_empty() {
        writeln!(out, "There are no program headers in this file.")?;
        return Ok(());
    }

    let width = address_width(file.class()) + 2;
    writeln!(out, "Program Headers:")?;
    writeln!(
        out,
        "  {:<14} {:<8} {:<width$} {:<width$} {:<8} {:<8} Flg Align",
        "Type", "Offset", "VirtAddr", "PhysAddr", "FileSiz", "MemSiz",
    )?;

    for phdr in &segments {
        writeln!(
            out,
            "  {:<14} {:#08x} {:#0width$x} {:#0width$x} {:#08x} {:#08x} {} {:#x}",
            Label(phdr.ty.label(), phdr.ty.as_raw()),
            phdr.offset,
            phdr.vaddr,
            phdr.paddr,
            phdr.filesz,
            phdr.memsz,
            phdr.flags,
            phdr.align,
        )?;
    }

    Ok(())
}

/// Designates a section on the command line, by index or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionSelector {
    Index(usize),
    Name(String),
}

impl FromStr for SectionSelector {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(s.to_owned()),
        })
    }
}

impl fmt::Display for SectionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Finds the section designated by `selector`, along with its name.
fn find_section<S>(
    file: &Elf<S>,
    selector: &SectionSelector,
) -> anyhow::Result<Option<(Shdr, String)>>
where
    S: ByteSource + ?Sized,
{
    match selector {
        SectionSelector::Index(index) => match file.section(*index)? {
            Some(shdr) => {
                let name = file.section_name(&shdr)?.unwrap_or_default();
                Ok(Some((shdr, name)))
            }
            None => Ok(None),
        },
        SectionSelector::Name(wanted) => {
            for shdr in file.section_headers()? {
                if file.section_name(&shdr)?.as_deref() == Some(wanted.as_str()) {
                    return Ok(Some((shdr, wanted.clone())));
                }
            }
            Ok(None)
        }
    }
}

/// Prints the contents of a section as hexadecimal bytes.
///
/// When `translate` is set, the multi-byte fields of the section's entries are first converted to
/// the byte order of the host.
pub fn hex_dump<S>(
    out: &mut impl Write,
    file: &Elf<S>,
    selector: &SectionSelector,
    translate: bool,
) -> anyhow::Result<()>
where
    S: ByteSource + ?Sized,
{
    let Some((shdr, name)) = find_section(file, selector)? else {
        anyhow::bail!("there is no section `{selector}`");
    };

    let data = if translate {
        file.translated_data(&shdr)
    } else {
        file.raw_data(&shdr)
    }
    .with_context(|| format!("cannot read the contents of section `{name}`"))?;

    writeln!(out)?;
    match data {
        Some(data) => {
            writeln!(out, "Hex dump of section '{name}':")?;
            hex_lines(out, shdr.addr, data.as_bytes())?;
        }
        None => writeln!(out, "Section '{name}' has no data to dump.")?,
    }

    Ok(())
}

/// Writes `bytes` sixteen at a time, with their address and their printable characters.
fn hex_lines(out: &mut impl Write, base: u64, bytes: &[u8]) -> io::Result<()> {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let address = base.wrapping_add(row as u64 * 16);
        write!(out, "  {address:#010x} ")?;

        for group in 0..4 {
            for i in 0..4 {
                match chunk.get(group * 4 + i) {
                    Some(byte) => write!(out, "{byte:02x}")?,
                    None => write!(out, "  ")?,
                }
            }
            write!(out, " ")?;
        }

        for &byte in chunk {
            let c = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            };
            write!(out, "{c}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}
