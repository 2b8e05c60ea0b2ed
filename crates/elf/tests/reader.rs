mod common;

use std::io::Cursor;

use common::{all_layouts, foreign_layout, ObjectBuilder};
use elf::{
    Class, DataEncoding, Elf, ErrorKind, Layout, Machine, OffsetKey, Phdr, PhdrFlags, PhdrType,
    Representation, SeekSource, ShdrFlags, ShdrType, Type,
};

const TEXT: [u8; 16] = [
    0x55, 0x48, 0x89, 0xe5, 0x31, 0xc0, 0x5d, 0xc3, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90,
];

fn relocatable() -> common::Object {
    ObjectBuilder::new(Layout::ELF64_LE)
        .section_with(
            ".text",
            ShdrType::PROGBITS,
            ShdrFlags::ALLOC | ShdrFlags::EXECINSTR,
            0,
            0,
            TEXT,
        )
        .build()
}

fn segment(ty: PhdrType, offset: u64) -> Phdr {
    Phdr {
        ty,
        flags: PhdrFlags::READABLE,
        offset,
        vaddr: 0x1_0000 + offset,
        paddr: 0x1_0000 + offset,
        filesz: 0x10,
        memsz: 0x20,
        align: 0x1000,
    }
}

#[test]
fn minimal_relocatable_object() {
    let object = relocatable();
    assert_eq!(object.offsets[0], 0x40);

    let file = Elf::open(&object.bytes[..]).unwrap();
    assert_eq!(file.kind().unwrap(), Type::REL);
    assert_eq!(file.kind().unwrap().label(), Some("REL (Relocatable file)"));
    assert_eq!(file.bits().unwrap(), 64);

    let data = file.raw_data(0x40u64).unwrap().unwrap();
    assert_eq!(data.as_bytes(), &TEXT);
    assert_eq!(data.representation(), Representation::Raw);
    assert_eq!(data.section_type(), ShdrType::PROGBITS);

    let sections = file.section_headers().unwrap();
    assert_eq!(sections.len(), 3);
    let text = &sections[1];
    assert_eq!(text.offset, 0x40);
    assert_eq!(text.size, 16);
    assert_eq!(file.section_name(text).unwrap().as_deref(), Some(".text"));
    assert_eq!(
        file.section_name(u64::from(text.name)).unwrap().as_deref(),
        Some(".text")
    );
}

#[test]
fn truncated_section_header_table() {
    let object = relocatable();
    let cut = object.shoff as usize + 64 + 20;
    let file = Elf::open(&object.bytes[..cut]).unwrap();

    let err = file.section_headers().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.is_truncation());
}

#[test]
fn truncation_without_a_length_hint() {
    let object = relocatable();
    let cut = object.bytes[..object.shoff as usize + 100].to_vec();
    let source = SeekSource::new(Cursor::new(cut));
    let file = Elf::open(&source).unwrap();

    let err = file.section_headers().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn every_class_and_encoding() {
    for layout in all_layouts() {
        let object = ObjectBuilder::new(layout)
            .ty(Type::EXEC)
            .machine(Machine::MIPS)
            .section(".data", ShdrType::PROGBITS, *b"abcdefgh")
            .segment(segment(PhdrType::LOAD, 0))
            .segment(segment(PhdrType::NOTE, 0x100))
            .build();

        let file = Elf::open(&object.bytes[..]).unwrap();
        let bits = if layout.class() == Class::ELF64 { 64 } else { 32 };
        assert_eq!(file.bits().unwrap(), bits);
        assert_eq!(file.data_encoding(), layout.encoding());
        assert_eq!(file.machine().unwrap().label(), Some("MIPS R3000"));

        let phdrs = file.program_headers().unwrap();
        assert_eq!(phdrs, [segment(PhdrType::LOAD, 0), segment(PhdrType::NOTE, 0x100)]);

        let shdrs = file.section_headers().unwrap();
        assert_eq!(shdrs.len(), 3);
        assert_eq!(file.section_name(&shdrs[1]).unwrap().as_deref(), Some(".data"));
        assert_eq!(
            file.section_name(&shdrs[2]).unwrap().as_deref(),
            Some(".shstrtab")
        );

        let data = file.raw_data(&shdrs[1]).unwrap().unwrap();
        assert_eq!(data.as_bytes(), b"abcdefgh");
    }
}

#[test]
fn encoding_labels() {
    let little = ObjectBuilder::new(Layout::ELF32_LE).build();
    let file = Elf::open(&little.bytes[..]).unwrap();
    assert_eq!(
        file.data_encoding().label(),
        Some("2's complement, little endian")
    );

    let big = ObjectBuilder::new(Layout::ELF64_BE).build();
    let file = Elf::open(&big.bytes[..]).unwrap();
    assert_eq!(file.data_encoding(), DataEncoding::BIG_ENDIAN);
}

#[test]
fn no_program_headers() {
    let object = relocatable();
    let file = Elf::open(&object.bytes[..]).unwrap();
    assert_eq!(file.program_header_count().unwrap(), 0);
    assert!(file.program_headers().unwrap().is_empty());
}

#[test]
fn program_headers_keep_their_order() {
    let mut builder = ObjectBuilder::new(Layout::ELF32_BE);
    let expected: Vec<_> = (0..5)
        .rev()
        .map(|i| segment(PhdrType::LOAD, i * 0x1000))
        .collect();
    for phdr in &expected {
        builder = builder.segment(*phdr);
    }
    let object = builder.build();

    let file = Elf::open(&object.bytes[..]).unwrap();
    assert_eq!(file.program_headers().unwrap(), expected);
}

#[test]
fn extended_numbering() {
    let object = ObjectBuilder::new(Layout::ELF64_BE)
        .section(".a", ShdrType::PROGBITS, *b"aaaa")
        .section(".b", ShdrType::PROGBITS, *b"bbbb")
        .segment(segment(PhdrType::LOAD, 0))
        .extended_numbering()
        .build();

    let file = Elf::open(&object.bytes[..]).unwrap();
    let hdr = file.header().unwrap();
    assert_eq!(hdr.shnum, 0);
    assert_eq!(hdr.shstrndx, elf::SHN_XINDEX);
    assert_eq!(hdr.phnum, elf::PN_XNUM);

    assert_eq!(file.section_count().unwrap(), 4);
    assert_eq!(file.section_headers().unwrap().len(), 4);
    assert_eq!(file.shstrndx().unwrap(), object.shstrndx as u32);
    assert_eq!(file.program_headers().unwrap().len(), 1);

    let names: Vec<_> = file
        .section_headers()
        .unwrap()
        .iter()
        .map(|shdr| file.section_name(shdr).unwrap())
        .collect();
    assert_eq!(
        names,
        [
            None,
            Some(".a".to_owned()),
            Some(".b".to_owned()),
            Some(".shstrtab".to_owned())
        ]
    );
}

#[test]
fn null_section_has_no_name() {
    let object = relocatable();
    let file = Elf::open(&object.bytes[..]).unwrap();
    let null = file.section(0).unwrap().unwrap();

    assert_eq!(null.ty, ShdrType::NULL);
    assert_eq!(file.section_name(&null).unwrap(), None);
    assert_eq!(file.section_name(0u64).unwrap(), None);
}

#[test]
fn names_outside_the_table() {
    let object = relocatable();
    let file = Elf::open(&object.bytes[..]).unwrap();

    assert_eq!(file.section_name(10_000u64).unwrap(), None);
    assert_eq!(file.section_name(u64::MAX).unwrap(), None);
}

#[test]
fn names_in_the_middle_of_a_string() {
    let object = relocatable();
    let file = Elf::open(&object.bytes[..]).unwrap();

    // ".text" starts at 1, so 2 points at "text".
    assert_eq!(file.section_name(2u64).unwrap().as_deref(), Some("text"));
}

#[test]
fn other_string_tables() {
    let object = ObjectBuilder::new(Layout::ELF32_LE)
        .section(".strtab", ShdrType::STRTAB, *b"\0main\0_start\0")
        .section(".text", ShdrType::PROGBITS, *b"\x90\x90")
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    assert_eq!(file.string(1, 1).unwrap().as_deref(), Some("main"));
    assert_eq!(file.string(1, 6).unwrap().as_deref(), Some("_start"));
    assert_eq!(file.string(1, 0).unwrap(), None);
    // Not a string table.
    assert_eq!(file.string(2, 0).unwrap(), None);
    // No such section.
    assert_eq!(file.string(42, 0).unwrap(), None);
}

#[test]
fn unterminated_strings_resolve_to_nothing() {
    let object = ObjectBuilder::new(Layout::ELF64_LE)
        .section(".strtab", ShdrType::STRTAB, *b"\0dangling")
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    assert_eq!(file.string(1, 1).unwrap(), None);
}

#[test]
fn long_names_span_several_reads() {
    let long = "x".repeat(200);
    let mut table = vec![0u8];
    table.extend_from_slice(long.as_bytes());
    table.push(0);

    let object = ObjectBuilder::new(Layout::ELF64_LE)
        .section(".strtab", ShdrType::STRTAB, table)
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    assert_eq!(file.string(1, 1).unwrap(), Some(long));
}

#[test]
fn data_lookups_that_miss() {
    let object = ObjectBuilder::new(Layout::ELF64_LE)
        .section(".empty", ShdrType::PROGBITS, Vec::<u8>::new())
        .nobits(".bss", 0x1000)
        .section(".data", ShdrType::PROGBITS, *b"0123")
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    // Zero offset.
    assert!(file.raw_data(0u64).unwrap().is_none());
    assert!(file.translated_data(0u64).unwrap().is_none());

    // Zero size: `.empty` and `.bss` share their offset with `.data`, which is the only match.
    let data = file.raw_data(object.offsets[0]).unwrap().unwrap();
    assert_eq!(data.as_bytes(), b"0123");

    // No section there.
    assert!(file.raw_data(object.offsets[2] + 1).unwrap().is_none());
    assert!(file.translated_data(object.offsets[2] + 1).unwrap().is_none());

    // The NULL section itself.
    let null = file.section(0).unwrap().unwrap();
    assert!(file.raw_data(&null).unwrap().is_none());
    assert!(file.translated_data(OffsetKey::Section(&null)).unwrap().is_none());
}

#[test]
fn nobits_sections_are_skipped() {
    let object = ObjectBuilder::new(Layout::ELF32_BE)
        .nobits(".bss", 0x10_0000)
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();
    let bss = file.section(1).unwrap().unwrap();
    assert_eq!(bss.ty, ShdrType::NOBITS);

    // `.bss` takes no room in the file, so `.shstrtab` starts at the same offset.
    let data = file.raw_data(&bss).unwrap().unwrap();
    assert_eq!(data.section_type(), ShdrType::STRTAB);
    assert_eq!(data.len(), b"\0.bss\0.shstrtab\0".len());
}

#[test]
fn sections_past_the_end_of_the_file() {
    let object = relocatable();
    let mut bytes = object.bytes.clone();

    // Grow .text past the end of the file.
    let size_field = object.shoff as usize + 64 + 32;
    bytes[size_field..size_field + 8].copy_from_slice(&0x10_0000u64.to_le_bytes());

    let file = Elf::open(&bytes[..]).unwrap();
    let err = file.raw_data(0x40u64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn translated_symbols_use_host_byte_order() {
    let layout = foreign_layout(Class::ELF64);

    // One Elf64_Sym in the foreign byte order.
    let mut sym = Vec::new();
    sym.extend_from_slice(&1u32.swap_bytes().to_ne_bytes());
    sym.extend_from_slice(&[0x12, 0]);
    sym.extend_from_slice(&1u16.swap_bytes().to_ne_bytes());
    sym.extend_from_slice(&0x40_1000u64.swap_bytes().to_ne_bytes());
    sym.extend_from_slice(&0x18u64.swap_bytes().to_ne_bytes());

    let object = ObjectBuilder::new(layout)
        .section_with(".symtab", ShdrType::SYMTAB, ShdrFlags::empty(), 0, 24, sym.clone())
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    let raw = file.raw_data(object.offsets[0]).unwrap().unwrap();
    assert_eq!(raw.as_bytes(), &sym[..]);

    let translated = file.translated_data(object.offsets[0]).unwrap().unwrap();
    assert_eq!(translated.representation(), Representation::Translated);
    assert_eq!(translated.section_type(), ShdrType::SYMTAB);

    let bytes = translated.as_bytes();
    assert_eq!(&bytes[0..4], &1u32.to_ne_bytes());
    assert_eq!(&bytes[4..6], &[0x12, 0]);
    assert_eq!(&bytes[6..8], &1u16.to_ne_bytes());
    assert_eq!(&bytes[8..16], &0x40_1000u64.to_ne_bytes());
    assert_eq!(&bytes[16..24], &0x18u64.to_ne_bytes());
}

#[test]
fn translated_bytes_of_plain_sections_match_raw() {
    let layout = foreign_layout(Class::ELF32);
    let object = ObjectBuilder::new(layout)
        .section(".rodata", ShdrType::PROGBITS, *b"\x01\x02\x03\x04")
        .build();
    let file = Elf::open(&object.bytes[..]).unwrap();

    let raw = file.raw_data(object.offsets[0]).unwrap().unwrap();
    let translated = file.translated_data(object.offsets[0]).unwrap().unwrap();
    assert_eq!(raw.as_bytes(), translated.as_bytes());
}

#[test]
fn returned_values_outlive_the_handle() {
    let object = relocatable();

    let (header, sections, text, name) = {
        let file = Elf::open(&object.bytes[..]).unwrap();
        let sections = file.section_headers().unwrap();
        let text = file.raw_data(&sections[1]).unwrap().unwrap();
        let name = file.section_name(&sections[1]).unwrap();
        (file.header().unwrap(), sections, text, name)
    };

    assert_eq!(header.shnum, 3);
    assert_eq!(sections.len(), 3);
    assert_eq!(text.into_bytes(), TEXT);
    assert_eq!(name.as_deref(), Some(".text"));
}

#[test]
fn header_round_trip_from_a_file() {
    for layout in all_layouts() {
        let object = ObjectBuilder::new(layout)
            .section(".text", ShdrType::PROGBITS, *b"\xc3")
            .segment(segment(PhdrType::LOAD, 0))
            .build();
        let file = Elf::open(&object.bytes[..]).unwrap();

        let header = file.header().unwrap();
        let encoded = header.encode().unwrap();
        assert_eq!(&encoded[..], &object.bytes[..layout.ehdr_size()]);
        assert_eq!(elf::Ehdr::decode(&encoded).unwrap(), header);
        assert_eq!(header.ident(), file.ident());
    }
}

#[test]
fn entry_size_too_small() {
    let object = relocatable();
    let mut bytes = object.bytes.clone();
    // e_shentsize
    bytes[58..60].copy_from_slice(&16u16.to_le_bytes());

    let file = Elf::open(&bytes[..]).unwrap();
    let err = file.section_headers().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}
