//! Conversion of section contents to the host byte order.
//!
//! The contents of a section are a sequence of fixed-size entries whose shape depends on the
//! type of the section. Translating swaps every multi-byte field of every entry; single bytes and
//! opaque payloads are left alone. A trailing partial entry is left as it is stored.

use crate::codec::Layout;
use crate::{Shdr, ShdrType};

/// The shape of one entry: the width of each of its fields, in order.
type Fields = &'static [usize];

const SYM32: Fields = &[4, 4, 4, 1, 1, 2];
const SYM64: Fields = &[4, 1, 1, 2, 8, 8];
const WORD32: Fields = &[4];
const WORD64: Fields = &[8];
const PAIR32: Fields = &[4, 4];
const PAIR64: Fields = &[8, 8];
const TRIPLE32: Fields = &[4, 4, 4];
const TRIPLE64: Fields = &[8, 8, 8];
const HALF: Fields = &[2];

/// Returns the entry shape of sections of type `ty`, or [`None`] for sections that are plain
/// bytes or need a dedicated walk.
fn entry_fields(ty: ShdrType, layout: Layout) -> Option<Fields> {
    let wide = layout.word_size() == 8;
    let pick = |narrow: Fields, wide_fields: Fields| if wide { wide_fields } else { narrow };

    match ty {
        ShdrType::SYMTAB | ShdrType::DYNSYM => Some(pick(SYM32, SYM64)),
        ShdrType::REL | ShdrType::DYNAMIC => Some(pick(PAIR32, PAIR64)),
        ShdrType::RELA => Some(pick(TRIPLE32, TRIPLE64)),
        ShdrType::INIT_ARRAY | ShdrType::FINI_ARRAY | ShdrType::PREINIT_ARRAY => {
            Some(pick(WORD32, WORD64))
        }
        ShdrType::HASH | ShdrType::GROUP | ShdrType::SYMTAB_SHNDX => Some(WORD32),
        ShdrType::GNU_VERSYM => Some(HALF),
        _ => None,
    }
}

/// Converts `bytes`, the contents of the section described by `shdr`, to the host byte order in
/// place.
pub(crate) fn translate(shdr: &Shdr, layout: Layout, bytes: &mut [u8]) {
    if layout.is_native() {
        return;
    }

    match shdr.ty {
        ShdrType::NOTE => swap_notes(layout, note_alignment(shdr, layout), bytes),
        ShdrType::GNU_HASH => swap_gnu_hash(layout, bytes),
        ty => {
            if let Some(fields) = entry_fields(ty, layout) {
                let size: usize = fields.iter().sum();
                let stride = usize::try_from(shdr.entsize)
                    .ok()
                    .filter(|&entsize| entsize > size)
                    .unwrap_or(size);
                swap_entries(fields, stride, bytes);
            }
        }
    }
}

/// Swaps every field of every complete entry. Entries start every `stride` bytes; the bytes
/// past the last field of an entry are padding.
fn swap_entries(fields: Fields, stride: usize, bytes: &mut [u8]) {
    for entry in bytes.chunks_exact_mut(stride) {
        let mut pos = 0;
        for &width in fields {
            entry[pos..pos + width].reverse();
            pos += width;
        }
    }
}

/// 64-bit note sections aligned on 8 bytes pad names and descriptors to 8 bytes. Every other
/// note section uses 4.
fn note_alignment(shdr: &Shdr, layout: Layout) -> usize {
    if shdr.addralign == 8 && layout.word_size() == 8 {
        8
    } else {
        4
    }
}

fn align_up(n: usize, align: usize) -> Option<usize> {
    n.checked_add(align - 1).map(|n| n & !(align - 1))
}

/// Swaps the `namesz`, `descsz` and `type` words of every note. Names and descriptors are
/// opaque and stay as they are.
fn swap_notes(layout: Layout, align: usize, bytes: &mut [u8]) {
    let mut pos = 0;

    while bytes.len() - pos >= 12 {
        let header = &mut bytes[pos..pos + 12];
        let namesz = layout.read_u32(&header[0..4]) as usize;
        let descsz = layout.read_u32(&header[4..8]) as usize;
        swap_entries(TRIPLE32, 12, header);

        let next = (pos + 12)
            .checked_add(namesz)
            .and_then(|name_end| align_up(name_end, align))
            .and_then(|desc| desc.checked_add(descsz))
            .and_then(|desc_end| align_up(desc_end, align));
        match next {
            Some(next) if next <= bytes.len() => pos = next,
            _ => break,
        }
    }
}

/// The GNU hash table: four 32-bit header words, a bloom filter of class-sized words, then
/// 32-bit buckets and chains.
fn swap_gnu_hash(layout: Layout, bytes: &mut [u8]) {
    if bytes.len() < 16 {
        return;
    }

    let bloom_words = layout.read_u32(&bytes[8..12]) as usize;
    swap_entries(WORD32, 4, &mut bytes[..16]);

    let word = layout.word_size();
    let bloom_end = bloom_words
        .checked_mul(word)
        .and_then(|n| n.checked_add(16))
        .unwrap_or(usize::MAX)
        .min(bytes.len());

    let fields = if word == 8 { WORD64 } else { WORD32 };
    swap_entries(fields, word, &mut bytes[16..bloom_end]);
    swap_entries(WORD32, 4, &mut bytes[bloom_end..]);
}
