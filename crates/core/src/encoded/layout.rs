// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Byte layout shared by encoded records and arrays.
//!
//! ```text
//! record: [null bitvec, padded to 8][slot 0]..[slot n-1][variable section]
//! array:  [size: u32][reserved: u32][null bitvec, padded to 8][slots][variable section]
//! map:    [key array length: u32][reserved: u32][key array][value array]
//! ```
//!
//! Every field owns one 8-byte little-endian slot, so the position of a slot
//! depends only on the number of fields. Variable length data is referenced
//! from the slot as `[offset: u32][length: u32]` where the offset is relative
//! to the start of the enclosing record or array. Setting the most significant
//! bit of the slot switches it to inline mode: the value lives in bytes 0..7
//! and the length in the low 7 bits of byte 7.

/// Width of a fixed slot.
pub const SLOT_SIZE: usize = 8;

/// Size of the array and map headers.
pub const HEADER_SIZE: usize = 8;

/// Marks a slot whose variable length value is stored inline.
pub const MODE_INLINE: u64 = 0x8000_0000_0000_0000;
pub const MODE_MASK: u64 = 0x8000_0000_0000_0000;

/// Largest value that fits inline in a slot.
pub const MAX_INLINE_SIZE: usize = 7;

/// Bytes of null bitvec for `num_fields` fields, rounded up to whole words.
pub const fn bitvec_size(num_fields: usize) -> usize {
	((num_fields + 63) / 64) * 8
}

/// Size of the bitvec plus all slots of a record with `num_fields` fields.
pub const fn fixed_size(num_fields: usize) -> usize {
	bitvec_size(num_fields) + num_fields * SLOT_SIZE
}

/// Start of the slot for `pos` in a record.
pub const fn slot_offset(num_fields: usize, pos: usize) -> usize {
	bitvec_size(num_fields) + pos * SLOT_SIZE
}

/// Size of the header, bitvec and slots of an array with `size` elements.
pub const fn array_fixed_size(size: usize) -> usize {
	HEADER_SIZE + fixed_size(size)
}

/// Pack a reference into the variable section.
pub const fn pack_ref(offset: usize, len: usize) -> u64 {
	((len as u64) << 32) | (offset as u32 as u64)
}

/// Unpack a reference written by [`pack_ref`].
pub const fn unpack_ref(slot: u64) -> (usize, usize) {
	let offset = (slot & 0xFFFF_FFFF) as usize;
	let len = ((slot & !MODE_MASK) >> 32) as usize;
	(offset, len)
}

pub const fn is_inline(slot: u64) -> bool {
	slot & MODE_MASK == MODE_INLINE
}

/// Round `len` up to the next multiple of 8 so every variable length value
/// starts word aligned.
pub const fn round_to_word(len: usize) -> usize {
	(len + 7) & !7
}
