// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::encoded::layout::{HEADER_SIZE, SLOT_SIZE, bitvec_size, is_inline, unpack_ref};

/// Positional reader over the slots of an encoded record or array.
///
/// Reading a position with the wrong accessor, or a null position, returns
/// whatever the slot holds; it never reads outside the buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotReader<'a> {
	bytes: &'a [u8],
	bitvec_start: usize,
	slots_start: usize,
	count: usize,
}

impl<'a> SlotReader<'a> {
	pub(crate) fn record(bytes: &'a [u8], num_fields: usize) -> Self {
		Self {
			bytes,
			bitvec_start: 0,
			slots_start: bitvec_size(num_fields),
			count: num_fields,
		}
	}

	pub(crate) fn array(bytes: &'a [u8]) -> Self {
		let count = read_u32(bytes, 0) as usize;
		Self {
			bytes,
			bitvec_start: HEADER_SIZE,
			slots_start: HEADER_SIZE + bitvec_size(count),
			count,
		}
	}

	pub(crate) fn count(self) -> usize {
		self.count
	}

	pub(crate) fn is_null_at(self, pos: usize) -> bool {
		debug_assert!(pos < self.count, "position {} out of bounds for {} fields", pos, self.count);
		match self.bytes.get(self.bitvec_start + pos / 8) {
			Some(byte) => byte & (1 << (pos % 8)) != 0,
			None => true,
		}
	}

	#[inline]
	pub(crate) fn word(self, pos: usize) -> [u8; 8] {
		debug_assert!(pos < self.count, "position {} out of bounds for {} fields", pos, self.count);
		read_word(self.bytes, self.slots_start + pos * SLOT_SIZE)
	}

	#[inline]
	pub(crate) fn slot(self, pos: usize) -> u64 {
		u64::from_le_bytes(self.word(pos))
	}

	pub(crate) fn get_boolean(self, pos: usize) -> bool {
		self.word(pos)[0] != 0
	}

	pub(crate) fn get_byte(self, pos: usize) -> i8 {
		self.word(pos)[0] as i8
	}

	pub(crate) fn get_short(self, pos: usize) -> i16 {
		let word = self.word(pos);
		i16::from_le_bytes([word[0], word[1]])
	}

	pub(crate) fn get_int(self, pos: usize) -> i32 {
		let word = self.word(pos);
		i32::from_le_bytes([word[0], word[1], word[2], word[3]])
	}

	pub(crate) fn get_long(self, pos: usize) -> i64 {
		i64::from_le_bytes(self.word(pos))
	}

	pub(crate) fn get_float(self, pos: usize) -> f32 {
		let word = self.word(pos);
		f32::from_le_bytes([word[0], word[1], word[2], word[3]])
	}

	pub(crate) fn get_double(self, pos: usize) -> f64 {
		f64::from_le_bytes(self.word(pos))
	}

	/// Bytes of a variable length value, inline or in the variable section.
	pub(crate) fn var_bytes(self, pos: usize) -> &'a [u8] {
		let slot = self.slot(pos);
		if is_inline(slot) {
			let len = ((slot >> 56) & 0x7F) as usize;
			self.slice(self.slots_start + pos * SLOT_SIZE, len.min(7))
		} else {
			let (offset, len) = unpack_ref(slot);
			self.slice(offset, len)
		}
	}

	pub(crate) fn slice(self, start: usize, len: usize) -> &'a [u8] {
		self.bytes.get(start..start.saturating_add(len)).unwrap_or(&[])
	}
}

pub(crate) fn read_word(bytes: &[u8], at: usize) -> [u8; 8] {
	let mut word = [0u8; 8];
	if let Some(src) = bytes.get(at..at + SLOT_SIZE) {
		word.copy_from_slice(src);
	}
	word
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
	match bytes.get(at..at + 4) {
		Some(src) => u32::from_le_bytes([src[0], src[1], src[2], src[3]]),
		None => 0,
	}
}
