// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ops::{Deref, DerefMut};

use tributary_type::util::CowVec;

use crate::encoded::{
	array::EncodedArray,
	layout::{HEADER_SIZE, MAX_INLINE_SIZE, MODE_INLINE, SLOT_SIZE, array_fixed_size, bitvec_size, fixed_size, pack_ref, round_to_word},
	record::EncodedRecord,
};

/// Writes fields into the slots and variable section of an encoded buffer.
///
/// Each position is written at most once. The caller supplies the declared
/// precision for decimals and timestamps so the compact or boxed layout can
/// be chosen; readers must pass the same precision.
#[derive(Debug)]
pub struct EncodedWriter {
	buf: Vec<u8>,
	bitvec_start: usize,
	slots_start: usize,
	count: usize,
}

impl EncodedWriter {
	fn for_record(num_fields: usize) -> Self {
		Self {
			buf: vec![0u8; fixed_size(num_fields)],
			bitvec_start: 0,
			slots_start: bitvec_size(num_fields),
			count: num_fields,
		}
	}

	fn for_array(size: usize) -> Self {
		let mut buf = vec![0u8; array_fixed_size(size)];
		buf[0..4].copy_from_slice(&(size as u32).to_le_bytes());
		Self {
			buf,
			bitvec_start: HEADER_SIZE,
			slots_start: HEADER_SIZE + bitvec_size(size),
			count: size,
		}
	}

	pub fn count(&self) -> usize {
		self.count
	}

	pub fn set_null_at(&mut self, pos: usize) {
		debug_assert!(pos < self.count);
		self.buf[self.bitvec_start + pos / 8] |= 1 << (pos % 8);
		self.write_word(pos, [0u8; 8]);
	}

	pub fn write_boolean(&mut self, pos: usize, value: bool) {
		self.write_word(pos, widen(&[value as u8]));
	}

	pub fn write_byte(&mut self, pos: usize, value: i8) {
		self.write_word(pos, widen(&value.to_le_bytes()));
	}

	pub fn write_short(&mut self, pos: usize, value: i16) {
		self.write_word(pos, widen(&value.to_le_bytes()));
	}

	pub fn write_int(&mut self, pos: usize, value: i32) {
		self.write_word(pos, widen(&value.to_le_bytes()));
	}

	pub fn write_long(&mut self, pos: usize, value: i64) {
		self.write_word(pos, value.to_le_bytes());
	}

	pub fn write_float(&mut self, pos: usize, value: f32) {
		self.write_word(pos, widen(&value.to_le_bytes()));
	}

	pub fn write_double(&mut self, pos: usize, value: f64) {
		self.write_word(pos, value.to_le_bytes());
	}

	#[inline]
	pub(crate) fn write_word(&mut self, pos: usize, word: [u8; 8]) {
		debug_assert!(pos < self.count, "position {} out of bounds for {} fields", pos, self.count);
		let at = self.slots_start + pos * SLOT_SIZE;
		self.buf[at..at + SLOT_SIZE].copy_from_slice(&word);
	}

	pub(crate) fn write_slot(&mut self, pos: usize, slot: u64) {
		self.write_word(pos, slot.to_le_bytes());
	}

	/// Store a variable length value, inline when it fits in the slot.
	pub(crate) fn write_var(&mut self, pos: usize, bytes: &[u8]) {
		if bytes.len() <= MAX_INLINE_SIZE {
			let mut word = [0u8; 8];
			word[..bytes.len()].copy_from_slice(bytes);
			word[7] = (MODE_INLINE >> 56) as u8 | bytes.len() as u8;
			self.write_word(pos, word);
		} else {
			let offset = self.append(bytes);
			self.write_slot(pos, pack_ref(offset, bytes.len()));
		}
	}

	/// Append to the variable section and return the offset of the data.
	pub(crate) fn append(&mut self, bytes: &[u8]) -> usize {
		let offset = self.buf.len();
		self.buf.extend_from_slice(bytes);
		self.buf.resize(offset + round_to_word(bytes.len()), 0);
		offset
	}

	fn into_bytes(self) -> Vec<u8> {
		self.buf
	}
}

fn widen(bytes: &[u8]) -> [u8; 8] {
	let mut word = [0u8; 8];
	word[..bytes.len()].copy_from_slice(bytes);
	word
}

/// Builds an [`EncodedRecord`] with a fixed number of fields.
///
/// ```ignore
/// let mut writer = EncodedRecordWriter::new(3);
/// writer.write_int(0, 42);
/// writer.set_null_at(1);
/// writer.write_decimal(2, &price, 10)?;
/// let record = writer.finish();
/// ```
#[derive(Debug)]
pub struct EncodedRecordWriter(EncodedWriter);

impl EncodedRecordWriter {
	pub fn new(num_fields: usize) -> Self {
		Self(EncodedWriter::for_record(num_fields))
	}

	pub fn finish(self) -> EncodedRecord {
		let num_fields = self.0.count;
		EncodedRecord::new(CowVec::new(self.0.into_bytes()), num_fields)
	}
}

impl Deref for EncodedRecordWriter {
	type Target = EncodedWriter;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for EncodedRecordWriter {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

/// Builds an [`EncodedArray`] with a fixed number of elements.
#[derive(Debug)]
pub struct EncodedArrayWriter(EncodedWriter);

impl EncodedArrayWriter {
	pub fn new(size: usize) -> Self {
		Self(EncodedWriter::for_array(size))
	}

	pub fn finish(self) -> EncodedArray {
		EncodedArray::new(CowVec::new(self.0.into_bytes()))
	}
}

impl Deref for EncodedArrayWriter {
	type Target = EncodedWriter;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for EncodedArrayWriter {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}
