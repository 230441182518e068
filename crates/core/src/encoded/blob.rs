// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::encoded::{reader::SlotReader, writer::EncodedWriter};

impl EncodedWriter {
	pub fn write_binary(&mut self, pos: usize, value: &[u8]) {
		self.write_var(pos, value);
	}

	pub fn write_string(&mut self, pos: usize, value: &str) {
		self.write_var(pos, value.as_bytes());
	}
}

impl<'a> SlotReader<'a> {
	pub(crate) fn get_binary(self, pos: usize) -> &'a [u8] {
		self.var_bytes(pos)
	}

	pub(crate) fn get_string(self, pos: usize) -> &'a str {
		match std::str::from_utf8(self.var_bytes(pos)) {
			Ok(value) => value,
			Err(_) => {
				debug_assert!(false, "field {} does not hold UTF-8 text", pos);
				""
			}
		}
	}
}

#[cfg(test)]
pub mod tests {
	use crate::{encoded::writer::EncodedRecordWriter, record::FieldAccessor};

	#[test]
	fn test_inline_boundary() {
		let mut writer = EncodedRecordWriter::new(2);
		writer.write_binary(0, &[1, 2, 3, 4, 5, 6, 7]);
		writer.write_binary(1, &[1, 2, 3, 4, 5, 6, 7, 8]);
		let record = writer.finish();

		assert_eq!(record.get_binary(0), &[1, 2, 3, 4, 5, 6, 7]);
		assert_eq!(record.get_binary(1), &[1, 2, 3, 4, 5, 6, 7, 8]);
		// one word of bitvec, two slots and the padded 8 byte value
		assert_eq!(record.as_bytes().len(), 8 + 16 + 8);
	}

	#[test]
	fn test_utf8_multibyte() {
		let mut writer = EncodedRecordWriter::new(1);
		writer.write_string(0, "zürich – 東京");
		let record = writer.finish();
		assert_eq!(record.get_string(0), "zürich – 東京");
	}
}
