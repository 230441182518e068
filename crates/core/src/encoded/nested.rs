// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::encoded::{
	array::{EncodedArray, EncodedArrayView, EncodedMap, EncodedMapView},
	reader::SlotReader,
	record::{EncodedRecord, EncodedRecordView},
	writer::EncodedWriter,
};

/// Nested values are copied into the variable section as self-contained
/// encodings; offsets inside them stay relative to their own start.
impl EncodedWriter {
	pub fn write_row(&mut self, pos: usize, value: &EncodedRecord) {
		self.write_var(pos, value.as_bytes());
	}

	pub fn write_array(&mut self, pos: usize, value: &EncodedArray) {
		self.write_var(pos, value.as_bytes());
	}

	pub fn write_map(&mut self, pos: usize, value: &EncodedMap) {
		self.write_var(pos, value.as_bytes());
	}
}

impl<'a> SlotReader<'a> {
	pub(crate) fn get_row(self, pos: usize, num_fields: usize) -> EncodedRecordView<'a> {
		EncodedRecordView::new(self.var_bytes(pos), num_fields)
	}

	pub(crate) fn get_array(self, pos: usize) -> EncodedArrayView<'a> {
		EncodedArrayView::new(self.var_bytes(pos))
	}

	pub(crate) fn get_map(self, pos: usize) -> EncodedMapView<'a> {
		EncodedMapView::new(self.var_bytes(pos))
	}
}

#[cfg(test)]
pub mod tests {
	use tributary_type::{Decimal, TimestampData};

	use crate::{
		encoded::{
			array::EncodedMap,
			writer::{EncodedArrayWriter, EncodedRecordWriter},
		},
		record::{ArrayData, FieldAccessor, MapData, RecordData},
	};

	#[test]
	fn test_nested_row() {
		let mut inner = EncodedRecordWriter::new(2);
		inner.write_string(0, "nested value longer than seven");
		inner.write_decimal(1, &Decimal::from_unscaled_long(-5, 4, 1), 4).unwrap();
		let inner = inner.finish();

		let mut outer = EncodedRecordWriter::new(2);
		outer.write_long(0, 1);
		outer.write_row(1, &inner);
		let outer = outer.finish();

		let row = outer.get_row(1, 2);
		assert_eq!(row.arity(), 2);
		assert_eq!(row.get_string(0), "nested value longer than seven");
		assert_eq!(row.get_decimal(1, 4, 1).to_string(), "-0.5");
	}

	#[test]
	fn test_array_of_boxed_timestamps() {
		let mut array = EncodedArrayWriter::new(3);
		array.write_timestamp(0, &TimestampData::from_epoch_millis_and_nanos(1, 2), 9);
		array.set_null_at(1);
		array.write_timestamp(2, &TimestampData::from_epoch_millis_and_nanos(3, 4), 9);
		let array = array.finish();

		let mut writer = EncodedRecordWriter::new(1);
		writer.write_array(0, &array);
		let record = writer.finish();

		let read = record.get_array(0);
		assert_eq!(read.size(), 3);
		assert_eq!(read.get_timestamp(0, 9), TimestampData::from_epoch_millis_and_nanos(1, 2));
		assert!(read.is_null_at(1));
		assert_eq!(read.get_timestamp(2, 9).nano_of_millisecond(), 4);
	}

	#[test]
	fn test_map() {
		let mut keys = EncodedArrayWriter::new(2);
		keys.write_string(0, "alpha");
		keys.write_string(1, "a key that does not fit inline");
		let mut values = EncodedArrayWriter::new(2);
		values.write_int(0, 1);
		values.set_null_at(1);
		let map = EncodedMap::new(&keys.finish(), &values.finish());

		let mut writer = EncodedRecordWriter::new(1);
		writer.write_map(0, &map);
		let record = writer.finish();

		let read = record.get_map(0);
		assert_eq!(read.size(), 2);
		assert_eq!(read.key_array().get_string(1), "a key that does not fit inline");
		assert_eq!(read.value_array().get_int(0), 1);
		assert!(read.value_array().is_null_at(1));
	}

	#[test]
	fn test_empty_array() {
		let array = EncodedArrayWriter::new(0).finish();
		let mut writer = EncodedRecordWriter::new(1);
		writer.write_array(0, &array);
		let record = writer.finish();
		assert_eq!(record.get_array(0).size(), 0);
	}
}
