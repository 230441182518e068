// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tributary_type::{LocalZonedTimestampData, TimestampData, ZonedTimestampData};

use crate::encoded::{layout::round_to_word, reader::SlotReader, writer::EncodedWriter};

/// Timestamps with precision <= 3 keep the epoch millisecond in the slot.
/// Wider ones put the millisecond in the variable section and keep
/// `[offset: u32][nano_of_millisecond: u32]` in the slot.
///
/// Zoned timestamps always live in the variable section as
/// `[millisecond: i64][nano_of_millisecond: i32, boxed only][zone id]`.
impl EncodedWriter {
	pub fn write_timestamp(&mut self, pos: usize, value: &TimestampData, precision: u8) {
		self.write_instant(pos, value.millisecond(), value.nano_of_millisecond(), precision);
	}

	pub fn write_local_zoned_timestamp(&mut self, pos: usize, value: &LocalZonedTimestampData, precision: u8) {
		self.write_instant(pos, value.epoch_millisecond(), value.nano_of_millisecond(), precision);
	}

	pub fn write_zoned_timestamp(&mut self, pos: usize, value: &ZonedTimestampData, precision: u8) {
		let zone = value.zone_id().as_bytes();
		let mut bytes = Vec::with_capacity(round_to_word(12 + zone.len()));
		bytes.extend_from_slice(&value.millisecond().to_le_bytes());
		if !TimestampData::is_compact(precision) {
			bytes.extend_from_slice(&value.nano_of_millisecond().to_le_bytes());
		}
		bytes.extend_from_slice(zone);
		self.write_var(pos, &bytes);
	}

	fn write_instant(&mut self, pos: usize, millisecond: i64, nano_of_millisecond: i32, precision: u8) {
		if TimestampData::is_compact(precision) {
			self.write_long(pos, millisecond);
		} else {
			let offset = self.append(&millisecond.to_le_bytes());
			self.write_slot(pos, ((nano_of_millisecond as u32 as u64) << 32) | offset as u32 as u64);
		}
	}
}

impl<'a> SlotReader<'a> {
	pub(crate) fn get_timestamp(self, pos: usize, precision: u8) -> TimestampData {
		let (millisecond, nanos) = self.instant(pos, precision);
		TimestampData::from_epoch_millis_and_nanos(millisecond, nanos)
	}

	pub(crate) fn get_local_zoned_timestamp(self, pos: usize, precision: u8) -> LocalZonedTimestampData {
		let (millisecond, nanos) = self.instant(pos, precision);
		LocalZonedTimestampData::from_epoch_millis_and_nanos(millisecond, nanos)
	}

	pub(crate) fn get_zoned_timestamp(self, pos: usize, precision: u8) -> ZonedTimestampData {
		let bytes = self.var_bytes(pos);
		let millisecond = i64::from_le_bytes(word_at(bytes, 0));
		let (nanos, zone_start) = if TimestampData::is_compact(precision) {
			(0, 8)
		} else {
			let raw = bytes.get(8..12).map(|b| [b[0], b[1], b[2], b[3]]).unwrap_or_default();
			(i32::from_le_bytes(raw).clamp(0, 999_999), 12)
		};
		let zone = bytes.get(zone_start..).and_then(|zone| std::str::from_utf8(zone).ok()).unwrap_or_default();
		ZonedTimestampData::new(millisecond, nanos, zone)
	}

	fn instant(self, pos: usize, precision: u8) -> (i64, i32) {
		if TimestampData::is_compact(precision) {
			(self.get_long(pos), 0)
		} else {
			let slot = self.slot(pos);
			let offset = (slot & 0xFFFF_FFFF) as usize;
			let nanos = ((slot >> 32) as u32 as i32).clamp(0, 999_999);
			(i64::from_le_bytes(word_at(self.slice(offset, 8), 0)), nanos)
		}
	}
}

fn word_at(bytes: &[u8], at: usize) -> [u8; 8] {
	crate::encoded::reader::read_word(bytes, at)
}

#[cfg(test)]
pub mod tests {
	use tributary_type::{LocalZonedTimestampData, TimestampData, ZonedTimestampData};

	use crate::{encoded::writer::EncodedRecordWriter, record::FieldAccessor};

	#[test]
	fn test_compact_timestamp() {
		let ts = TimestampData::from_epoch_millis(1_700_000_000_123);
		let mut writer = EncodedRecordWriter::new(1);
		writer.write_timestamp(0, &ts, 3);
		let record = writer.finish();

		assert_eq!(record.as_bytes().len(), 16);
		assert_eq!(record.get_timestamp(0, 3), ts);
	}

	#[test]
	fn test_boxed_timestamp_keeps_nanos() {
		let ts = TimestampData::from_epoch_millis_and_nanos(-1_234, 456_789);
		let mut writer = EncodedRecordWriter::new(2);
		writer.write_int(0, 1);
		writer.write_timestamp(1, &ts, 9);
		let record = writer.finish();

		assert_eq!(record.get_timestamp(1, 9), ts);
		assert_eq!(record.get_int(0), 1);
	}

	#[test]
	fn test_local_zoned_timestamp() {
		let ts = LocalZonedTimestampData::from_epoch_millis_and_nanos(86_400_000, 1);
		let mut writer = EncodedRecordWriter::new(2);
		writer.write_local_zoned_timestamp(0, &ts, 6);
		writer.write_local_zoned_timestamp(1, &LocalZonedTimestampData::from_epoch_millis(5), 0);
		let record = writer.finish();

		assert_eq!(record.get_local_zoned_timestamp(0, 6), ts);
		assert_eq!(record.get_local_zoned_timestamp(1, 0).epoch_millisecond(), 5);
	}

	#[test]
	fn test_zoned_timestamp_compact_and_boxed() {
		let compact = ZonedTimestampData::new(1_000, 0, "+02:00");
		let boxed = ZonedTimestampData::new(1_000, 999_999, "Europe/Amsterdam");
		let mut writer = EncodedRecordWriter::new(2);
		writer.write_zoned_timestamp(0, &compact, 3);
		writer.write_zoned_timestamp(1, &boxed, 9);
		let record = writer.finish();

		assert_eq!(record.get_zoned_timestamp(0, 3), compact);
		assert_eq!(record.get_zoned_timestamp(1, 9), boxed);
	}
}
