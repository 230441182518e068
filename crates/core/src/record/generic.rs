// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tributary_type::{Decimal, LocalZonedTimestampData, TimestampData, Value, ZonedTimestampData};

use crate::record::{ArrayData, MapData, RecordData, impl_field_accessor};

/// A row backed by one [`Value`] per field.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
	values: Vec<Value>,
}

impl GenericRecord {
	pub fn new(values: Vec<Value>) -> Self {
		Self {
			values,
		}
	}

	pub fn of<const N: usize>(values: [Value; N]) -> Self {
		Self::new(values.into())
	}

	pub fn values(&self) -> &[Value] {
		&self.values
	}

	pub fn into_values(self) -> Vec<Value> {
		self.values
	}

	fn slots(&self) -> Slots<'_> {
		Slots::Values(&self.values)
	}
}

impl_field_accessor!([] GenericRecord, slots);

impl RecordData for GenericRecord {
	fn arity(&self) -> usize {
		self.values.len()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericArray {
	values: Vec<Value>,
}

impl GenericArray {
	pub fn new(values: Vec<Value>) -> Self {
		Self {
			values,
		}
	}

	fn slots(&self) -> Slots<'_> {
		Slots::Values(&self.values)
	}
}

impl_field_accessor!([] GenericArray, slots);

impl ArrayData for GenericArray {
	fn size(&self) -> usize {
		self.values.len()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericMap {
	entries: Vec<(Value, Value)>,
}

impl GenericMap {
	pub fn new(entries: Vec<(Value, Value)>) -> Self {
		Self {
			entries,
		}
	}
}

impl MapData for GenericMap {
	fn size(&self) -> usize {
		self.entries.len()
	}

	fn key_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(Slots::Keys(&self.entries))
	}

	fn value_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(Slots::Items(&self.entries))
	}
}

/// Borrowed positional access into generic values. Map entries are exposed
/// as two arrays without copying.
#[derive(Debug, Clone, Copy)]
enum Slots<'a> {
	Values(&'a [Value]),
	Keys(&'a [(Value, Value)]),
	Items(&'a [(Value, Value)]),
}

macro_rules! expect_kind {
	($slots:expr, $pos:expr, $($pattern:pat => $result:expr),+ $(,)?) => {{
		let value = $slots.at($pos);
		match value {
			$($pattern => $result,)+
			other => type_mismatch($pos, stringify!($($pattern)|+), other),
		}
	}};
}

impl<'a> Slots<'a> {
	fn len(self) -> usize {
		match self {
			Slots::Values(values) => values.len(),
			Slots::Keys(entries) | Slots::Items(entries) => entries.len(),
		}
	}

	fn at(self, pos: usize) -> &'a Value {
		match self {
			Slots::Values(values) => &values[pos],
			Slots::Keys(entries) => &entries[pos].0,
			Slots::Items(entries) => &entries[pos].1,
		}
	}

	fn is_null_at(self, pos: usize) -> bool {
		self.at(pos).is_null()
	}

	fn get_boolean(self, pos: usize) -> bool {
		expect_kind!(self, pos, Value::Boolean(v) => *v)
	}

	fn get_byte(self, pos: usize) -> i8 {
		expect_kind!(self, pos, Value::TinyInt(v) => *v)
	}

	fn get_short(self, pos: usize) -> i16 {
		expect_kind!(self, pos, Value::SmallInt(v) => *v)
	}

	fn get_int(self, pos: usize) -> i32 {
		expect_kind!(self, pos, Value::Int(v) | Value::Date(v) | Value::Time(v) => *v)
	}

	fn get_long(self, pos: usize) -> i64 {
		expect_kind!(self, pos, Value::BigInt(v) => *v)
	}

	fn get_float(self, pos: usize) -> f32 {
		expect_kind!(self, pos, Value::Float(v) => *v)
	}

	fn get_double(self, pos: usize) -> f64 {
		expect_kind!(self, pos, Value::Double(v) => *v)
	}

	fn get_binary(self, pos: usize) -> &'a [u8] {
		expect_kind!(self, pos, Value::Binary(v) => v.as_slice())
	}

	fn get_string(self, pos: usize) -> &'a str {
		expect_kind!(self, pos, Value::Varchar(v) => v.as_str())
	}

	fn get_decimal(self, pos: usize, precision: u8, scale: u8) -> Decimal {
		let decimal = expect_kind!(self, pos, Value::Decimal(v) => v);
		debug_assert_eq!((decimal.precision(), decimal.scale()), (precision, scale));
		decimal.clone()
	}

	fn get_timestamp(self, pos: usize, _precision: u8) -> TimestampData {
		expect_kind!(self, pos, Value::Timestamp(v) => *v)
	}

	fn get_zoned_timestamp(self, pos: usize, _precision: u8) -> ZonedTimestampData {
		expect_kind!(self, pos, Value::ZonedTimestamp(v) => v.clone())
	}

	fn get_local_zoned_timestamp(self, pos: usize, _precision: u8) -> LocalZonedTimestampData {
		expect_kind!(self, pos, Value::LocalZonedTimestamp(v) => *v)
	}

	fn get_array(self, pos: usize) -> Slots<'a> {
		expect_kind!(self, pos, Value::Array(v) => Slots::Values(v))
	}

	fn get_map(self, pos: usize) -> MapSlots<'a> {
		expect_kind!(self, pos, Value::Map(v) => MapSlots(v))
	}

	fn get_row(self, pos: usize, num_fields: usize) -> Slots<'a> {
		let fields = expect_kind!(self, pos, Value::Row(v) => v);
		debug_assert_eq!(fields.len(), num_fields);
		Slots::Values(fields)
	}
}

impl<'a> Slots<'a> {
	fn slots(&self) -> Slots<'a> {
		*self
	}
}

impl_field_accessor!(['a] Slots<'a>, slots);

impl RecordData for Slots<'_> {
	fn arity(&self) -> usize {
		self.len()
	}
}

impl ArrayData for Slots<'_> {
	fn size(&self) -> usize {
		self.len()
	}
}

#[derive(Debug, Clone, Copy)]
struct MapSlots<'a>(&'a [(Value, Value)]);

impl MapData for MapSlots<'_> {
	fn size(&self) -> usize {
		self.0.len()
	}

	fn key_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(Slots::Keys(self.0))
	}

	fn value_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(Slots::Items(self.0))
	}
}

#[cold]
fn type_mismatch(pos: usize, expected: &str, actual: &Value) -> ! {
	panic!("type mismatch at position {}: expected {}, found {}", pos, expected, actual.kind())
}
