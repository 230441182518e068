// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tributary_type::{DataType, Value};

use crate::record::{ArrayData, FieldAccessor, RecordData};

/// Reads one field of a row as a [`Value`], `None` when the field is null.
pub type FieldGetter = Box<dyn Fn(&dyn RecordData) -> Option<Value> + Send + Sync>;

/// Reads one element of an array as a [`Value`], `None` when it is null.
pub type ElementGetter = Box<dyn Fn(&dyn ArrayData, usize) -> Option<Value> + Send + Sync>;

/// Create a getter for field `pos` of type `data_type`, so consumers never
/// pick accessors by hand.
pub fn field_getter(data_type: &DataType, pos: usize) -> FieldGetter {
	let data_type = data_type.clone();
	Box::new(move |record: &dyn RecordData| read_value(record, &data_type, pos))
}

pub fn element_getter(data_type: &DataType) -> ElementGetter {
	let data_type = data_type.clone();
	Box::new(move |array: &dyn ArrayData, pos: usize| read_value(array, &data_type, pos))
}

/// Read every field of `record` using the given field types.
pub fn materialize(record: &dyn RecordData, types: &[DataType]) -> Vec<Value> {
	debug_assert_eq!(record.arity(), types.len());
	types.iter().enumerate().map(|(pos, data_type)| read_value(record, data_type, pos).unwrap_or(Value::Null)).collect()
}

fn read_value<A: FieldAccessor + ?Sized>(data: &A, data_type: &DataType, pos: usize) -> Option<Value> {
	if data.is_null_at(pos) {
		return None;
	}

	let value = match data_type {
		DataType::Boolean => Value::Boolean(data.get_boolean(pos)),
		DataType::TinyInt => Value::TinyInt(data.get_byte(pos)),
		DataType::SmallInt => Value::SmallInt(data.get_short(pos)),
		DataType::Int => Value::Int(data.get_int(pos)),
		DataType::BigInt => Value::BigInt(data.get_long(pos)),
		DataType::Float => Value::Float(data.get_float(pos)),
		DataType::Double => Value::Double(data.get_double(pos)),
		DataType::Binary => Value::Binary(data.get_binary(pos).to_vec()),
		DataType::Varchar => Value::Varchar(data.get_string(pos).to_string()),
		DataType::Decimal {
			precision,
			scale,
		} => Value::Decimal(data.get_decimal(pos, *precision, *scale)),
		DataType::Date => Value::Date(data.get_int(pos)),
		DataType::Time => Value::Time(data.get_int(pos)),
		DataType::Timestamp {
			precision,
		} => Value::Timestamp(data.get_timestamp(pos, *precision)),
		DataType::ZonedTimestamp {
			precision,
		} => Value::ZonedTimestamp(data.get_zoned_timestamp(pos, *precision)),
		DataType::LocalZonedTimestamp {
			precision,
		} => Value::LocalZonedTimestamp(data.get_local_zoned_timestamp(pos, *precision)),
		DataType::Array(element) => {
			let array = data.get_array(pos);
			Value::Array(read_all(&*array, element))
		}
		DataType::Map {
			key,
			value,
		} => {
			let map = data.get_map(pos);
			let keys = read_all(&*map.key_array(), key);
			let values = read_all(&*map.value_array(), value);
			Value::Map(keys.into_iter().zip(values).collect())
		}
		DataType::Row(fields) => {
			let row = data.get_row(pos, fields.len());
			Value::Row(
				fields.iter()
					.enumerate()
					.map(|(idx, field)| read_value(&*row, field, idx).unwrap_or(Value::Null))
					.collect(),
			)
		}
	};

	Some(value)
}

fn read_all(array: &dyn ArrayData, element: &DataType) -> Vec<Value> {
	(0..array.size()).map(|idx| read_value(array, element, idx).unwrap_or(Value::Null)).collect()
}
