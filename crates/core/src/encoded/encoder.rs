// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use thiserror::Error;
use tributary_type::{
	DataType, Value,
	error::{Diagnostic, IntoDiagnostic},
};

use crate::encoded::{
	array::{EncodedArray, EncodedMap},
	record::EncodedRecord,
	writer::{EncodedArrayWriter, EncodedRecordWriter, EncodedWriter},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
	#[error("expected {expected} values, got {actual}")]
	ArityMismatch {
		expected: usize,
		actual: usize,
	},

	#[error("{actual} value at position {pos} does not conform to {expected}")]
	TypeMismatch {
		pos: usize,
		expected: DataType,
		actual: &'static str,
	},

	#[error("decimal {value} at position {pos} exceeds the compact range of precision {precision}")]
	DecimalOverflow {
		pos: usize,
		precision: u8,
		value: String,
	},
}

impl IntoDiagnostic for EncodeError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			EncodeError::ArityMismatch {
				..
			} => "ENCODE_001",
			EncodeError::TypeMismatch {
				..
			} => "ENCODE_002",
			EncodeError::DecimalOverflow {
				..
			} => "ENCODE_003",
		};
		Diagnostic {
			code: code.to_string(),
			message: self.to_string(),
			help: Some("The values must match the field types of the table schema".to_string()),
			notes: vec![],
			cause: None,
		}
	}
}

impl From<EncodeError> for tributary_type::Error {
	fn from(err: EncodeError) -> Self {
		tributary_type::error!(err)
	}
}

/// Encodes rows of [`Value`]s into the binary layout for a fixed list of
/// field types.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
	types: Arc<[DataType]>,
}

impl RecordEncoder {
	pub fn new(types: impl Into<Vec<DataType>>) -> Self {
		Self {
			types: types.into().into(),
		}
	}

	pub fn types(&self) -> &[DataType] {
		&self.types
	}

	pub fn encode(&self, values: &[Value]) -> Result<EncodedRecord, EncodeError> {
		if values.len() != self.types.len() {
			return Err(EncodeError::ArityMismatch {
				expected: self.types.len(),
				actual: values.len(),
			});
		}

		for (pos, (value, data_type)) in values.iter().zip(self.types.iter()).enumerate() {
			if !value.conforms_to(data_type) {
				return Err(EncodeError::TypeMismatch {
					pos,
					expected: data_type.clone(),
					actual: value.kind(),
				});
			}
		}

		encode_record(&self.types, values)
	}
}

fn encode_record(types: &[DataType], values: &[Value]) -> Result<EncodedRecord, EncodeError> {
	let mut writer = EncodedRecordWriter::new(types.len());
	for (pos, (data_type, value)) in types.iter().zip(values).enumerate() {
		write_value(&mut writer, pos, data_type, value)?;
	}
	Ok(writer.finish())
}

fn encode_array(element: &DataType, values: &[Value]) -> Result<EncodedArray, EncodeError> {
	let mut writer = EncodedArrayWriter::new(values.len());
	for (pos, value) in values.iter().enumerate() {
		write_value(&mut writer, pos, element, value)?;
	}
	Ok(writer.finish())
}

fn write_value(writer: &mut EncodedWriter, pos: usize, data_type: &DataType, value: &Value) -> Result<(), EncodeError> {
	match (data_type, value) {
		(_, Value::Null) => writer.set_null_at(pos),
		(DataType::Boolean, Value::Boolean(v)) => writer.write_boolean(pos, *v),
		(DataType::TinyInt, Value::TinyInt(v)) => writer.write_byte(pos, *v),
		(DataType::SmallInt, Value::SmallInt(v)) => writer.write_short(pos, *v),
		(DataType::Int, Value::Int(v)) | (DataType::Date, Value::Date(v)) | (DataType::Time, Value::Time(v)) => {
			writer.write_int(pos, *v)
		}
		(DataType::BigInt, Value::BigInt(v)) => writer.write_long(pos, *v),
		(DataType::Float, Value::Float(v)) => writer.write_float(pos, *v),
		(DataType::Double, Value::Double(v)) => writer.write_double(pos, *v),
		(DataType::Binary, Value::Binary(v)) => writer.write_binary(pos, v),
		(DataType::Varchar, Value::Varchar(v)) => writer.write_string(pos, v),
		(
			DataType::Decimal {
				precision,
				..
			},
			Value::Decimal(v),
		) => writer.write_decimal(pos, v, *precision)?,
		(
			DataType::Timestamp {
				precision,
			},
			Value::Timestamp(v),
		) => writer.write_timestamp(pos, v, *precision),
		(
			DataType::ZonedTimestamp {
				precision,
			},
			Value::ZonedTimestamp(v),
		) => writer.write_zoned_timestamp(pos, v, *precision),
		(
			DataType::LocalZonedTimestamp {
				precision,
			},
			Value::LocalZonedTimestamp(v),
		) => writer.write_local_zoned_timestamp(pos, v, *precision),
		(DataType::Array(element), Value::Array(values)) => writer.write_array(pos, &encode_array(element, values)?),
		(
			DataType::Map {
				key,
				value,
			},
			Value::Map(entries),
		) => {
			let keys: Vec<Value> = entries.iter().map(|(k, _)| k.clone()).collect();
			let values: Vec<Value> = entries.iter().map(|(_, v)| v.clone()).collect();
			writer.write_map(pos, &EncodedMap::new(&encode_array(key, &keys)?, &encode_array(value, &values)?));
		}
		(DataType::Row(fields), Value::Row(values)) => writer.write_row(pos, &encode_record(fields, values)?),
		(data_type, value) => {
			debug_assert!(false, "{} value cannot be written as {}", value.kind(), data_type);
			writer.set_null_at(pos);
		}
	}
	Ok(())
}
