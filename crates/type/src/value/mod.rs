// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod decimal;
pub mod temporal;
pub mod r#type;

use decimal::Decimal;
use temporal::{LocalZonedTimestampData, TimestampData, ZonedTimestampData};
use r#type::DataType;

/// A single field value of a row.
///
/// The variant set is closed; every logical [`DataType`] maps to exactly one
/// variant, with [`Value::Null`] standing for an absent value of any type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Null,
	Boolean(bool),
	TinyInt(i8),
	SmallInt(i16),
	Int(i32),
	BigInt(i64),
	Float(f32),
	Double(f64),
	Binary(Vec<u8>),
	Varchar(String),
	Decimal(Decimal),
	/// Days since 1970-01-01.
	Date(i32),
	/// Milliseconds of the day.
	Time(i32),
	Timestamp(TimestampData),
	ZonedTimestamp(ZonedTimestampData),
	LocalZonedTimestamp(LocalZonedTimestampData),
	Array(Vec<Value>),
	Map(Vec<(Value, Value)>),
	Row(Vec<Value>),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Value::Null => "NULL",
			Value::Boolean(_) => "BOOLEAN",
			Value::TinyInt(_) => "TINYINT",
			Value::SmallInt(_) => "SMALLINT",
			Value::Int(_) => "INT",
			Value::BigInt(_) => "BIGINT",
			Value::Float(_) => "FLOAT",
			Value::Double(_) => "DOUBLE",
			Value::Binary(_) => "BINARY",
			Value::Varchar(_) => "VARCHAR",
			Value::Decimal(_) => "DECIMAL",
			Value::Date(_) => "DATE",
			Value::Time(_) => "TIME",
			Value::Timestamp(_) => "TIMESTAMP",
			Value::ZonedTimestamp(_) => "TIMESTAMP WITH TIME ZONE",
			Value::LocalZonedTimestamp(_) => "TIMESTAMP_LTZ",
			Value::Array(_) => "ARRAY",
			Value::Map(_) => "MAP",
			Value::Row(_) => "ROW",
		}
	}

	/// Whether this value can be stored in a field of type `data_type`.
	///
	/// `Null` conforms to every type; nested values are checked recursively.
	pub fn conforms_to(&self, data_type: &DataType) -> bool {
		match (self, data_type) {
			(Value::Null, _) => true,
			(Value::Boolean(_), DataType::Boolean)
			| (Value::TinyInt(_), DataType::TinyInt)
			| (Value::SmallInt(_), DataType::SmallInt)
			| (Value::Int(_), DataType::Int)
			| (Value::BigInt(_), DataType::BigInt)
			| (Value::Float(_), DataType::Float)
			| (Value::Double(_), DataType::Double)
			| (Value::Binary(_), DataType::Binary)
			| (Value::Varchar(_), DataType::Varchar)
			| (Value::Date(_), DataType::Date)
			| (Value::Time(_), DataType::Time)
			| (Value::Timestamp(_), DataType::Timestamp { .. })
			| (Value::ZonedTimestamp(_), DataType::ZonedTimestamp { .. })
			| (Value::LocalZonedTimestamp(_), DataType::LocalZonedTimestamp { .. }) => true,
			(
				Value::Decimal(decimal),
				DataType::Decimal {
					precision,
					scale,
				},
			) => decimal.precision() == *precision && decimal.scale() == *scale,
			(Value::Array(elements), DataType::Array(element)) => {
				elements.iter().all(|value| value.conforms_to(element))
			}
			(
				Value::Map(entries),
				DataType::Map {
					key,
					value,
				},
			) => entries.iter().all(|(k, v)| !k.is_null() && k.conforms_to(key) && v.conforms_to(value)),
			(Value::Row(values), DataType::Row(fields)) => {
				values.len() == fields.len()
					&& values.iter().zip(fields).all(|(value, field)| value.conforms_to(field))
			}
			_ => false,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Boolean(v) => write!(f, "{}", v),
			Value::TinyInt(v) => write!(f, "{}", v),
			Value::SmallInt(v) => write!(f, "{}", v),
			Value::Int(v) => write!(f, "{}", v),
			Value::BigInt(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::Double(v) => write!(f, "{}", v),
			Value::Binary(bytes) => {
				f.write_str("0x")?;
				for byte in bytes {
					write!(f, "{:02x}", byte)?;
				}
				Ok(())
			}
			Value::Varchar(v) => write!(f, "'{}'", v),
			Value::Decimal(v) => write!(f, "{}", v),
			Value::Date(days) => match temporal::days_to_date(*days) {
				Some(date) => write!(f, "{}", date),
				None => write!(f, "date({})", days),
			},
			Value::Time(millis) => match temporal::millis_to_time(*millis) {
				Some(time) => write!(f, "{}", time),
				None => write!(f, "time({})", millis),
			},
			Value::Timestamp(v) => write!(f, "{}", v),
			Value::ZonedTimestamp(v) => match v.to_date_time() {
				Some(dt) => write!(f, "{}", dt),
				None => write!(f, "{}ms {}", v.millisecond(), v.zone_id()),
			},
			Value::LocalZonedTimestamp(v) => match v.to_utc() {
				Some(dt) => write!(f, "{}", dt),
				None => write!(f, "{}ms", v.epoch_millisecond()),
			},
			Value::Array(values) | Value::Row(values) => {
				f.write_str(if matches!(self, Value::Array(_)) {
					"["
				} else {
					"("
				})?;
				for (idx, value) in values.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}", value)?;
				}
				f.write_str(if matches!(self, Value::Array(_)) {
					"]"
				} else {
					")"
				})
			}
			Value::Map(entries) => {
				f.write_str("{")?;
				for (idx, (key, value)) in entries.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}: {}", key, value)?;
				}
				f.write_str("}")
			}
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Boolean(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::BigInt(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Double(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Varchar(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Varchar(v)
	}
}

impl From<Decimal> for Value {
	fn from(v: Decimal) -> Self {
		Value::Decimal(v)
	}
}

impl From<TimestampData> for Value {
	fn from(v: TimestampData) -> Self {
		Value::Timestamp(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(Value::Null)
	}
}
