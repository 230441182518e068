// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::{decimal::MAX_COMPACT_PRECISION, temporal::MAX_COMPACT_TIMESTAMP_PRECISION};

/// Logical type of a column or nested field.
///
/// The physical encoding of decimals and timestamps depends on the declared
/// precision, which is why those variants carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
	Boolean,
	TinyInt,
	SmallInt,
	Int,
	BigInt,
	Float,
	Double,
	Binary,
	Varchar,
	Decimal {
		precision: u8,
		scale: u8,
	},
	/// Days since 1970-01-01.
	Date,
	/// Milliseconds of the day.
	Time,
	Timestamp {
		precision: u8,
	},
	ZonedTimestamp {
		precision: u8,
	},
	LocalZonedTimestamp {
		precision: u8,
	},
	Array(Box<DataType>),
	Map {
		key: Box<DataType>,
		value: Box<DataType>,
	},
	Row(Vec<DataType>),
}

impl DataType {
	pub fn decimal(precision: u8, scale: u8) -> Self {
		DataType::Decimal {
			precision,
			scale,
		}
	}

	pub fn timestamp(precision: u8) -> Self {
		DataType::Timestamp {
			precision,
		}
	}

	pub fn array(element: DataType) -> Self {
		DataType::Array(Box::new(element))
	}

	pub fn map(key: DataType, value: DataType) -> Self {
		DataType::Map {
			key: Box::new(key),
			value: Box::new(value),
		}
	}

	/// Whether values of this type fit entirely in an 8-byte fixed slot.
	pub fn is_compact(&self) -> bool {
		match self {
			DataType::Boolean
			| DataType::TinyInt
			| DataType::SmallInt
			| DataType::Int
			| DataType::BigInt
			| DataType::Float
			| DataType::Double
			| DataType::Date
			| DataType::Time => true,
			DataType::Decimal {
				precision,
				..
			} => *precision <= MAX_COMPACT_PRECISION,
			DataType::Timestamp {
				precision,
			}
			| DataType::LocalZonedTimestamp {
				precision,
			} => *precision <= MAX_COMPACT_TIMESTAMP_PRECISION,
			_ => false,
		}
	}

	pub fn is_nested(&self) -> bool {
		matches!(self, DataType::Array(_) | DataType::Map { .. } | DataType::Row(_))
	}
}

impl Display for DataType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			DataType::Boolean => f.write_str("BOOLEAN"),
			DataType::TinyInt => f.write_str("TINYINT"),
			DataType::SmallInt => f.write_str("SMALLINT"),
			DataType::Int => f.write_str("INT"),
			DataType::BigInt => f.write_str("BIGINT"),
			DataType::Float => f.write_str("FLOAT"),
			DataType::Double => f.write_str("DOUBLE"),
			DataType::Binary => f.write_str("BINARY"),
			DataType::Varchar => f.write_str("VARCHAR"),
			DataType::Decimal {
				precision,
				scale,
			} => write!(f, "DECIMAL({}, {})", precision, scale),
			DataType::Date => f.write_str("DATE"),
			DataType::Time => f.write_str("TIME"),
			DataType::Timestamp {
				precision,
			} => write!(f, "TIMESTAMP({})", precision),
			DataType::ZonedTimestamp {
				precision,
			} => write!(f, "TIMESTAMP({}) WITH TIME ZONE", precision),
			DataType::LocalZonedTimestamp {
				precision,
			} => write!(f, "TIMESTAMP_LTZ({})", precision),
			DataType::Array(element) => write!(f, "ARRAY<{}>", element),
			DataType::Map {
				key,
				value,
			} => write!(f, "MAP<{}, {}>", key, value),
			DataType::Row(fields) => {
				f.write_str("ROW<")?;
				for (idx, field) in fields.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}", field)?;
				}
				f.write_str(">")
			}
		}
	}
}
