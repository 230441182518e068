// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Shared vocabulary of the schema evolution pipeline: identifiers, logical
//! data types, field values and the diagnostic error type.

pub mod error;
pub mod id;
pub mod util;
pub mod value;

pub use error::{Error, Result};
pub use id::{OperatorId, SchemaVersion, SubtaskId, TableId};
pub use value::{
	Value,
	decimal::{Decimal, MAX_COMPACT_PRECISION},
	temporal::{LocalZonedTimestampData, TimestampData, ZonedTimestampData},
	r#type::DataType,
};
