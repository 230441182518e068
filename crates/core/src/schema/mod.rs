// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Table schemas and the changes applied to them.

mod change;
mod error;

pub use change::{ColumnPosition, SchemaChange};
pub use error::SchemaError;
use serde::{Deserialize, Serialize};
use tributary_type::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	pub data_type: DataType,
	pub nullable: bool,
}

impl Column {
	pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
		Self {
			name: name.into(),
			data_type,
			nullable: true,
		}
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}
}

/// The ordered columns of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
	columns: Vec<Column>,
	primary_keys: Vec<String>,
}

impl Schema {
	pub fn new(columns: Vec<Column>) -> Self {
		Self {
			columns,
			primary_keys: vec![],
		}
	}

	pub fn with_primary_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_keys = keys.into_iter().map(Into::into).collect();
		self
	}

	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	pub fn primary_keys(&self) -> &[String] {
		&self.primary_keys
	}

	pub fn arity(&self) -> usize {
		self.columns.len()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name == name)
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name == name)
	}

	/// The field types in column order, as needed to read a record of this
	/// schema.
	pub fn data_types(&self) -> Vec<DataType> {
		self.columns.iter().map(|c| c.data_type.clone()).collect()
	}

	/// Returns the schema that results from applying `change`. The receiver
	/// is left untouched.
	pub fn apply(&self, change: &SchemaChange) -> Result<Schema, SchemaError> {
		change.apply_to(Some(self))
	}

	pub(crate) fn columns_mut(&mut self) -> &mut Vec<Column> {
		&mut self.columns
	}

	pub(crate) fn primary_keys_mut(&mut self) -> &mut Vec<String> {
		&mut self.primary_keys
	}
}
