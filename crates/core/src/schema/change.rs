// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tributary_type::DataType;

use crate::schema::{Column, Schema, SchemaError};

/// Where an added column is placed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
	First,
	#[default]
	Last,
	Before(String),
	After(String),
}

/// A structural change to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaChange {
	CreateTable(Schema),
	AddColumn {
		column: Column,
		position: ColumnPosition,
	},
	DropColumn {
		name: String,
	},
	RenameColumn {
		from: String,
		to: String,
	},
	AlterColumnType {
		name: String,
		data_type: DataType,
	},
}

impl SchemaChange {
	/// Apply this change to the current schema of a table, `None` when the
	/// table does not exist yet.
	pub fn apply_to(&self, current: Option<&Schema>) -> Result<Schema, SchemaError> {
		let Some(current) = current else {
			return match self {
				SchemaChange::CreateTable(schema) => Ok(schema.clone()),
				_ => Err(SchemaError::NoSchema),
			};
		};

		let mut result = current.clone();
		match self {
			SchemaChange::CreateTable(_) => return Err(SchemaError::TableAlreadyExists),
			SchemaChange::AddColumn {
				column,
				position,
			} => {
				if current.column(&column.name).is_some() {
					return Err(SchemaError::DuplicateColumn(column.name.clone()));
				}
				let idx = match position {
					ColumnPosition::First => 0,
					ColumnPosition::Last => current.arity(),
					ColumnPosition::Before(name) => index_of(current, name)?,
					ColumnPosition::After(name) => index_of(current, name)? + 1,
				};
				result.columns_mut().insert(idx, column.clone());
			}
			SchemaChange::DropColumn {
				name,
			} => {
				let idx = index_of(current, name)?;
				if current.primary_keys().contains(name) {
					return Err(SchemaError::PrimaryKeyColumn(name.clone()));
				}
				result.columns_mut().remove(idx);
			}
			SchemaChange::RenameColumn {
				from,
				to,
			} => {
				let idx = index_of(current, from)?;
				if from != to && current.column(to).is_some() {
					return Err(SchemaError::DuplicateColumn(to.clone()));
				}
				result.columns_mut()[idx].name = to.clone();
				for key in result.primary_keys_mut().iter_mut().filter(|k| *k == from) {
					*key = to.clone();
				}
			}
			SchemaChange::AlterColumnType {
				name,
				data_type,
			} => {
				let idx = index_of(current, name)?;
				result.columns_mut()[idx].data_type = data_type.clone();
			}
		}
		Ok(result)
	}
}

fn index_of(schema: &Schema, name: &str) -> Result<usize, SchemaError> {
	schema.column_index(name).ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))
}

impl Display for SchemaChange {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			SchemaChange::CreateTable(schema) => write!(f, "CREATE TABLE ({} columns)", schema.arity()),
			SchemaChange::AddColumn {
				column,
				..
			} => write!(f, "ADD COLUMN {} {}", column.name, column.data_type),
			SchemaChange::DropColumn {
				name,
			} => write!(f, "DROP COLUMN {}", name),
			SchemaChange::RenameColumn {
				from,
				to,
			} => write!(f, "RENAME COLUMN {} TO {}", from, to),
			SchemaChange::AlterColumnType {
				name,
				data_type,
			} => write!(f, "ALTER COLUMN {} TYPE {}", name, data_type),
		}
	}
}
