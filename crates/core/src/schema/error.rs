// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use thiserror::Error;
use tributary_type::error::{Diagnostic, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	#[error("table already exists")]
	TableAlreadyExists,

	#[error("table has no schema yet")]
	NoSchema,

	#[error("unknown column '{0}'")]
	UnknownColumn(String),

	#[error("column '{0}' already exists")]
	DuplicateColumn(String),

	#[error("column '{0}' is part of the primary key")]
	PrimaryKeyColumn(String),
}

impl IntoDiagnostic for SchemaError {
	fn into_diagnostic(self) -> Diagnostic {
		let (code, help) = match &self {
			SchemaError::TableAlreadyExists => ("SCHEMA_001", "CREATE TABLE may only be the first change of a table"),
			SchemaError::NoSchema => ("SCHEMA_002", "The first change of a table must create it"),
			SchemaError::UnknownColumn(_) => ("SCHEMA_003", "Check the column name against the current schema"),
			SchemaError::DuplicateColumn(_) => ("SCHEMA_004", "Column names must be unique within a table"),
			SchemaError::PrimaryKeyColumn(_) => {
				("SCHEMA_005", "Primary key columns cannot be dropped while the key references them")
			}
		};
		Diagnostic {
			code: code.to_string(),
			message: self.to_string(),
			help: Some(help.to_string()),
			notes: vec![],
			cause: None,
		}
	}
}

impl From<SchemaError> for tributary_type::Error {
	fn from(err: SchemaError) -> Self {
		tributary_type::error!(err)
	}
}
