// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use thiserror::Error;
use tributary_type::error::{Diagnostic, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TracingError {
	#[error("invalid filter directive '{directive}': {reason}")]
	InvalidFilter {
		directive: String,
		reason: String,
	},

	#[error("a global tracing subscriber is already installed: {0}")]
	AlreadyInitialized(String),
}

impl IntoDiagnostic for TracingError {
	fn into_diagnostic(self) -> Diagnostic {
		let (code, help) = match &self {
			TracingError::InvalidFilter {
				..
			} => ("TRACING_001", Some("Use RUST_LOG syntax, e.g. 'info,tributary_sub_schema=debug'")),
			TracingError::AlreadyInitialized(_) => ("TRACING_002", None),
		};
		Diagnostic {
			code: code.to_string(),
			message: self.to_string(),
			help: help.map(str::to_string),
			notes: vec![],
			cause: None,
		}
	}
}

impl From<TracingError> for tributary_type::Error {
	fn from(err: TracingError) -> Self {
		tributary_type::error!(err)
	}
}
