// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// A decimal does not fit the declared precision.
pub fn decimal_overflow(value: impl Into<String>, precision: u8, scale: u8) -> Diagnostic {
	Diagnostic {
		code: "VALUE_001".to_string(),
		message: format!("decimal {} does not fit DECIMAL({}, {})", value.into(), precision, scale),
		help: Some("Widen the column precision or reduce the scale".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_decimal(text: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VALUE_002".to_string(),
		message: format!("'{}' is not a valid decimal", text.into()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_precision(precision: u8, scale: u8) -> Diagnostic {
	Diagnostic {
		code: "VALUE_003".to_string(),
		message: format!("invalid decimal precision/scale ({}, {})", precision, scale),
		help: Some("Precision must be between 1 and 38 and scale must not exceed precision".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_timestamp(text: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VALUE_004".to_string(),
		message: format!("'{}' is not a valid timestamp", text.into()),
		help: Some("Expected YYYY-MM-DD HH:MM:SS[.fffffffff]".to_string()),
		notes: vec![],
		cause: None,
	}
}
