// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::Display;

use super::Diagnostic;

pub fn json_error(err: impl Display) -> Diagnostic {
	Diagnostic {
		code: "SERIALIZATION_001".to_string(),
		message: format!("JSON error: {}", err),
		help: Some("Check that the document matches the expected structure".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn encode_error(err: impl Display) -> Diagnostic {
	Diagnostic {
		code: "SERIALIZATION_002".to_string(),
		message: format!("failed to encode event: {}", err),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn decode_error(err: impl Display) -> Diagnostic {
	Diagnostic {
		code: "SERIALIZATION_003".to_string(),
		message: format!("failed to decode event: {}", err),
		help: Some("This may indicate a version mismatch between sender and receiver".to_string()),
		notes: vec![],
		cause: None,
	}
}
