// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// An invariant of the pipeline itself was violated.
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_001".to_string(),
		message: format!("Internal error: {}", reason.into()),
		help: Some("This indicates a bug in the pipeline rather than bad input".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A component was used after it was shut down.
pub fn shutdown(component: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_002".to_string(),
		message: format!("{} has been shut down", component.into()),
		help: None,
		notes: vec![],
		cause: None,
	}
}
