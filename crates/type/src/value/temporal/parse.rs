// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;

use crate::{Result, error::diagnostic::value::invalid_timestamp, value::temporal::TimestampData};

const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse `YYYY-MM-DD HH:MM:SS[.fffffffff]` (a `T` separator is accepted).
pub fn parse_timestamp(text: &str) -> Result<TimestampData> {
	let trimmed = text.trim();
	for format in FORMATS {
		if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
			return Ok(TimestampData::from_naive(naive));
		}
	}
	Err(crate::error!(invalid_timestamp(text)))
}
