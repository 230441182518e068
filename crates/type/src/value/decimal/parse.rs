// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{borrow::Cow, str::FromStr};

use bigdecimal::BigDecimal;

use crate::{
	Result,
	error::diagnostic::value::{decimal_overflow, invalid_decimal, invalid_precision},
	return_error,
	value::decimal::Decimal,
};

/// Parse decimal text into `DECIMAL(precision, scale)`.
///
/// Surrounding whitespace and `_` digit separators are accepted.
pub fn parse_decimal(text: &str, precision: u8, scale: u8) -> Result<Decimal> {
	if !Decimal::is_valid_precision(precision, scale) {
		return_error!(invalid_precision(precision, scale));
	}

	let needs_trimming = text.as_bytes().first().map_or(false, |&b| b.is_ascii_whitespace())
		|| text.as_bytes().last().map_or(false, |&b| b.is_ascii_whitespace());
	let has_underscores = text.as_bytes().contains(&b'_');

	let value = match (needs_trimming, has_underscores) {
		(false, false) => Cow::Borrowed(text),
		(true, false) => Cow::Borrowed(text.trim()),
		(false, true) => Cow::Owned(text.replace('_', "")),
		(true, true) => Cow::Owned(text.trim().replace('_', "")),
	};

	if value.is_empty() {
		return_error!(invalid_decimal(text));
	}

	let big_decimal = BigDecimal::from_str(&value).map_err(|_| crate::error!(invalid_decimal(text)))?;

	match Decimal::from_big_decimal(&big_decimal, precision, scale) {
		Some(decimal) => Ok(decimal),
		None => return_error!(decimal_overflow(value.as_ref(), precision, scale)),
	}
}
