// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use serde::{Deserialize, Serialize};

mod parse;

pub use parse::parse_decimal;

/// Largest precision whose unscaled value always fits in an `i64`.
pub const MAX_COMPACT_PRECISION: u8 = 18;

pub const MAX_PRECISION: u8 = 38;

/// A fixed precision/scale decimal.
///
/// Values with `precision <= 18` keep their unscaled value in an `i64`
/// (compact); wider ones keep an arbitrary precision decimal (boxed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
	precision: u8,
	scale: u8,
	repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Repr {
	Compact(i64),
	Boxed(BigDecimal),
}

impl Decimal {
	pub fn is_compact(precision: u8) -> bool {
		precision <= MAX_COMPACT_PRECISION
	}

	pub fn is_valid_precision(precision: u8, scale: u8) -> bool {
		precision >= 1 && precision <= MAX_PRECISION && scale <= precision
	}

	/// Rescale `value` to `scale` (rounding half-up) and check it fits
	/// `precision`. Returns `None` on overflow.
	pub fn from_big_decimal(value: &BigDecimal, precision: u8, scale: u8) -> Option<Self> {
		let rescaled = value.with_scale_round(scale as i64, RoundingMode::HalfUp);
		let (unscaled, _) = rescaled.as_bigint_and_exponent();
		if digit_count(&unscaled) > precision as usize {
			return None;
		}

		let repr = if Self::is_compact(precision) {
			Repr::Compact(unscaled.to_i64()?)
		} else {
			Repr::Boxed(rescaled)
		};

		Some(Self {
			precision,
			scale,
			repr,
		})
	}

	/// Wrap an unscaled value already known to fit the precision.
	pub fn from_unscaled_long(unscaled: i64, precision: u8, scale: u8) -> Self {
		let repr = if Self::is_compact(precision) {
			Repr::Compact(unscaled)
		} else {
			Repr::Boxed(BigDecimal::new(BigInt::from(unscaled), scale as i64))
		};
		Self {
			precision,
			scale,
			repr,
		}
	}

	/// Wrap a big-endian two's complement unscaled value.
	pub fn from_unscaled_bytes(bytes: &[u8], precision: u8, scale: u8) -> Self {
		let unscaled = BigInt::from_signed_bytes_be(bytes);
		let repr = match (Self::is_compact(precision), unscaled.to_i64()) {
			(true, Some(compact)) => Repr::Compact(compact),
			_ => Repr::Boxed(BigDecimal::new(unscaled, scale as i64)),
		};
		Self {
			precision,
			scale,
			repr,
		}
	}

	pub fn zero(precision: u8, scale: u8) -> Self {
		Self::from_unscaled_long(0, precision, scale)
	}

	pub fn precision(&self) -> u8 {
		self.precision
	}

	pub fn scale(&self) -> u8 {
		self.scale
	}

	pub fn is_compact_value(&self) -> bool {
		matches!(self.repr, Repr::Compact(_))
	}

	/// The unscaled value of a compact decimal.
	///
	/// Boxed decimals whose unscaled value happens to fit are converted; wider
	/// ones return `None`.
	pub fn to_unscaled_long(&self) -> Option<i64> {
		match &self.repr {
			Repr::Compact(unscaled) => Some(*unscaled),
			Repr::Boxed(value) => value.as_bigint_and_exponent().0.to_i64(),
		}
	}

	pub fn to_unscaled_bytes(&self) -> Vec<u8> {
		match &self.repr {
			Repr::Compact(unscaled) => BigInt::from(*unscaled).to_signed_bytes_be(),
			Repr::Boxed(value) => value.as_bigint_and_exponent().0.to_signed_bytes_be(),
		}
	}

	pub fn to_big_decimal(&self) -> BigDecimal {
		match &self.repr {
			Repr::Compact(unscaled) => BigDecimal::new(BigInt::from(*unscaled), self.scale as i64),
			Repr::Boxed(value) => value.clone(),
		}
	}

	pub fn is_negative(&self) -> bool {
		match &self.repr {
			Repr::Compact(unscaled) => *unscaled < 0,
			Repr::Boxed(value) => value.is_negative(),
		}
	}
}

fn digit_count(unscaled: &BigInt) -> usize {
	unscaled.abs().to_string().len()
}

impl Display for Decimal {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let unscaled = match &self.repr {
			Repr::Compact(unscaled) => BigInt::from(*unscaled),
			Repr::Boxed(value) => value.as_bigint_and_exponent().0,
		};

		let digits = unscaled.abs().to_string();
		let sign = if unscaled.is_negative() {
			"-"
		} else {
			""
		};
		let scale = self.scale as usize;
		if scale == 0 {
			return write!(f, "{}{}", sign, digits);
		}

		let padded = if digits.len() <= scale {
			format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
		} else {
			digits
		};
		let (int_part, frac_part) = padded.split_at(padded.len() - scale);
		write!(f, "{}{}.{}", sign, int_part, frac_part)
	}
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn test_compact_from_big_decimal() {
		let value = BigDecimal::from_str("12345.67").unwrap();
		let decimal = Decimal::from_big_decimal(&value, 10, 2).unwrap();
		assert!(decimal.is_compact_value());
		assert_eq!(decimal.to_unscaled_long(), Some(1234567));
		assert_eq!(decimal.to_string(), "12345.67");
	}

	#[test]
	fn test_boxed_from_big_decimal() {
		let value = BigDecimal::from_str("123456789012345678901234.5678").unwrap();
		let decimal = Decimal::from_big_decimal(&value, 30, 4).unwrap();
		assert!(!decimal.is_compact_value());
		assert_eq!(decimal.to_string(), "123456789012345678901234.5678");
		assert_eq!(decimal.to_unscaled_long(), None);
	}

	#[test]
	fn test_rescale_rounds_half_up() {
		let value = BigDecimal::from_str("1.005").unwrap();
		let decimal = Decimal::from_big_decimal(&value, 5, 2).unwrap();
		assert_eq!(decimal.to_string(), "1.01");
	}

	#[test]
	fn test_overflow_returns_none() {
		let value = BigDecimal::from_str("12345.6").unwrap();
		assert!(Decimal::from_big_decimal(&value, 4, 1).is_none());
	}

	#[test]
	fn test_unscaled_bytes_round_trip_boxed() {
		let value = BigDecimal::from_str("-98765432109876543210.12").unwrap();
		let decimal = Decimal::from_big_decimal(&value, 25, 2).unwrap();
		let bytes = decimal.to_unscaled_bytes();
		assert_eq!(Decimal::from_unscaled_bytes(&bytes, 25, 2), decimal);
	}

	#[test]
	fn test_display_small_fraction() {
		assert_eq!(Decimal::from_unscaled_long(5, 5, 3).to_string(), "0.005");
		assert_eq!(Decimal::from_unscaled_long(-5, 5, 3).to_string(), "-0.005");
		assert_eq!(Decimal::from_unscaled_long(42, 5, 0).to_string(), "42");
	}

	#[test]
	fn test_valid_precision() {
		assert!(Decimal::is_valid_precision(10, 2));
		assert!(!Decimal::is_valid_precision(0, 0));
		assert!(!Decimal::is_valid_precision(39, 2));
		assert!(!Decimal::is_valid_precision(4, 5));
	}
}
