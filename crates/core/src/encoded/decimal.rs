// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tributary_type::Decimal;

use crate::encoded::{encoder::EncodeError, reader::SlotReader, writer::EncodedWriter};

/// Decimal storage has two tiers selected by the declared precision:
/// - precision <= 18: the unscaled value is stored in the slot as an i64
/// - wider: the unscaled value is stored as big-endian two's complement bytes
///   in the variable section (inline when it fits)
impl EncodedWriter {
	pub fn write_decimal(&mut self, pos: usize, value: &Decimal, precision: u8) -> Result<(), EncodeError> {
		debug_assert_eq!(value.precision(), precision);
		if Decimal::is_compact(precision) {
			let unscaled = value.to_unscaled_long().ok_or_else(|| EncodeError::DecimalOverflow {
				pos,
				precision,
				value: value.to_string(),
			})?;
			self.write_long(pos, unscaled);
		} else {
			self.write_var(pos, &value.to_unscaled_bytes());
		}
		Ok(())
	}
}

impl<'a> SlotReader<'a> {
	pub(crate) fn get_decimal(self, pos: usize, precision: u8, scale: u8) -> Decimal {
		if Decimal::is_compact(precision) {
			Decimal::from_unscaled_long(self.get_long(pos), precision, scale)
		} else {
			Decimal::from_unscaled_bytes(self.var_bytes(pos), precision, scale)
		}
	}
}
