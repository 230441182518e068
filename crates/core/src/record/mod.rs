// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Positional, typed read access to row values.
//!
//! [`RecordData`] is the contract every stage of the pipeline reads rows
//! through. Two representations implement it: the binary
//! [`EncodedRecord`](crate::encoded::EncodedRecord) and the tagged-variant
//! [`GenericRecord`]. Nullability is owned by the container, so callers check
//! [`FieldAccessor::is_null_at`] before calling a getter.
//!
//! Calling a getter on a null position, or with an accessor that does not
//! match the field type, is a caller error. The binary form returns whatever
//! the slot holds and the generic form panics with a type mismatch.

use std::fmt::Debug;

use tributary_type::{Decimal, LocalZonedTimestampData, TimestampData, ZonedTimestampData};

mod generic;
mod getter;

pub use generic::{GenericArray, GenericMap, GenericRecord};
pub use getter::{ElementGetter, FieldGetter, element_getter, field_getter, materialize};

/// Typed getters shared by rows and arrays.
pub trait FieldAccessor: Debug + Send + Sync {
	fn is_null_at(&self, pos: usize) -> bool;

	fn get_boolean(&self, pos: usize) -> bool;

	fn get_byte(&self, pos: usize) -> i8;

	fn get_short(&self, pos: usize) -> i16;

	/// Also used for `DATE` (days since epoch) and `TIME` (millis of day).
	fn get_int(&self, pos: usize) -> i32;

	fn get_long(&self, pos: usize) -> i64;

	fn get_float(&self, pos: usize) -> f32;

	fn get_double(&self, pos: usize) -> f64;

	fn get_binary(&self, pos: usize) -> &[u8];

	fn get_string(&self, pos: usize) -> &str;

	/// The precision and scale are required because the physical layout of
	/// a decimal depends on them.
	fn get_decimal(&self, pos: usize, precision: u8, scale: u8) -> Decimal;

	fn get_timestamp(&self, pos: usize, precision: u8) -> TimestampData;

	fn get_zoned_timestamp(&self, pos: usize, precision: u8) -> ZonedTimestampData;

	fn get_local_zoned_timestamp(&self, pos: usize, precision: u8) -> LocalZonedTimestampData;

	fn get_array(&self, pos: usize) -> Box<dyn ArrayData + '_>;

	fn get_map(&self, pos: usize) -> Box<dyn MapData + '_>;

	/// `num_fields` is needed to locate the slots of the nested row.
	fn get_row(&self, pos: usize, num_fields: usize) -> Box<dyn RecordData + '_>;
}

/// A read-only view of one row.
pub trait RecordData: FieldAccessor {
	/// Number of fields in this row.
	fn arity(&self) -> usize;
}

/// A read-only view of an array value.
pub trait ArrayData: FieldAccessor {
	fn size(&self) -> usize;
}

/// A read-only view of a map value as parallel key and value arrays.
pub trait MapData: Debug + Send + Sync {
	fn size(&self) -> usize;

	fn key_array(&self) -> Box<dyn ArrayData + '_>;

	fn value_array(&self) -> Box<dyn ArrayData + '_>;
}

/// Implements [`FieldAccessor`] by forwarding to a positional reader.
///
/// The reader returned by `$reader` must expose the same getter names and
/// return nested views that implement the matching trait.
macro_rules! impl_field_accessor {
	([$($generics:tt)*] $ty:ty, $reader:ident) => {
		impl<$($generics)*> $crate::record::FieldAccessor for $ty {
			fn is_null_at(&self, pos: usize) -> bool {
				self.$reader().is_null_at(pos)
			}

			fn get_boolean(&self, pos: usize) -> bool {
				self.$reader().get_boolean(pos)
			}

			fn get_byte(&self, pos: usize) -> i8 {
				self.$reader().get_byte(pos)
			}

			fn get_short(&self, pos: usize) -> i16 {
				self.$reader().get_short(pos)
			}

			fn get_int(&self, pos: usize) -> i32 {
				self.$reader().get_int(pos)
			}

			fn get_long(&self, pos: usize) -> i64 {
				self.$reader().get_long(pos)
			}

			fn get_float(&self, pos: usize) -> f32 {
				self.$reader().get_float(pos)
			}

			fn get_double(&self, pos: usize) -> f64 {
				self.$reader().get_double(pos)
			}

			fn get_binary(&self, pos: usize) -> &[u8] {
				self.$reader().get_binary(pos)
			}

			fn get_string(&self, pos: usize) -> &str {
				self.$reader().get_string(pos)
			}

			fn get_decimal(&self, pos: usize, precision: u8, scale: u8) -> tributary_type::Decimal {
				self.$reader().get_decimal(pos, precision, scale)
			}

			fn get_timestamp(&self, pos: usize, precision: u8) -> tributary_type::TimestampData {
				self.$reader().get_timestamp(pos, precision)
			}

			fn get_zoned_timestamp(&self, pos: usize, precision: u8) -> tributary_type::ZonedTimestampData {
				self.$reader().get_zoned_timestamp(pos, precision)
			}

			fn get_local_zoned_timestamp(
				&self,
				pos: usize,
				precision: u8,
			) -> tributary_type::LocalZonedTimestampData {
				self.$reader().get_local_zoned_timestamp(pos, precision)
			}

			fn get_array(&self, pos: usize) -> Box<dyn $crate::record::ArrayData + '_> {
				Box::new(self.$reader().get_array(pos))
			}

			fn get_map(&self, pos: usize) -> Box<dyn $crate::record::MapData + '_> {
				Box::new(self.$reader().get_map(pos))
			}

			fn get_row(&self, pos: usize, num_fields: usize) -> Box<dyn $crate::record::RecordData + '_> {
				Box::new(self.$reader().get_row(pos, num_fields))
			}
		}
	};
}

pub(crate) use impl_field_accessor;
