// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Debug, Formatter};

use tributary_type::util::CowVec;

use crate::{
	encoded::reader::SlotReader,
	record::{RecordData, impl_field_accessor},
};

/// An owned row in the binary layout.
///
/// Cloning shares the underlying buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedRecord {
	bytes: CowVec<u8>,
	num_fields: usize,
}

impl EncodedRecord {
	pub fn new(bytes: CowVec<u8>, num_fields: usize) -> Self {
		Self {
			bytes: bytes.share(),
			num_fields,
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn view(&self) -> EncodedRecordView<'_> {
		EncodedRecordView::new(&self.bytes, self.num_fields)
	}

	fn reader(&self) -> SlotReader<'_> {
		SlotReader::record(&self.bytes, self.num_fields)
	}
}

impl Debug for EncodedRecord {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EncodedRecord")
			.field("num_fields", &self.num_fields)
			.field("len", &self.bytes.len())
			.finish()
	}
}

impl_field_accessor!([] EncodedRecord, reader);

impl RecordData for EncodedRecord {
	fn arity(&self) -> usize {
		self.num_fields
	}
}

/// A borrowed row in the binary layout, typically a nested field.
#[derive(Debug, Clone, Copy)]
pub struct EncodedRecordView<'a> {
	bytes: &'a [u8],
	num_fields: usize,
}

impl<'a> EncodedRecordView<'a> {
	pub fn new(bytes: &'a [u8], num_fields: usize) -> Self {
		Self {
			bytes,
			num_fields,
		}
	}

	pub fn as_bytes(&self) -> &'a [u8] {
		self.bytes
	}

	/// Copy into an owned record.
	pub fn to_record(&self) -> EncodedRecord {
		EncodedRecord::new(CowVec::new(self.bytes.to_vec()), self.num_fields)
	}

	fn reader(&self) -> SlotReader<'a> {
		SlotReader::record(self.bytes, self.num_fields)
	}
}

impl_field_accessor!(['a] EncodedRecordView<'a>, reader);

impl RecordData for EncodedRecordView<'_> {
	fn arity(&self) -> usize {
		self.num_fields
	}
}
