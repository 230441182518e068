// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tributary_type::util::CowVec;

use crate::{
	encoded::{
		layout::HEADER_SIZE,
		reader::{SlotReader, read_u32},
	},
	record::{ArrayData, MapData, impl_field_accessor},
};

/// An owned array in the binary layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArray {
	bytes: CowVec<u8>,
}

impl EncodedArray {
	pub fn new(bytes: CowVec<u8>) -> Self {
		Self {
			bytes: bytes.share(),
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn view(&self) -> EncodedArrayView<'_> {
		EncodedArrayView::new(&self.bytes)
	}

	fn reader(&self) -> SlotReader<'_> {
		SlotReader::array(&self.bytes)
	}
}

impl_field_accessor!([] EncodedArray, reader);

impl ArrayData for EncodedArray {
	fn size(&self) -> usize {
		self.reader().count()
	}
}

#[derive(Debug, Clone, Copy)]
pub struct EncodedArrayView<'a> {
	bytes: &'a [u8],
}

impl<'a> EncodedArrayView<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
		}
	}

	pub fn as_bytes(&self) -> &'a [u8] {
		self.bytes
	}

	fn reader(&self) -> SlotReader<'a> {
		SlotReader::array(self.bytes)
	}
}

impl_field_accessor!(['a] EncodedArrayView<'a>, reader);

impl ArrayData for EncodedArrayView<'_> {
	fn size(&self) -> usize {
		self.reader().count()
	}
}

/// An owned map in the binary layout: a key array followed by a value array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMap {
	bytes: CowVec<u8>,
}

impl EncodedMap {
	pub fn new(keys: &EncodedArray, values: &EncodedArray) -> Self {
		debug_assert_eq!(keys.size(), values.size());
		let mut bytes = Vec::with_capacity(HEADER_SIZE + keys.as_bytes().len() + values.as_bytes().len());
		bytes.extend_from_slice(&(keys.as_bytes().len() as u32).to_le_bytes());
		bytes.extend_from_slice(&[0u8; 4]);
		bytes.extend_from_slice(keys.as_bytes());
		bytes.extend_from_slice(values.as_bytes());
		Self {
			bytes: CowVec::new(bytes).share(),
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn view(&self) -> EncodedMapView<'_> {
		EncodedMapView::new(&self.bytes)
	}
}

impl MapData for EncodedMap {
	fn size(&self) -> usize {
		self.view().size()
	}

	fn key_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(self.view().keys())
	}

	fn value_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(self.view().values())
	}
}

#[derive(Debug, Clone, Copy)]
pub struct EncodedMapView<'a> {
	bytes: &'a [u8],
}

impl<'a> EncodedMapView<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
		}
	}

	pub fn keys(&self) -> EncodedArrayView<'a> {
		let len = read_u32(self.bytes, 0) as usize;
		EncodedArrayView::new(self.bytes.get(HEADER_SIZE..HEADER_SIZE + len).unwrap_or(&[]))
	}

	pub fn values(&self) -> EncodedArrayView<'a> {
		let len = read_u32(self.bytes, 0) as usize;
		EncodedArrayView::new(self.bytes.get(HEADER_SIZE + len..).unwrap_or(&[]))
	}
}

impl MapData for EncodedMapView<'_> {
	fn size(&self) -> usize {
		self.keys().size()
	}

	fn key_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(self.keys())
	}

	fn value_array(&self) -> Box<dyn ArrayData + '_> {
		Box::new(self.values())
	}
}
