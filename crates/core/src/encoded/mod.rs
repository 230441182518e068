// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compact binary representation of rows.
//!
//! A record starts with a null bit set padded to whole 8-byte words, followed
//! by one 8-byte slot per field and a variable-length section. Fixed-width
//! values live directly in their slot. Variable-length values of at most
//! seven bytes are stored inline in the slot with the high bit set, anything
//! longer is referenced as `[offset: u32][length: u32]` into the variable
//! section. Arrays use the same layout behind a `[size: u32]` header and
//! maps are a pair of arrays.

mod array;
mod blob;
mod decimal;
mod encoder;
mod layout;
mod nested;
mod reader;
mod record;
mod temporal;
mod writer;

pub use array::{EncodedArray, EncodedArrayView, EncodedMap, EncodedMapView};
pub use encoder::{EncodeError, RecordEncoder};
pub use record::{EncodedRecord, EncodedRecordView};
pub use writer::{EncodedArrayWriter, EncodedRecordWriter, EncodedWriter};
