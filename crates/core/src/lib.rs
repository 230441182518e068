// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod encoded;
pub mod event;
pub mod interface;
pub mod record;
pub mod schema;

pub use encoded::{EncodedArray, EncodedMap, EncodedRecord, RecordEncoder};
pub use record::{ArrayData, FieldAccessor, GenericRecord, MapData, RecordData};
pub use schema::{Column, ColumnPosition, Schema, SchemaChange, SchemaError};
