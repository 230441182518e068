// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use tributary_type::{SchemaVersion, TableId};

use crate::{record::RecordData, schema::SchemaChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
	Insert,
	Update,
	Delete,
	Replace,
}

impl Display for OperationType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			OperationType::Insert => "INSERT",
			OperationType::Update => "UPDATE",
			OperationType::Delete => "DELETE",
			OperationType::Replace => "REPLACE",
		};
		f.write_str(name)
	}
}

/// One row-level change captured from the source.
///
/// The row images are shared so a buffered event can be replayed without
/// copying its records.
#[derive(Debug, Clone)]
pub struct DataChangeEvent {
	table: TableId,
	op: OperationType,
	before: Option<Arc<dyn RecordData>>,
	after: Option<Arc<dyn RecordData>>,
}

impl DataChangeEvent {
	pub fn insert(table: TableId, after: impl RecordData + 'static) -> Self {
		Self {
			table,
			op: OperationType::Insert,
			before: None,
			after: Some(Arc::new(after)),
		}
	}

	pub fn update(table: TableId, before: impl RecordData + 'static, after: impl RecordData + 'static) -> Self {
		Self {
			table,
			op: OperationType::Update,
			before: Some(Arc::new(before)),
			after: Some(Arc::new(after)),
		}
	}

	pub fn delete(table: TableId, before: impl RecordData + 'static) -> Self {
		Self {
			table,
			op: OperationType::Delete,
			before: Some(Arc::new(before)),
			after: None,
		}
	}

	pub fn replace(table: TableId, after: impl RecordData + 'static) -> Self {
		Self {
			table,
			op: OperationType::Replace,
			before: None,
			after: Some(Arc::new(after)),
		}
	}

	pub fn table(&self) -> &TableId {
		&self.table
	}

	pub fn op(&self) -> OperationType {
		self.op
	}

	pub fn before(&self) -> Option<&dyn RecordData> {
		self.before.as_deref()
	}

	pub fn after(&self) -> Option<&dyn RecordData> {
		self.after.as_deref()
	}
}

/// Marker emitted by the source when the structure of a table changed.
/// Records after the marker follow the new schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChangeEvent {
	pub table: TableId,
	pub version: SchemaVersion,
	pub change: SchemaChange,
}

impl SchemaChangeEvent {
	pub fn new(table: TableId, version: impl Into<SchemaVersion>, change: SchemaChange) -> Self {
		Self {
			table,
			version: version.into(),
			change,
		}
	}
}

/// An element flowing through a subtask.
#[derive(Debug, Clone)]
pub enum StreamElement {
	Data(DataChangeEvent),
	SchemaChange(SchemaChangeEvent),
}

impl StreamElement {
	pub fn table(&self) -> &TableId {
		match self {
			StreamElement::Data(event) => event.table(),
			StreamElement::SchemaChange(event) => &event.table,
		}
	}
}

impl From<DataChangeEvent> for StreamElement {
	fn from(event: DataChangeEvent) -> Self {
		StreamElement::Data(event)
	}
}

impl From<SchemaChangeEvent> for StreamElement {
	fn from(event: SchemaChangeEvent) -> Self {
		StreamElement::SchemaChange(event)
	}
}
