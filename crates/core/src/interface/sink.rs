// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tributary_type::{Result, TableId};

use crate::{event::DataChangeEvent, schema::Schema};

/// The external sink a subtask writes to.
pub trait SinkWriter: Send + Sync {
	/// Write one change. `schema` describes the layout of its row images.
	fn write(&self, event: &DataChangeEvent, schema: &Schema) -> Result<()>;

	/// Make every write for `table` so far durable.
	fn flush(&self, table: &TableId) -> Result<()>;

	/// Switch `table` to `schema` before records of the new layout arrive.
	fn apply_schema(&self, table: &TableId, schema: &Schema) -> Result<()>;
}

impl<T: SinkWriter + ?Sized> SinkWriter for Arc<T> {
	fn write(&self, event: &DataChangeEvent, schema: &Schema) -> Result<()> {
		(**self).write(event, schema)
	}

	fn flush(&self, table: &TableId) -> Result<()> {
		(**self).flush(table)
	}

	fn apply_schema(&self, table: &TableId, schema: &Schema) -> Result<()> {
		(**self).apply_schema(table, schema)
	}
}
