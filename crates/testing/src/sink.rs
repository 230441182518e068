// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A sink writer that records every call for assertions.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::trace;
use tributary_core::{
	event::{DataChangeEvent, OperationType},
	interface::SinkWriter,
	record::{RecordData, materialize},
	schema::Schema,
};
use tributary_type::{
	Result, TableId, Value,
	error::{Diagnostic, Error},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
	Write {
		table: TableId,
		op: OperationType,
		/// The row image read with the schema the record was written under,
		/// the before image for deletes.
		values: Vec<Value>,
	},
	Flush(TableId),
	ApplySchema(TableId, Schema),
}

/// Records writes, flushes and applied schemas in call order.
///
/// Like a real sink it rejects a record whose arity does not match the
/// schema it is written with. Flush failures can be injected.
#[derive(Debug, Default)]
pub struct RecordingSink {
	calls: Mutex<Vec<SinkCall>>,
	failing_flushes: AtomicUsize,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make the next `count` flushes fail.
	pub fn fail_flushes(&self, count: usize) {
		self.failing_flushes.store(count, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<SinkCall> {
		self.calls.lock().clone()
	}

	/// Row images written to `table`, in order.
	pub fn writes(&self, table: &TableId) -> Vec<Vec<Value>> {
		self.calls
			.lock()
			.iter()
			.filter_map(|call| match call {
				SinkCall::Write {
					table: written,
					values,
					..
				} if written == table => Some(values.clone()),
				_ => None,
			})
			.collect()
	}

	pub fn flushes(&self, table: &TableId) -> usize {
		self.calls.lock().iter().filter(|call| matches!(call, SinkCall::Flush(flushed) if flushed == table)).count()
	}

	/// The last schema applied to `table`.
	pub fn schema(&self, table: &TableId) -> Option<Schema> {
		self.calls.lock().iter().rev().find_map(|call| match call {
			SinkCall::ApplySchema(applied, schema) if applied == table => Some(schema.clone()),
			_ => None,
		})
	}
}

impl SinkWriter for RecordingSink {
	fn write(&self, event: &DataChangeEvent, schema: &Schema) -> Result<()> {
		let record = match event.op() {
			OperationType::Delete => event.before(),
			_ => event.after(),
		};
		let values = match record {
			Some(record) => read(record, schema)?,
			None => vec![],
		};

		trace!(table = %event.table(), op = %event.op(), "recorded write");
		self.calls.lock().push(SinkCall::Write {
			table: event.table().clone(),
			op: event.op(),
			values,
		});
		Ok(())
	}

	fn flush(&self, table: &TableId) -> Result<()> {
		let failing = self.failing_flushes.load(Ordering::SeqCst);
		if failing > 0 {
			self.failing_flushes.store(failing - 1, Ordering::SeqCst);
			return Err(Error::new(Diagnostic {
				code: "TESTING_002".to_string(),
				message: format!("injected flush failure for {}", table),
				help: None,
				notes: vec![],
				cause: None,
			}));
		}

		self.calls.lock().push(SinkCall::Flush(table.clone()));
		Ok(())
	}

	fn apply_schema(&self, table: &TableId, schema: &Schema) -> Result<()> {
		self.calls.lock().push(SinkCall::ApplySchema(table.clone(), schema.clone()));
		Ok(())
	}
}

fn read(record: &dyn RecordData, schema: &Schema) -> Result<Vec<Value>> {
	if record.arity() != schema.arity() {
		return Err(Error::new(Diagnostic {
			code: "TESTING_003".to_string(),
			message: format!("record has {} fields, schema has {} columns", record.arity(), schema.arity()),
			help: None,
			notes: vec![],
			cause: None,
		}));
	}
	Ok(materialize(record, &schema.data_types()))
}

#[cfg(test)]
pub mod tests {
	use tributary_core::{
		Column, GenericRecord, Schema,
		event::{DataChangeEvent, OperationType},
		interface::SinkWriter,
	};
	use tributary_type::{DataType, TableId, Value};

	use crate::sink::{RecordingSink, SinkCall};

	fn orders() -> TableId {
		TableId::new("shop", "orders")
	}

	fn schema() -> Schema {
		Schema::new(vec![Column::new("id", DataType::Int), Column::new("item", DataType::Varchar)])
	}

	#[test]
	fn test_records_calls_in_order() {
		let sink = RecordingSink::new();
		sink.apply_schema(&orders(), &schema()).unwrap();
		sink.write(&DataChangeEvent::insert(orders(), GenericRecord::of([Value::Int(1), Value::from("pen")])), &schema())
			.unwrap();
		sink.flush(&orders()).unwrap();

		assert_eq!(
			sink.calls(),
			vec![
				SinkCall::ApplySchema(orders(), schema()),
				SinkCall::Write {
					table: orders(),
					op: OperationType::Insert,
					values: vec![Value::Int(1), Value::from("pen")],
				},
				SinkCall::Flush(orders()),
			]
		);
		assert_eq!(sink.writes(&orders()), vec![vec![Value::Int(1), Value::from("pen")]]);
		assert_eq!(sink.flushes(&orders()), 1);
		assert_eq!(sink.schema(&orders()), Some(schema()));
	}

	#[test]
	fn test_rejects_arity_mismatch() {
		let sink = RecordingSink::new();
		let err = sink.write(&DataChangeEvent::insert(orders(), GenericRecord::of([Value::Int(1)])), &schema()).unwrap_err();
		assert_eq!(err.code(), "TESTING_003");
		assert!(sink.calls().is_empty());
	}

	#[test]
	fn test_injected_flush_failures() {
		let sink = RecordingSink::new();
		sink.fail_flushes(2);

		assert!(sink.flush(&orders()).is_err());
		assert!(sink.flush(&orders()).is_err());
		assert!(sink.flush(&orders()).is_ok());
		assert_eq!(sink.flushes(&orders()), 1);
	}

	#[test]
	fn test_delete_records_before_image() {
		let sink = RecordingSink::new();
		sink.write(&DataChangeEvent::delete(orders(), GenericRecord::of([Value::Int(9), Value::Null])), &schema())
			.unwrap();
		assert_eq!(sink.writes(&orders()), vec![vec![Value::Int(9), Value::Null]]);
	}
}
