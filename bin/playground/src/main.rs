// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{
	sync::Arc,
	thread::sleep,
	time::{Duration, Instant},
};

use tracing::{Level, info};
use tributary_core::{
	Column, ColumnPosition, GenericRecord, Schema, SchemaChange,
	event::{DataChangeEvent, SchemaChangeEvent},
	interface::SinkWriter,
	record::materialize,
};
use tributary_sub_schema::{SchemaEvolutionConfig, SchemaEvolutionJob};
use tributary_sub_tracing::TracingBuilder;
use tributary_type::{
	DataType, Decimal, Result, SchemaVersion, SubtaskId, TableId, Value, error::diagnostic::internal::internal,
	return_error,
};

/// Logs what a real sink would write.
struct ConsoleSink(SubtaskId);

impl SinkWriter for ConsoleSink {
	fn write(&self, event: &DataChangeEvent, schema: &Schema) -> Result<()> {
		if let Some(after) = event.after() {
			let names: Vec<&str> = schema.columns().iter().map(|column| column.name.as_str()).collect();
			let values = materialize(after, &schema.data_types());
			info!(subtask = self.0.0, table = %event.table(), op = %event.op(), ?names, ?values, "write");
		}
		Ok(())
	}

	fn flush(&self, table: &TableId) -> Result<()> {
		info!(subtask = self.0.0, %table, "flush");
		Ok(())
	}

	fn apply_schema(&self, table: &TableId, schema: &Schema) -> Result<()> {
		let columns: Vec<String> =
			schema.columns().iter().map(|column| format!("{} {}", column.name, column.data_type)).collect();
		info!(subtask = self.0.0, %table, ?columns, "apply schema");
		Ok(())
	}
}

fn orders() -> TableId {
	TableId::new("shop", "orders")
}

fn order(id: i32, item: &str) -> DataChangeEvent {
	DataChangeEvent::insert(orders(), GenericRecord::of([Value::Int(id), Value::from(item)]))
}

fn priced_order(id: i32, item: &str, cents: i64) -> DataChangeEvent {
	DataChangeEvent::insert(
		orders(),
		GenericRecord::of([Value::Int(id), Value::from(item), Value::Decimal(Decimal::from_unscaled_long(cents, 10, 2))]),
	)
}

fn wait_for_version(job: &SchemaEvolutionJob, version: u64) -> Result<()> {
	let deadline = Instant::now() + Duration::from_secs(5);
	while job.snapshot()?.version(&orders()) < Some(SchemaVersion(version)) {
		if Instant::now() > deadline {
			return_error!(internal(format!("schema version {} was never released", version)));
		}
		sleep(Duration::from_millis(5));
	}
	Ok(())
}

fn main() -> Result<()> {
	TracingBuilder::new().level(Level::INFO).try_init()?;

	let job = SchemaEvolutionJob::builder(SchemaEvolutionConfig::new("orders-sink"))
		.parallelism(3)
		.sink(|subtask| Arc::new(ConsoleSink(subtask)) as Arc<dyn SinkWriter>)
		.start()?;

	info!("=== create shop.orders ===");
	let schema = Schema::new(vec![Column::new("id", DataType::Int).not_null(), Column::new("item", DataType::Varchar)])
		.with_primary_keys(["id"]);
	job.request_schema_change(SchemaChangeEvent::new(orders(), 1, SchemaChange::CreateTable(schema)))?;
	wait_for_version(&job, 1)?;

	for id in 0..6 {
		job.send(SubtaskId(id as u32 % 3), order(id, "pen"))?;
	}

	info!("=== add column price, restarting subtask 1 during the round ===");
	job.request_schema_change(SchemaChangeEvent::new(
		orders(),
		2,
		SchemaChange::AddColumn {
			column: Column::new("price", DataType::decimal(10, 2)),
			position: ColumnPosition::Last,
		},
	))?;
	job.restart(SubtaskId(1))?;
	wait_for_version(&job, 2)?;

	for id in 6..9 {
		job.send(SubtaskId(id as u32 % 3), priced_order(id, "ink", 250))?;
	}

	let snapshot = job.snapshot()?;
	info!("coordinator snapshot:\n{}", serde_json::to_string_pretty(&snapshot).unwrap_or_default());

	job.shutdown();
	Ok(())
}
