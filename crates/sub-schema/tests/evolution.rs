// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! End to end schema evolution across parallel subtasks

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use tributary_core::{
	Column, ColumnPosition, GenericRecord, Schema, SchemaChange,
	event::{DataChangeEvent, SchemaChangeEvent, StreamElement},
	interface::{CoordinatorGateway, SinkWriter},
};
use tributary_sub_schema::{
	OperatorState, RetryPolicy, SchemaEvolutionConfig, SchemaEvolutionJob, SchemaEvolutionJobBuilder, TablePhase,
};
use tributary_testing::{FlakyGateway, RecordingSink, wait_for};
use tributary_type::{DataType, Decimal, Result, SchemaVersion, SubtaskId, TableId, Value};

struct Fixture {
	job: SchemaEvolutionJob,
	sinks: Vec<Arc<RecordingSink>>,
}

impl Fixture {
	fn start(parallelism: u32) -> Result<Self> {
		Self::start_with(parallelism, |builder| builder)
	}

	fn start_with(
		parallelism: u32,
		configure: impl FnOnce(SchemaEvolutionJobBuilder) -> SchemaEvolutionJobBuilder,
	) -> Result<Self> {
		let sinks: Vec<Arc<RecordingSink>> = (0..4).map(|_| Arc::new(RecordingSink::new())).collect();
		let factory = sinks.clone();
		let config = SchemaEvolutionConfig::new("schema-evolution").retry(RetryPolicy::new(5, Duration::from_millis(5)));
		let builder = SchemaEvolutionJob::builder(config)
			.parallelism(parallelism)
			.sink(move |subtask| factory[subtask.0 as usize].clone() as Arc<dyn SinkWriter>);
		let job = configure(builder).start()?;

		let fixture = Self {
			job,
			sinks,
		};
		fixture.wait_registered(parallelism as usize);
		Ok(fixture)
	}

	fn sink(&self, subtask: u32) -> &RecordingSink {
		&self.sinks[subtask as usize]
	}

	fn wait_registered(&self, count: usize) {
		wait_for(
			|| self.job.snapshot().map(|snapshot| snapshot.subtasks.len() == count).unwrap_or(false),
			"subtasks should register",
		);
	}

	fn wait_released(&self, table: &TableId, version: u64) {
		wait_for(
			|| {
				self.job.snapshot()
					.map(|snapshot| snapshot.version(table) >= Some(SchemaVersion(version)))
					.unwrap_or(false)
			},
			"schema version should be released",
		);
	}

	fn wait_phase(&self, subtask: u32, table: &TableId, phase: TablePhase) {
		wait_for(
			|| {
				self.job.operator_status(SubtaskId(subtask))
					.and_then(|status| status.table(table).map(|table| table.phase))
					== Some(phase)
			},
			"table should reach phase",
		);
	}

	fn wait_version(&self, subtask: u32, table: &TableId, version: u64) {
		wait_for(
			|| {
				self.job.operator_status(SubtaskId(subtask))
					.and_then(|status| status.table(table).cloned())
					.is_some_and(|table| {
						table.version == SchemaVersion(version) && table.phase == TablePhase::Normal
					})
			},
			"subtask should adopt schema version",
		);
	}

	fn wait_writes(&self, subtask: u32, table: &TableId, count: usize) {
		wait_for(|| self.sink(subtask).writes(table).len() >= count, "records should be written");
	}

	/// Create `orders` at version 1 on every subtask.
	fn create_orders(&self) -> Result<()> {
		self.job.request_schema_change(SchemaChangeEvent::new(orders(), 1, SchemaChange::CreateTable(orders_v1())))?;
		self.wait_released(&orders(), 1);
		for subtask in self.job.subtasks() {
			self.wait_version(subtask.0, &orders(), 1);
		}
		Ok(())
	}
}

fn orders() -> TableId {
	TableId::new("shop", "orders")
}

fn items() -> TableId {
	TableId::new("shop", "items")
}

fn orders_v1() -> Schema {
	Schema::new(vec![Column::new("id", DataType::Int).not_null(), Column::new("item", DataType::Varchar)])
		.with_primary_keys(["id"])
}

fn orders_v2() -> Schema {
	Schema::new(vec![
		Column::new("id", DataType::Int).not_null(),
		Column::new("item", DataType::Varchar),
		Column::new("price", DataType::decimal(10, 2)),
	])
	.with_primary_keys(["id"])
}

fn add_price() -> SchemaChangeEvent {
	SchemaChangeEvent::new(
		orders(),
		2,
		SchemaChange::AddColumn {
			column: Column::new("price", DataType::decimal(10, 2)),
			position: ColumnPosition::Last,
		},
	)
}

fn order(id: i32) -> DataChangeEvent {
	DataChangeEvent::insert(orders(), GenericRecord::of([Value::Int(id), Value::from("pen")]))
}

fn price(cents: i64) -> Value {
	Value::Decimal(Decimal::from_unscaled_long(cents, 10, 2))
}

fn priced_order(id: i32, cents: i64) -> DataChangeEvent {
	DataChangeEvent::insert(orders(), GenericRecord::of([Value::Int(id), Value::from("ink"), price(cents)]))
}

#[test]
fn test_create_table_then_write() -> Result<()> {
	let fixture = Fixture::start(3)?;
	fixture.create_orders()?;

	for subtask in 0..3 {
		fixture.job.send(SubtaskId(subtask), order(subtask as i32))?;
	}
	for subtask in 0..3 {
		fixture.wait_writes(subtask, &orders(), 1);
		assert_eq!(fixture.sink(subtask).writes(&orders()), vec![vec![Value::Int(subtask as i32), Value::from("pen")]]);
		assert_eq!(fixture.sink(subtask).schema(&orders()), Some(orders_v1()));
	}

	let snapshot = fixture.job.snapshot()?;
	assert_eq!(snapshot.releases, 1);
	assert!(snapshot.rounds.is_empty());

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_records_before_create_are_held() -> Result<()> {
	let fixture = Fixture::start(1)?;

	fixture.job.send(SubtaskId(0), order(1))?;
	wait_for(
		|| {
			fixture.job.operator_status(SubtaskId(0))
				.and_then(|status| status.table(&orders()).map(|table| table.buffered))
				== Some(1)
		},
		"record should be held back",
	);
	assert!(fixture.sink(0).writes(&orders()).is_empty());

	fixture.create_orders()?;
	fixture.wait_writes(0, &orders(), 1);
	assert_eq!(fixture.sink(0).writes(&orders()), vec![vec![Value::Int(1), Value::from("pen")]]);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_restart_during_round_acknowledges_again() -> Result<()> {
	let fixture = Fixture::start(3)?;
	fixture.create_orders()?;

	// subtask 1 has not seen the marker yet
	fixture.job.send(SubtaskId(0), add_price())?;
	fixture.job.send(SubtaskId(2), add_price())?;
	fixture.wait_phase(0, &orders(), TablePhase::Blocked(SchemaVersion(2)));
	fixture.wait_phase(2, &orders(), TablePhase::Blocked(SchemaVersion(2)));

	let snapshot = fixture.job.snapshot()?;
	let round = snapshot.round(&orders()).expect("round should be open");
	assert_eq!(round.version, SchemaVersion(2));
	assert_eq!(round.pending, BTreeSet::from([SubtaskId(1)]));

	// held back while blocked
	fixture.job.send(SubtaskId(0), priced_order(10, 250))?;

	fixture.job.restart(SubtaskId(1))?;
	fixture.wait_released(&orders(), 2);

	let snapshot = fixture.job.snapshot()?;
	assert!(snapshot.subtasks.contains(&(SubtaskId(1), 1)));
	assert_eq!(snapshot.releases, 2);

	// the upstream replays the marker to the new incarnation
	fixture.job.send(SubtaskId(1), add_price())?;
	fixture.job.send(SubtaskId(1), priced_order(11, 300))?;

	fixture.wait_writes(0, &orders(), 1);
	fixture.wait_writes(1, &orders(), 1);
	assert_eq!(fixture.sink(0).writes(&orders()), vec![vec![Value::Int(10), Value::from("ink"), price(250)]]);
	assert_eq!(fixture.sink(1).writes(&orders()), vec![vec![Value::Int(11), Value::from("ink"), price(300)]]);
	for subtask in 0..3 {
		fixture.wait_version(subtask, &orders(), 2);
		assert_eq!(fixture.sink(subtask).schema(&orders()), Some(orders_v2()));
	}

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_late_registrant_does_not_block_round() -> Result<()> {
	let fixture = Fixture::start(2)?;
	let create = SchemaChangeEvent::new(
		items(),
		1,
		SchemaChange::CreateTable(Schema::new(vec![Column::new("sku", DataType::Varchar)])),
	);
	fixture.job.request_schema_change(create)?;
	fixture.wait_released(&items(), 1);

	let add_stock = SchemaChangeEvent::new(
		items(),
		2,
		SchemaChange::AddColumn {
			column: Column::new("stock", DataType::BigInt),
			position: ColumnPosition::Last,
		},
	);
	fixture.job.send(SubtaskId(0), add_stock.clone())?;
	fixture.wait_phase(0, &items(), TablePhase::Blocked(SchemaVersion(2)));

	fixture.job.add_subtask(SubtaskId(2))?;
	fixture.wait_registered(3);
	fixture.wait_version(2, &items(), 1);

	let snapshot = fixture.job.snapshot()?;
	let round = snapshot.round(&items()).expect("round should be open");
	assert_eq!(round.required, BTreeSet::from([SubtaskId(0), SubtaskId(1)]));
	assert_eq!(round.pending, BTreeSet::from([SubtaskId(1)]));

	fixture.job.send(SubtaskId(1), add_stock.clone())?;
	fixture.wait_released(&items(), 2);
	for subtask in 0..3 {
		fixture.wait_version(subtask, &items(), 2);
	}

	// a marker the late registrant sees afterwards changes nothing
	fixture.job.send(SubtaskId(2), add_stock)?;
	fixture.job.send(SubtaskId(2), DataChangeEvent::insert(items(), GenericRecord::of([Value::from("a-1"), Value::BigInt(4)])))?;
	fixture.wait_writes(2, &items(), 1);
	assert_eq!(fixture.sink(2).writes(&items()), vec![vec![Value::from("a-1"), Value::BigInt(4)]]);
	assert_eq!(fixture.job.snapshot()?.releases, 2);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_duplicate_marker_and_flush_success() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;

	fixture.job.send(SubtaskId(0), add_price())?;
	fixture.job.send(SubtaskId(0), add_price())?;
	fixture.wait_phase(0, &orders(), TablePhase::Blocked(SchemaVersion(2)));
	wait_for(
		|| {
			fixture.job.snapshot().ok().and_then(|snapshot| snapshot.round(&orders()).cloned()).is_some_and(
				|round| round.acknowledged.contains(&SubtaskId(0)),
			)
		},
		"flush success should be counted",
	);

	let status = fixture.job.operator_status(SubtaskId(0)).expect("subtask 0 runs");
	assert_eq!(status.table(&orders()).map(|table| table.buffered), Some(0));

	fixture.job.client().notify_flush_success(SubtaskId(0), orders(), SchemaVersion(2))?;
	let snapshot = fixture.job.snapshot()?;
	let round = snapshot.round(&orders()).expect("round should still be open");
	assert_eq!(round.acknowledged, BTreeSet::from([SubtaskId(0)]));
	assert_eq!(round.pending, BTreeSet::from([SubtaskId(1)]));

	fixture.job.send(SubtaskId(1), add_price())?;
	fixture.wait_released(&orders(), 2);
	assert_eq!(fixture.job.snapshot()?.releases, 2);
	assert_eq!(fixture.sink(0).flushes(&orders()), 2);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_redelivered_flush_success_does_not_release_next_round() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;

	fixture.job.send(SubtaskId(0), add_price())?;
	wait_for(
		|| {
			fixture.job.snapshot().ok().and_then(|snapshot| snapshot.round(&orders()).cloned()).is_some_and(
				|round| round.version == SchemaVersion(2) && round.acknowledged.contains(&SubtaskId(0)),
			)
		},
		"round for version 2 should be open",
	);

	fixture.job.client().notify_flush_success(SubtaskId(1), orders(), SchemaVersion(1))?;
	fixture.job.client().notify_flush_success(SubtaskId(1), orders(), SchemaVersion(1))?;

	let snapshot = fixture.job.snapshot()?;
	let round = snapshot.round(&orders()).expect("round should still be open");
	assert_eq!(round.version, SchemaVersion(2));
	assert_eq!(round.pending, BTreeSet::from([SubtaskId(1)]));
	assert_eq!(snapshot.version(&orders()), Some(SchemaVersion(1)));
	assert_eq!(snapshot.releases, 1);

	fixture.job.send(SubtaskId(1), add_price())?;
	fixture.wait_released(&orders(), 2);
	assert_eq!(fixture.sink(1).flushes(&orders()), 2);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_transport_failures_are_retried() -> Result<()> {
	let fixture = Fixture::start_with(3, |builder| {
		builder.wrap_gateway(|local| Arc::new(FlakyGateway::new(local, 3)) as Arc<dyn CoordinatorGateway>)
	})?;
	fixture.create_orders()?;

	fixture.job.send(SubtaskId(2), order(7))?;
	fixture.wait_writes(2, &orders(), 1);
	for subtask in 0..3 {
		assert_eq!(fixture.job.operator_status(SubtaskId(subtask)).map(|status| status.state), Some(OperatorState::Running));
	}

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_retries_exhausted_fails_subtask_until_restart() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;

	fixture.sink(0).fail_flushes(usize::MAX);
	fixture.job.request_schema_change(add_price())?;

	wait_for(
		|| fixture.job.operator_status(SubtaskId(0)).is_some_and(|status| status.is_failed()),
		"subtask 0 should give up",
	);
	let Some(OperatorState::Failed(reason)) = fixture.job.operator_status(SubtaskId(0)).map(|status| status.state) else {
		panic!("subtask 0 should be failed");
	};
	assert!(reason.contains("EVOLUTION_003"), "{}", reason);

	fixture.wait_phase(1, &orders(), TablePhase::Blocked(SchemaVersion(2)));
	let snapshot = fixture.job.snapshot()?;
	let round = snapshot.round(&orders()).expect("round waits for subtask 0");
	assert_eq!(round.pending, BTreeSet::from([SubtaskId(0)]));

	fixture.sink(0).fail_flushes(0);
	fixture.job.restart(SubtaskId(0))?;
	fixture.wait_released(&orders(), 2);
	fixture.wait_version(0, &orders(), 2);
	fixture.wait_version(1, &orders(), 2);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_other_tables_keep_flowing() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;
	fixture.job.request_schema_change(SchemaChangeEvent::new(
		items(),
		1,
		SchemaChange::CreateTable(Schema::new(vec![Column::new("sku", DataType::Varchar)])),
	))?;
	fixture.wait_released(&items(), 1);
	fixture.wait_version(0, &items(), 1);

	fixture.job.send(SubtaskId(0), add_price())?;
	fixture.wait_phase(0, &orders(), TablePhase::Blocked(SchemaVersion(2)));

	fixture.job.send(SubtaskId(0), priced_order(1, 100))?;
	fixture.job.send(SubtaskId(0), DataChangeEvent::insert(items(), GenericRecord::of([Value::from("b-2")])))?;
	fixture.wait_writes(0, &items(), 1);

	assert!(fixture.sink(0).writes(&orders()).is_empty());
	let status = fixture.job.operator_status(SubtaskId(0)).expect("subtask 0 runs");
	assert_eq!(status.table(&orders()).map(|table| table.buffered), Some(1));
	assert_eq!(status.table(&items()).map(|table| table.phase), Some(TablePhase::Normal));

	fixture.job.send(SubtaskId(1), add_price())?;
	fixture.wait_writes(0, &orders(), 1);
	assert_eq!(fixture.sink(0).writes(&orders()), vec![vec![Value::Int(1), Value::from("ink"), price(100)]]);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_invalid_change_releases_current_schema() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;

	fixture.job.request_schema_change(SchemaChangeEvent::new(
		orders(),
		2,
		SchemaChange::DropColumn {
			name: "discount".to_string(),
		},
	))?;
	fixture.wait_released(&orders(), 2);

	for subtask in 0..2 {
		fixture.wait_version(subtask, &orders(), 2);
		assert_eq!(fixture.sink(subtask).schema(&orders()), Some(orders_v1()));
	}

	fixture.job.send(SubtaskId(1), order(3))?;
	fixture.wait_writes(1, &orders(), 1);

	fixture.job.shutdown();
	Ok(())
}

#[test]
fn test_consecutive_changes_apply_in_order() -> Result<()> {
	let fixture = Fixture::start(2)?;
	fixture.create_orders()?;

	let rename = SchemaChangeEvent::new(
		orders(),
		3,
		SchemaChange::RenameColumn {
			from: "item".to_string(),
			to: "product".to_string(),
		},
	);
	fixture.job.request_schema_change(add_price())?;
	fixture.job.request_schema_change(rename)?;
	fixture.job.send(SubtaskId(0), StreamElement::from(priced_order(4, 999)))?;

	fixture.wait_released(&orders(), 3);
	fixture.wait_version(0, &orders(), 3);
	fixture.wait_writes(0, &orders(), 1);

	let schema = fixture.sink(0).schema(&orders()).expect("schema applied");
	let names: Vec<&str> = schema.columns().iter().map(|column| column.name.as_str()).collect();
	assert_eq!(names, vec!["id", "product", "price"]);
	assert_eq!(fixture.sink(0).writes(&orders()), vec![vec![Value::Int(4), Value::from("ink"), price(999)]]);
	assert_eq!(fixture.job.snapshot()?.releases, 3);

	fixture.job.shutdown();
	Ok(())
}
