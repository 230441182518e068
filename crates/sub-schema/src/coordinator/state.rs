// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, btree_map::Entry};

use tracing::{debug, error, info, trace, warn};
use tributary_core::{
	event::{
		CoordinatorEvent, FlushSuccessEvent, OperatorEvent, PendingFlush, SchemaChangeEvent, SchemaChangeRequest,
		SchemaReleaseEvent, SchemaStateResponse, TableSchema,
	},
	interface::SubtaskGateway,
	schema::Schema,
};
use tributary_type::{OperatorId, SchemaVersion, SubtaskId, TableId};

use crate::coordinator::{
	registry::{Registration, Registry},
	round::{Ack, Round},
	snapshot::{CoordinatorSnapshot, RoundSnapshot},
};

#[derive(Debug)]
struct Applied {
	version: SchemaVersion,
	schema: Schema,
}

/// Everything the coordinator knows. Owned by the coordinator actor and
/// mutated one event at a time.
#[derive(Debug)]
pub struct CoordinatorState {
	operator: OperatorId,
	registry: Registry,
	tables: BTreeMap<TableId, Applied>,
	rounds: BTreeMap<TableId, Round>,
	queued: BTreeMap<TableId, BTreeMap<SchemaVersion, SchemaChangeEvent>>,
	releases: u64,
}

impl CoordinatorState {
	pub fn new(operator: OperatorId) -> Self {
		Self {
			operator,
			registry: Registry::default(),
			tables: BTreeMap::new(),
			rounds: BTreeMap::new(),
			queued: BTreeMap::new(),
			releases: 0,
		}
	}

	pub fn on_event(&mut self, event: OperatorEvent, gateway: &dyn SubtaskGateway) {
		trace!(operator = %self.operator, ?event, "coordinator received event");
		match event {
			OperatorEvent::Register(event) => self.on_register(event.subtask),
			OperatorEvent::FlushSuccess(event) => self.on_flush_success(event, gateway),
			OperatorEvent::SchemaChangeRequest(request) => self.on_schema_change_request(request, gateway),
			OperatorEvent::SchemaStateRequest(request) => self.on_schema_state_request(request.subtask, gateway),
		}
	}

	fn on_register(&mut self, subtask: SubtaskId) {
		match self.registry.register(subtask) {
			Registration::New => info!(subtask = subtask.0, "subtask registered"),
			Registration::Restart {
				incarnation,
			} => {
				info!(subtask = subtask.0, incarnation, "subtask restarted");
				for round in self.rounds.values_mut() {
					if round.forget(subtask) {
						debug!(
							subtask = subtask.0,
							table = %round.table,
							"restarted subtask must acknowledge again"
						);
					}
				}
			}
		}
	}

	fn on_flush_success(&mut self, event: FlushSuccessEvent, gateway: &dyn SubtaskGateway) {
		let FlushSuccessEvent {
			subtask,
			table,
			version,
		} = event;

		if !self.registry.is_registered(subtask) {
			warn!(subtask = subtask.0, table = %table, "flush success from unregistered subtask ignored");
			return;
		}

		let Some(round) = self.rounds.get_mut(&table) else {
			if self.tables.contains_key(&table) {
				debug!(subtask = subtask.0, table = %table, "flush success after round closed ignored");
			} else {
				warn!(subtask = subtask.0, table = %table, "flush success for unknown table ignored");
			}
			return;
		};

		if round.version != version {
			debug!(
				subtask = subtask.0,
				table = %table,
				version = %version,
				active = %round.version,
				"flush success for another round ignored"
			);
			return;
		}

		match round.acknowledge(subtask) {
			Ack::Counted => {
				debug!(
					subtask = subtask.0,
					table = %table,
					pending = round.pending().len(),
					"flush success counted"
				);
				if round.is_complete() {
					self.release(&table, gateway);
				}
			}
			Ack::Duplicate => trace!(subtask = subtask.0, table = %table, "duplicate flush success"),
			Ack::NotRequired => {
				debug!(subtask = subtask.0, table = %table, "flush success from subtask not required by round")
			}
		}
	}

	fn on_schema_change_request(&mut self, request: SchemaChangeRequest, gateway: &dyn SubtaskGateway) {
		let SchemaChangeRequest {
			subtask,
			event,
		} = request;

		if !self.registry.is_registered(subtask) {
			debug!(subtask = subtask.0, table = %event.table, "schema change requested by unregistered subtask");
		}

		if let Some(applied) = self.tables.get(&event.table)
			&& event.version <= applied.version
		{
			debug!(
				subtask = subtask.0,
				table = %event.table,
				version = %event.version,
				applied = %applied.version,
				"stale schema change request, re-sending release"
			);
			let release = SchemaReleaseEvent {
				table: event.table,
				version: applied.version,
				schema: applied.schema.clone(),
			};
			if let Err(err) = gateway.send_to_subtask(subtask, CoordinatorEvent::Release(release)) {
				warn!(subtask = subtask.0, %err, "failed to re-send release");
			}
			return;
		}

		match self.rounds.get(&event.table) {
			Some(round) if round.version == event.version => {
				trace!(subtask = subtask.0, table = %event.table, version = %event.version, "duplicate schema change request")
			}
			Some(round) if round.version < event.version => {
				let table = event.table.clone();
				let version = event.version;
				if let Entry::Vacant(entry) = self.queued.entry(table.clone()).or_default().entry(version) {
					debug!(table = %table, version = %version, "schema change queued behind active round");
					entry.insert(event);
				}
			}
			Some(round) => debug!(
				table = %event.table,
				version = %event.version,
				active = %round.version,
				"schema change older than the active round ignored"
			),
			None => self.start_round(event, gateway),
		}
	}

	fn on_schema_state_request(&mut self, subtask: SubtaskId, gateway: &dyn SubtaskGateway) {
		if !self.registry.is_registered(subtask) {
			warn!(subtask = subtask.0, "schema state requested by unregistered subtask");
			return;
		}

		let response = SchemaStateResponse {
			schemas: self
				.tables
				.iter()
				.map(|(table, applied)| TableSchema {
					table: table.clone(),
					version: applied.version,
					schema: applied.schema.clone(),
				})
				.collect(),
			pending_flush: self
				.rounds
				.values()
				.filter(|round| round.is_pending(subtask))
				.map(|round| PendingFlush {
					table: round.table.clone(),
					version: round.version,
				})
				.collect(),
		};

		debug!(
			subtask = subtask.0,
			tables = response.schemas.len(),
			pending = response.pending_flush.len(),
			"answering schema state request"
		);
		if let Err(err) = gateway.send_to_subtask(subtask, CoordinatorEvent::SchemaState(response)) {
			warn!(subtask = subtask.0, %err, "failed to send schema state");
		}
	}

	fn start_round(&mut self, event: SchemaChangeEvent, gateway: &dyn SubtaskGateway) {
		let current = self.tables.get(&event.table).map(|applied| &applied.schema);
		let schema = match event.change.apply_to(current) {
			Ok(schema) => schema,
			Err(err) => {
				error!(
					table = %event.table,
					version = %event.version,
					change = %event.change,
					%err,
					"schema change cannot be applied, releasing the current schema"
				);
				current.cloned().unwrap_or_default()
			}
		};

		let required = self.registry.live();
		info!(
			table = %event.table,
			version = %event.version,
			change = %event.change,
			required = required.len(),
			"schema change round started"
		);

		let table = event.table.clone();
		let round = Round::new(event.table, event.version, schema, required);
		let complete = round.is_complete();
		self.rounds.insert(table.clone(), round);

		if complete {
			self.release(&table, gateway);
		}
	}

	fn release(&mut self, table: &TableId, gateway: &dyn SubtaskGateway) {
		let Some(round) = self.rounds.remove(table) else {
			return;
		};

		let release = SchemaReleaseEvent {
			table: round.table.clone(),
			version: round.version,
			schema: round.schema.clone(),
		};
		self.tables.insert(
			round.table,
			Applied {
				version: round.version,
				schema: round.schema,
			},
		);
		self.releases += 1;

		let subtasks = self.registry.live();
		info!(
			table = %table,
			version = %release.version,
			subtasks = subtasks.len(),
			elapsed = ?round.started.elapsed(),
			"releasing schema"
		);
		for subtask in subtasks {
			if let Err(err) = gateway.send_to_subtask(subtask, CoordinatorEvent::Release(release.clone())) {
				warn!(subtask = subtask.0, table = %table, %err, "failed to deliver release");
			}
		}

		if let Some(next) = self.next_queued(table) {
			self.start_round(next, gateway);
		}
	}

	fn next_queued(&mut self, table: &TableId) -> Option<SchemaChangeEvent> {
		let applied = self.tables.get(table).map(|applied| applied.version);
		let queue = self.queued.get_mut(table)?;
		let next = loop {
			let (version, event) = queue.pop_first()?;
			if applied.is_none_or(|applied| version > applied) {
				break event;
			}
		};
		if queue.is_empty() {
			self.queued.remove(table);
		}
		Some(next)
	}

	pub fn snapshot(&self) -> CoordinatorSnapshot {
		CoordinatorSnapshot {
			subtasks: self.registry.incarnations().collect(),
			rounds: self
				.rounds
				.values()
				.map(|round| RoundSnapshot {
					table: round.table.clone(),
					version: round.version,
					required: round.required().clone(),
					acknowledged: round.acknowledged().clone(),
					pending: round.pending(),
					age: round.started.elapsed(),
				})
				.collect(),
			queued: self
				.queued
				.iter()
				.flat_map(|(table, queue)| queue.keys().map(|version| (table.clone(), *version)))
				.collect(),
			tables: self.tables.iter().map(|(table, applied)| (table.clone(), applied.version)).collect(),
			releases: self.releases,
		}
	}
}

#[cfg(test)]
pub mod tests {
	use parking_lot::Mutex;
	use tributary_core::{
		event::{
			CoordinatorEvent, FlushSuccessEvent, OperatorEvent, SchemaChangeEvent, SchemaChangeRequest,
			SchemaStateRequest, SinkWriterRegisterEvent,
		},
		interface::SubtaskGateway,
		schema::{Column, ColumnPosition, Schema, SchemaChange},
	};
	use tributary_type::{DataType, OperatorId, Result, SchemaVersion, SubtaskId, TableId};

	use crate::coordinator::state::CoordinatorState;

	#[derive(Default)]
	struct Outbox {
		sent: Mutex<Vec<(SubtaskId, CoordinatorEvent)>>,
	}

	impl Outbox {
		fn take(&self) -> Vec<(SubtaskId, CoordinatorEvent)> {
			std::mem::take(&mut *self.sent.lock())
		}

		fn releases(&self) -> Vec<(u32, u64)> {
			self.take()
				.into_iter()
				.filter_map(|(subtask, event)| match event {
					CoordinatorEvent::Release(release) => Some((subtask.0, release.version.0)),
					_ => None,
				})
				.collect()
		}
	}

	impl SubtaskGateway for Outbox {
		fn send_to_subtask(&self, subtask: SubtaskId, event: CoordinatorEvent) -> Result<()> {
			self.sent.lock().push((subtask, event));
			Ok(())
		}
	}

	fn orders() -> TableId {
		TableId::new("shop", "orders")
	}

	fn create(version: u64) -> SchemaChangeEvent {
		SchemaChangeEvent::new(
			orders(),
			version,
			SchemaChange::CreateTable(Schema::new(vec![Column::new("id", DataType::BigInt)])),
		)
	}

	fn add_column(version: u64, name: &str) -> SchemaChangeEvent {
		SchemaChangeEvent::new(
			orders(),
			version,
			SchemaChange::AddColumn {
				column: Column::new(name, DataType::Varchar),
				position: ColumnPosition::Last,
			},
		)
	}

	fn register(state: &mut CoordinatorState, outbox: &Outbox, subtask: u32) {
		state.on_event(
			OperatorEvent::Register(SinkWriterRegisterEvent {
				subtask: SubtaskId(subtask),
			}),
			outbox,
		);
	}

	fn request(state: &mut CoordinatorState, outbox: &Outbox, subtask: u32, event: SchemaChangeEvent) {
		state.on_event(
			OperatorEvent::SchemaChangeRequest(SchemaChangeRequest {
				subtask: SubtaskId(subtask),
				event,
			}),
			outbox,
		);
	}

	fn flushed(state: &mut CoordinatorState, outbox: &Outbox, subtask: u32, version: u64) {
		state.on_event(
			OperatorEvent::FlushSuccess(FlushSuccessEvent {
				subtask: SubtaskId(subtask),
				table: orders(),
				version: SchemaVersion(version),
			}),
			outbox,
		);
	}

	fn setup(subtasks: &[u32]) -> (CoordinatorState, Outbox) {
		let mut state = CoordinatorState::new(OperatorId::new("test"));
		let outbox = Outbox::default();
		for subtask in subtasks {
			register(&mut state, &outbox, *subtask);
		}
		(state, outbox)
	}

	mod flush_success {
		use super::*;

		#[test]
		fn test_orders_restart_before_flush() {
			let (mut state, outbox) = setup(&[0, 1, 2]);
			request(&mut state, &outbox, 0, create(1));

			register(&mut state, &outbox, 1);
			assert_eq!(state.snapshot().rounds[0].required.len(), 3);

			flushed(&mut state, &outbox, 1, 1);
			flushed(&mut state, &outbox, 0, 1);
			assert!(outbox.releases().is_empty());

			flushed(&mut state, &outbox, 2, 1);
			assert_eq!(outbox.releases(), vec![(0, 1), (1, 1), (2, 1)]);

			flushed(&mut state, &outbox, 2, 1);
			flushed(&mut state, &outbox, 1, 1);
			assert!(outbox.releases().is_empty());
			assert_eq!(state.snapshot().releases, 1);
		}

		#[test]
		fn test_restart_after_acknowledging_requires_new_ack() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 1, 1);
			register(&mut state, &outbox, 1);
			flushed(&mut state, &outbox, 0, 1);

			assert!(outbox.releases().is_empty());
			assert_eq!(state.snapshot().rounds[0].pending.iter().map(|s| s.0).collect::<Vec<_>>(), vec![1]);

			flushed(&mut state, &outbox, 1, 1);
			assert_eq!(outbox.releases().len(), 2);
		}

		#[test]
		fn test_duplicates_count_once() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 0, 1);

			assert!(outbox.releases().is_empty());
			assert_eq!(state.snapshot().rounds[0].acknowledged.len(), 1);
		}

		#[test]
		fn test_unknown_table_and_subtask_are_ignored() {
			let (mut state, outbox) = setup(&[0]);
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 9, 1);

			assert!(outbox.take().is_empty());
			assert_eq!(state.snapshot().releases, 0);
		}

		#[test]
		fn test_unregistered_subtask_ack_does_not_count() {
			let (mut state, outbox) = setup(&[0]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 7, 1);
			assert!(state.snapshot().rounds[0].acknowledged.is_empty());
		}
	}

	mod register {
		use super::*;

		#[test]
		fn test_items_late_registrant_does_not_block() {
			let (mut state, outbox) = setup(&[0, 1, 2]);
			request(&mut state, &outbox, 0, create(1));
			register(&mut state, &outbox, 3);

			let snapshot = state.snapshot();
			assert_eq!(snapshot.rounds[0].required.len(), 3);
			assert_eq!(snapshot.subtasks.len(), 4);

			for subtask in [0, 1, 2] {
				flushed(&mut state, &outbox, subtask, 1);
			}

			// the late registrant still receives the release
			assert_eq!(outbox.releases(), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
		}

		#[test]
		fn test_incarnation_is_tracked() {
			let (mut state, outbox) = setup(&[0, 1]);
			register(&mut state, &outbox, 1);
			register(&mut state, &outbox, 1);
			assert_eq!(state.snapshot().subtasks, vec![(SubtaskId(0), 0), (SubtaskId(1), 2)]);
		}
	}

	mod schema_change_request {
		use super::*;

		#[test]
		fn test_empty_required_set_releases_immediately() {
			let (mut state, outbox) = setup(&[]);
			request(&mut state, &outbox, 0, create(1));

			assert!(outbox.take().is_empty());
			let snapshot = state.snapshot();
			assert!(snapshot.rounds.is_empty());
			assert_eq!(snapshot.version(&orders()), Some(SchemaVersion(1)));
			assert_eq!(snapshot.releases, 1);
		}

		#[test]
		fn test_same_version_is_deduplicated() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			request(&mut state, &outbox, 1, create(1));

			let snapshot = state.snapshot();
			assert_eq!(snapshot.rounds.len(), 1);
			assert!(snapshot.queued.is_empty());
		}

		#[test]
		fn test_stale_request_resends_release_to_requester() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 1, 1);
			outbox.take();

			request(&mut state, &outbox, 1, create(1));
			assert_eq!(outbox.releases(), vec![(1, 1)]);
			assert_eq!(state.snapshot().releases, 1);
		}

		#[test]
		fn test_newer_version_queues_behind_active_round() {
			let (mut state, outbox) = setup(&[0]);
			request(&mut state, &outbox, 0, create(1));
			request(&mut state, &outbox, 0, add_column(2, "note"));
			assert_eq!(state.snapshot().queued, vec![(orders(), SchemaVersion(2))]);

			flushed(&mut state, &outbox, 0, 1);
			assert_eq!(outbox.releases(), vec![(0, 1)]);

			let snapshot = state.snapshot();
			assert!(snapshot.queued.is_empty());
			assert_eq!(snapshot.round(&orders()).unwrap().version, SchemaVersion(2));

			flushed(&mut state, &outbox, 0, 2);
			let released = outbox.take();
			match &released[0].1 {
				CoordinatorEvent::Release(release) => {
					assert_eq!(release.version, SchemaVersion(2));
					assert_eq!(release.schema.arity(), 2);
				}
				other => panic!("unexpected event {:?}", other),
			}
		}

		#[test]
		fn test_redelivered_ack_does_not_count_toward_next_round() {
			let (mut state, outbox) = setup(&[0]);
			request(&mut state, &outbox, 0, create(1));
			request(&mut state, &outbox, 0, add_column(2, "note"));

			flushed(&mut state, &outbox, 0, 1);
			assert_eq!(outbox.releases(), vec![(0, 1)]);

			flushed(&mut state, &outbox, 0, 1);
			assert!(outbox.releases().is_empty());

			let snapshot = state.snapshot();
			let round = snapshot.round(&orders()).unwrap();
			assert_eq!(round.version, SchemaVersion(2));
			assert_eq!(round.pending.iter().map(|s| s.0).collect::<Vec<_>>(), vec![0]);
			assert_eq!(snapshot.releases, 1);

			flushed(&mut state, &outbox, 0, 2);
			assert_eq!(outbox.releases(), vec![(0, 2)]);
		}

		#[test]
		fn test_ack_for_future_version_is_ignored() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 1, 3);

			assert!(outbox.releases().is_empty());
			assert_eq!(state.snapshot().rounds[0].pending.iter().map(|s| s.0).collect::<Vec<_>>(), vec![1]);
		}

		#[test]
		fn test_invalid_change_releases_current_schema() {
			let (mut state, outbox) = setup(&[0]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 0, 1);
			outbox.take();

			let drop_missing = SchemaChangeEvent::new(
				orders(),
				2,
				SchemaChange::DropColumn {
					name: "missing".into(),
				},
			);
			request(&mut state, &outbox, 0, drop_missing);
			flushed(&mut state, &outbox, 0, 2);

			match &outbox.take()[0].1 {
				CoordinatorEvent::Release(release) => {
					assert_eq!(release.version, SchemaVersion(2));
					assert_eq!(release.schema.columns()[0].name, "id");
				}
				other => panic!("unexpected event {:?}", other),
			}
		}
	}

	mod schema_state_request {
		use super::*;

		#[test]
		fn test_reports_schemas_and_pending_flushes() {
			let (mut state, outbox) = setup(&[0, 1]);
			request(&mut state, &outbox, 0, create(1));
			flushed(&mut state, &outbox, 0, 1);
			flushed(&mut state, &outbox, 1, 1);
			request(&mut state, &outbox, 0, add_column(2, "note"));
			flushed(&mut state, &outbox, 0, 2);
			outbox.take();

			register(&mut state, &outbox, 1);
			state.on_event(
				OperatorEvent::SchemaStateRequest(SchemaStateRequest {
					subtask: SubtaskId(1),
				}),
				&outbox,
			);

			let sent = outbox.take();
			assert_eq!(sent.len(), 1);
			assert_eq!(sent[0].0, SubtaskId(1));
			match &sent[0].1 {
				CoordinatorEvent::SchemaState(response) => {
					assert_eq!(response.schemas.len(), 1);
					assert_eq!(response.schemas[0].version, SchemaVersion(1));
					assert_eq!(response.pending_flush.len(), 1);
					assert_eq!(response.pending_flush[0].version, SchemaVersion(2));
				}
				other => panic!("unexpected event {:?}", other),
			}
		}

		#[test]
		fn test_unregistered_subtask_gets_no_answer() {
			let (mut state, outbox) = setup(&[]);
			state.on_event(
				OperatorEvent::SchemaStateRequest(SchemaStateRequest {
					subtask: SubtaskId(0),
				}),
				&outbox,
			);
			assert!(outbox.take().is_empty());
		}
	}
}
