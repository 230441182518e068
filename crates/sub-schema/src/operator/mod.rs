// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The in-stream stage of one subtask.
//!
//! Per table: `Normal` writes records straight to the sink. A schema change
//! marker moves the table to `AwaitingFlush` until the sink is flushed and
//! the coordinator was told, then to `Blocked` until the coordinator
//! releases the new schema. Records of a table that is not `Normal` are held
//! back and replayed under the released schema, other tables keep flowing.

mod status;
mod table;

use std::{
	collections::{BTreeMap, VecDeque},
	sync::Arc,
	thread,
};

use parking_lot::RwLock;
pub use status::{OperatorState, OperatorStatus, TablePhase, TableStatus};
use table::{Handshake, Phase, TableState};
use tracing::{debug, error, info, trace, warn};
use tributary_core::{
	event::{CoordinatorEvent, SchemaChangeEvent, SchemaReleaseEvent, SchemaStateResponse, StreamElement},
	interface::SinkWriter,
};
use tributary_runtime::actor::{Actor, ActorConfig, Context, Flow};
use tributary_type::{Error, Result, SubtaskId, TableId};

use crate::{client::SchemaEvolutionClient, config::RetryPolicy, error::EvolutionError, gateway::LocalSubtaskGateway};

pub enum OperatorMsg {
	Element(StreamElement),
	Coordinator(CoordinatorEvent),
	/// Retry the pending handshake of a table.
	Retry(TableId),
	Stop,
}

pub struct SchemaOperator {
	subtask: SubtaskId,
	client: SchemaEvolutionClient,
	sink: Arc<dyn SinkWriter>,
	retry: RetryPolicy,
	status: Arc<RwLock<OperatorStatus>>,
	mailbox_capacity: usize,
	route: Option<Arc<LocalSubtaskGateway>>,
}

impl SchemaOperator {
	pub fn new(
		subtask: SubtaskId,
		client: SchemaEvolutionClient,
		sink: Arc<dyn SinkWriter>,
		retry: RetryPolicy,
	) -> Self {
		Self {
			subtask,
			client,
			sink,
			retry,
			status: Arc::new(RwLock::new(OperatorStatus::default())),
			mailbox_capacity: 0,
			route: None,
		}
	}

	/// Attach to `gateway` before registering, so the coordinator can reach
	/// this incarnation as soon as it knows about it.
	pub fn route_through(mut self, gateway: Arc<LocalSubtaskGateway>) -> Self {
		self.route = Some(gateway);
		self
	}

	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		self.mailbox_capacity = capacity;
		self
	}

	/// Shared view of what this operator is doing, updated as it runs.
	pub fn status(&self) -> Arc<RwLock<OperatorStatus>> {
		self.status.clone()
	}
}

pub struct Subtask {
	subtask: SubtaskId,
	client: SchemaEvolutionClient,
	sink: Arc<dyn SinkWriter>,
	retry: RetryPolicy,
	tables: BTreeMap<TableId, TableState>,
	state: OperatorState,
	status: Arc<RwLock<OperatorStatus>>,
}

impl Actor for SchemaOperator {
	type State = Subtask;
	type Message = OperatorMsg;

	fn init(&self, _ctx: &Context<Self::Message>) -> Self::State {
		Subtask {
			subtask: self.subtask,
			client: self.client.clone(),
			sink: self.sink.clone(),
			retry: self.retry.clone(),
			tables: BTreeMap::new(),
			state: OperatorState::Starting,
			status: self.status.clone(),
		}
	}

	fn pre_start(&self, state: &mut Self::State, ctx: &Context<Self::Message>) {
		if let Some(gateway) = &self.route {
			gateway.attach(self.subtask, ctx.self_ref());
		}

		match state.start() {
			Ok(()) => {
				info!(subtask = self.subtask.0, "schema operator started");
				state.state = OperatorState::Running;
			}
			Err(err) => {
				state.fail(err);
				let _ = ctx.self_ref().send(OperatorMsg::Stop);
			}
		}
		state.publish();
	}

	fn handle(&self, state: &mut Self::State, msg: Self::Message, ctx: &Context<Self::Message>) -> Flow {
		if matches!(state.state, OperatorState::Failed(_)) {
			return Flow::Stop;
		}

		let result = match msg {
			OperatorMsg::Element(element) => state.on_element(element, ctx),
			OperatorMsg::Coordinator(CoordinatorEvent::Release(release)) => state.on_release(release, ctx),
			OperatorMsg::Coordinator(CoordinatorEvent::SchemaState(response)) => {
				state.on_schema_state(response, ctx)
			}
			OperatorMsg::Retry(table) => state.drive(&table, ctx),
			OperatorMsg::Stop => return Flow::Stop,
		};

		let flow = match result {
			Ok(()) => Flow::Continue,
			Err(err) => {
				state.fail(err);
				Flow::Stop
			}
		};
		state.publish();
		flow
	}

	fn post_stop(&self, state: &mut Self::State) {
		if !matches!(state.state, OperatorState::Failed(_)) {
			state.state = OperatorState::Stopped;
		}
		state.publish();
		debug!(subtask = self.subtask.0, "schema operator stopped");
	}

	fn config(&self) -> ActorConfig {
		ActorConfig::new().mailbox_capacity(self.mailbox_capacity)
	}
}

impl Subtask {
	/// Register and ask for the current schemas. Blocks while retrying.
	fn start(&self) -> Result<()> {
		self.send_blocking("register", || self.client.register_subtask(self.subtask))?;
		self.send_blocking("request schema state", || self.client.request_schema_state(self.subtask))
	}

	fn send_blocking(&self, what: &str, send: impl Fn() -> Result<()>) -> Result<()> {
		let mut failures = 0;
		loop {
			let Err(err) = send() else {
				return Ok(());
			};
			failures += 1;
			if !self.retry.can_retry(failures) {
				return Err(self.exhausted(failures, err));
			}
			let delay = self.retry.backoff(failures);
			warn!(subtask = self.subtask.0, attempt = failures, ?delay, %err, "{} failed, retrying", what);
			thread::sleep(delay);
		}
	}

	fn on_element(&mut self, element: StreamElement, ctx: &Context<OperatorMsg>) -> Result<()> {
		match element {
			StreamElement::Data(event) => {
				let table = self.tables.entry(event.table().clone()).or_default();
				match (&table.phase, &table.schema) {
					(Phase::Normal, Some(schema)) => {
						trace!(subtask = self.subtask.0, table = %event.table(), op = %event.op(), "writing record");
						self.sink.write(&event, schema)?;
					}
					(Phase::Normal, None) => {
						if table.buffer.is_empty() {
							warn!(
								subtask = self.subtask.0,
								table = %event.table(),
								"holding records of a table without schema until it is created"
							);
						}
						table.buffer.push_back(StreamElement::Data(event));
					}
					_ => table.buffer.push_back(StreamElement::Data(event)),
				}
				Ok(())
			}
			StreamElement::SchemaChange(event) => self.on_schema_change(event, ctx),
		}
	}

	fn on_schema_change(&mut self, event: SchemaChangeEvent, ctx: &Context<OperatorMsg>) -> Result<()> {
		let table = self.tables.entry(event.table.clone()).or_default();

		if table.is_replayed(event.version) {
			debug!(
				subtask = self.subtask.0,
				table = %event.table,
				version = %event.version,
				"schema change marker already seen"
			);
			return Ok(());
		}

		if !table.is_normal() {
			table.buffer.push_back(StreamElement::SchemaChange(event));
			return Ok(());
		}

		debug!(
			subtask = self.subtask.0,
			table = %event.table,
			version = %event.version,
			change = %event.change,
			"schema change marker, flushing"
		);
		let key = event.table.clone();
		table.phase = Phase::AwaitingFlush(Handshake::new(event));
		self.drive(&key, ctx)
	}

	/// Run the unfinished steps of a table's handshake. A failed step is
	/// retried through the mailbox so other tables are not held up.
	fn drive(&mut self, key: &TableId, ctx: &Context<OperatorMsg>) -> Result<()> {
		let Some(table) = self.tables.get_mut(key) else {
			return Ok(());
		};
		let Phase::AwaitingFlush(handshake) = &mut table.phase else {
			trace!(subtask = self.subtask.0, table = %key, "no handshake to retry");
			return Ok(());
		};

		match run_handshake(handshake, key, self.subtask, self.sink.as_ref(), &self.client) {
			Ok(()) => {
				let version = handshake.version;
				debug!(subtask = self.subtask.0, table = %key, version = %version, "flushed, waiting for release");
				table.phase = Phase::Blocked {
					version,
				};
				Ok(())
			}
			Err(err) => {
				handshake.failures += 1;
				let failures = handshake.failures;
				if !self.retry.can_retry(failures) {
					return Err(self.exhausted(failures, err));
				}

				let delay = self.retry.backoff(failures);
				warn!(
					subtask = self.subtask.0,
					table = %key,
					attempt = failures,
					?delay,
					%err,
					"schema change handshake failed, retrying"
				);
				let key = key.clone();
				ctx.schedule_once(delay, move || OperatorMsg::Retry(key));
				Ok(())
			}
		}
	}

	fn on_release(&mut self, release: SchemaReleaseEvent, ctx: &Context<OperatorMsg>) -> Result<()> {
		let SchemaReleaseEvent {
			table: key,
			version,
			schema,
		} = release;
		let table = self.tables.entry(key.clone()).or_default();

		if version <= table.version {
			debug!(subtask = self.subtask.0, table = %key, version = %version, "stale release ignored");
			return Ok(());
		}
		if table.awaited().is_some_and(|awaited| version < awaited) {
			debug!(subtask = self.subtask.0, table = %key, version = %version, "release older than awaited change ignored");
			return Ok(());
		}

		// released without waiting for this subtask, it registered late
		if let Phase::AwaitingFlush(handshake) = &table.phase
			&& !handshake.flushed
		{
			self.sink.flush(&key)?;
		}

		self.sink.apply_schema(&key, &schema)?;
		info!(subtask = self.subtask.0, table = %key, version = %version, "schema released");

		let buffered = table.adopt(version, schema);
		self.replay(buffered, ctx)
	}

	fn on_schema_state(&mut self, response: SchemaStateResponse, ctx: &Context<OperatorMsg>) -> Result<()> {
		let mut restored = Vec::new();

		for current in response.schemas {
			let table = self.tables.entry(current.table.clone()).or_default();
			if current.version <= table.version || !table.is_normal() {
				continue;
			}
			self.sink.apply_schema(&current.table, &current.schema)?;
			debug!(subtask = self.subtask.0, table = %current.table, version = %current.version, "schema restored");
			restored.push(table.adopt(current.version, current.schema));
		}

		for pending in response.pending_flush {
			let table = self.tables.entry(pending.table.clone()).or_default();
			if table.is_replayed(pending.version) || !table.is_normal() {
				continue;
			}
			info!(
				subtask = self.subtask.0,
				table = %pending.table,
				version = %pending.version,
				"acknowledging open schema change round"
			);
			table.phase = Phase::AwaitingFlush(Handshake::acknowledge_only(pending.version));
			self.drive(&pending.table, ctx)?;
		}

		for buffered in restored {
			self.replay(buffered, ctx)?;
		}
		Ok(())
	}

	fn replay(&mut self, buffered: VecDeque<StreamElement>, ctx: &Context<OperatorMsg>) -> Result<()> {
		if !buffered.is_empty() {
			debug!(subtask = self.subtask.0, count = buffered.len(), "replaying held back elements");
		}
		for element in buffered {
			self.on_element(element, ctx)?;
		}
		Ok(())
	}

	fn exhausted(&self, attempts: u32, err: Error) -> Error {
		EvolutionError::RetriesExhausted {
			subtask: self.subtask,
			attempts,
			cause: err.0,
		}
		.into()
	}

	fn fail(&mut self, err: Error) {
		error!(subtask = self.subtask.0, code = err.code(), %err, "schema operator failed");
		self.state = OperatorState::Failed(err.to_string());
	}

	fn publish(&self) {
		let tables = self.tables.iter().map(|(table, state)| (table.clone(), state.status())).collect();
		*self.status.write() = OperatorStatus {
			state: self.state.clone(),
			tables,
		};
	}
}

fn run_handshake(
	handshake: &mut Handshake,
	table: &TableId,
	subtask: SubtaskId,
	sink: &dyn SinkWriter,
	client: &SchemaEvolutionClient,
) -> Result<()> {
	if !handshake.flushed {
		sink.flush(table)?;
		handshake.flushed = true;
	}
	if !handshake.requested {
		if let Some(change) = &handshake.change {
			client.request_schema_change(subtask, change.clone())?;
		}
		handshake.requested = true;
	}
	if !handshake.acknowledged {
		client.notify_flush_success(subtask, table.clone(), handshake.version)?;
		handshake.acknowledged = true;
	}
	Ok(())
}
