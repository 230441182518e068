// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wires one coordinator and its parallel subtasks onto an actor system.

use std::{collections::BTreeMap, sync::Arc};

use crossbeam_channel::bounded;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use tributary_core::{
	event::{SchemaChangeEvent, StreamElement},
	interface::{CoordinatorGateway, SinkWriter},
};
use tributary_runtime::actor::{ActorHandle, ActorSystem};
use tributary_type::{Result, SubtaskId, error::diagnostic::internal::internal, return_error};

use crate::{
	client::SchemaEvolutionClient,
	config::SchemaEvolutionConfig,
	coordinator::{CoordinatorMsg, CoordinatorSnapshot, SchemaOperatorCoordinator},
	error::EvolutionError,
	gateway::{LocalCoordinatorGateway, LocalSubtaskGateway},
	operator::{OperatorMsg, OperatorStatus, SchemaOperator},
};

/// Creates the sink writer of one subtask.
pub type SinkFactory = Arc<dyn Fn(SubtaskId) -> Arc<dyn SinkWriter> + Send + Sync>;

type GatewayWrapper = Box<dyn FnOnce(Arc<LocalCoordinatorGateway>) -> Arc<dyn CoordinatorGateway>>;

pub struct SchemaEvolutionJobBuilder {
	config: SchemaEvolutionConfig,
	parallelism: u32,
	sink: Option<SinkFactory>,
	wrap_gateway: Option<GatewayWrapper>,
}

impl SchemaEvolutionJobBuilder {
	pub fn parallelism(mut self, parallelism: u32) -> Self {
		self.parallelism = parallelism;
		self
	}

	pub fn sink<F>(mut self, factory: F) -> Self
	where
		F: Fn(SubtaskId) -> Arc<dyn SinkWriter> + Send + Sync + 'static,
	{
		self.sink = Some(Arc::new(factory));
		self
	}

	/// Decorate the gateway the subtasks use to reach the coordinator, for
	/// example to inject transport failures.
	pub fn wrap_gateway<F>(mut self, wrap: F) -> Self
	where
		F: FnOnce(Arc<LocalCoordinatorGateway>) -> Arc<dyn CoordinatorGateway> + 'static,
	{
		self.wrap_gateway = Some(Box::new(wrap));
		self
	}

	pub fn start(self) -> Result<SchemaEvolutionJob> {
		let Some(sink) = self.sink else {
			return_error!(internal("schema evolution job started without a sink"));
		};

		let system = ActorSystem::new().map_err(|err| spawn_error("actor system", err))?;

		let local = Arc::new(LocalCoordinatorGateway::new());
		let subtasks = Arc::new(LocalSubtaskGateway::new());

		let coordinator = SchemaOperatorCoordinator::new(self.config.operator_id.clone(), subtasks.clone())
			.mailbox_capacity(self.config.coordinator_mailbox_capacity);
		let coordinator = system
			.spawn(&format!("coordinator-{}", self.config.operator_id), coordinator)
			.map_err(|err| spawn_error("coordinator", err))?;
		local.attach(self.config.operator_id.clone(), coordinator.actor_ref().clone());

		let gateway: Arc<dyn CoordinatorGateway> = match self.wrap_gateway {
			Some(wrap) => wrap(local.clone()),
			None => local.clone(),
		};

		let job = SchemaEvolutionJob {
			client: SchemaEvolutionClient::new(self.config.operator_id.clone(), gateway),
			config: self.config,
			system,
			coordinator: Mutex::new(Some(coordinator)),
			local,
			subtasks,
			sink,
			operators: Mutex::new(BTreeMap::new()),
		};

		for subtask in 0..self.parallelism {
			job.add_subtask(SubtaskId(subtask))?;
		}

		info!(operator = %job.config.operator_id, parallelism = self.parallelism, "schema evolution job started");
		Ok(job)
	}
}

struct RunningOperator {
	handle: ActorHandle<OperatorMsg>,
	status: Arc<RwLock<OperatorStatus>>,
}

/// A running job: the coordinator plus one schema operator per subtask.
pub struct SchemaEvolutionJob {
	config: SchemaEvolutionConfig,
	system: ActorSystem,
	client: SchemaEvolutionClient,
	coordinator: Mutex<Option<ActorHandle<CoordinatorMsg>>>,
	local: Arc<LocalCoordinatorGateway>,
	subtasks: Arc<LocalSubtaskGateway>,
	sink: SinkFactory,
	operators: Mutex<BTreeMap<SubtaskId, RunningOperator>>,
}

impl SchemaEvolutionJob {
	pub fn builder(config: SchemaEvolutionConfig) -> SchemaEvolutionJobBuilder {
		SchemaEvolutionJobBuilder {
			config,
			parallelism: 1,
			sink: None,
			wrap_gateway: None,
		}
	}

	pub fn config(&self) -> &SchemaEvolutionConfig {
		&self.config
	}

	pub fn subtasks(&self) -> Vec<SubtaskId> {
		self.operators.lock().keys().copied().collect()
	}

	/// Feed one element into the stream of `subtask`.
	pub fn send(&self, subtask: SubtaskId, element: impl Into<StreamElement>) -> Result<()> {
		let operators = self.operators.lock();
		let operator = operators.get(&subtask).ok_or(EvolutionError::UnknownSubtask(subtask))?;
		operator
			.handle
			.actor_ref()
			.send(OperatorMsg::Element(element.into()))
			.map_err(|_| EvolutionError::ShutDown(format!("schema operator {}", subtask)))?;
		Ok(())
	}

	/// Broadcast a schema change marker to every subtask, the way a source
	/// emits it into each parallel stream.
	pub fn request_schema_change(&self, event: SchemaChangeEvent) -> Result<()> {
		debug!(table = %event.table, version = %event.version, change = %event.change, "broadcasting schema change");
		for subtask in self.subtasks() {
			self.send(subtask, StreamElement::SchemaChange(event.clone()))?;
		}
		Ok(())
	}

	/// Start a schema operator for `subtask`. Adding a running subtask is a
	/// no-op.
	pub fn add_subtask(&self, subtask: SubtaskId) -> Result<()> {
		let mut operators = self.operators.lock();
		if operators.contains_key(&subtask) {
			return Ok(());
		}
		let operator = self.spawn_operator(subtask)?;
		operators.insert(subtask, operator);
		Ok(())
	}

	/// Stop `subtask` and start a fresh incarnation in its place. Elements
	/// the old incarnation held back are dropped, the upstream replays them.
	pub fn restart(&self, subtask: SubtaskId) -> Result<()> {
		let mut operators = self.operators.lock();
		let previous = operators.remove(&subtask).ok_or(EvolutionError::UnknownSubtask(subtask))?;

		info!(subtask = subtask.0, "restarting subtask");
		if previous.handle.actor_ref().send(OperatorMsg::Stop).is_err() {
			debug!(subtask = subtask.0, "previous incarnation already stopped");
		}
		if let Err(err) = previous.handle.join() {
			warn!(subtask = subtask.0, %err, "previous incarnation did not stop cleanly");
		}

		let operator = self.spawn_operator(subtask)?;
		operators.insert(subtask, operator);
		Ok(())
	}

	pub fn snapshot(&self) -> Result<CoordinatorSnapshot> {
		let (tx, rx) = bounded(1);
		{
			let coordinator = self.coordinator.lock();
			let coordinator = coordinator.as_ref().ok_or_else(coordinator_gone)?;
			coordinator.actor_ref().send(CoordinatorMsg::Snapshot(tx)).map_err(|_| coordinator_gone())?;
		}
		rx.recv().map_err(|_| coordinator_gone().into())
	}

	pub fn operator_status(&self, subtask: SubtaskId) -> Option<OperatorStatus> {
		self.operators.lock().get(&subtask).map(|operator| operator.status.read().clone())
	}

	/// The client the subtasks of this job use.
	pub fn client(&self) -> &SchemaEvolutionClient {
		&self.client
	}

	/// Stop every subtask, then the coordinator.
	pub fn shutdown(self) {
		let operators = std::mem::take(&mut *self.operators.lock());
		for (subtask, operator) in operators {
			if operator.handle.actor_ref().send(OperatorMsg::Stop).is_err() {
				debug!(subtask = subtask.0, "schema operator already stopped");
			}
			if let Err(err) = operator.handle.join() {
				warn!(subtask = subtask.0, %err, "schema operator did not stop cleanly");
			}
			self.subtasks.detach(subtask);
		}

		if let Some(coordinator) = self.coordinator.lock().take() {
			if coordinator.actor_ref().send(CoordinatorMsg::Stop).is_err() {
				debug!(operator = %self.config.operator_id, "coordinator already stopped");
			}
			if let Err(err) = coordinator.join() {
				warn!(operator = %self.config.operator_id, %err, "coordinator did not stop cleanly");
			}
		}
		self.local.detach(&self.config.operator_id);

		info!(operator = %self.config.operator_id, "schema evolution job stopped");
	}

	fn spawn_operator(&self, subtask: SubtaskId) -> Result<RunningOperator> {
		let operator = SchemaOperator::new(subtask, self.client.clone(), (self.sink)(subtask), self.config.retry.clone())
			.mailbox_capacity(self.config.operator_mailbox_capacity)
			.route_through(self.subtasks.clone());
		let status = operator.status();
		let handle = self
			.system
			.spawn(&format!("schema-operator-{}", subtask), operator)
			.map_err(|err| spawn_error("schema operator", err))?;

		Ok(RunningOperator {
			handle,
			status,
		})
	}
}

impl Drop for SchemaEvolutionJob {
	fn drop(&mut self) {
		self.system.shutdown();
	}
}

fn spawn_error(component: &str, err: std::io::Error) -> EvolutionError {
	EvolutionError::Spawn {
		component: component.to_string(),
		reason: err.to_string(),
	}
}

fn coordinator_gone() -> EvolutionError {
	EvolutionError::ShutDown("coordinator".to_string())
}
