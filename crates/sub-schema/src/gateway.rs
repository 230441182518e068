// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-process gateways that deliver events straight into actor mailboxes.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;
use tributary_core::{
	event::{CoordinatorEvent, SerializedEvent},
	interface::{CoordinatorGateway, SubtaskGateway},
};
use tributary_runtime::actor::ActorRef;
use tributary_type::{OperatorId, Result, SubtaskId};

use crate::{coordinator::CoordinatorMsg, error::TransportError, operator::OperatorMsg};

#[derive(Default)]
pub struct LocalCoordinatorGateway {
	coordinators: RwLock<HashMap<OperatorId, ActorRef<CoordinatorMsg>>>,
}

impl LocalCoordinatorGateway {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attach(&self, operator: OperatorId, coordinator: ActorRef<CoordinatorMsg>) {
		debug!(%operator, "coordinator attached");
		self.coordinators.write().insert(operator, coordinator);
	}

	pub fn detach(&self, operator: &OperatorId) {
		self.coordinators.write().remove(operator);
	}
}

impl CoordinatorGateway for LocalCoordinatorGateway {
	fn send_to_coordinator(&self, operator: &OperatorId, event: SerializedEvent) -> Result<()> {
		let coordinator = self.coordinators.read().get(operator).cloned();
		coordinator
			.and_then(|coordinator| coordinator.send(CoordinatorMsg::Event(event)).ok())
			.ok_or_else(|| TransportError::CoordinatorUnreachable(operator.clone()).into())
	}
}

/// Routes coordinator events to the current incarnation of each subtask.
#[derive(Default)]
pub struct LocalSubtaskGateway {
	subtasks: RwLock<HashMap<SubtaskId, ActorRef<OperatorMsg>>>,
}

impl LocalSubtaskGateway {
	pub fn new() -> Self {
		Self::default()
	}

	/// Attach `subtask`, replacing the mailbox of a previous incarnation.
	pub fn attach(&self, subtask: SubtaskId, operator: ActorRef<OperatorMsg>) {
		debug!(subtask = subtask.0, "subtask attached");
		self.subtasks.write().insert(subtask, operator);
	}

	pub fn detach(&self, subtask: SubtaskId) {
		self.subtasks.write().remove(&subtask);
	}
}

impl SubtaskGateway for LocalSubtaskGateway {
	fn send_to_subtask(&self, subtask: SubtaskId, event: CoordinatorEvent) -> Result<()> {
		let operator = self.subtasks.read().get(&subtask).cloned();
		operator
			.and_then(|operator| operator.send(OperatorMsg::Coordinator(event)).ok())
			.ok_or_else(|| TransportError::SubtaskUnreachable(subtask).into())
	}
}
