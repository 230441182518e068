// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The single authority deciding when a schema change is released.
//!
//! A round for a table starts with the first change request of a version
//! newer than the released one. Its required set is every subtask registered
//! at that moment, so subtasks that register later never block it. The round
//! releases once every required subtask acknowledged its flush, and the
//! release goes to every registered subtask exactly once. A subtask that
//! registers again while a round is open has restarted and must acknowledge
//! again.

mod registry;
mod round;
mod snapshot;
mod state;

use std::sync::Arc;

use crossbeam_channel::Sender;
pub use snapshot::{CoordinatorSnapshot, RoundSnapshot};
pub use state::CoordinatorState;
use tracing::{info, warn};
use tributary_core::{event::SerializedEvent, interface::SubtaskGateway};
use tributary_runtime::actor::{Actor, ActorConfig, Context, Flow};
use tributary_type::OperatorId;

use crate::codec::decode_event;

pub enum CoordinatorMsg {
	/// An event from a subtask, still in wire form.
	Event(SerializedEvent),
	Snapshot(Sender<CoordinatorSnapshot>),
	Stop,
}

pub struct SchemaOperatorCoordinator {
	operator: OperatorId,
	gateway: Arc<dyn SubtaskGateway>,
	mailbox_capacity: usize,
}

impl SchemaOperatorCoordinator {
	pub fn new(operator: OperatorId, gateway: Arc<dyn SubtaskGateway>) -> Self {
		Self {
			operator,
			gateway,
			mailbox_capacity: 0,
		}
	}

	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		self.mailbox_capacity = capacity;
		self
	}
}

impl Actor for SchemaOperatorCoordinator {
	type State = CoordinatorState;
	type Message = CoordinatorMsg;

	fn init(&self, _ctx: &Context<Self::Message>) -> Self::State {
		CoordinatorState::new(self.operator.clone())
	}

	fn handle(&self, state: &mut Self::State, msg: Self::Message, _ctx: &Context<Self::Message>) -> Flow {
		match msg {
			CoordinatorMsg::Event(event) => match decode_event(&event) {
				Ok(event) => state.on_event(event, self.gateway.as_ref()),
				Err(err) => warn!(operator = %self.operator, %err, "dropping undecodable operator event"),
			},
			CoordinatorMsg::Snapshot(reply) => {
				let _ = reply.send(state.snapshot());
			}
			CoordinatorMsg::Stop => return Flow::Stop,
		}
		Flow::Continue
	}

	fn pre_start(&self, _state: &mut Self::State, _ctx: &Context<Self::Message>) {
		info!(operator = %self.operator, "schema coordinator started");
	}

	fn post_stop(&self, state: &mut Self::State) {
		let snapshot = state.snapshot();
		if !snapshot.rounds.is_empty() {
			warn!(operator = %self.operator, open = snapshot.rounds.len(), "schema coordinator stopped with open rounds");
		}
		info!(operator = %self.operator, releases = snapshot.releases, "schema coordinator stopped");
	}

	fn config(&self) -> ActorConfig {
		ActorConfig::new().mailbox_capacity(self.mailbox_capacity)
	}
}
