// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tracing::trace;
use tributary_core::{
	event::{
		FlushSuccessEvent, OperatorEvent, SchemaChangeEvent, SchemaChangeRequest, SchemaStateRequest,
		SinkWriterRegisterEvent,
	},
	interface::CoordinatorGateway,
};
use tributary_type::{OperatorId, Result, SchemaVersion, SubtaskId, TableId};

use crate::codec::encode_event;

/// Sends a subtask's notifications to the coordinator.
///
/// Holds no state of its own. Every call is exactly one send attempt and an
/// `Err` means the coordinator did not accept the event, so retrying is up
/// to the caller.
#[derive(Clone)]
pub struct SchemaEvolutionClient {
	operator: OperatorId,
	gateway: Arc<dyn CoordinatorGateway>,
}

impl SchemaEvolutionClient {
	pub fn new(operator: OperatorId, gateway: Arc<dyn CoordinatorGateway>) -> Self {
		Self {
			operator,
			gateway,
		}
	}

	pub fn operator(&self) -> &OperatorId {
		&self.operator
	}

	/// Announce that `subtask` started. Sent on every start, restarts included.
	pub fn register_subtask(&self, subtask: SubtaskId) -> Result<()> {
		self.send(OperatorEvent::Register(SinkWriterRegisterEvent {
			subtask,
		}))
	}

	/// Only call once every record of `table` written under the old schema
	/// is durable. `version` is the schema version the flush was made for.
	pub fn notify_flush_success(&self, subtask: SubtaskId, table: TableId, version: SchemaVersion) -> Result<()> {
		self.send(OperatorEvent::FlushSuccess(FlushSuccessEvent {
			subtask,
			table,
			version,
		}))
	}

	pub fn request_schema_change(&self, subtask: SubtaskId, event: SchemaChangeEvent) -> Result<()> {
		self.send(OperatorEvent::SchemaChangeRequest(SchemaChangeRequest {
			subtask,
			event,
		}))
	}

	pub fn request_schema_state(&self, subtask: SubtaskId) -> Result<()> {
		self.send(OperatorEvent::SchemaStateRequest(SchemaStateRequest {
			subtask,
		}))
	}

	fn send(&self, event: OperatorEvent) -> Result<()> {
		trace!(operator = %self.operator, subtask = event.subtask().0, ?event, "sending to coordinator");
		let serialized = encode_event(&event)?;
		self.gateway.send_to_coordinator(&self.operator, serialized)
	}
}

#[cfg(test)]
pub mod tests {
	use std::sync::Arc;

	use parking_lot::Mutex;
	use tributary_core::{
		event::{FlushSuccessEvent, OperatorEvent, SerializedEvent, SinkWriterRegisterEvent},
		interface::CoordinatorGateway,
	};
	use tributary_type::{OperatorId, Result, SchemaVersion, SubtaskId, TableId};

	use crate::{SchemaEvolutionClient, TransportError, codec::decode_event};

	#[derive(Default)]
	struct Capture {
		sent: Mutex<Vec<(OperatorId, SerializedEvent)>>,
		down: bool,
	}

	impl CoordinatorGateway for Capture {
		fn send_to_coordinator(&self, operator: &OperatorId, event: SerializedEvent) -> Result<()> {
			if self.down {
				return Err(TransportError::CoordinatorUnreachable(operator.clone()).into());
			}
			self.sent.lock().push((operator.clone(), event));
			Ok(())
		}
	}

	fn decoded(capture: &Capture) -> Vec<OperatorEvent> {
		capture.sent.lock().iter().map(|(_, e)| decode_event(e).unwrap()).collect()
	}

	mod register_subtask {
		use super::*;

		#[test]
		fn test_sends_register_event() {
			let capture = Arc::new(Capture::default());
			let client = SchemaEvolutionClient::new(OperatorId::new("op"), capture.clone());

			client.register_subtask(SubtaskId(4)).unwrap();

			assert_eq!(capture.sent.lock()[0].0, OperatorId::new("op"));
			assert_eq!(
				decoded(&capture),
				vec![OperatorEvent::Register(SinkWriterRegisterEvent {
					subtask: SubtaskId(4)
				})]
			);
		}

		#[test]
		fn test_unreachable_coordinator() {
			let capture = Arc::new(Capture {
				down: true,
				..Capture::default()
			});
			let client = SchemaEvolutionClient::new(OperatorId::new("op"), capture);

			let err = client.register_subtask(SubtaskId(0)).unwrap_err();
			assert_eq!(err.code(), "EVOLUTION_001");
		}
	}

	mod notify_flush_success {
		use super::*;

		#[test]
		fn test_every_call_is_one_send() {
			let capture = Arc::new(Capture::default());
			let client = SchemaEvolutionClient::new(OperatorId::new("op"), capture.clone());
			let table = TableId::new("shop", "orders");

			client.notify_flush_success(SubtaskId(1), table.clone(), SchemaVersion(4)).unwrap();
			client.notify_flush_success(SubtaskId(1), table.clone(), SchemaVersion(4)).unwrap();

			let expected = OperatorEvent::FlushSuccess(FlushSuccessEvent {
				subtask: SubtaskId(1),
				table,
				version: SchemaVersion(4),
			});
			assert_eq!(decoded(&capture), vec![expected.clone(), expected]);
		}
	}
}
