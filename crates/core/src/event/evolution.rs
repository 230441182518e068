// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Events exchanged between the schema operators and their coordinator.

use serde::{Deserialize, Serialize};
use tributary_type::{SchemaVersion, SubtaskId, TableId};

use crate::{event::SchemaChangeEvent, schema::Schema};

/// Sent by a sink writer every time it starts, including after a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkWriterRegisterEvent {
	pub subtask: SubtaskId,
}

/// Sent once every record of `table` written under the old schema has been
/// flushed durably. `version` is the schema version the flush was made for,
/// so a redelivered acknowledgement never counts toward a later round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushSuccessEvent {
	pub subtask: SubtaskId,
	pub table: TableId,
	pub version: SchemaVersion,
}

/// Forwards a schema change marker seen by a subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChangeRequest {
	pub subtask: SubtaskId,
	pub event: SchemaChangeEvent,
}

/// Asks for the current schemas after a (re)start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStateRequest {
	pub subtask: SubtaskId,
}

/// Everything an operator sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorEvent {
	Register(SinkWriterRegisterEvent),
	FlushSuccess(FlushSuccessEvent),
	SchemaChangeRequest(SchemaChangeRequest),
	SchemaStateRequest(SchemaStateRequest),
}

impl OperatorEvent {
	pub fn subtask(&self) -> SubtaskId {
		match self {
			OperatorEvent::Register(event) => event.subtask,
			OperatorEvent::FlushSuccess(event) => event.subtask,
			OperatorEvent::SchemaChangeRequest(event) => event.subtask,
			OperatorEvent::SchemaStateRequest(event) => event.subtask,
		}
	}
}

/// An [`OperatorEvent`] in its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvent(Vec<u8>);

impl SerializedEvent {
	pub fn new(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.0
	}
}

/// Broadcast when every required subtask flushed `table`. Carries the
/// schema that records after the marker must be written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReleaseEvent {
	pub table: TableId,
	pub version: SchemaVersion,
	pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
	pub table: TableId,
	pub version: SchemaVersion,
	pub schema: Schema,
}

/// A table whose active round still waits for the requesting subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFlush {
	pub table: TableId,
	pub version: SchemaVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStateResponse {
	pub schemas: Vec<TableSchema>,
	pub pending_flush: Vec<PendingFlush>,
}

/// Everything the coordinator sends to a subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorEvent {
	Release(SchemaReleaseEvent),
	SchemaState(SchemaStateResponse),
}
