// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeMap;

use serde::Serialize;
use tributary_type::{SchemaVersion, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperatorState {
	/// Registering with the coordinator.
	Starting,
	Running,
	/// Gave up, the engine is expected to restart the subtask.
	Failed(String),
	Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TablePhase {
	Normal,
	/// Flushing and notifying the coordinator of the change to this version.
	AwaitingFlush(SchemaVersion),
	/// Waiting for the coordinator to release this version.
	Blocked(SchemaVersion),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
	pub version: SchemaVersion,
	pub phase: TablePhase,
	pub buffered: usize,
}

/// What one subtask is doing, published after every message it handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorStatus {
	pub state: OperatorState,
	pub tables: BTreeMap<TableId, TableStatus>,
}

impl Default for OperatorStatus {
	fn default() -> Self {
		Self {
			state: OperatorState::Starting,
			tables: BTreeMap::new(),
		}
	}
}

impl OperatorStatus {
	pub fn table(&self, table: &TableId) -> Option<&TableStatus> {
		self.tables.get(table)
	}

	pub fn is_failed(&self) -> bool {
		matches!(self.state, OperatorState::Failed(_))
	}
}
