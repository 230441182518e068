// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeSet, time::Duration};

use serde::Serialize;
use tributary_type::{SchemaVersion, SubtaskId, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
	pub table: TableId,
	pub version: SchemaVersion,
	pub required: BTreeSet<SubtaskId>,
	pub acknowledged: BTreeSet<SubtaskId>,
	pub pending: BTreeSet<SubtaskId>,
	pub age: Duration,
}

/// Point-in-time view of the coordinator. A round that does not release
/// is only visible here, the protocol itself never times out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
	/// Registered subtasks with their incarnation, 0 for the first start.
	pub subtasks: Vec<(SubtaskId, u64)>,
	pub rounds: Vec<RoundSnapshot>,
	/// Changes waiting behind an active round of the same table.
	pub queued: Vec<(TableId, SchemaVersion)>,
	/// Last released version per table.
	pub tables: Vec<(TableId, SchemaVersion)>,
	/// Total number of releases broadcast.
	pub releases: u64,
}

impl CoordinatorSnapshot {
	pub fn round(&self, table: &TableId) -> Option<&RoundSnapshot> {
		self.rounds.iter().find(|round| &round.table == table)
	}

	pub fn version(&self, table: &TableId) -> Option<SchemaVersion> {
		self.tables.iter().find(|(t, _)| t == table).map(|(_, version)| *version)
	}

	pub fn is_registered(&self, subtask: SubtaskId) -> bool {
		self.subtasks.iter().any(|(s, _)| *s == subtask)
	}

	/// Rounds that have been waiting for longer than `threshold`.
	pub fn stalled(&self, threshold: Duration) -> Vec<&RoundSnapshot> {
		self.rounds.iter().filter(|round| round.age > threshold).collect()
	}
}
