// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeSet, time::Instant};

use tributary_core::schema::Schema;
use tributary_type::{SchemaVersion, SubtaskId, TableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ack {
	Counted,
	Duplicate,
	/// The subtask registered after the round started.
	NotRequired,
}

/// One schema change waiting for the flush acknowledgements of every
/// subtask that was live when it started.
#[derive(Debug)]
pub(crate) struct Round {
	pub(crate) table: TableId,
	pub(crate) version: SchemaVersion,
	pub(crate) schema: Schema,
	required: BTreeSet<SubtaskId>,
	acknowledged: BTreeSet<SubtaskId>,
	pub(crate) started: Instant,
}

impl Round {
	pub(crate) fn new(table: TableId, version: SchemaVersion, schema: Schema, required: BTreeSet<SubtaskId>) -> Self {
		Self {
			table,
			version,
			schema,
			required,
			acknowledged: BTreeSet::new(),
			started: Instant::now(),
		}
	}

	pub(crate) fn acknowledge(&mut self, subtask: SubtaskId) -> Ack {
		if !self.required.contains(&subtask) {
			Ack::NotRequired
		} else if self.acknowledged.insert(subtask) {
			Ack::Counted
		} else {
			Ack::Duplicate
		}
	}

	/// Drop the acknowledgement of a restarted subtask. Returns whether it
	/// had acknowledged.
	pub(crate) fn forget(&mut self, subtask: SubtaskId) -> bool {
		self.acknowledged.remove(&subtask)
	}

	pub(crate) fn is_complete(&self) -> bool {
		self.required.is_subset(&self.acknowledged)
	}

	pub(crate) fn is_pending(&self, subtask: SubtaskId) -> bool {
		self.required.contains(&subtask) && !self.acknowledged.contains(&subtask)
	}

	pub(crate) fn required(&self) -> &BTreeSet<SubtaskId> {
		&self.required
	}

	pub(crate) fn acknowledged(&self) -> &BTreeSet<SubtaskId> {
		&self.acknowledged
	}

	pub(crate) fn pending(&self) -> BTreeSet<SubtaskId> {
		self.required.difference(&self.acknowledged).copied().collect()
	}
}

#[cfg(test)]
pub mod tests {
	use std::collections::BTreeSet;

	use tributary_core::schema::Schema;
	use tributary_type::{SchemaVersion, SubtaskId, TableId};

	use crate::coordinator::round::{Ack, Round};

	fn round(required: &[u32]) -> Round {
		Round::new(
			TableId::new("shop", "orders"),
			SchemaVersion(1),
			Schema::default(),
			required.iter().copied().map(SubtaskId).collect::<BTreeSet<_>>(),
		)
	}

	#[test]
	fn test_completes_when_all_required_acknowledged() {
		let mut round = round(&[0, 1]);

		assert_eq!(round.acknowledge(SubtaskId(0)), Ack::Counted);
		assert!(!round.is_complete());
		assert_eq!(round.acknowledge(SubtaskId(0)), Ack::Duplicate);
		assert_eq!(round.acknowledge(SubtaskId(1)), Ack::Counted);
		assert!(round.is_complete());
	}

	#[test]
	fn test_late_registrant_is_not_counted() {
		let mut round = round(&[0]);
		assert_eq!(round.acknowledge(SubtaskId(3)), Ack::NotRequired);
		assert_eq!(round.required().len(), 1);
		assert!(round.acknowledged().is_empty());
	}

	#[test]
	fn test_forget_requires_acknowledging_again() {
		let mut round = round(&[0, 1]);
		round.acknowledge(SubtaskId(1));

		assert!(round.forget(SubtaskId(1)));
		assert!(!round.forget(SubtaskId(0)));
		assert!(round.is_pending(SubtaskId(1)));
		assert_eq!(round.pending().len(), 2);
	}

	#[test]
	fn test_empty_required_set_is_complete() {
		assert!(round(&[]).is_complete());
	}
}
