// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, BTreeSet};

use tributary_type::SubtaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
	New,
	/// The subtask was live already, so this is a new incarnation of it.
	Restart {
		incarnation: u64,
	},
}

/// Live subtasks and how often each one started. Entries are never removed
/// for the lifetime of the job.
#[derive(Debug, Default)]
pub(crate) struct Registry {
	subtasks: BTreeMap<SubtaskId, u64>,
}

impl Registry {
	pub(crate) fn register(&mut self, subtask: SubtaskId) -> Registration {
		match self.subtasks.get_mut(&subtask) {
			Some(incarnation) => {
				*incarnation += 1;
				Registration::Restart {
					incarnation: *incarnation,
				}
			}
			None => {
				self.subtasks.insert(subtask, 0);
				Registration::New
			}
		}
	}

	pub(crate) fn is_registered(&self, subtask: SubtaskId) -> bool {
		self.subtasks.contains_key(&subtask)
	}

	pub(crate) fn live(&self) -> BTreeSet<SubtaskId> {
		self.subtasks.keys().copied().collect()
	}

	pub(crate) fn incarnations(&self) -> impl Iterator<Item = (SubtaskId, u64)> + '_ {
		self.subtasks.iter().map(|(subtask, incarnation)| (*subtask, *incarnation))
	}
}
