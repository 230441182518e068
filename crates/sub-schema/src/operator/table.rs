// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::VecDeque;

use tributary_core::{
	event::{SchemaChangeEvent, StreamElement},
	schema::Schema,
};
use tributary_type::SchemaVersion;

use crate::operator::status::{TablePhase, TableStatus};

/// Progress of the flush and notifications for one schema change. Each
/// step is done once and never repeated on retry.
#[derive(Debug)]
pub(crate) struct Handshake {
	pub(crate) version: SchemaVersion,
	/// `None` when acknowledging a round another subtask started, after a
	/// restart.
	pub(crate) change: Option<SchemaChangeEvent>,
	pub(crate) flushed: bool,
	pub(crate) requested: bool,
	pub(crate) acknowledged: bool,
	pub(crate) failures: u32,
}

impl Handshake {
	pub(crate) fn new(change: SchemaChangeEvent) -> Self {
		Self {
			version: change.version,
			change: Some(change),
			flushed: false,
			requested: false,
			acknowledged: false,
			failures: 0,
		}
	}

	pub(crate) fn acknowledge_only(version: SchemaVersion) -> Self {
		Self {
			version,
			change: None,
			flushed: false,
			requested: true,
			acknowledged: false,
			failures: 0,
		}
	}
}

#[derive(Debug, Default)]
pub(crate) enum Phase {
	#[default]
	Normal,
	AwaitingFlush(Handshake),
	Blocked {
		version: SchemaVersion,
	},
}

/// Per-table state of one subtask. Only the table in the middle of a change
/// is held back, every other table keeps flowing.
#[derive(Debug, Default)]
pub(crate) struct TableState {
	pub(crate) version: SchemaVersion,
	pub(crate) schema: Option<Schema>,
	pub(crate) phase: Phase,
	/// Elements held back in arrival order.
	pub(crate) buffer: VecDeque<StreamElement>,
}

impl TableState {
	pub(crate) fn awaited(&self) -> Option<SchemaVersion> {
		match &self.phase {
			Phase::Normal => None,
			Phase::AwaitingFlush(handshake) => Some(handshake.version),
			Phase::Blocked {
				version,
			} => Some(*version),
		}
	}

	pub(crate) fn is_normal(&self) -> bool {
		matches!(self.phase, Phase::Normal)
	}

	/// Whether a marker for `version` was already seen or applied.
	pub(crate) fn is_replayed(&self, version: SchemaVersion) -> bool {
		version <= self.version || self.awaited().is_some_and(|awaited| version <= awaited)
	}

	/// Switch to `schema` and return the held back elements for replay.
	pub(crate) fn adopt(&mut self, version: SchemaVersion, schema: Schema) -> VecDeque<StreamElement> {
		self.version = version;
		self.schema = Some(schema);
		self.phase = Phase::Normal;
		std::mem::take(&mut self.buffer)
	}

	pub(crate) fn status(&self) -> TableStatus {
		let phase = match &self.phase {
			Phase::Normal => TablePhase::Normal,
			Phase::AwaitingFlush(handshake) => TablePhase::AwaitingFlush(handshake.version),
			Phase::Blocked {
				version,
			} => TablePhase::Blocked(*version),
		};
		TableStatus {
			version: self.version,
			phase,
			buffered: self.buffer.len(),
		}
	}
}

#[cfg(test)]
pub mod tests {
	use tributary_core::{
		event::{DataChangeEvent, SchemaChangeEvent, StreamElement},
		record::{FieldAccessor, GenericRecord},
		schema::{Schema, SchemaChange},
	};
	use tributary_type::{SchemaVersion, TableId, Value};

	use crate::operator::{
		status::TablePhase,
		table::{Handshake, Phase, TableState},
	};

	fn marker(version: u64) -> SchemaChangeEvent {
		SchemaChangeEvent::new(TableId::new("shop", "orders"), version, SchemaChange::CreateTable(Schema::default()))
	}

	fn row(id: i32) -> StreamElement {
		DataChangeEvent::insert(TableId::new("shop", "orders"), GenericRecord::of([Value::Int(id)])).into()
	}

	#[test]
	fn test_replayed_markers() {
		let mut table = TableState {
			version: SchemaVersion(2),
			..TableState::default()
		};
		assert!(table.is_replayed(SchemaVersion(1)));
		assert!(table.is_replayed(SchemaVersion(2)));
		assert!(!table.is_replayed(SchemaVersion(3)));

		table.phase = Phase::AwaitingFlush(Handshake::new(marker(4)));
		assert!(table.is_replayed(SchemaVersion(4)));
		assert!(!table.is_replayed(SchemaVersion(5)));
	}

	#[test]
	fn test_adopt_returns_buffer_in_order() {
		let mut table = TableState {
			phase: Phase::Blocked {
				version: SchemaVersion(1),
			},
			..TableState::default()
		};
		table.buffer.push_back(row(1));
		table.buffer.push_back(row(2));
		assert_eq!(table.status().phase, TablePhase::Blocked(SchemaVersion(1)));
		assert_eq!(table.status().buffered, 2);

		let replay = table.adopt(SchemaVersion(1), Schema::default());
		assert!(table.is_normal());
		assert!(table.buffer.is_empty());
		assert_eq!(replay.len(), 2);
		match &replay[0] {
			StreamElement::Data(event) => assert_eq!(event.after().map(|r| r.get_int(0)), Some(1)),
			other => panic!("unexpected element {:?}", other),
		}
	}

	#[test]
	fn test_acknowledge_only_skips_request() {
		let handshake = Handshake::acknowledge_only(SchemaVersion(3));
		assert!(handshake.requested);
		assert!(handshake.change.is_none());
	}
}
