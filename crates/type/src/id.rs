// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

/// Fully qualified name of a captured table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
	namespace: String,
	name: String,
}

impl TableId {
	pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			name: name.into(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl Display for TableId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.namespace, self.name)
	}
}

/// Index of a parallel sink-writer subtask, `0..parallelism`.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(pub u32);

impl Deref for SubtaskId {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq<u32> for SubtaskId {
	fn eq(&self, other: &u32) -> bool {
		self.0.eq(other)
	}
}

impl From<u32> for SubtaskId {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

impl From<SubtaskId> for u32 {
	fn from(value: SubtaskId) -> Self {
		value.0
	}
}

impl Display for SubtaskId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Identifies the operator whose coordinator an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(pub String);

impl OperatorId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}
}

impl Display for OperatorId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Monotonically increasing per-table version issued by the source for every
/// structural change. Version 0 means no schema is known yet.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(pub u64);

impl SchemaVersion {
	pub const INITIAL: SchemaVersion = SchemaVersion(0);

	pub fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl Deref for SchemaVersion {
	type Target = u64;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq<u64> for SchemaVersion {
	fn eq(&self, other: &u64) -> bool {
		self.0.eq(other)
	}
}

impl From<u64> for SchemaVersion {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

impl Display for SchemaVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "v{}", self.0)
	}
}
