// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A vector that is shared until it is written to.
///
/// Encoded records are handed to many consumers (sink writers, buffers,
/// replay) without copying; the first mutation detaches a private copy.
#[derive(Clone, Debug)]
pub enum CowVec<T>
where
	T: Clone,
{
	Owned(Vec<T>),
	Shared(Arc<Vec<T>>),
}

impl<T> CowVec<T>
where
	T: Clone,
{
	pub fn new(vec: Vec<T>) -> Self {
		CowVec::Owned(vec)
	}

	pub fn from_shared(shared: Arc<Vec<T>>) -> Self {
		CowVec::Shared(shared)
	}

	/// Turn an owned buffer into a shared one so clones are free.
	pub fn share(self) -> Self {
		match self {
			CowVec::Owned(vec) => CowVec::Shared(Arc::new(vec)),
			shared => shared,
		}
	}

	/// Ensures unique ownership and returns a mutable reference to the inner Vec.
	pub fn make_mut(&mut self) -> &mut Vec<T> {
		if let CowVec::Shared(shared) = self {
			*self = CowVec::Owned((**shared).clone());
		}
		match self {
			CowVec::Owned(vec) => vec,
			CowVec::Shared(_) => unreachable!(),
		}
	}

	pub fn as_slice(&self) -> &[T] {
		match self {
			CowVec::Owned(vec) => vec,
			CowVec::Shared(shared) => shared,
		}
	}

	pub fn is_shared(&self) -> bool {
		matches!(self, CowVec::Shared(_))
	}

	pub fn push(&mut self, value: T) {
		self.make_mut().push(value);
	}

	pub fn extend(&mut self, iter: impl IntoIterator<Item = T>) {
		self.make_mut().extend(iter);
	}
}

impl<T> Deref for CowVec<T>
where
	T: Clone,
{
	type Target = [T];

	fn deref(&self) -> &Self::Target {
		self.as_slice()
	}
}

impl<T> PartialEq for CowVec<T>
where
	T: Clone + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.as_slice() == other.as_slice()
	}
}

impl<T> Eq for CowVec<T> where T: Clone + Eq {}

impl<T> From<Vec<T>> for CowVec<T>
where
	T: Clone,
{
	fn from(vec: Vec<T>) -> Self {
		CowVec::Owned(vec)
	}
}

impl<T> Serialize for CowVec<T>
where
	T: Clone + Serialize,
{
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.as_slice().serialize(serializer)
	}
}

impl<'de, T> Deserialize<'de> for CowVec<T>
where
	T: Clone + Deserialize<'de>,
{
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Vec::<T>::deserialize(deserializer).map(CowVec::Owned)
	}
}
