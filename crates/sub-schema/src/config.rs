// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tributary_type::{OperatorId, Result};

/// Exponential backoff for sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
	/// Attempts before the subtask gives up, the first try included.
	pub max_attempts: u32,
	#[serde(with = "millis")]
	pub initial_backoff: Duration,
	#[serde(with = "millis")]
	pub max_backoff: Duration,
	pub multiplier: f64,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 5,
			initial_backoff: Duration::from_millis(50),
			max_backoff: Duration::from_secs(2),
			multiplier: 2.0,
		}
	}
}

impl RetryPolicy {
	pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
		Self {
			max_attempts,
			initial_backoff,
			..Self::default()
		}
	}

	pub fn max_backoff(mut self, max_backoff: Duration) -> Self {
		self.max_backoff = max_backoff;
		self
	}

	pub fn multiplier(mut self, multiplier: f64) -> Self {
		self.multiplier = multiplier;
		self
	}

	/// Delay before retry number `attempt`, counting from 1.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(32) as i32;
		let delay = self.initial_backoff.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
		Duration::try_from_secs_f64(delay).unwrap_or(self.max_backoff).min(self.max_backoff)
	}

	/// Whether another attempt is allowed after `attempts` failed ones.
	pub fn can_retry(&self, attempts: u32) -> bool {
		attempts < self.max_attempts
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaEvolutionConfig {
	/// Identifies the coordinator the subtasks talk to.
	pub operator_id: OperatorId,
	pub retry: RetryPolicy,
	/// 0 = unbounded
	pub coordinator_mailbox_capacity: usize,
	/// 0 = unbounded
	pub operator_mailbox_capacity: usize,
}

impl Default for SchemaEvolutionConfig {
	fn default() -> Self {
		Self {
			operator_id: OperatorId::new("schema-evolution"),
			retry: RetryPolicy::default(),
			coordinator_mailbox_capacity: 0,
			operator_mailbox_capacity: 0,
		}
	}
}

impl SchemaEvolutionConfig {
	pub fn new(operator_id: impl Into<String>) -> Self {
		Self {
			operator_id: OperatorId::new(operator_id),
			..Self::default()
		}
	}

	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn coordinator_mailbox_capacity(mut self, capacity: usize) -> Self {
		self.coordinator_mailbox_capacity = capacity;
		self
	}

	pub fn operator_mailbox_capacity(mut self, capacity: usize) -> Self {
		self.operator_mailbox_capacity = capacity;
		self
	}

	/// Parse a configuration. Missing fields take their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(value.as_millis() as u64)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		Ok(Duration::from_millis(u64::deserialize(deserializer)?))
	}
}
