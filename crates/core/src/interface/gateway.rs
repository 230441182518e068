// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tributary_type::{OperatorId, Result, SubtaskId};

use crate::event::{CoordinatorEvent, SerializedEvent};

/// Delivers events from a subtask to the coordinator of `operator`.
///
/// Delivery is at-least-once and preserves the order of events sent by one
/// subtask. An `Err` means the event was not accepted and may be retried.
pub trait CoordinatorGateway: Send + Sync {
	fn send_to_coordinator(&self, operator: &OperatorId, event: SerializedEvent) -> Result<()>;
}

/// Delivers coordinator events to one subtask.
pub trait SubtaskGateway: Send + Sync {
	fn send_to_subtask(&self, subtask: SubtaskId, event: CoordinatorEvent) -> Result<()>;
}

impl<T: CoordinatorGateway + ?Sized> CoordinatorGateway for Arc<T> {
	fn send_to_coordinator(&self, operator: &OperatorId, event: SerializedEvent) -> Result<()> {
		(**self).send_to_coordinator(operator, event)
	}
}

impl<T: SubtaskGateway + ?Sized> SubtaskGateway for Arc<T> {
	fn send_to_subtask(&self, subtask: SubtaskId, event: CoordinatorEvent) -> Result<()> {
		(**self).send_to_subtask(subtask, event)
	}
}
