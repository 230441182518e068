// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;
use tributary_core::{event::SerializedEvent, interface::CoordinatorGateway};
use tributary_type::{
	OperatorId, Result,
	error::{Diagnostic, Error},
};

/// Wraps a gateway and fails the first `failures` sends, then delegates.
pub struct FlakyGateway<G> {
	inner: G,
	remaining: AtomicUsize,
	attempts: AtomicUsize,
}

impl<G: CoordinatorGateway> FlakyGateway<G> {
	pub fn new(inner: G, failures: usize) -> Self {
		Self {
			inner,
			remaining: AtomicUsize::new(failures),
			attempts: AtomicUsize::new(0),
		}
	}

	/// Fail the next `count` sends as well.
	pub fn fail_next(&self, count: usize) {
		self.remaining.store(count, Ordering::SeqCst);
	}

	/// Every send attempted, failed ones included.
	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}
}

impl<G: CoordinatorGateway> CoordinatorGateway for FlakyGateway<G> {
	fn send_to_coordinator(&self, operator: &OperatorId, event: SerializedEvent) -> Result<()> {
		self.attempts.fetch_add(1, Ordering::SeqCst);

		let failed = self
			.remaining
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| remaining.checked_sub(1))
			.is_ok();
		if failed {
			debug!(%operator, "dropping event sent to coordinator");
			return Err(Error::new(Diagnostic {
				code: "TESTING_001".to_string(),
				message: format!("injected transport failure towards {}", operator),
				help: None,
				notes: vec![],
				cause: None,
			}));
		}

		self.inner.send_to_coordinator(operator, event)
	}
}
