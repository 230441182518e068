// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	io,
	sync::Arc,
	thread,
};

use tracing::debug;

use crate::actor::{
	context::{CancellationToken, Context},
	mailbox::{ActorRef, create_mailbox},
	runner::ActorRunner,
	timers::SchedulerHandle,
	traits::Actor,
};

/// Returned by [`ActorHandle::join`] when the actor thread panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinError(String);

impl JoinError {
	pub fn new(reason: impl Into<String>) -> Self {
		Self(reason.into())
	}
}

impl Display for JoinError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "actor panicked: {}", self.0)
	}
}

impl std::error::Error for JoinError {}

/// Handle to an actor running on its own thread.
pub struct ActorHandle<M> {
	actor_ref: ActorRef<M>,
	join_handle: Option<thread::JoinHandle<()>>,
}

impl<M> ActorHandle<M> {
	pub fn actor_ref(&self) -> &ActorRef<M> {
		&self.actor_ref
	}

	pub fn is_finished(&self) -> bool {
		self.join_handle.as_ref().is_none_or(|handle| handle.is_finished())
	}

	/// Wait for the actor to complete.
	pub fn join(mut self) -> Result<(), JoinError> {
		match self.join_handle.take() {
			Some(handle) => handle.join().map_err(|e| {
				let reason = e
					.downcast_ref::<&str>()
					.map(|s| s.to_string())
					.or_else(|| e.downcast_ref::<String>().cloned())
					.unwrap_or_else(|| "unknown panic".to_string());
				JoinError::new(reason)
			}),
			None => Ok(()),
		}
	}
}

struct Inner {
	cancel: CancellationToken,
	scheduler: SchedulerHandle,
}

/// Owns the shared timer scheduler and the shutdown signal of a group of
/// actors. Cloning is cheap.
#[derive(Clone)]
pub struct ActorSystem {
	inner: Arc<Inner>,
}

impl ActorSystem {
	pub fn new() -> io::Result<Self> {
		Ok(Self {
			inner: Arc::new(Inner {
				cancel: CancellationToken::new(),
				scheduler: SchedulerHandle::new()?,
			}),
		})
	}

	/// Spawn `actor` on a dedicated OS thread named `name`.
	pub fn spawn<A: Actor>(&self, name: &str, actor: A) -> io::Result<ActorHandle<A::Message>> {
		let config = actor.config();
		let (actor_ref, mailbox) = create_mailbox(config.mailbox_capacity);
		let ctx = Context::new(actor_ref.clone(), self.clone(), self.cancellation_token());
		let runner = ActorRunner::new(name.to_string(), actor, mailbox, ctx);

		let join_handle = thread::Builder::new().name(name.to_string()).spawn(move || runner.run())?;

		Ok(ActorHandle {
			actor_ref,
			join_handle: Some(join_handle),
		})
	}

	pub fn scheduler(&self) -> &SchedulerHandle {
		&self.inner.scheduler
	}

	pub fn cancellation_token(&self) -> CancellationToken {
		self.inner.cancel.clone()
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.cancel.is_cancelled()
	}

	/// Signal every actor to stop and stop the timer scheduler. Actors exit
	/// within one shutdown check interval. Join their handles to wait.
	pub fn shutdown(&self) {
		debug!("actor system shutting down");
		self.inner.cancel.cancel();
		self.inner.scheduler.shutdown();
	}
}
