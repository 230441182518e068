// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use tracing::debug;

use crate::actor::{
	context::Context,
	mailbox::{Mailbox, RecvTimeoutError},
	traits::{Actor, Flow},
};

/// Interval for checking cancellation during blocked recv.
const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Drives one actor on its dedicated thread.
pub(crate) struct ActorRunner<A: Actor> {
	name: String,
	actor: A,
	mailbox: Mailbox<A::Message>,
	ctx: Context<A::Message>,
}

impl<A: Actor> ActorRunner<A> {
	pub(crate) fn new(name: String, actor: A, mailbox: Mailbox<A::Message>, ctx: Context<A::Message>) -> Self {
		Self {
			name,
			actor,
			mailbox,
			ctx,
		}
	}

	pub(crate) fn run(self) {
		debug!(actor = %self.name, "actor starting");

		let mut state = self.actor.init(&self.ctx);
		self.actor.pre_start(&mut state, &self.ctx);
		self.run_loop(&mut state);
		self.actor.post_stop(&mut state);

		debug!(actor = %self.name, "actor stopped");
	}

	fn run_loop(&self, state: &mut A::State) {
		loop {
			if self.ctx.is_cancelled() {
				debug!(actor = %self.name, "actor cancelled, stopping");
				return;
			}

			match self.mailbox.recv_timeout(SHUTDOWN_CHECK_INTERVAL) {
				Ok(msg) => match self.actor.handle(state, msg, &self.ctx) {
					Flow::Stop => {
						debug!(actor = %self.name, "actor returned Flow::Stop");
						return;
					}
					Flow::Continue => continue,
				},
				Err(RecvTimeoutError::Timeout) => continue,
				Err(RecvTimeoutError::Closed) => {
					debug!(actor = %self.name, "actor mailbox closed, stopping");
					return;
				}
			}
		}
	}
}
