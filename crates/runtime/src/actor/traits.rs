// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::actor::context::Context;

/// What the actor wants to do after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	/// Keep processing messages.
	Continue,

	/// Stop this actor permanently.
	///
	/// The actor's `post_stop` hook is called and its thread exits.
	Stop,
}

#[derive(Debug, Clone, Default)]
pub struct ActorConfig {
	/// Mailbox capacity. 0 = unbounded.
	pub mailbox_capacity: usize,
}

impl ActorConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the mailbox capacity. 0 = unbounded.
	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		self.mailbox_capacity = capacity;
		self
	}
}

/// An isolated unit of computation.
///
/// Actors own their state exclusively, process messages one at a time and
/// communicate with other actors only by message passing.
///
/// # Lifecycle
///
/// 1. `init()` - Create initial state
/// 2. `pre_start()` - Called before processing begins
/// 3. Loop: `handle()` messages until `Flow::Stop` or system shutdown
/// 4. `post_stop()` - Cleanup after the loop exits
pub trait Actor: Send + 'static {
	/// The actor's internal state (owned, not shared).
	type State: 'static;

	/// Messages this actor can receive.
	type Message: Send + 'static;

	fn init(&self, ctx: &Context<Self::Message>) -> Self::State;

	fn handle(&self, state: &mut Self::State, msg: Self::Message, ctx: &Context<Self::Message>) -> Flow;

	/// Called once before message processing begins.
	#[allow(unused_variables)]
	fn pre_start(&self, state: &mut Self::State, ctx: &Context<Self::Message>) {}

	#[allow(unused_variables)]
	fn post_stop(&self, state: &mut Self::State) {}

	/// Actor configuration. Override for custom settings.
	fn config(&self) -> ActorConfig {
		ActorConfig::default()
	}
}
