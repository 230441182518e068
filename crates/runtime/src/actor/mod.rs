// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Actor runtime.
//!
//! Every actor runs on its own OS thread and owns its state exclusively.
//! Messages arrive through a [`mailbox`] and are handled one at a time in
//! arrival order. Timers are driven by a single scheduler thread per
//! [`system::ActorSystem`].

pub mod context;
pub mod mailbox;
mod runner;
pub mod system;
pub mod timers;
pub mod traits;

pub use context::{CancellationToken, Context};
pub use mailbox::{ActorRef, SendError};
pub use system::{ActorHandle, ActorSystem, JoinError};
pub use timers::TimerHandle;
pub use traits::{Actor, ActorConfig, Flow};
