// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Display, Formatter},
	time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

/// Returned when the receiving actor has stopped. Gives the message back.
pub struct SendError<M>(pub M);

impl<M> Debug for SendError<M> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("SendError(..)")
	}
}

impl<M> Display for SendError<M> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("actor mailbox closed")
	}
}

impl<M> std::error::Error for SendError<M> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecvTimeoutError {
	Timeout,
	Closed,
}

/// Address of an actor. Cheap to clone and shareable across threads.
pub struct ActorRef<M> {
	tx: Sender<M>,
}

impl<M: Send> ActorRef<M> {
	/// Queue `msg` for the actor. Blocks while a bounded mailbox is full.
	pub fn send(&self, msg: M) -> Result<(), SendError<M>> {
		self.tx.send(msg).map_err(|e| SendError(e.into_inner()))
	}

	/// Number of messages waiting to be handled.
	pub fn pending(&self) -> usize {
		self.tx.len()
	}
}

impl<M> Clone for ActorRef<M> {
	fn clone(&self) -> Self {
		Self {
			tx: self.tx.clone(),
		}
	}
}

impl<M> Debug for ActorRef<M> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorRef").field("pending", &self.tx.len()).finish()
	}
}

pub(crate) struct Mailbox<M> {
	rx: Receiver<M>,
}

impl<M> Mailbox<M> {
	pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
		self.rx.recv_timeout(timeout).map_err(|e| match e {
			crossbeam_channel::RecvTimeoutError::Timeout => RecvTimeoutError::Timeout,
			crossbeam_channel::RecvTimeoutError::Disconnected => RecvTimeoutError::Closed,
		})
	}
}

/// Create a mailbox. A capacity of 0 means unbounded.
pub(crate) fn create_mailbox<M>(capacity: usize) -> (ActorRef<M>, Mailbox<M>) {
	let (tx, rx) = if capacity == 0 {
		unbounded()
	} else {
		bounded(capacity)
	};
	(
		ActorRef {
			tx,
		},
		Mailbox {
			rx,
		},
	)
}
