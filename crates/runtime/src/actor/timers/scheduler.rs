// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering as CmpOrdering,
	collections::BinaryHeap,
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::trace;

use super::{TimerHandle, next_timer_id};

struct TimerEntry {
	id: u64,
	deadline: Instant,
	callback: Box<dyn FnOnce() + Send>,
	cancelled: Arc<AtomicBool>,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
	fn eq(&self, other: &Self) -> bool {
		self.deadline == other.deadline && self.id == other.id
	}
}

impl Ord for TimerEntry {
	// BinaryHeap is a max-heap, reverse for earliest deadline first.
	fn cmp(&self, other: &Self) -> CmpOrdering {
		other.deadline.cmp(&self.deadline).then_with(|| other.id.cmp(&self.id))
	}
}

impl PartialOrd for TimerEntry {
	fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
		Some(self.cmp(other))
	}
}

enum SchedulerCommand {
	Schedule(TimerEntry),
	Shutdown,
}

/// Handle to the timer scheduler thread.
///
/// Callbacks run on the scheduler thread itself, so they must be short.
/// Sending a message to a mailbox is the intended use.
pub struct SchedulerHandle {
	command_tx: Sender<SchedulerCommand>,
	join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerHandle {
	pub fn new() -> io::Result<Self> {
		let (command_tx, command_rx) = bounded(256);

		let join_handle =
			thread::Builder::new().name("timer-scheduler".to_string()).spawn(move || scheduler_loop(command_rx))?;

		Ok(Self {
			command_tx,
			join_handle: Mutex::new(Some(join_handle)),
		})
	}

	/// Schedule a callback to fire once after a delay.
	pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> TimerHandle
	where
		F: FnOnce() + Send + 'static,
	{
		let handle = TimerHandle::new(next_timer_id());

		let _ = self.command_tx.send(SchedulerCommand::Schedule(TimerEntry {
			id: handle.id(),
			deadline: Instant::now() + delay,
			callback: Box::new(callback),
			cancelled: handle.cancelled_flag(),
		}));

		handle
	}

	/// Stop the scheduler and wait for its thread. Pending timers never fire.
	pub fn shutdown(&self) {
		let _ = self.command_tx.send(SchedulerCommand::Shutdown);

		if let Some(handle) = self.join_handle.lock().take() {
			let _ = handle.join();
		}
	}
}

impl Drop for SchedulerHandle {
	fn drop(&mut self) {
		// no join, dropping must not block
		let _ = self.command_tx.send(SchedulerCommand::Shutdown);
	}
}

fn scheduler_loop(command_rx: Receiver<SchedulerCommand>) {
	let mut heap: BinaryHeap<TimerEntry> = BinaryHeap::new();

	loop {
		let timeout = heap.peek().map(|entry| entry.deadline.saturating_duration_since(Instant::now()));

		let command = match timeout {
			Some(Duration::ZERO) => command_rx.try_recv().ok(),
			Some(timeout) => match command_rx.recv_timeout(timeout) {
				Ok(command) => Some(command),
				Err(RecvTimeoutError::Timeout) => None,
				Err(RecvTimeoutError::Disconnected) => return,
			},
			None => match command_rx.recv() {
				Ok(command) => Some(command),
				Err(_) => return,
			},
		};

		match command {
			Some(SchedulerCommand::Schedule(entry)) => heap.push(entry),
			Some(SchedulerCommand::Shutdown) => return,
			None => {}
		}

		let now = Instant::now();
		while heap.peek().is_some_and(|entry| entry.deadline <= now) {
			let Some(entry) = heap.pop() else {
				break;
			};
			if entry.cancelled.load(Ordering::SeqCst) {
				trace!(timer = entry.id, "skipping cancelled timer");
				continue;
			}
			(entry.callback)();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc;

	use super::*;

	#[test]
	fn test_schedule_once() {
		let scheduler = SchedulerHandle::new().unwrap();

		let (tx, rx) = mpsc::channel();
		scheduler.schedule_once(Duration::from_millis(10), move || {
			tx.send(()).unwrap();
		});

		rx.recv_timeout(Duration::from_secs(1)).unwrap();
		scheduler.shutdown();
	}

	#[test]
	fn test_schedule_once_zero_delay() {
		let scheduler = SchedulerHandle::new().unwrap();

		let (tx, rx) = mpsc::channel();
		scheduler.schedule_once(Duration::ZERO, move || {
			tx.send(()).unwrap();
		});

		rx.recv_timeout(Duration::from_secs(1)).unwrap();
		scheduler.shutdown();
	}

	#[test]
	fn test_cancel_before_fire() {
		let scheduler = SchedulerHandle::new().unwrap();

		let (tx, rx) = mpsc::channel();
		let handle = scheduler.schedule_once(Duration::from_millis(50), move || {
			tx.send(()).unwrap();
		});

		assert!(handle.cancel());
		assert!(!handle.cancel());
		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

		scheduler.shutdown();
	}

	#[test]
	fn test_multiple_timers_fire_in_deadline_order() {
		let scheduler = SchedulerHandle::new().unwrap();

		let results = Arc::new(Mutex::new(Vec::new()));

		for i in 0..5u64 {
			let results = results.clone();
			scheduler.schedule_once(Duration::from_millis((5 - i) * 10), move || {
				results.lock().push(i);
			});
		}

		thread::sleep(Duration::from_millis(150));

		assert_eq!(*results.lock(), vec![4, 3, 2, 1, 0]);
		scheduler.shutdown();
	}

	#[test]
	fn test_shutdown_drops_pending_timers() {
		let scheduler = SchedulerHandle::new().unwrap();

		let (tx, rx) = mpsc::channel::<()>();
		scheduler.schedule_once(Duration::from_secs(10), move || {
			let _ = tx.send(());
		});
		scheduler.shutdown();

		assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
	}
}
