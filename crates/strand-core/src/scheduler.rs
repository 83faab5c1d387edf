//! Host task scheduling
//!
//! The updaters never block or spin: every unit of work is handed to a
//! [`Scheduler`] as a [`Task`]. The scheduler is an injected capability so the
//! engine can run on any event loop. [`LocalScheduler`] is a deterministic,
//! single-threaded implementation driven explicitly by its owner.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::priority::TaskPriority;

/// A unit of work run by the scheduler
///
/// Errors returned by a task propagate to whoever drives the scheduler.
pub type Task = Box<dyn FnOnce() -> Result<()>>;

/// Options for [`Scheduler::request_callback`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCallbackOptions {
	pub priority: TaskPriority,
}

impl RequestCallbackOptions {
	pub fn with_priority(priority: TaskPriority) -> Self {
		Self { priority }
	}
}

/// Options for [`Scheduler::yield_to_main`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YieldToMainOptions {
	pub priority: Option<TaskPriority>,
}

/// Capability to run tasks on the host's event loop
pub trait Scheduler {
	/// Monotonic clock reading
	fn current_time(&self) -> Instant;

	/// Whether a render loop that has been running for `elapsed` should give
	/// control back to the host
	fn should_yield_to_main(&self, elapsed: Duration) -> bool;

	/// Run `task` later as a task of the given priority
	fn request_callback(&self, task: Task, options: RequestCallbackOptions);

	/// Run `task` before any other task
	fn queue_microtask(&self, task: Task);

	/// Future that resolves once the host has had a chance to run other tasks
	///
	/// # Example
	///
	/// ```ignore
	/// scheduler.yield_to_main(YieldToMainOptions::default()).await;
	/// ```
	fn yield_to_main(&self, options: YieldToMainOptions) -> LocalBoxFuture<'static, ()> {
		let (sender, receiver) = oneshot::channel::<()>();
		self.request_callback(
			Box::new(move || {
				let _ = sender.send(());
				Ok(())
			}),
			RequestCallbackOptions {
				priority: options.priority.unwrap_or_default(),
			},
		);
		Box::pin(async move {
			let _ = receiver.await;
		})
	}
}

/// Default time slice before a concurrent render yields.
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(5);

#[derive(Default)]
struct TaskQueues {
	microtasks: VecDeque<Task>,
	user_blocking: VecDeque<Task>,
	user_visible: VecDeque<Task>,
	background: VecDeque<Task>,
}

impl TaskQueues {
	fn lane(&mut self, priority: TaskPriority) -> &mut VecDeque<Task> {
		match priority {
			TaskPriority::UserBlocking => &mut self.user_blocking,
			TaskPriority::UserVisible => &mut self.user_visible,
			TaskPriority::Background => &mut self.background,
		}
	}

	fn pop(&mut self) -> Option<Task> {
		if let Some(task) = self.microtasks.pop_front() {
			return Some(task);
		}
		TaskPriority::DESCENDING
			.into_iter()
			.find_map(|priority| self.lane(priority).pop_front())
	}

	fn len(&self) -> usize {
		self.microtasks.len() + self.user_blocking.len() + self.user_visible.len() + self.background.len()
	}
}

/// Deterministic single-threaded scheduler
///
/// Tasks never run on their own: call [`LocalScheduler::run_until_idle`] or
/// [`LocalScheduler::run_next`]. Microtasks always run first, then tasks by
/// descending priority, FIFO within a priority.
pub struct LocalScheduler {
	frame_budget: Duration,
	queues: RefCell<TaskQueues>,
}

impl LocalScheduler {
	pub fn new() -> Self {
		Self::with_frame_budget(DEFAULT_FRAME_BUDGET)
	}

	/// Create a scheduler that asks renders to yield after `frame_budget`
	///
	/// A zero budget makes every concurrent render yield after each block.
	pub fn with_frame_budget(frame_budget: Duration) -> Self {
		Self {
			frame_budget,
			queues: RefCell::new(TaskQueues::default()),
		}
	}

	pub fn from_config(config: &RuntimeConfig) -> Self {
		Self::with_frame_budget(config.frame_budget())
	}

	pub fn frame_budget(&self) -> Duration {
		self.frame_budget
	}

	/// Number of queued tasks, microtasks included
	pub fn pending_tasks(&self) -> usize {
		self.queues.borrow().len()
	}

	/// Run the next queued task
	///
	/// Returns `Ok(false)` when nothing was queued.
	pub fn run_next(&self) -> Result<bool> {
		let task = self.queues.borrow_mut().pop();
		match task {
			Some(task) => {
				task()?;
				Ok(true)
			}
			None => Ok(false),
		}
	}

	/// Run tasks until every queue is empty, returning how many ran
	///
	/// Stops at the first failing task and returns its error; the remaining
	/// tasks stay queued.
	pub fn run_until_idle(&self) -> Result<usize> {
		let mut ran = 0;
		while self.run_next().inspect_err(|error| {
			tracing::error!(%error, "scheduled task failed");
		})? {
			ran += 1;
		}
		Ok(ran)
	}
}

impl Default for LocalScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl Scheduler for LocalScheduler {
	fn current_time(&self) -> Instant {
		Instant::now()
	}

	fn should_yield_to_main(&self, elapsed: Duration) -> bool {
		elapsed >= self.frame_budget
	}

	fn request_callback(&self, task: Task, options: RequestCallbackOptions) {
		self.queues.borrow_mut().lane(options.priority).push_back(task);
	}

	fn queue_microtask(&self, task: Task) {
		self.queues.borrow_mut().microtasks.push_back(task);
	}
}

impl fmt::Debug for LocalScheduler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalScheduler")
			.field("frame_budget", &self.frame_budget)
			.field("pending_tasks", &self.pending_tasks())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use futures::FutureExt;
	use rstest::rstest;
	use std::rc::Rc;

	fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Task {
		let log = Rc::clone(log);
		Box::new(move || {
			log.borrow_mut().push(label);
			Ok(())
		})
	}

	#[rstest]
	fn test_microtasks_then_priority_order() {
		let scheduler = LocalScheduler::new();
		let log = Rc::new(RefCell::new(Vec::new()));

		scheduler.request_callback(
			recorder(&log, "background"),
			RequestCallbackOptions::with_priority(TaskPriority::Background),
		);
		scheduler.request_callback(recorder(&log, "visible"), RequestCallbackOptions::default());
		scheduler.request_callback(
			recorder(&log, "blocking"),
			RequestCallbackOptions::with_priority(TaskPriority::UserBlocking),
		);
		scheduler.queue_microtask(recorder(&log, "micro"));

		assert_eq!(scheduler.run_until_idle().unwrap(), 4);
		assert_eq!(*log.borrow(), vec!["micro", "blocking", "visible", "background"]);
	}

	#[rstest]
	fn test_error_stops_the_loop() {
		let scheduler = LocalScheduler::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		scheduler.request_callback(
			Box::new(|| Err(Error::MissingTemplateParser)),
			RequestCallbackOptions::default(),
		);
		scheduler.request_callback(recorder(&log, "after"), RequestCallbackOptions::default());

		assert!(scheduler.run_until_idle().is_err());
		assert_eq!(scheduler.pending_tasks(), 1);
		assert!(log.borrow().is_empty());
	}

	#[rstest]
	#[case(Duration::ZERO, Duration::ZERO, true)]
	#[case(Duration::from_millis(5), Duration::from_millis(1), false)]
	#[case(Duration::from_millis(5), Duration::from_millis(5), true)]
	fn test_should_yield(#[case] budget: Duration, #[case] elapsed: Duration, #[case] expected: bool) {
		let scheduler = LocalScheduler::with_frame_budget(budget);

		assert_eq!(scheduler.should_yield_to_main(elapsed), expected);
	}

	#[rstest]
	fn test_yield_to_main_resolves_after_tasks_run() {
		let scheduler = LocalScheduler::new();
		let mut future = scheduler.yield_to_main(YieldToMainOptions::default());

		assert!((&mut future).now_or_never().is_none());
		scheduler.run_until_idle().unwrap();
		assert!(future.now_or_never().is_some());
	}
}
