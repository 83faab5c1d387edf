//! Updaters: the pipelines that render dirty blocks and flush effects
//!
//! An [`Updater`] owns the queues of one rendering pipeline:
//!
//! - dirty [`Block`]s waiting to be re-rendered
//! - mutation, layout and passive [`Effect`]s waiting to be committed
//!
//! Two strategies are provided:
//!
//! - [`SyncUpdater`] drains everything in a single microtask.
//! - [`ConcurrentUpdater`] renders per-priority lanes as host tasks, yields to
//!   the host between blocks when the scheduler asks for it and commits
//!   effects in separate high- and low-priority tasks.
//!
//! Both share the [`TaskCounter`] that backs [`Updater::wait_for_update`].

mod concurrent_updater;
mod sync_updater;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

pub use concurrent_updater::ConcurrentUpdater;
pub use sync_updater::SyncUpdater;

use crate::block::Block;
use crate::effect::{CommitPhase, Effect};
use crate::host::UpdateHost;
use crate::priority::TaskPriority;

/// A rendering pipeline
pub trait Updater {
	/// Block whose `perform_update` is currently running
	fn get_current_block(&self) -> Option<Rc<dyn Block>>;

	/// Priority for updates requested right now without an explicit priority
	fn get_current_priority(&self) -> TaskPriority;

	/// Run `f` with `priority` as the current priority
	///
	/// Event bindings use this to pass the priority derived from the event
	/// being handled down to the updates it triggers.
	fn run_with_priority(&self, priority: TaskPriority, f: &mut dyn FnMut());

	/// Whether any block or effect is queued
	fn is_pending(&self) -> bool;

	/// Whether a task of this updater is waiting to run or running
	fn is_scheduled(&self) -> bool;

	/// Future resolving once no task of this updater is in flight
	fn wait_for_update(&self) -> WaitForUpdate;

	fn enqueue_block(&self, block: Rc<dyn Block>);

	fn enqueue_mutation_effect(&self, effect: Rc<dyn Effect>);

	fn enqueue_layout_effect(&self, effect: Rc<dyn Effect>);

	fn enqueue_passive_effect(&self, effect: Rc<dyn Effect>);

	/// Make sure queued work gets processed. Idempotent while a run is pending.
	fn schedule_update(&self);
}

/// Handle passed through bindings, blocks and render contexts
///
/// Bundles the host, the updater and (while rendering a block) the block that
/// owns the work. Cloning is cheap.
#[derive(Clone)]
pub struct UpdateContext {
	host: Rc<dyn UpdateHost>,
	updater: Rc<dyn Updater>,
	block: Option<Rc<dyn Block>>,
}

impl UpdateContext {
	pub fn new(host: Rc<dyn UpdateHost>, updater: Rc<dyn Updater>) -> Self {
		Self {
			host,
			updater,
			block: None,
		}
	}

	/// Same host and updater, rendering on behalf of `block`
	pub fn with_block(&self, block: Rc<dyn Block>) -> Self {
		Self {
			host: Rc::clone(&self.host),
			updater: Rc::clone(&self.updater),
			block: Some(block),
		}
	}

	/// Same host and updater, without a block
	///
	/// Stored by long-lived callbacks (dispatchers, subscriptions) so they do
	/// not keep a block alive.
	pub fn detached(&self) -> Self {
		Self::new(Rc::clone(&self.host), Rc::clone(&self.updater))
	}

	pub fn host(&self) -> &Rc<dyn UpdateHost> {
		&self.host
	}

	pub fn updater(&self) -> &Rc<dyn Updater> {
		&self.updater
	}

	/// Block on whose behalf work is being done
	pub fn block(&self) -> Option<&Rc<dyn Block>> {
		self.block.as_ref()
	}

	pub fn current_priority(&self) -> TaskPriority {
		self.updater.get_current_priority()
	}

	pub fn enqueue_block(&self, block: Rc<dyn Block>) {
		self.updater.enqueue_block(block);
	}

	pub fn enqueue_mutation_effect(&self, effect: Rc<dyn Effect>) {
		self.updater.enqueue_mutation_effect(effect);
	}

	pub fn enqueue_layout_effect(&self, effect: Rc<dyn Effect>) {
		self.updater.enqueue_layout_effect(effect);
	}

	pub fn enqueue_passive_effect(&self, effect: Rc<dyn Effect>) {
		self.updater.enqueue_passive_effect(effect);
	}

	pub fn schedule_update(&self) {
		self.updater.schedule_update();
	}
}

/// In-flight task counter shared by an updater and its waiters
#[derive(Default)]
pub struct TaskCounter {
	count: Cell<usize>,
	waiters: RefCell<Vec<Waker>>,
}

impl TaskCounter {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn count(&self) -> usize {
		self.count.get()
	}

	pub fn increment(&self) {
		self.count.set(self.count.get() + 1);
	}

	/// Decrement, waking every waiter once the count reaches zero
	pub fn decrement(&self) {
		let count = self.count.get().saturating_sub(1);
		self.count.set(count);
		if count == 0 {
			let waiters = mem::take(&mut *self.waiters.borrow_mut());
			for waker in waiters {
				waker.wake();
			}
		}
	}

	pub fn wait(self: &Rc<Self>) -> WaitForUpdate {
		WaitForUpdate {
			counter: Rc::clone(self),
		}
	}
}

/// Future returned by [`Updater::wait_for_update`]
pub struct WaitForUpdate {
	counter: Rc<TaskCounter>,
}

impl Future for WaitForUpdate {
	type Output = ();

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.counter.count() == 0 {
			Poll::Ready(())
		} else {
			self.counter.waiters.borrow_mut().push(cx.waker().clone());
			Poll::Pending
		}
	}
}

/// Effect queues bucketed by phase
#[derive(Default)]
pub(crate) struct EffectQueues {
	mutation: RefCell<Vec<Rc<dyn Effect>>>,
	layout: RefCell<Vec<Rc<dyn Effect>>>,
	passive: RefCell<Vec<Rc<dyn Effect>>>,
}

impl EffectQueues {
	fn queue(&self, phase: CommitPhase) -> &RefCell<Vec<Rc<dyn Effect>>> {
		match phase {
			CommitPhase::Mutation => &self.mutation,
			CommitPhase::Layout => &self.layout,
			CommitPhase::Passive => &self.passive,
		}
	}

	pub(crate) fn push(&self, phase: CommitPhase, effect: Rc<dyn Effect>) {
		self.queue(phase).borrow_mut().push(effect);
	}

	pub(crate) fn take(&self, phase: CommitPhase) -> Vec<Rc<dyn Effect>> {
		mem::take(&mut *self.queue(phase).borrow_mut())
	}

	#[cfg(test)]
	pub(crate) fn len(&self, phase: CommitPhase) -> usize {
		self.queue(phase).borrow().len()
	}

	pub(crate) fn has(&self, phase: CommitPhase) -> bool {
		!self.queue(phase).borrow().is_empty()
	}

	pub(crate) fn is_empty(&self) -> bool {
		!self.has(CommitPhase::Mutation) && !self.has(CommitPhase::Layout) && !self.has(CommitPhase::Passive)
	}

	/// Take and commit `phase` through `host`. Returns whether anything ran.
	pub(crate) fn flush(&self, phase: CommitPhase, host: &dyn UpdateHost) -> bool {
		let effects = self.take(phase);
		if effects.is_empty() {
			return false;
		}
		tracing::trace!(%phase, count = effects.len(), "flushing effects");
		host.flush_effects(effects, phase);
		true
	}
}
