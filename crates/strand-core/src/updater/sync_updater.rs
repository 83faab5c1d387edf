//! SyncUpdater - drains every queue in a single microtask

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::{Rc, Weak};

use super::{EffectQueues, TaskCounter, UpdateContext, Updater, WaitForUpdate};
use crate::block::Block;
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::host::UpdateHost;
use crate::priority::TaskPriority;
use crate::scheduler::Scheduler;

/// Updater that processes all queued work synchronously inside one microtask
///
/// The flush loop renders every dirty block, then commits mutation, layout
/// and passive effects, and repeats until all queues are empty. Priorities
/// are irrelevant here; [`Updater::get_current_priority`] always reports
/// [`TaskPriority::UserBlocking`].
pub struct SyncUpdater {
	this: Weak<SyncUpdater>,
	host: Rc<dyn UpdateHost>,
	scheduler: Rc<dyn Scheduler>,
	current_block: RefCell<Option<Rc<dyn Block>>>,
	pending_blocks: RefCell<VecDeque<Rc<dyn Block>>>,
	effects: EffectQueues,
	tasks: Rc<TaskCounter>,
}

impl SyncUpdater {
	pub fn new(host: Rc<dyn UpdateHost>, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			this: this.clone(),
			host,
			scheduler,
			current_block: RefCell::new(None),
			pending_blocks: RefCell::new(VecDeque::new()),
			effects: EffectQueues::default(),
			tasks: TaskCounter::new(),
		})
	}

	fn context(&self) -> Option<UpdateContext> {
		let updater: Rc<dyn Updater> = self.this.upgrade()?;
		Some(UpdateContext::new(Rc::clone(&self.host), updater))
	}

	fn flush(&self) -> Result<()> {
		let result = match self.context() {
			Some(context) => self.flush_queues(&context),
			None => Ok(()),
		};
		self.tasks.decrement();
		result
	}

	fn flush_queues(&self, context: &UpdateContext) -> Result<()> {
		loop {
			self.render_blocks(context)?;

			let mut committed = self.effects.flush(CommitPhase::Mutation, &*self.host);
			committed |= self.effects.flush(CommitPhase::Layout, &*self.host);
			committed |= self.effects.flush(CommitPhase::Passive, &*self.host);

			if !committed && self.pending_blocks.borrow().is_empty() {
				return Ok(());
			}
		}
	}

	fn render_blocks(&self, context: &UpdateContext) -> Result<()> {
		loop {
			let mut batch = mem::take(&mut *self.pending_blocks.borrow_mut());
			if batch.is_empty() {
				return Ok(());
			}
			while let Some(block) = batch.pop_front() {
				if !block.should_update() {
					block.cancel_update();
					continue;
				}
				*self.current_block.borrow_mut() = Some(Rc::clone(&block));
				let result = block.perform_update(&context.with_block(Rc::clone(&block)));
				*self.current_block.borrow_mut() = None;
				if let Err(error) = result {
					let mut pending = self.pending_blocks.borrow_mut();
					batch.append(&mut pending);
					*pending = batch;
					return Err(error);
				}
			}
		}
	}
}

impl Updater for SyncUpdater {
	fn get_current_block(&self) -> Option<Rc<dyn Block>> {
		self.current_block.borrow().clone()
	}

	fn get_current_priority(&self) -> TaskPriority {
		TaskPriority::UserBlocking
	}

	fn run_with_priority(&self, _priority: TaskPriority, f: &mut dyn FnMut()) {
		f();
	}

	fn is_pending(&self) -> bool {
		!self.pending_blocks.borrow().is_empty() || !self.effects.is_empty()
	}

	fn is_scheduled(&self) -> bool {
		self.tasks.count() > 0
	}

	fn wait_for_update(&self) -> WaitForUpdate {
		self.tasks.wait()
	}

	fn enqueue_block(&self, block: Rc<dyn Block>) {
		self.pending_blocks.borrow_mut().push_back(block);
	}

	fn enqueue_mutation_effect(&self, effect: Rc<dyn Effect>) {
		self.effects.push(CommitPhase::Mutation, effect);
	}

	fn enqueue_layout_effect(&self, effect: Rc<dyn Effect>) {
		self.effects.push(CommitPhase::Layout, effect);
	}

	fn enqueue_passive_effect(&self, effect: Rc<dyn Effect>) {
		self.effects.push(CommitPhase::Passive, effect);
	}

	fn schedule_update(&self) {
		if self.is_scheduled() {
			return;
		}
		self.tasks.increment();
		tracing::debug!("scheduling synchronous flush");
		let this = self.this.clone();
		self.scheduler.queue_microtask(Box::new(move || match this.upgrade() {
			Some(updater) => updater.flush(),
			None => Ok(()),
		}));
	}
}
