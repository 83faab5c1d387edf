//! ConcurrentUpdater - prioritized, interruptible rendering

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use super::{EffectQueues, TaskCounter, UpdateContext, Updater, WaitForUpdate};
use crate::block::Block;
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::host::UpdateHost;
use crate::priority::TaskPriority;
use crate::scheduler::{RequestCallbackOptions, Scheduler};

#[derive(Default)]
struct RenderLane {
	pending: VecDeque<Rc<dyn Block>>,
	scheduled: bool,
}

enum LaneOutcome {
	Drained,
	Yielded,
}

/// Updater that renders dirty blocks as prioritized host tasks
///
/// - Blocks are queued in one lane per priority and processed FIFO.
/// - Each lane runs as a task requested at the lane's priority. Between two
///   blocks the loop asks the scheduler whether to yield; if so, the lane is
///   continued by a fresh task at the same priority.
/// - When a lane drains, mutation and layout effects are committed by a
///   [`TaskPriority::UserBlocking`] task and passive effects by a
///   [`TaskPriority::Background`] task.
///
/// The current priority is the one installed through
/// [`Updater::run_with_priority`] (event bindings do this while running a
/// listener), falling back to the host's default priority.
pub struct ConcurrentUpdater {
	this: Weak<ConcurrentUpdater>,
	host: Rc<dyn UpdateHost>,
	scheduler: Rc<dyn Scheduler>,
	current_block: RefCell<Option<Rc<dyn Block>>>,
	priority_context: Cell<Option<TaskPriority>>,
	lanes: RefCell<BTreeMap<TaskPriority, RenderLane>>,
	effects: EffectQueues,
	blocking_effects_scheduled: Cell<bool>,
	passive_effects_scheduled: Cell<bool>,
	tasks: Rc<TaskCounter>,
}

impl ConcurrentUpdater {
	pub fn new(host: Rc<dyn UpdateHost>, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			this: this.clone(),
			host,
			scheduler,
			current_block: RefCell::new(None),
			priority_context: Cell::new(None),
			lanes: RefCell::new(BTreeMap::new()),
			effects: EffectQueues::default(),
			blocking_effects_scheduled: Cell::new(false),
			passive_effects_scheduled: Cell::new(false),
			tasks: TaskCounter::new(),
		})
	}

	fn context(&self) -> Option<UpdateContext> {
		let updater: Rc<dyn Updater> = self.this.upgrade()?;
		Some(UpdateContext::new(Rc::clone(&self.host), updater))
	}

	fn request_task<F>(&self, priority: TaskPriority, run: F)
	where
		F: FnOnce(&ConcurrentUpdater) -> Result<()> + 'static,
	{
		self.tasks.increment();
		let this = self.this.clone();
		self.scheduler.request_callback(
			Box::new(move || match this.upgrade() {
				Some(updater) => {
					let result = run(&*updater);
					updater.tasks.decrement();
					result
				}
				None => Ok(()),
			}),
			RequestCallbackOptions::with_priority(priority),
		);
	}

	fn schedule_render_lane(&self, priority: TaskPriority) {
		tracing::debug!(%priority, "scheduling render lane");
		self.request_task(priority, move |updater| updater.run_render_lane(priority));
	}

	fn pop_block(&self, priority: TaskPriority) -> Option<Rc<dyn Block>> {
		self.lanes
			.borrow_mut()
			.get_mut(&priority)
			.and_then(|lane| lane.pending.pop_front())
	}

	fn run_render_lane(&self, priority: TaskPriority) -> Result<()> {
		let Some(context) = self.context() else {
			return Ok(());
		};
		let started_at = self.scheduler.current_time();
		let mut rendered = 0usize;

		let outcome = loop {
			let Some(block) = self.pop_block(priority) else {
				break Ok(LaneOutcome::Drained);
			};
			if !block.should_update() {
				block.cancel_update();
				continue;
			}
			if rendered > 0 {
				let elapsed = self.scheduler.current_time().saturating_duration_since(started_at);
				if self.scheduler.should_yield_to_main(elapsed) {
					if let Some(lane) = self.lanes.borrow_mut().get_mut(&priority) {
						lane.pending.push_front(block);
					}
					break Ok(LaneOutcome::Yielded);
				}
			}

			*self.current_block.borrow_mut() = Some(Rc::clone(&block));
			let result = block.perform_update(&context.with_block(Rc::clone(&block)));
			*self.current_block.borrow_mut() = None;
			if let Err(error) = result {
				break Err(error);
			}
			rendered += 1;
		};

		match outcome {
			Ok(LaneOutcome::Yielded) => {
				tracing::trace!(%priority, rendered, "yielding render lane to the host");
				self.schedule_render_lane(priority);
				Ok(())
			}
			Ok(LaneOutcome::Drained) => {
				self.set_lane_scheduled(priority, false);
				self.schedule_effects();
				Ok(())
			}
			Err(error) => {
				self.set_lane_scheduled(priority, false);
				tracing::error!(%priority, %error, "render failed");
				Err(error)
			}
		}
	}

	fn set_lane_scheduled(&self, priority: TaskPriority, scheduled: bool) {
		if let Some(lane) = self.lanes.borrow_mut().get_mut(&priority) {
			lane.scheduled = scheduled;
		}
	}

	fn schedule_effects(&self) {
		let has_blocking =
			self.effects.has(CommitPhase::Mutation) || self.effects.has(CommitPhase::Layout);
		if has_blocking && !self.blocking_effects_scheduled.replace(true) {
			self.request_task(TaskPriority::UserBlocking, |updater| {
				updater.flush_blocking_effects();
				Ok(())
			});
		}
		if self.effects.has(CommitPhase::Passive) && !self.passive_effects_scheduled.replace(true) {
			self.request_task(TaskPriority::Background, |updater| {
				updater.flush_passive_effects();
				Ok(())
			});
		}
	}

	fn flush_blocking_effects(&self) {
		self.blocking_effects_scheduled.set(false);
		self.effects.flush(CommitPhase::Mutation, &*self.host);
		self.effects.flush(CommitPhase::Layout, &*self.host);
		self.schedule_update();
	}

	fn flush_passive_effects(&self) {
		self.passive_effects_scheduled.set(false);
		self.effects.flush(CommitPhase::Passive, &*self.host);
		self.schedule_update();
	}
}

impl Updater for ConcurrentUpdater {
	fn get_current_block(&self) -> Option<Rc<dyn Block>> {
		self.current_block.borrow().clone()
	}

	fn get_current_priority(&self) -> TaskPriority {
		self.priority_context
			.get()
			.unwrap_or_else(|| self.host.default_priority())
	}

	fn run_with_priority(&self, priority: TaskPriority, f: &mut dyn FnMut()) {
		let previous = self.priority_context.replace(Some(priority));
		f();
		self.priority_context.set(previous);
	}

	fn is_pending(&self) -> bool {
		self.lanes
			.borrow()
			.values()
			.any(|lane| !lane.pending.is_empty())
			|| !self.effects.is_empty()
	}

	fn is_scheduled(&self) -> bool {
		self.tasks.count() > 0
	}

	fn wait_for_update(&self) -> WaitForUpdate {
		self.tasks.wait()
	}

	fn enqueue_block(&self, block: Rc<dyn Block>) {
		self.lanes
			.borrow_mut()
			.entry(block.priority())
			.or_default()
			.pending
			.push_back(block);
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
		let ready: Vec<TaskPriority> = self
			.lanes
			.borrow_mut()
			.iter_mut()
			.rev()
			.filter(|(_, lane)| !lane.scheduled && !lane.pending.is_empty())
			.map(|(priority, lane)| {
				lane.scheduled = true;
				*priority
			})
			.collect();
		for priority in ready {
			self.schedule_render_lane(priority);
		}
		self.schedule_effects();
	}
}
