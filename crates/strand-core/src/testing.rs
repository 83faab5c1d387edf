//! Test doubles shared by the unit tests of this crate

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use strand_dom::Node;

use crate::binding::{Binding, resolve_binding};
use crate::block::{Block, BlockState};
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::host::{RenderHost, UpdateHost};
use crate::part::Part;
use crate::priority::TaskPriority;
use crate::template::value::ValueFragment;
use crate::template::{Template, TemplateFragment, TemplateResult};
use crate::updater::{EffectQueues, TaskCounter, UpdateContext, Updater, WaitForUpdate};
use crate::value::Value;

/// Updater that only queues; [`TestHarness::flush`] drains it
#[derive(Default)]
pub(crate) struct RecordingUpdater {
	blocks: RefCell<VecDeque<Rc<dyn Block>>>,
	effects: EffectQueues,
	priority: Cell<Option<TaskPriority>>,
	scheduled: Cell<usize>,
}

impl Updater for RecordingUpdater {
	fn get_current_block(&self) -> Option<Rc<dyn Block>> {
		None
	}

	fn get_current_priority(&self) -> TaskPriority {
		self.priority.get().unwrap_or(TaskPriority::UserVisible)
	}

	fn run_with_priority(&self, priority: TaskPriority, f: &mut dyn FnMut()) {
		let previous = self.priority.replace(Some(priority));
		f();
		self.priority.set(previous);
	}

	fn is_pending(&self) -> bool {
		!self.blocks.borrow().is_empty() || !self.effects.is_empty()
	}

	fn is_scheduled(&self) -> bool {
		false
	}

	fn wait_for_update(&self) -> WaitForUpdate {
		TaskCounter::new().wait()
	}

	fn enqueue_block(&self, block: Rc<dyn Block>) {
		self.blocks.borrow_mut().push_back(block);
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
		self.scheduled.set(self.scheduled.get() + 1);
	}
}

pub(crate) struct TestHarness {
	host: Rc<RenderHost>,
	updater: Rc<RecordingUpdater>,
}

impl TestHarness {
	pub(crate) fn new() -> Self {
		Self {
			host: Rc::new(RenderHost::new()),
			updater: Rc::new(RecordingUpdater::default()),
		}
	}

	pub(crate) fn context(&self) -> UpdateContext {
		UpdateContext::new(
			Rc::clone(&self.host) as Rc<dyn UpdateHost>,
			Rc::clone(&self.updater) as Rc<dyn Updater>,
		)
	}

	/// Mutation effects waiting to be committed
	pub(crate) fn mutation_count(&self) -> usize {
		self.updater.effects.len(CommitPhase::Mutation)
	}

	/// Render queued blocks and commit effects until nothing is left
	pub(crate) fn flush(&self) -> Result<()> {
		let context = self.context();
		loop {
			loop {
				let block = self.updater.blocks.borrow_mut().pop_front();
				let Some(block) = block else { break };
				if block.should_update() {
					block.perform_update(&context.with_block(Rc::clone(&block)))?;
				} else {
					block.cancel_update();
				}
			}

			let mut committed = self.updater.effects.flush(CommitPhase::Mutation, &*self.host);
			committed |= self.updater.effects.flush(CommitPhase::Layout, &*self.host);
			committed |= self.updater.effects.flush(CommitPhase::Passive, &*self.host);

			if !committed && self.updater.blocks.borrow().is_empty() {
				return Ok(());
			}
		}
	}
}

/// Connected block that records requests and renders nothing
pub(crate) struct MockBlock {
	this: Weak<MockBlock>,
	state: BlockState,
	requests: Cell<usize>,
	last_priority: Cell<Option<TaskPriority>>,
	updates: Cell<usize>,
}

impl MockBlock {
	pub(crate) fn new(parent: Option<&Rc<dyn Block>>) -> Rc<Self> {
		let block = Rc::new_cyclic(|this| Self {
			this: this.clone(),
			state: BlockState::new(parent),
			requests: Cell::new(0),
			last_priority: Cell::new(None),
			updates: Cell::new(0),
		});
		block.state.set_connected(true);
		block
	}

	pub(crate) fn requested_updates(&self) -> usize {
		self.requests.get()
	}

	pub(crate) fn last_requested_priority(&self) -> Option<TaskPriority> {
		self.last_priority.get()
	}

	pub(crate) fn reset_updates(&self) {
		self.requests.set(0);
		self.last_priority.set(None);
	}

	pub(crate) fn update_count(&self) -> usize {
		self.updates.get()
	}
}

impl Block for MockBlock {
	fn parent(&self) -> Option<Rc<dyn Block>> {
		self.state.parent()
	}

	fn priority(&self) -> TaskPriority {
		self.state.priority()
	}

	fn is_connected(&self) -> bool {
		self.state.is_connected()
	}

	fn is_updating(&self) -> bool {
		self.state.is_updating()
	}

	fn cancel_update(&self) {
		self.state.finish_update();
	}

	fn request_update(&self, priority: TaskPriority, context: &UpdateContext) {
		self.requests.set(self.requests.get() + 1);
		self.last_priority.set(Some(priority));
		if self.state.mark_requested(priority) {
			if let Some(this) = self.this.upgrade() {
				context.enqueue_block(this);
				context.schedule_update();
			}
		}
	}

	fn perform_update(&self, _context: &UpdateContext) -> Result<()> {
		self.updates.set(self.updates.get() + 1);
		self.state.finish_update();
		Ok(())
	}
}

#[derive(Default)]
pub(crate) struct TemplateStats {
	renders: Cell<usize>,
	binds: Cell<usize>,
	unbinds: Cell<usize>,
	mounts: Cell<usize>,
	unmounts: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
	counter.set(counter.get() + 1);
}

impl TemplateStats {
	pub(crate) fn renders(&self) -> usize {
		self.renders.get()
	}

	pub(crate) fn binds(&self) -> usize {
		self.binds.get()
	}

	pub(crate) fn unbinds(&self) -> usize {
		self.unbinds.get()
	}

	pub(crate) fn mounts(&self) -> usize {
		self.mounts.get()
	}

	pub(crate) fn unmounts(&self) -> usize {
		self.unmounts.get()
	}
}

/// `<mock-NAME>` element whose text content is the first hole
pub(crate) struct MockTemplate {
	name: &'static str,
	stats: Rc<TemplateStats>,
}

impl MockTemplate {
	pub(crate) fn new(name: &'static str) -> Rc<Self> {
		Rc::new(Self {
			name,
			stats: Rc::default(),
		})
	}

	pub(crate) fn template(self: &Rc<Self>) -> Rc<dyn Template> {
		Rc::clone(self) as Rc<dyn Template>
	}

	pub(crate) fn result(self: &Rc<Self>, data: Vec<Value>) -> TemplateResult {
		TemplateResult::new(self.template(), data)
	}

	pub(crate) fn stats(&self) -> &TemplateStats {
		&self.stats
	}
}

impl Template for MockTemplate {
	fn render(&self, data: &[Value], context: &UpdateContext) -> Result<Rc<dyn TemplateFragment>> {
		bump(&self.stats.renders);
		let element = Node::element(&format!("mock-{}", self.name));
		let text = Node::text("");
		element.append_child(&text);
		let mut binding: Box<dyn Binding> =
			resolve_binding(data.first().cloned().unwrap_or_default(), Part::node(&text), context)?;
		binding.connect(context)?;
		Ok(Rc::new(MockFragment {
			inner: ValueFragment::new(vec![element], vec![binding]),
			stats: Rc::clone(&self.stats),
		}))
	}

	fn is_same_template(&self, other: &dyn Template) -> bool {
		std::ptr::addr_eq(self as *const Self, other as *const dyn Template)
	}
}

struct MockFragment {
	inner: ValueFragment,
	stats: Rc<TemplateStats>,
}

impl TemplateFragment for MockFragment {
	fn start_node(&self) -> Option<Node> {
		self.inner.start_node()
	}

	fn end_node(&self) -> Option<Node> {
		self.inner.end_node()
	}

	fn bind(&self, data: &[Value], context: &UpdateContext) -> Result<()> {
		bump(&self.stats.binds);
		self.inner.bind(data, context)
	}

	fn unbind(&self, context: &UpdateContext) {
		bump(&self.stats.unbinds);
		self.inner.unbind(context);
	}

	fn mount(&self, part: &Part) {
		bump(&self.stats.mounts);
		self.inner.mount(part);
	}

	fn unmount(&self, part: &Part) {
		bump(&self.stats.unmounts);
		self.inner.unmount(part);
	}

	fn disconnect(&self) {
		self.inner.disconnect();
	}
}
