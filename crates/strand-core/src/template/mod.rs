//! Templates, fragments and the template-result block
//!
//! A [`Template`] is the static shape of some markup with holes; rendering it
//! produces a [`TemplateFragment`]: cloned nodes plus one binding per hole.
//! Parsing markup into templates is done by a [`TemplateParser`] installed on
//! the host; the small [`value`] templates used for `text()`, `child_node()`
//! and `element()` are built in.
//!
//! [`TemplateResult`] pairs a template with the data for its holes. As a
//! directive it binds through a [`TemplateResultBinding`], a [`Block`] that
//! re-binds the same fragment while the template stays the same and swaps in a
//! freshly rendered fragment when it changes.
//!
//! [`TemplateParser`]: crate::host::TemplateParser

pub mod value;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use strand_dom::Node;

use crate::binding::Binding;
use crate::block::{Block, BlockState};
use crate::directive::{AsAny, Directive, ensure_directive, ensure_part};
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::part::{Part, PartType};
use crate::priority::TaskPriority;
use crate::updater::UpdateContext;
use crate::value::Value;

/// Static structure of a piece of markup with holes
pub trait Template: AsAny {
	/// Clone the structure and create (and connect) one binding per hole
	fn render(&self, data: &[Value], context: &UpdateContext) -> Result<Rc<dyn TemplateFragment>>;

	/// Whether fragments of `other` can be re-bound with data meant for `self`
	fn is_same_template(&self, other: &dyn Template) -> bool;
}

/// A rendered template instance
pub trait TemplateFragment {
	fn start_node(&self) -> Option<Node>;

	fn end_node(&self) -> Option<Node>;

	/// Re-bind every hole with `data`, positionally
	fn bind(&self, data: &[Value], context: &UpdateContext) -> Result<()>;

	fn unbind(&self, context: &UpdateContext);

	/// Insert the fragment's nodes before the anchor of `part`
	fn mount(&self, part: &Part);

	/// Remove the fragment's nodes from the tree
	fn unmount(&self, part: &Part);

	fn disconnect(&self);
}

/// A template together with the values for its holes
#[derive(Clone)]
pub struct TemplateResult {
	template: Rc<dyn Template>,
	data: Vec<Value>,
}

impl TemplateResult {
	pub fn new(template: Rc<dyn Template>, data: Vec<Value>) -> Self {
		Self { template, data }
	}

	pub fn template(&self) -> &Rc<dyn Template> {
		&self.template
	}

	pub fn data(&self) -> &[Value] {
		&self.data
	}
}

impl fmt::Debug for TemplateResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TemplateResult")
			.field("data", &self.data)
			.finish_non_exhaustive()
	}
}

impl From<TemplateResult> for Value {
	fn from(result: TemplateResult) -> Self {
		Value::directive(result)
	}
}

impl Directive for TemplateResult {
	fn name(&self) -> &'static str {
		"TemplateResult"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		ensure_part("TemplateResult", "a child node part", &part, &[PartType::ChildNode])?;
		Ok(Box::new(TemplateResultBinding::new(self, part, context.block())))
	}
}

fn same_fragment(a: &Option<Rc<dyn TemplateFragment>>, b: &Option<Rc<dyn TemplateFragment>>) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
		(None, None) => true,
		_ => false,
	}
}

/// Pending and committed fragments of a block rendering into one part
pub(crate) struct FragmentSlot {
	part: Part,
	template: Option<Rc<dyn Template>>,
	pending: Option<Rc<dyn TemplateFragment>>,
	memoized: Option<Rc<dyn TemplateFragment>>,
}

impl FragmentSlot {
	pub(crate) fn new(part: Part) -> Self {
		Self {
			part,
			template: None,
			pending: None,
			memoized: None,
		}
	}

	pub(crate) fn part(&self) -> &Part {
		&self.part
	}

	pub(crate) fn start_node(&self) -> Node {
		self.memoized
			.as_ref()
			.and_then(|fragment| fragment.start_node())
			.unwrap_or_else(|| self.part.target().clone())
	}

	/// Reconcile the pending fragment with `template` and `data`
	///
	/// `request_mutation` is called before any new fragment is rendered, so the
	/// swap is committed ahead of the effects of the new fragment's holes.
	pub(crate) fn update(
		&mut self,
		template: &Rc<dyn Template>,
		data: &[Value],
		context: &UpdateContext,
		request_mutation: &dyn Fn(),
	) -> Result<()> {
		let same_template = self
			.template
			.as_ref()
			.is_some_and(|current| current.is_same_template(&**template));

		match self.pending.clone() {
			Some(pending) if same_template => {
				if !same_fragment(&self.memoized, &self.pending) {
					request_mutation();
				}
				pending.bind(data, context)?;
			}
			Some(pending) => {
				pending.unbind(context);
				request_mutation();
				self.pending = Some(template.render(data, context)?);
			}
			None => {
				request_mutation();
				self.pending = Some(template.render(data, context)?);
			}
		}

		self.template = Some(Rc::clone(template));
		Ok(())
	}

	/// Swap the committed fragment for the pending one, or unmount everything
	/// when the owner is no longer connected
	pub(crate) fn commit(&mut self, connected: bool) {
		if connected {
			if same_fragment(&self.memoized, &self.pending) {
				return;
			}
			if let Some(memoized) = &self.memoized {
				memoized.unmount(&self.part);
			}
			if let Some(pending) = &self.pending {
				pending.mount(&self.part);
			}
			self.memoized = self.pending.clone();
		} else if let Some(memoized) = self.memoized.take() {
			memoized.unmount(&self.part);
		}
	}

	pub(crate) fn unbind(&self, context: &UpdateContext) {
		if let Some(pending) = &self.pending {
			pending.unbind(context);
		}
	}

	pub(crate) fn disconnect(&self) {
		if let Some(pending) = &self.pending {
			pending.disconnect();
		}
	}
}

/// Binding of a [`TemplateResult`] to a child node part
pub struct TemplateResultBinding {
	block: Rc<TemplateBlock>,
}

struct TemplateBlock {
	this: Weak<TemplateBlock>,
	state: BlockState,
	directive: RefCell<Rc<TemplateResult>>,
	slot: RefCell<FragmentSlot>,
}

impl TemplateResultBinding {
	pub fn new(directive: Rc<TemplateResult>, part: Part, parent: Option<&Rc<dyn Block>>) -> Self {
		let block = Rc::new_cyclic(|this| TemplateBlock {
			this: this.clone(),
			state: BlockState::new(parent),
			directive: RefCell::new(directive),
			slot: RefCell::new(FragmentSlot::new(part)),
		});
		Self { block }
	}

	/// The block driving this binding
	pub fn block(&self) -> Rc<dyn Block> {
		Rc::clone(&self.block) as Rc<dyn Block>
	}
}

impl TemplateBlock {
	fn request_mutation(&self, context: &UpdateContext) {
		if self.state.is_mutating() {
			return;
		}
		if let Some(this) = self.this.upgrade() {
			self.state.set_mutating(true);
			context.enqueue_mutation_effect(this);
		}
	}

	fn force_update(&self, context: &UpdateContext) {
		if self.state.mark_forced() {
			if let Some(this) = self.this.upgrade() {
				context.enqueue_block(this);
			}
		}
	}
}

impl Block for TemplateBlock {
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
		if !self.state.mark_requested(priority) {
			return;
		}
		if let Some(this) = self.this.upgrade() {
			context.enqueue_block(this);
			context.schedule_update();
		}
	}

	fn perform_update(&self, context: &UpdateContext) -> Result<()> {
		let directive = Rc::clone(&*self.directive.borrow());
		let result = self.slot.borrow_mut().update(
			directive.template(),
			directive.data(),
			context,
			&|| self.request_mutation(context),
		);
		self.state.finish_update();
		result
	}
}

impl Effect for TemplateBlock {
	fn commit(&self, _phase: CommitPhase) {
		self.slot.borrow_mut().commit(self.state.is_connected());
		self.state.set_mutating(false);
	}
}

impl Binding for TemplateResultBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&*self.block.directive.borrow()) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.block.slot.borrow().part().clone()
	}

	fn start_node(&self) -> Node {
		self.block.slot.borrow().start_node()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		self.block.state.set_connected(true);
		self.block.force_update(context);
		Ok(())
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let part = self.part();
		let directive = ensure_directive::<TemplateResult>(&value, &part)?;
		*self.block.directive.borrow_mut() = directive;
		self.block.state.set_connected(true);
		self.block.force_update(context);
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		self.block.slot.borrow().unbind(context);
		self.block.request_mutation(context);
		self.block.state.set_connected(false);
		self.block.state.finish_update();
	}

	fn disconnect(&mut self) {
		self.block.slot.borrow().disconnect();
		self.block.state.set_connected(false);
		self.block.state.finish_update();
	}
}
