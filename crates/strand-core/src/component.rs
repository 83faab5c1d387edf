//! Component directive and its block
//!
//! A component is a plain function from props and a [`RenderContext`] to a
//! [`TemplateResult`]. Its block keeps the hook list between renders and
//! renders the returned template into the part the same way a bare
//! [`TemplateResult`] would.
//!
//! ```ignore
//! fn greeting(props: &GreetingProps, ctx: &mut RenderContext) -> Result<TemplateResult> {
//!     Ok(ctx.text(format!("hello, {}", props.name)))
//! }
//!
//! let value = component(greeting, GreetingProps { name: "world".into() });
//! ```

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use strand_dom::Node;

use crate::binding::Binding;
use crate::block::{Block, BlockState};
use crate::context::RenderContext;
use crate::directive::{Directive, ensure_directive, ensure_part};
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::hook::{CleanupHooks, Hook, cleanup_hooks};
use crate::part::{Part, PartType};
use crate::priority::TaskPriority;
use crate::template::{FragmentSlot, TemplateResult};
use crate::updater::UpdateContext;
use crate::value::Value;

/// Signature of a component function
pub type ComponentFn<P> = fn(&P, &mut RenderContext) -> Result<TemplateResult>;

/// A component function applied to its props
pub struct Component<P> {
	render: ComponentFn<P>,
	props: P,
}

impl<P> Component<P> {
	pub fn new(render: ComponentFn<P>, props: P) -> Self {
		Self { render, props }
	}

	pub fn props(&self) -> &P {
		&self.props
	}

	/// Whether both components run the same function
	pub fn is_same_component(&self, other: &Self) -> bool {
		std::ptr::fn_addr_eq(self.render, other.render)
	}
}

/// Shorthand for `Value::directive(Component::new(render, props))`
pub fn component<P: 'static>(render: ComponentFn<P>, props: P) -> Value {
	Value::directive(Component::new(render, props))
}

impl<P: 'static> Directive for Component<P> {
	fn name(&self) -> &'static str {
		"Component"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		ensure_part("Component", "a child node part", &part, &[PartType::ChildNode])?;
		Ok(Box::new(ComponentBinding::new(self, part, context.block())))
	}
}

/// Binding of a [`Component`] to a child node part
pub struct ComponentBinding<P: 'static> {
	block: Rc<ComponentBlock<P>>,
}

struct ComponentBlock<P: 'static> {
	this: Weak<ComponentBlock<P>>,
	state: BlockState,
	directive: RefCell<Rc<Component<P>>>,
	hooks: RefCell<Vec<Hook>>,
	slot: RefCell<FragmentSlot>,
}

impl<P: 'static> ComponentBinding<P> {
	pub fn new(directive: Rc<Component<P>>, part: Part, parent: Option<&Rc<dyn Block>>) -> Self {
		let block = Rc::new_cyclic(|this| ComponentBlock {
			this: this.clone(),
			state: BlockState::new(parent),
			directive: RefCell::new(directive),
			hooks: RefCell::new(Vec::new()),
			slot: RefCell::new(FragmentSlot::new(part)),
		});
		Self { block }
	}

	/// The block driving this binding
	pub fn block(&self) -> Rc<dyn Block> {
		Rc::clone(&self.block) as Rc<dyn Block>
	}

	/// Number of hook slots kept from the last render
	pub fn hook_count(&self) -> usize {
		self.block.hooks.borrow().len()
	}
}

impl<P: 'static> ComponentBlock<P> {
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

	/// Discard the hooks; their cleanups run as a passive effect
	fn release_hooks(&self, context: &UpdateContext) {
		let hooks = mem::take(&mut *self.hooks.borrow_mut());
		if !hooks.is_empty() {
			context.enqueue_passive_effect(Rc::new(CleanupHooks::new(hooks)));
		}
	}

	fn render(&self, this: Rc<dyn Block>, context: &UpdateContext) -> Result<TemplateResult> {
		let directive = Rc::clone(&*self.directive.borrow());
		let hooks = mem::take(&mut *self.hooks.borrow_mut());
		let mut render_context = RenderContext::new(hooks, this, context.clone());
		let rendered = (directive.render)(&directive.props, &mut render_context);
		let (hooks, finalized) = render_context.finalize();
		*self.hooks.borrow_mut() = hooks;
		let result = rendered?;
		finalized?;
		Ok(result)
	}
}

impl<P: 'static> Block for ComponentBlock<P> {
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
		let Some(this) = self.this.upgrade() else {
			self.state.finish_update();
			return Ok(());
		};
		let result = self.render(this, context).and_then(|rendered| {
			self.slot.borrow_mut().update(
				rendered.template(),
				rendered.data(),
				context,
				&|| self.request_mutation(context),
			)
		});
		self.state.finish_update();
		result
	}
}

impl<P: 'static> Effect for ComponentBlock<P> {
	fn commit(&self, _phase: CommitPhase) {
		self.slot.borrow_mut().commit(self.state.is_connected());
		self.state.set_mutating(false);
	}
}

impl<P: 'static> Binding for ComponentBinding<P> {
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
		let directive = ensure_directive::<Component<P>>(&value, &part)?;
		if !directive.is_same_component(&self.block.directive.borrow()) {
			self.block.release_hooks(context);
		}
		*self.block.directive.borrow_mut() = directive;
		self.block.state.set_connected(true);
		self.block.force_update(context);
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		self.block.release_hooks(context);
		self.block.slot.borrow().unbind(context);
		self.block.request_mutation(context);
		self.block.state.set_connected(false);
		self.block.state.finish_update();
	}

	fn disconnect(&mut self) {
		let hooks = mem::take(&mut *self.block.hooks.borrow_mut());
		cleanup_hooks(&hooks);
		self.block.slot.borrow().disconnect();
		self.block.state.set_connected(false);
		self.block.state.finish_update();
	}
}
