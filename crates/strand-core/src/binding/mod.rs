//! Bindings: the live relationship between a value and a part
//!
//! Every hole of a rendered template is owned by exactly one [`Binding`]. The
//! binding is created through [`resolve_binding`], connected once, then
//! receives new values through [`Binding::bind`] on every re-render.
//!
//! ## Lifecycle
//!
//! ```text
//! resolve_binding ─▶ connect ─▶ bind* ─▶ unbind ─▶ (bind again) ─▶ disconnect
//! ```
//!
//! - `connect` commits the initial value.
//! - `bind` with a value that is the same as the current one enqueues nothing.
//! - `unbind` returns the part to an empty state but keeps the binding usable.
//! - `disconnect` releases subscriptions and child bindings without touching
//!   the node tree.
//!
//! Primitive bindings never write to the tree directly. They mark themselves
//! dirty and enqueue a mutation effect; repeated binds before the flush
//! coalesce into a single commit.

mod attribute;
mod element;
mod event;
mod node;
mod property;

use std::cell::RefCell;
use std::rc::Rc;

use strand_dom::Node;

pub use attribute::AttributeBinding;
pub use element::ElementBinding;
pub use event::EventBinding;
pub use node::NodeBinding;
pub use property::{PropertyBinding, property_value};

use crate::effect::Effect;
use crate::error::Result;
use crate::part::{Part, PartType};
use crate::updater::UpdateContext;
use crate::value::Value;

/// Owner of one part
pub trait Binding {
	/// The value most recently bound
	fn value(&self) -> Value;

	/// The part this binding owns
	fn part(&self) -> Part;

	/// First node of the content this binding renders
	fn start_node(&self) -> Node;

	/// Last node of the content this binding renders
	fn end_node(&self) -> Node {
		self.part().target().clone()
	}

	/// Commit the initial value. Called exactly once before any `bind`.
	fn connect(&mut self, context: &UpdateContext) -> Result<()>;

	/// Replace the value
	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()>;

	/// Clear the content while keeping the binding reusable
	fn unbind(&mut self, context: &UpdateContext);

	/// Release every resource held by the binding
	fn disconnect(&mut self);
}

/// Create the binding for `value` at `part`
///
/// A directive value always builds its own binding. Any other value gets the
/// default binding for the part kind:
///
/// | Part        | Binding              |
/// |-------------|----------------------|
/// | Attribute   | [`AttributeBinding`] |
/// | ChildNode   | [`NodeBinding`]      |
/// | Element     | [`ElementBinding`]   |
/// | Event       | [`EventBinding`]     |
/// | Node        | [`NodeBinding`]      |
/// | Property    | [`PropertyBinding`]  |
pub fn resolve_binding(
	value: Value,
	part: Part,
	context: &UpdateContext,
) -> Result<Box<dyn Binding>> {
	if let Some(directive) = value.as_directive() {
		return Rc::clone(directive).resolve_binding(part, context);
	}
	resolve_primitive_binding(value, part)
}

/// Create the default binding for `part`, ignoring directives
pub fn resolve_primitive_binding(value: Value, part: Part) -> Result<Box<dyn Binding>> {
	Ok(match part.part_type() {
		PartType::Attribute => Box::new(AttributeBinding::new(value, part)?),
		PartType::ChildNode | PartType::Node => Box::new(NodeBinding::new(value, part)?),
		PartType::Element => Box::new(ElementBinding::new(value, part)?),
		PartType::Event => Box::new(EventBinding::new(value, part)?),
		PartType::Property => Box::new(PropertyBinding::new(value, part)?),
	})
}

/// State of a primitive binding that commits through a mutation effect.
pub(crate) trait CommitState {
	fn dirty(&mut self) -> &mut bool;
}

/// Enqueue `state` as a mutation effect unless a commit is already pending.
pub(crate) fn request_commit<S>(state: &Rc<RefCell<S>>, context: &UpdateContext)
where
	S: CommitState + 'static,
	RefCell<S>: Effect,
{
	{
		let mut state = state.borrow_mut();
		let dirty = state.dirty();
		if *dirty {
			return;
		}
		*dirty = true;
	}
	let effect: Rc<dyn Effect> = Rc::clone(state) as Rc<dyn Effect>;
	context.enqueue_mutation_effect(effect);
}
