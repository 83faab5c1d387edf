//! Values whose kind may change between renders
//!
//! Regular bindings reject a value of a different kind than the one they
//! were created for. Wrapping the value in [`dynamic`] re-resolves the inner
//! binding whenever the kind changes: primitive to directive, or one
//! directive type to another.

use std::any::TypeId;
use std::rc::Rc;

use strand_dom::Node;

use crate::binding::{Binding, resolve_binding};
use crate::directive::{Directive, ensure_directive};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

pub struct Dynamic {
	value: Value,
}

impl Dynamic {
	pub fn new(value: Value) -> Self {
		Self { value }
	}

	pub fn value(&self) -> &Value {
		&self.value
	}
}

/// Wrap `value` so that its kind may change between renders
pub fn dynamic(value: impl Into<Value>) -> Value {
	Value::directive(Dynamic::new(value.into()))
}

fn directive_type(value: &Value) -> Option<TypeId> {
	value
		.as_directive()
		.map(|directive| (**directive).as_any().type_id())
}

impl Directive for Dynamic {
	fn name(&self) -> &'static str {
		"Dynamic"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		let binding = resolve_binding(self.value.clone(), part.clone(), context)?;
		Ok(Box::new(DynamicBinding {
			directive: self,
			part,
			binding,
		}))
	}
}

pub struct DynamicBinding {
	directive: Rc<Dynamic>,
	part: Part,
	binding: Box<dyn Binding>,
}

impl DynamicBinding {
	/// The binding currently owning the part
	pub fn inner(&self) -> &dyn Binding {
		&*self.binding
	}
}

impl Binding for DynamicBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&self.directive) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.part.clone()
	}

	fn start_node(&self) -> Node {
		self.binding.start_node()
	}

	fn end_node(&self) -> Node {
		self.binding.end_node()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		self.binding.connect(context)
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let directive = ensure_directive::<Dynamic>(&value, &self.part)?;
		let next = directive.value.clone();
		let same_kind = directive_type(&self.binding.value()) == directive_type(&next);
		self.directive = directive;

		if same_kind {
			return self.binding.bind(next, context);
		}

		tracing::debug!(
			from = %self.binding.value().describe(),
			to = %next.describe(),
			"value kind changed, replacing binding"
		);
		self.binding.unbind(context);
		self.binding.disconnect();
		let mut binding = resolve_binding(next, self.part.clone(), context)?;
		binding.connect(context)?;
		self.binding = binding;
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		self.binding.unbind(context);
	}

	fn disconnect(&mut self) {
		self.binding.disconnect();
	}
}
