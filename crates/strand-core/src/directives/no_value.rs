use std::rc::Rc;

use strand_dom::Node;

use crate::binding::Binding;
use crate::directive::{Directive, ensure_directive};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

/// Directive that renders nothing and never touches its part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoValue;

impl Directive for NoValue {
	fn name(&self) -> &'static str {
		"NoValue"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		_context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		Ok(Box::new(NoValueBinding {
			directive: self,
			part,
		}))
	}
}

pub struct NoValueBinding {
	directive: Rc<NoValue>,
	part: Part,
}

impl Binding for NoValueBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&self.directive) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.part.clone()
	}

	fn start_node(&self) -> Node {
		self.part.target().clone()
	}

	fn connect(&mut self, _context: &UpdateContext) -> Result<()> {
		Ok(())
	}

	fn bind(&mut self, value: Value, _context: &UpdateContext) -> Result<()> {
		self.directive = ensure_directive::<NoValue>(&value, &self.part)?;
		Ok(())
	}

	fn unbind(&mut self, _context: &UpdateContext) {}

	fn disconnect(&mut self) {}
}
