//! Switch between two values on a boolean
//!
//! Each branch keeps its own binding. Switching unbinds the active branch and
//! binds (or creates) the other one, so flipping back and forth reuses both.

use std::rc::Rc;

use strand_dom::Node;

use super::NoValue;
use crate::binding::{Binding, resolve_binding};
use crate::directive::{Directive, ensure_directive};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

pub struct Condition {
	condition: bool,
	true_value: Value,
	false_value: Value,
}

impl Condition {
	pub fn new(condition: bool, true_value: Value, false_value: Value) -> Self {
		Self {
			condition,
			true_value,
			false_value,
		}
	}

	pub fn condition(&self) -> bool {
		self.condition
	}

	fn branch(&self, condition: bool) -> Value {
		if condition {
			self.true_value.clone()
		} else {
			self.false_value.clone()
		}
	}
}

/// `true_value` when `condition` holds, otherwise `false_value`
pub fn condition(condition: bool, true_value: impl Into<Value>, false_value: impl Into<Value>) -> Value {
	Value::directive(Condition::new(condition, true_value.into(), false_value.into()))
}

/// `value` when `condition` holds, otherwise nothing
pub fn when(condition: bool, value: impl Into<Value>) -> Value {
	self::condition(condition, value, Value::directive(NoValue))
}

/// `value` unless `condition` holds
pub fn unless(condition: bool, value: impl Into<Value>) -> Value {
	self::condition(condition, Value::directive(NoValue), value)
}

impl Directive for Condition {
	fn name(&self) -> &'static str {
		"Condition"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		Ok(Box::new(ConditionBinding::new(self, part, context)?))
	}
}

pub struct ConditionBinding {
	directive: Rc<Condition>,
	part: Part,
	true_binding: Option<Box<dyn Binding>>,
	false_binding: Option<Box<dyn Binding>>,
}

impl ConditionBinding {
	pub fn new(directive: Rc<Condition>, part: Part, context: &UpdateContext) -> Result<Self> {
		let binding = resolve_binding(directive.branch(directive.condition), part.clone(), context)?;
		let (true_binding, false_binding) = if directive.condition {
			(Some(binding), None)
		} else {
			(None, Some(binding))
		};
		Ok(Self {
			directive,
			part,
			true_binding,
			false_binding,
		})
	}

	fn slot(&mut self, condition: bool) -> &mut Option<Box<dyn Binding>> {
		if condition {
			&mut self.true_binding
		} else {
			&mut self.false_binding
		}
	}

	fn active(&self) -> Option<&dyn Binding> {
		let binding = if self.directive.condition {
			&self.true_binding
		} else {
			&self.false_binding
		};
		binding.as_deref()
	}
}

impl Binding for ConditionBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&self.directive) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.part.clone()
	}

	fn start_node(&self) -> Node {
		self.active()
			.map(|binding| binding.start_node())
			.unwrap_or_else(|| self.part.target().clone())
	}

	fn end_node(&self) -> Node {
		self.part.target().clone()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		let condition = self.directive.condition;
		match self.slot(condition) {
			Some(binding) => binding.connect(context),
			None => Ok(()),
		}
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let directive = ensure_directive::<Condition>(&value, &self.part)?;
		let previous = self.directive.condition;
		let next = directive.condition;
		let branch = directive.branch(next);
		self.directive = directive;

		if previous != next {
			if let Some(binding) = self.slot(previous) {
				binding.unbind(context);
			}
		}

		let part = self.part.clone();
		match self.slot(next) {
			Some(binding) => binding.bind(branch, context),
			None => {
				let mut binding = resolve_binding(branch, part, context)?;
				binding.connect(context)?;
				*self.slot(next) = Some(binding);
				Ok(())
			}
		}
	}

	fn unbind(&mut self, context: &UpdateContext) {
		let condition = self.directive.condition;
		if let Some(binding) = self.slot(condition) {
			binding.unbind(context);
		}
	}

	fn disconnect(&mut self) {
		for binding in [&mut self.true_binding, &mut self.false_binding]
			.into_iter()
			.flatten()
		{
			binding.disconnect();
		}
	}
}
