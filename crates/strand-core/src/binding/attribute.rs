use std::cell::RefCell;
use std::rc::Rc;

use strand_dom::Node;

use super::{Binding, CommitState, request_commit};
use crate::directive::ensure_non_directive;
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

/// Binds a value to an attribute
///
/// - strings are set verbatim
/// - booleans toggle the attribute
/// - `Null` removes it
/// - anything else is stringified
pub struct AttributeBinding {
	state: Rc<RefCell<AttributeState>>,
}

struct AttributeState {
	part: Part,
	value: Value,
	dirty: bool,
}

impl AttributeBinding {
	pub fn new(value: Value, part: Part) -> Result<Self> {
		ensure_non_directive(&value, &part)?;
		Ok(Self {
			state: Rc::new(RefCell::new(AttributeState {
				part,
				value,
				dirty: false,
			})),
		})
	}
}

impl Binding for AttributeBinding {
	fn value(&self) -> Value {
		self.state.borrow().value.clone()
	}

	fn part(&self) -> Part {
		self.state.borrow().part.clone()
	}

	fn start_node(&self) -> Node {
		self.state.borrow().part.target().clone()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		request_commit(&self.state, context);
		Ok(())
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		{
			let mut state = self.state.borrow_mut();
			ensure_non_directive(&value, &state.part)?;
			if state.value.is_same(&value) {
				return Ok(());
			}
			state.value = value;
		}
		request_commit(&self.state, context);
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		{
			let mut state = self.state.borrow_mut();
			if state.value.is_null() {
				return;
			}
			state.value = Value::Null;
		}
		request_commit(&self.state, context);
	}

	fn disconnect(&mut self) {}
}

impl CommitState for AttributeState {
	fn dirty(&mut self) -> &mut bool {
		&mut self.dirty
	}
}

impl Effect for RefCell<AttributeState> {
	fn commit(&self, _phase: CommitPhase) {
		let mut state = self.borrow_mut();
		state.dirty = false;
		let Part::Attribute { node, name } = &state.part else {
			return;
		};
		match &state.value {
			Value::String(value) => node.set_attribute(name, value),
			Value::Bool(value) => {
				node.toggle_attribute(name, *value);
			}
			Value::Null => {
				node.remove_attribute(name);
			}
			other => {
				let value = other.to_display_string().unwrap_or_default();
				node.set_attribute(name, &value);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestHarness;
	use rstest::rstest;

	fn attribute_part(name: &str) -> (Node, Part) {
		let node = Node::element("div");
		let part = Part::attribute(&node, name);
		(node, part)
	}

	#[rstest]
	#[case(Value::from("box"), Some("box"))]
	#[case(Value::from(true), Some(""))]
	#[case(Value::from(false), None)]
	#[case(Value::Null, None)]
	#[case(Value::from(12), Some("12"))]
	fn test_commit_value_kinds(#[case] value: Value, #[case] expected: Option<&str>) {
		let harness = TestHarness::new();
		let (node, part) = attribute_part("class");
		let mut binding = AttributeBinding::new(value, part).unwrap();

		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		assert_eq!(node.get_attribute("class").as_deref(), expected);
	}

	#[rstest]
	fn test_same_value_enqueues_nothing() {
		let harness = TestHarness::new();
		let (_node, part) = attribute_part("title");
		let mut binding = AttributeBinding::new(Value::from("a"), part).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.bind(Value::from("a"), &harness.context()).unwrap();
		binding.bind(Value::from("a"), &harness.context()).unwrap();

		assert_eq!(harness.mutation_count(), 0);
	}

	#[rstest]
	fn test_repeated_binds_coalesce() {
		let harness = TestHarness::new();
		let (node, part) = attribute_part("title");
		let mut binding = AttributeBinding::new(Value::from("a"), part).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.bind(Value::from("b"), &harness.context()).unwrap();
		binding.bind(Value::from("c"), &harness.context()).unwrap();

		assert_eq!(harness.mutation_count(), 1);
		harness.flush().unwrap();
		assert_eq!(node.get_attribute("title").as_deref(), Some("c"));
	}

	#[rstest]
	fn test_unbind_removes_attribute() {
		let harness = TestHarness::new();
		let (node, part) = attribute_part("title");
		let mut binding = AttributeBinding::new(Value::from("a"), part).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.unbind(&harness.context());
		harness.flush().unwrap();

		assert!(!node.has_attribute("title"));
		assert!(binding.value().is_null());
	}

	#[rstest]
	fn test_rejects_directive() {
		let (_node, part) = attribute_part("title");
		let error = AttributeBinding::new(Value::directive(crate::directives::NoValue), part)
			.err()
			.unwrap();

		assert!(error.to_string().contains("[[ATTRIBUTE IS HERE!]]"));
	}
}
