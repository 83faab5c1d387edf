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

/// Assigns a value to a node property
///
/// Properties are stored on the node as the bound [`Value`]; read them back
/// with [`property_value`]. Unbinding leaves the last assigned value in place.
pub struct PropertyBinding {
	state: Rc<RefCell<PropertyState>>,
}

struct PropertyState {
	part: Part,
	value: Value,
	dirty: bool,
}

impl PropertyBinding {
	pub fn new(value: Value, part: Part) -> Result<Self> {
		ensure_non_directive(&value, &part)?;
		Ok(Self {
			state: Rc::new(RefCell::new(PropertyState {
				part,
				value,
				dirty: false,
			})),
		})
	}
}

/// Read a property previously assigned by a [`PropertyBinding`]
pub fn property_value(node: &Node, name: &str) -> Option<Value> {
	node.property(name)
		.and_then(|value| value.downcast_ref::<Value>().cloned())
}

impl Binding for PropertyBinding {
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

	fn unbind(&mut self, _context: &UpdateContext) {}

	fn disconnect(&mut self) {}
}

impl CommitState for PropertyState {
	fn dirty(&mut self) -> &mut bool {
		&mut self.dirty
	}
}

impl Effect for RefCell<PropertyState> {
	fn commit(&self, _phase: CommitPhase) {
		let mut state = self.borrow_mut();
		state.dirty = false;
		if let Part::Property { node, name } = &state.part {
			node.set_property(name, Rc::new(state.value.clone()));
		}
	}
}
