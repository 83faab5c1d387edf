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

/// Writes the stringified value into the data of a text or comment node
pub struct NodeBinding {
	state: Rc<RefCell<NodeState>>,
}

struct NodeState {
	part: Part,
	value: Value,
	dirty: bool,
}

impl NodeBinding {
	pub fn new(value: Value, part: Part) -> Result<Self> {
		ensure_non_directive(&value, &part)?;
		Ok(Self {
			state: Rc::new(RefCell::new(NodeState {
				part,
				value,
				dirty: false,
			})),
		})
	}
}

impl Binding for NodeBinding {
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

impl CommitState for NodeState {
	fn dirty(&mut self) -> &mut bool {
		&mut self.dirty
	}
}

impl Effect for RefCell<NodeState> {
	fn commit(&self, _phase: CommitPhase) {
		let mut state = self.borrow_mut();
		state.dirty = false;
		let data = state.value.to_display_string();
		state.part.target().set_node_value(data.as_deref());
	}
}
