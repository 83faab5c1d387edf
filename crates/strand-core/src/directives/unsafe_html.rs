//! Raw markup inserted in front of a child node part
//!
//! The content is parsed with the HTML fragment parser and inserted as-is.
//! Nothing is escaped; only pass markup from trusted sources.

use std::cell::RefCell;
use std::rc::Rc;

use strand_dom::{Node, parse_html_fragment};

use crate::binding::{Binding, CommitState, request_commit};
use crate::directive::{Directive, ensure_directive, ensure_part};
use crate::effect::{CommitPhase, Effect};
use crate::error::Result;
use crate::part::{Part, PartType};
use crate::updater::UpdateContext;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsafeHtml {
	content: String,
}

impl UnsafeHtml {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
		}
	}

	pub fn content(&self) -> &str {
		&self.content
	}
}

/// Insert `content` as markup
pub fn unsafe_html(content: impl Into<String>) -> Value {
	Value::directive(UnsafeHtml::new(content))
}

impl Directive for UnsafeHtml {
	fn name(&self) -> &'static str {
		"UnsafeHtml"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		_context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		ensure_part("UnsafeHtml", "a child node part", &part, &[PartType::ChildNode])?;
		Ok(Box::new(UnsafeHtmlBinding::new(self, part)))
	}
}

pub struct UnsafeHtmlBinding {
	directive: Rc<UnsafeHtml>,
	state: Rc<RefCell<UnsafeHtmlState>>,
}

struct UnsafeHtmlState {
	part: Part,
	content: String,
	nodes: Vec<Node>,
	dirty: bool,
}

impl UnsafeHtmlBinding {
	pub fn new(directive: Rc<UnsafeHtml>, part: Part) -> Self {
		let content = directive.content.clone();
		Self {
			directive,
			state: Rc::new(RefCell::new(UnsafeHtmlState {
				part,
				content,
				nodes: Vec::new(),
				dirty: false,
			})),
		}
	}

	fn set_content(&mut self, content: String, context: &UpdateContext) {
		{
			let mut state = self.state.borrow_mut();
			if state.content == content {
				return;
			}
			state.content = content;
		}
		request_commit(&self.state, context);
	}
}

impl Binding for UnsafeHtmlBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&self.directive) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.state.borrow().part.clone()
	}

	fn start_node(&self) -> Node {
		let state = self.state.borrow();
		state
			.nodes
			.first()
			.cloned()
			.unwrap_or_else(|| state.part.target().clone())
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		request_commit(&self.state, context);
		Ok(())
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let directive = ensure_directive::<UnsafeHtml>(&value, &self.state.borrow().part)?;
		let content = directive.content.clone();
		self.directive = directive;
		self.set_content(content, context);
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		let has_nodes = !self.state.borrow().nodes.is_empty();
		self.state.borrow_mut().content.clear();
		if has_nodes {
			request_commit(&self.state, context);
		}
	}

	fn disconnect(&mut self) {}
}

impl CommitState for UnsafeHtmlState {
	fn dirty(&mut self) -> &mut bool {
		&mut self.dirty
	}
}

impl Effect for RefCell<UnsafeHtmlState> {
	fn commit(&self, _phase: CommitPhase) {
		let mut state = self.borrow_mut();
		state.dirty = false;
		for node in state.nodes.drain(..) {
			node.remove();
		}
		if state.content.is_empty() {
			return;
		}
		let nodes = parse_html_fragment(&state.content);
		state.part.target().before(&nodes);
		state.nodes = nodes;
	}
}
