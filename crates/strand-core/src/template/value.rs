//! Built-in single-hole templates
//!
//! These wrap one value in the smallest possible structure so that it can be
//! rendered anywhere a [`TemplateResult`] is expected:
//!
//! - [`text`] renders a text node whose data is the value
//! - [`child_node`] renders a child node anchor bound to the value
//! - [`element`] renders `<tag>` with spread props and one child value

use std::cell::RefCell;
use std::rc::Rc;

use strand_dom::Node;

use super::{Template, TemplateFragment, TemplateResult};
use crate::binding::{Binding, resolve_binding};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

/// Renders its single value into a text node
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTemplate;

/// Renders its single value into a child node part
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildNodeTemplate;

/// Renders an element whose props and children are the two holes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
	tag: String,
}

impl ElementTemplate {
	pub fn new(tag: impl Into<String>) -> Self {
		Self { tag: tag.into() }
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}
}

/// `text(value)`: a template result rendering `value` as text
pub fn text(value: impl Into<Value>) -> TemplateResult {
	TemplateResult::new(Rc::new(TextTemplate), vec![value.into()])
}

/// `child_node(value)`: a template result rendering `value` into a child part
pub fn child_node(value: impl Into<Value>) -> TemplateResult {
	TemplateResult::new(Rc::new(ChildNodeTemplate), vec![value.into()])
}

/// `element(tag, props, child)`
///
/// # Example
///
/// ```ignore
/// let props: SpreadProps = [("class", "greeting")].into_iter().collect();
/// let result = element("p", props, text("hello"));
/// ```
pub fn element(
	tag: impl Into<String>,
	props: impl Into<Value>,
	child: impl Into<Value>,
) -> TemplateResult {
	TemplateResult::new(
		Rc::new(ElementTemplate::new(tag)),
		vec![props.into(), child.into()],
	)
}

fn hole(data: &[Value], index: usize) -> Value {
	data.get(index).cloned().unwrap_or_default()
}

fn connect(value: Value, part: Part, context: &UpdateContext) -> Result<Box<dyn Binding>> {
	let mut binding = resolve_binding(value, part, context)?;
	binding.connect(context)?;
	Ok(binding)
}

impl Template for TextTemplate {
	fn render(&self, data: &[Value], context: &UpdateContext) -> Result<Rc<dyn TemplateFragment>> {
		let node = Node::text("");
		let binding = connect(hole(data, 0), Part::node(&node), context)?;
		Ok(Rc::new(ValueFragment::new(vec![node], vec![binding])))
	}

	fn is_same_template(&self, other: &dyn Template) -> bool {
		other.as_any().is::<TextTemplate>()
	}
}

impl Template for ChildNodeTemplate {
	fn render(&self, data: &[Value], context: &UpdateContext) -> Result<Rc<dyn TemplateFragment>> {
		let anchor = Node::comment("");
		let binding = connect(hole(data, 0), Part::child_node(&anchor), context)?;
		Ok(Rc::new(ValueFragment::new(vec![anchor], vec![binding])))
	}

	fn is_same_template(&self, other: &dyn Template) -> bool {
		other.as_any().is::<ChildNodeTemplate>()
	}
}

impl Template for ElementTemplate {
	fn render(&self, data: &[Value], context: &UpdateContext) -> Result<Rc<dyn TemplateFragment>> {
		let element = Node::element(&self.tag);
		let anchor = Node::comment("");
		element.append_child(&anchor);
		let props = connect(hole(data, 0), Part::element(&element), context)?;
		let child = connect(hole(data, 1), Part::child_node(&anchor), context)?;
		Ok(Rc::new(ValueFragment::new(vec![element], vec![props, child])))
	}

	fn is_same_template(&self, other: &dyn Template) -> bool {
		other
			.as_any()
			.downcast_ref::<ElementTemplate>()
			.is_some_and(|other| other.tag == self.tag)
	}
}

/// Fragment with a fixed list of root nodes and one binding per hole
pub struct ValueFragment {
	roots: Vec<Node>,
	bindings: RefCell<Vec<Box<dyn Binding>>>,
}

impl ValueFragment {
	pub fn new(roots: Vec<Node>, bindings: Vec<Box<dyn Binding>>) -> Self {
		Self {
			roots,
			bindings: RefCell::new(bindings),
		}
	}
}

impl TemplateFragment for ValueFragment {
	fn start_node(&self) -> Option<Node> {
		self.roots.first().cloned()
	}

	fn end_node(&self) -> Option<Node> {
		self.roots.last().cloned()
	}

	fn bind(&self, data: &[Value], context: &UpdateContext) -> Result<()> {
		for (index, binding) in self.bindings.borrow_mut().iter_mut().enumerate() {
			binding.bind(hole(data, index), context)?;
		}
		Ok(())
	}

	fn unbind(&self, context: &UpdateContext) {
		for binding in self.bindings.borrow_mut().iter_mut() {
			binding.unbind(context);
		}
	}

	fn mount(&self, part: &Part) {
		part.target().before(&self.roots);
	}

	fn unmount(&self, _part: &Part) {
		for root in &self.roots {
			root.remove();
		}
	}

	fn disconnect(&self) {
		for binding in self.bindings.borrow_mut().iter_mut() {
			binding.disconnect();
		}
	}
}
