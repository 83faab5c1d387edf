use indexmap::IndexMap;
use strand_dom::Node;

use super::{Binding, resolve_binding};
use crate::error::{Error, Result};
use crate::part::{Part, report_part};
use crate::updater::UpdateContext;
use crate::value::{SpreadProps, Value};

/// Spreads a [`SpreadProps`] map onto an element
///
/// Each key owns a sub-binding resolved from its prefix:
///
/// - `@name` binds the `name` event
/// - `.name` binds the `name` property
/// - anything else binds the attribute of the same name
///
/// On every update, sub-bindings whose key disappeared are unbound and
/// dropped first; the remaining keys are then bound (or created) in the
/// insertion order of the new map.
pub struct ElementBinding {
	part: Part,
	props: SpreadProps,
	bindings: IndexMap<String, Box<dyn Binding>>,
}

fn ensure_props(value: &Value, part: &Part) -> Result<SpreadProps> {
	match value {
		Value::Props(props) => Ok(props.clone()),
		Value::Null => Ok(SpreadProps::new()),
		other => Err(Error::InvalidValue {
			binding: "ElementBinding",
			expected: "spread props",
			found: other.describe(),
			location: report_part(part),
		}),
	}
}

fn resolve_spread_part(key: &str, node: &Node) -> Part {
	if let Some(name) = key.strip_prefix('@') {
		Part::event(node, name)
	} else if let Some(name) = key.strip_prefix('.') {
		Part::property(node, name)
	} else {
		Part::attribute(node, key)
	}
}

impl ElementBinding {
	pub fn new(value: Value, part: Part) -> Result<Self> {
		let props = ensure_props(&value, &part)?;
		Ok(Self {
			part,
			props,
			bindings: IndexMap::new(),
		})
	}

	fn update_props(&mut self, context: &UpdateContext) -> Result<()> {
		let props = self.props.clone();

		self.bindings.retain(|key, binding| {
			if props.contains_key(key) {
				true
			} else {
				binding.unbind(context);
				false
			}
		});

		for (key, value) in props.iter() {
			match self.bindings.get_mut(key) {
				Some(binding) => binding.bind(value.clone(), context)?,
				None => {
					let part = resolve_spread_part(key, self.part.target());
					let mut binding = resolve_binding(value.clone(), part, context)?;
					binding.connect(context)?;
					self.bindings.insert(key.clone(), binding);
				}
			}
		}
		Ok(())
	}
}

impl Binding for ElementBinding {
	fn value(&self) -> Value {
		Value::Props(self.props.clone())
	}

	fn part(&self) -> Part {
		self.part.clone()
	}

	fn start_node(&self) -> Node {
		self.part.target().clone()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		self.update_props(context)
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let props = ensure_props(&value, &self.part)?;
		if props.ptr_eq(&self.props) {
			return Ok(());
		}
		self.props = props;
		self.update_props(context)
	}

	fn unbind(&mut self, context: &UpdateContext) {
		self.props = SpreadProps::new();
		for binding in self.bindings.values_mut() {
			binding.unbind(context);
		}
	}

	fn disconnect(&mut self) {
		for binding in self.bindings.values_mut() {
			binding.disconnect();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binding::property_value;
	use crate::testing::TestHarness;
	use crate::value::EventListener;
	use rstest::rstest;
	use strand_dom::Event;

	#[rstest]
	fn test_spread_dispatches_by_prefix() {
		let harness = TestHarness::new();
		let node = Node::element("input");
		let clicks = std::rc::Rc::new(std::cell::Cell::new(0));
		let counter = std::rc::Rc::clone(&clicks);
		let props: SpreadProps = [
			("class", Value::from("field")),
			(".value", Value::from("typed")),
			("@click", Value::from(EventListener::new(move |_| counter.set(counter.get() + 1)))),
		]
		.into_iter()
		.collect();
		let mut binding = ElementBinding::new(Value::from(props), Part::element(&node)).unwrap();

		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();
		node.dispatch_event(&Event::new("click"));

		assert_eq!(node.get_attribute("class").as_deref(), Some("field"));
		assert!(property_value(&node, "value").is_some());
		assert_eq!(clicks.get(), 1);
	}

	#[rstest]
	fn test_stale_keys_are_unbound() {
		let harness = TestHarness::new();
		let node = Node::element("div");
		let first: SpreadProps = [("id", "a"), ("title", "t")].into_iter().collect();
		let second: SpreadProps = [("title", "u"), ("lang", "en")].into_iter().collect();
		let mut binding = ElementBinding::new(Value::from(first), Part::element(&node)).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.bind(Value::from(second), &harness.context()).unwrap();
		harness.flush().unwrap();

		assert_eq!(node.to_html(), r#"<div title="u" lang="en"></div>"#);
	}

	#[rstest]
	fn test_same_props_are_skipped() {
		let harness = TestHarness::new();
		let node = Node::element("div");
		let props: SpreadProps = [("id", "a")].into_iter().collect();
		let mut binding = ElementBinding::new(Value::from(props.clone()), Part::element(&node)).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.bind(Value::from(props), &harness.context()).unwrap();

		assert_eq!(harness.mutation_count(), 0);
	}

	#[rstest]
	fn test_unbind_clears_every_key() {
		let harness = TestHarness::new();
		let node = Node::element("div");
		let props: SpreadProps = [("id", "a"), ("title", "t")].into_iter().collect();
		let mut binding = ElementBinding::new(Value::from(props), Part::element(&node)).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.unbind(&harness.context());
		harness.flush().unwrap();

		assert_eq!(node.to_html(), "<div></div>");
	}
}
