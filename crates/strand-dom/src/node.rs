//! Node - shared handle to a host tree node

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{Event, EventHandler, ListenerOptions};
use crate::serialize;

/// Kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// An element such as `<div>`.
	Element,
	/// A text node.
	Text,
	/// A comment node. Used as hole anchors by the engine.
	Comment,
	/// A document fragment. Inserting it moves its children instead.
	Fragment,
}

enum NodeKind {
	Element(String),
	Text,
	Comment,
	Fragment,
}

#[derive(Clone)]
struct Registration {
	event_type: String,
	handler: Rc<dyn EventHandler>,
	options: ListenerOptions,
}

impl Registration {
	fn matches(&self, event_type: &str, handler: &Rc<dyn EventHandler>, capture: bool) -> bool {
		self.event_type == event_type
			&& std::ptr::addr_eq(Rc::as_ptr(&self.handler), Rc::as_ptr(handler))
			&& self.options.capture == capture
	}
}

#[derive(Clone, Copy)]
enum Phase {
	Capture,
	Target,
	Bubble,
}

struct NodeInner {
	kind: NodeKind,
	parent: RefCell<Weak<NodeInner>>,
	children: RefCell<Vec<Node>>,
	data: RefCell<String>,
	attributes: RefCell<Vec<(String, String)>>,
	properties: RefCell<Vec<(String, Rc<dyn Any>)>>,
	listeners: RefCell<Vec<Registration>>,
}

/// Reference-counted handle to a node in the host tree
///
/// Cloning a `Node` clones the handle, not the node. Children are owned by
/// their parent; a child only holds a weak reference back up.
#[derive(Clone)]
pub struct Node {
	inner: Rc<NodeInner>,
}

impl Node {
	fn from_kind(kind: NodeKind, data: &str) -> Self {
		Self {
			inner: Rc::new(NodeInner {
				kind,
				parent: RefCell::new(Weak::new()),
				children: RefCell::new(Vec::new()),
				data: RefCell::new(data.to_owned()),
				attributes: RefCell::new(Vec::new()),
				properties: RefCell::new(Vec::new()),
				listeners: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Create an element with the given tag name
	pub fn element(tag: &str) -> Self {
		Self::from_kind(NodeKind::Element(tag.to_owned()), "")
	}

	/// Create a text node
	pub fn text(data: &str) -> Self {
		Self::from_kind(NodeKind::Text, data)
	}

	/// Create a comment node
	pub fn comment(data: &str) -> Self {
		Self::from_kind(NodeKind::Comment, data)
	}

	/// Create an empty document fragment
	pub fn fragment() -> Self {
		Self::from_kind(NodeKind::Fragment, "")
	}

	pub fn node_type(&self) -> NodeType {
		match self.inner.kind {
			NodeKind::Element(_) => NodeType::Element,
			NodeKind::Text => NodeType::Text,
			NodeKind::Comment => NodeType::Comment,
			NodeKind::Fragment => NodeType::Fragment,
		}
	}

	/// Tag name for elements, `None` otherwise
	pub fn tag_name(&self) -> Option<&str> {
		match &self.inner.kind {
			NodeKind::Element(tag) => Some(tag.as_str()),
			_ => None,
		}
	}

	/// Whether both handles refer to the same node
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Character data of text and comment nodes
	pub fn node_value(&self) -> Option<String> {
		match self.inner.kind {
			NodeKind::Text | NodeKind::Comment => Some(self.inner.data.borrow().clone()),
			_ => None,
		}
	}

	/// Replace the character data of a text or comment node
	///
	/// `None` clears the data. Elements and fragments ignore the call.
	pub fn set_node_value(&self, value: Option<&str>) {
		if matches!(self.inner.kind, NodeKind::Text | NodeKind::Comment) {
			*self.inner.data.borrow_mut() = value.unwrap_or_default().to_owned();
		}
	}

	/// Concatenated text of this node and its descendants, comments excluded
	pub fn text_content(&self) -> String {
		match self.inner.kind {
			NodeKind::Text => self.inner.data.borrow().clone(),
			NodeKind::Comment => String::new(),
			_ => self
				.inner
				.children
				.borrow()
				.iter()
				.map(Node::text_content)
				.collect(),
		}
	}

	// Attributes

	pub fn get_attribute(&self, name: &str) -> Option<String> {
		self.inner
			.attributes
			.borrow()
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.clone())
	}

	pub fn has_attribute(&self, name: &str) -> bool {
		self.inner
			.attributes
			.borrow()
			.iter()
			.any(|(key, _)| key == name)
	}

	/// Set an attribute, keeping its original position when it already exists
	pub fn set_attribute(&self, name: &str, value: &str) {
		let mut attributes = self.inner.attributes.borrow_mut();
		match attributes.iter_mut().find(|(key, _)| key == name) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => attributes.push((name.to_owned(), value.to_owned())),
		}
	}

	/// Remove an attribute, returning whether it was present
	pub fn remove_attribute(&self, name: &str) -> bool {
		let mut attributes = self.inner.attributes.borrow_mut();
		let before = attributes.len();
		attributes.retain(|(key, _)| key != name);
		attributes.len() != before
	}

	/// Add (`force == true`) or remove (`force == false`) a boolean attribute
	///
	/// Returns whether the attribute is present afterwards. An existing value
	/// is left untouched when forcing it on.
	pub fn toggle_attribute(&self, name: &str, force: bool) -> bool {
		if force {
			if !self.has_attribute(name) {
				self.set_attribute(name, "");
			}
		} else {
			self.remove_attribute(name);
		}
		force
	}

	/// Snapshot of all attributes in insertion order
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.inner.attributes.borrow().clone()
	}

	// Properties

	/// Assign a property slot
	pub fn set_property(&self, name: &str, value: Rc<dyn Any>) {
		let mut properties = self.inner.properties.borrow_mut();
		match properties.iter_mut().find(|(key, _)| key == name) {
			Some((_, existing)) => *existing = value,
			None => properties.push((name.to_owned(), value)),
		}
	}

	/// Read a property slot
	pub fn property(&self, name: &str) -> Option<Rc<dyn Any>> {
		self.inner
			.properties
			.borrow()
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| Rc::clone(value))
	}

	// Event listeners

	/// Register `handler` for `event_type`
	///
	/// Registering the same handler for the same type and capture flag twice
	/// is a no-op.
	pub fn add_event_listener(
		&self,
		event_type: &str,
		handler: Rc<dyn EventHandler>,
		options: ListenerOptions,
	) {
		let mut listeners = self.inner.listeners.borrow_mut();
		if listeners
			.iter()
			.any(|registration| registration.matches(event_type, &handler, options.capture))
		{
			return;
		}
		listeners.push(Registration {
			event_type: event_type.to_owned(),
			handler,
			options,
		});
	}

	/// Unregister `handler`, returning whether it was registered
	pub fn remove_event_listener(
		&self,
		event_type: &str,
		handler: &Rc<dyn EventHandler>,
		options: ListenerOptions,
	) -> bool {
		let mut listeners = self.inner.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|registration| !registration.matches(event_type, handler, options.capture));
		listeners.len() != before
	}

	/// Number of listeners registered for `event_type`
	pub fn listener_count(&self, event_type: &str) -> usize {
		self.inner
			.listeners
			.borrow()
			.iter()
			.filter(|registration| registration.event_type == event_type)
			.count()
	}

	/// Dispatch `event` with capture, target and (if enabled) bubble phases
	///
	/// Returns `false` when a listener called `prevent_default`.
	pub fn dispatch_event(&self, event: &Event) -> bool {
		event.set_target(self);

		let mut path = Vec::new();
		let mut current = self.parent_node();
		while let Some(node) = current {
			current = node.parent_node();
			path.push(node);
		}

		for node in path.iter().rev() {
			if event.propagation_stopped() {
				break;
			}
			node.invoke_listeners(event, Phase::Capture);
		}
		if !event.propagation_stopped() {
			self.invoke_listeners(event, Phase::Target);
		}
		if event.does_bubble() {
			for node in &path {
				if event.propagation_stopped() {
					break;
				}
				node.invoke_listeners(event, Phase::Bubble);
			}
		}

		event.set_current_target(None);
		!event.default_prevented()
	}

	fn invoke_listeners(&self, event: &Event, phase: Phase) {
		event.set_current_target(Some(self));
		let matching: Vec<Registration> = self
			.inner
			.listeners
			.borrow()
			.iter()
			.filter(|registration| {
				registration.event_type == event.event_type()
					&& match phase {
						Phase::Capture => registration.options.capture,
						Phase::Target => true,
						Phase::Bubble => !registration.options.capture,
					}
			})
			.cloned()
			.collect();

		for registration in matching {
			if registration.options.once {
				self.remove_event_listener(
					&registration.event_type,
					&registration.handler,
					registration.options,
				);
			}
			registration.handler.handle_event(event);
		}
	}

	// Tree

	pub fn parent_node(&self) -> Option<Node> {
		self.inner
			.parent
			.borrow()
			.upgrade()
			.map(|inner| Node { inner })
	}

	/// Snapshot of the children
	pub fn child_nodes(&self) -> Vec<Node> {
		self.inner.children.borrow().clone()
	}

	pub fn first_child(&self) -> Option<Node> {
		self.inner.children.borrow().first().cloned()
	}

	pub fn last_child(&self) -> Option<Node> {
		self.inner.children.borrow().last().cloned()
	}

	pub fn next_sibling(&self) -> Option<Node> {
		let parent = self.parent_node()?;
		let siblings = parent.inner.children.borrow();
		let index = siblings.iter().position(|node| node.ptr_eq(self))?;
		siblings.get(index + 1).cloned()
	}

	pub fn previous_sibling(&self) -> Option<Node> {
		let parent = self.parent_node()?;
		let siblings = parent.inner.children.borrow();
		let index = siblings.iter().position(|node| node.ptr_eq(self))?;
		index.checked_sub(1).and_then(|index| siblings.get(index).cloned())
	}

	/// Whether `other` is this node or one of its descendants
	pub fn contains(&self, other: &Node) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node.ptr_eq(self) {
				return true;
			}
			current = node.parent_node();
		}
		false
	}

	/// Append `child` (or the children of a fragment) as last child
	pub fn append_child(&self, child: &Node) {
		self.insert_before(child, None);
	}

	/// Insert `child` (or the children of a fragment) before `reference`
	///
	/// A missing or foreign `reference` appends. Inserting an ancestor into
	/// its own subtree is ignored.
	pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
		if child.contains(self) || reference.is_some_and(|reference| reference.ptr_eq(child)) {
			return;
		}
		let nodes = child.take_for_insertion();
		for node in &nodes {
			*node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
		}
		let mut children = self.inner.children.borrow_mut();
		let index = reference
			.and_then(|reference| children.iter().position(|node| node.ptr_eq(reference)))
			.unwrap_or(children.len());
		for (offset, node) in nodes.into_iter().enumerate() {
			children.insert(index + offset, node);
		}
	}

	/// Insert `nodes` immediately before this node, in order
	///
	/// Does nothing when this node has no parent.
	pub fn before(&self, nodes: &[Node]) {
		if let Some(parent) = self.parent_node() {
			for node in nodes {
				parent.insert_before(node, Some(self));
			}
		}
	}

	/// Detach this node from its parent
	pub fn remove(&self) {
		if let Some(parent) = self.inner.parent.borrow().upgrade() {
			parent
				.children
				.borrow_mut()
				.retain(|node| !Rc::ptr_eq(&node.inner, &self.inner));
		}
		*self.inner.parent.borrow_mut() = Weak::new();
	}

	fn take_for_insertion(&self) -> Vec<Node> {
		if let NodeKind::Fragment = self.inner.kind {
			let children = std::mem::take(&mut *self.inner.children.borrow_mut());
			for child in &children {
				*child.inner.parent.borrow_mut() = Weak::new();
			}
			children
		} else {
			self.remove();
			vec![self.clone()]
		}
	}

	// Serialization

	/// Serialize this node (its children, for fragments) as HTML
	pub fn to_html(&self) -> String {
		let mut out = String::new();
		serialize::write_node(self, &mut out, None);
		out
	}

	/// Serialize the children of this node as HTML
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.child_nodes() {
			serialize::write_node(&child, &mut out, None);
		}
		out
	}

	/// Serialize this node, printing `marker` in place of `target`
	///
	/// Used to point at a location inside a tree in error messages.
	pub fn to_html_marking(&self, target: &Node, marker: &str) -> String {
		let mut out = String::new();
		serialize::write_node(self, &mut out, Some((target, marker)));
		out
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.inner.kind {
			NodeKind::Element(tag) => write!(f, "<{tag}>"),
			NodeKind::Text => write!(f, "#text {:?}", self.inner.data.borrow()),
			NodeKind::Comment => write!(f, "<!--{}-->", self.inner.data.borrow()),
			NodeKind::Fragment => f.write_str("#document-fragment"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_insert_before_reference() {
		let parent = Node::element("div");
		let anchor = Node::comment("");
		parent.append_child(&anchor);

		anchor.before(&[Node::text("a"), Node::text("b")]);

		assert_eq!(parent.to_html(), "<div>ab<!----></div>");
		assert!(anchor.previous_sibling().is_some());
	}

	#[rstest]
	fn test_fragment_children_are_moved() {
		let fragment = Node::fragment();
		fragment.append_child(&Node::element("span"));
		fragment.append_child(&Node::text("x"));
		let parent = Node::element("p");

		parent.append_child(&fragment);

		assert_eq!(parent.to_html(), "<p><span></span>x</p>");
		assert!(fragment.child_nodes().is_empty());
	}

	#[rstest]
	fn test_reinserting_moves_node() {
		let first = Node::element("a");
		let second = Node::element("b");
		let child = Node::text("t");
		first.append_child(&child);

		second.append_child(&child);

		assert!(first.child_nodes().is_empty());
		assert!(child.parent_node().is_some_and(|parent| parent.ptr_eq(&second)));
	}

	#[rstest]
	#[case(true, true)]
	#[case(false, false)]
	fn test_toggle_attribute(#[case] force: bool, #[case] present: bool) {
		let node = Node::element("input");
		node.set_attribute("disabled", "");

		node.toggle_attribute("disabled", force);

		assert_eq!(node.has_attribute("disabled"), present);
	}

	#[rstest]
	fn test_set_attribute_keeps_position() {
		let node = Node::element("div");
		node.set_attribute("id", "a");
		node.set_attribute("class", "b");
		node.set_attribute("id", "c");

		assert_eq!(node.to_html(), r#"<div id="c" class="b"></div>"#);
	}

	#[rstest]
	fn test_duplicate_listener_is_ignored() {
		let node = Node::element("button");
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let handler: Rc<dyn EventHandler> = Rc::new(move |_: &Event| counter.set(counter.get() + 1));

		node.add_event_listener("click", Rc::clone(&handler), ListenerOptions::new());
		node.add_event_listener("click", Rc::clone(&handler), ListenerOptions::new());
		node.dispatch_event(&Event::new("click"));

		assert_eq!(calls.get(), 1);
		assert!(node.remove_event_listener("click", &handler, ListenerOptions::new()));
		assert_eq!(node.listener_count("click"), 0);
	}

	#[rstest]
	fn test_capture_target_bubble_order() {
		let outer = Node::element("div");
		let inner = Node::element("span");
		outer.append_child(&inner);
		let log = Rc::new(RefCell::new(Vec::new()));

		let push = |label: &'static str| -> Rc<dyn EventHandler> {
			let log = Rc::clone(&log);
			Rc::new(move |_: &Event| log.borrow_mut().push(label))
		};
		outer.add_event_listener("click", push("bubble"), ListenerOptions::new());
		outer.add_event_listener("click", push("capture"), ListenerOptions::new().capture(true));
		inner.add_event_listener("click", push("target"), ListenerOptions::new());

		inner.dispatch_event(&Event::new("click").bubbles(true));

		assert_eq!(*log.borrow(), vec!["capture", "target", "bubble"]);
	}

	#[rstest]
	fn test_once_listener_runs_once() {
		let node = Node::element("button");
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		node.add_event_listener(
			"click",
			Rc::new(move |_: &Event| counter.set(counter.get() + 1)),
			ListenerOptions::new().once(true),
		);

		node.dispatch_event(&Event::new("click"));
		node.dispatch_event(&Event::new("click"));

		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	fn test_prevent_default_reported() {
		let node = Node::element("a");
		node.add_event_listener(
			"click",
			Rc::new(|event: &Event| event.prevent_default()),
			ListenerOptions::new(),
		);

		assert!(!node.dispatch_event(&Event::new("click")));
	}

	#[rstest]
	fn test_properties_hold_any_value() {
		let node = Node::element("input");
		node.set_property("value", Rc::new(String::from("hello")));

		let value = node.property("value");

		assert_eq!(
			value.as_deref().and_then(|value| value.downcast_ref::<String>()),
			Some(&String::from("hello"))
		);
	}
}
