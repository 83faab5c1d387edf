//! Parts: the mutation sites of a template.

use std::fmt;

use strand_dom::Node;

/// Kind of a [`Part`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
	Attribute,
	ChildNode,
	Element,
	Event,
	Node,
	Property,
}

impl fmt::Display for PartType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			PartType::Attribute => "attribute part",
			PartType::ChildNode => "child node part",
			PartType::Element => "element part",
			PartType::Event => "event part",
			PartType::Node => "node part",
			PartType::Property => "property part",
		})
	}
}

/// Descriptor of one place in a rendered template where a value is inserted
///
/// A part references its node but owns no content; exactly one binding is
/// attached to it at any time.
#[derive(Debug, Clone)]
pub enum Part {
	/// `<div name=${value}>`
	Attribute { node: Node, name: String },
	/// `<div>${value}</div>`, anchored by a comment node
	ChildNode { node: Node },
	/// `<div ${props}>`
	Element { node: Node },
	/// `<button @name=${listener}>`
	Event { node: Node, name: String },
	/// A text node whose data is the value
	Node { node: Node },
	/// `<input .name=${value}>`
	Property { node: Node, name: String },
}

impl Part {
	pub fn attribute(node: &Node, name: impl Into<String>) -> Self {
		Part::Attribute {
			node: node.clone(),
			name: name.into(),
		}
	}

	pub fn child_node(node: &Node) -> Self {
		Part::ChildNode { node: node.clone() }
	}

	pub fn element(node: &Node) -> Self {
		Part::Element { node: node.clone() }
	}

	pub fn event(node: &Node, name: impl Into<String>) -> Self {
		Part::Event {
			node: node.clone(),
			name: name.into(),
		}
	}

	pub fn node(node: &Node) -> Self {
		Part::Node { node: node.clone() }
	}

	pub fn property(node: &Node, name: impl Into<String>) -> Self {
		Part::Property {
			node: node.clone(),
			name: name.into(),
		}
	}

	/// The node this part points at
	pub fn target(&self) -> &Node {
		match self {
			Part::Attribute { node, .. }
			| Part::ChildNode { node }
			| Part::Element { node }
			| Part::Event { node, .. }
			| Part::Node { node }
			| Part::Property { node, .. } => node,
		}
	}

	pub fn part_type(&self) -> PartType {
		match self {
			Part::Attribute { .. } => PartType::Attribute,
			Part::ChildNode { .. } => PartType::ChildNode,
			Part::Element { .. } => PartType::Element,
			Part::Event { .. } => PartType::Event,
			Part::Node { .. } => PartType::Node,
			Part::Property { .. } => PartType::Property,
		}
	}

	/// Attribute, property or event name
	pub fn name(&self) -> Option<&str> {
		match self {
			Part::Attribute { name, .. } | Part::Event { name, .. } | Part::Property { name, .. } => {
				Some(name.as_str())
			}
			_ => None,
		}
	}
}

/// Render the location of `part` with a visible marker, for error messages
///
/// # Example
///
/// ```ignore
/// let input = Node::element("input");
/// let message = report_part(&Part::attribute(&input, "value"));
/// assert_eq!(message, "<input value=[[ATTRIBUTE IS HERE!]]>");
/// ```
pub fn report_part(part: &Part) -> String {
	match part {
		Part::Attribute { node, name } => {
			mark_opening_tag(node, &format!("{name}=[[ATTRIBUTE IS HERE!]]"))
		}
		Part::Property { node, name } => {
			mark_opening_tag(node, &format!(".{name}=[[PROPERTY IS HERE!]]"))
		}
		Part::Event { node, name } => mark_opening_tag(node, &format!("@{name}=[[EVENT IS HERE!]]")),
		Part::Element { node } => mark_opening_tag(node, "[[ELEMENT IS HERE!]]"),
		Part::ChildNode { node } => mark_in_parent(node, "[[CHILD NODE IS HERE!]]"),
		Part::Node { node } => mark_in_parent(node, "[[NODE IS HERE!]]"),
	}
}

fn mark_opening_tag(node: &Node, marker: &str) -> String {
	let mut out = String::from("<");
	out.push_str(node.tag_name().unwrap_or("#node"));
	for (name, value) in node.attributes() {
		out.push_str(&format!(" {name}=\"{value}\""));
	}
	out.push(' ');
	out.push_str(marker);
	out.push('>');
	out
}

fn mark_in_parent(node: &Node, marker: &str) -> String {
	match node.parent_node() {
		Some(parent) => parent.to_html_marking(node, marker),
		None => marker.to_owned(),
	}
}
