//! HTML serialization of the node tree.

use std::borrow::Cow;

use crate::node::{Node, NodeType};

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

pub(crate) fn write_node(node: &Node, out: &mut String, marker: Option<(&Node, &str)>) {
	if let Some((target, text)) = marker {
		if node.ptr_eq(target) {
			out.push_str(text);
			return;
		}
	}

	match node.node_type() {
		NodeType::Text => {
			out.push_str(&escape_text(&node.node_value().unwrap_or_default()));
		}
		NodeType::Comment => {
			out.push_str("<!--");
			out.push_str(&node.node_value().unwrap_or_default());
			out.push_str("-->");
		}
		NodeType::Fragment => {
			for child in node.child_nodes() {
				write_node(&child, out, marker);
			}
		}
		NodeType::Element => {
			let tag = node.tag_name().unwrap_or_default();
			out.push('<');
			out.push_str(tag);
			for (name, value) in node.attributes() {
				out.push(' ');
				out.push_str(&name);
				out.push_str("=\"");
				out.push_str(&escape_attribute(&value));
				out.push('"');
			}
			out.push('>');
			if VOID_ELEMENTS.contains(&tag) {
				return;
			}
			for child in node.child_nodes() {
				write_node(&child, out, marker);
			}
			out.push_str("</");
			out.push_str(tag);
			out.push('>');
		}
	}
}

fn escape_text(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

fn escape_attribute(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '"']) {
		Cow::Owned(s.replace('&', "&amp;").replace('"', "&quot;"))
	} else {
		Cow::Borrowed(s)
	}
}
