//! HTML fragment parsing backed by `scraper`.

use scraper::{ElementRef, Html};

use crate::node::Node;

/// Parse `html` as a body fragment into detached nodes
///
/// Text, comment and element nodes are kept; doctypes and processing
/// instructions are dropped.
///
/// # Example
///
/// ```ignore
/// let nodes = parse_html_fragment("<b>bold</b> text");
/// assert_eq!(nodes.len(), 2);
/// ```
pub fn parse_html_fragment(html: &str) -> Vec<Node> {
	let document = Html::parse_fragment(html);
	let nodes = convert_children(document.root_element());
	tracing::trace!(nodes = nodes.len(), "parsed html fragment");
	nodes
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
	let mut nodes = Vec::new();
	for child in parent.children() {
		match child.value() {
			scraper::Node::Text(text) => nodes.push(Node::text(text)),
			scraper::Node::Comment(comment) => nodes.push(Node::comment(comment)),
			scraper::Node::Element(_) => {
				if let Some(element) = ElementRef::wrap(child) {
					nodes.push(convert_element(element));
				}
			}
			_ => {}
		}
	}
	nodes
}

fn convert_element(element: ElementRef<'_>) -> Node {
	let node = Node::element(element.value().name());
	for (name, value) in element.value().attrs() {
		node.set_attribute(name, value);
	}
	for child in convert_children(element) {
		node.append_child(&child);
	}
	node
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_mixed_content() {
		let nodes = parse_html_fragment(r#"<b class="x">bold</b> text<!--note-->"#);

		let html: String = nodes.iter().map(Node::to_html).collect();
		assert_eq!(html, r#"<b class="x">bold</b> text<!--note-->"#);
	}

	#[rstest]
	fn test_parse_empty() {
		assert!(parse_html_fragment("").is_empty());
	}
}
