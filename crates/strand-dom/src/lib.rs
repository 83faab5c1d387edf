//! Host node tree for strand
//!
//! Bindings in `strand-core` never touch a browser directly; they commit into
//! the small in-memory node tree defined here. It models just enough of the
//! DOM for the engine to be exercised and inspected:
//!
//! - element, text, comment and fragment nodes
//! - attributes (ordered), properties (arbitrary `Rc<dyn Any>` slots)
//! - event listeners with capture/once/passive options and dispatch
//! - sibling/child manipulation with fragment flattening
//! - HTML serialization ([`Node::to_html`]) and fragment parsing
//!   ([`parse_html_fragment`])
//!
//! ## Example
//!
//! ```ignore
//! use strand_dom::Node;
//!
//! let list = Node::element("ul");
//! let item = Node::element("li");
//! item.append_child(&Node::text("first"));
//! list.append_child(&item);
//!
//! assert_eq!(list.to_html(), "<ul><li>first</li></ul>");
//! ```

mod event;
mod node;
mod parse;
mod serialize;

pub use event::{Event, EventHandler, ListenerOptions};
pub use node::{Node, NodeType};
pub use parse::parse_html_fragment;
