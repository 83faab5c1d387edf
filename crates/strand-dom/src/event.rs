//! Events and listener registration types.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::node::Node;

/// Anything that can receive a dispatched event
pub trait EventHandler {
	/// Handle `event`
	fn handle_event(&self, event: &Event);
}

impl<F> EventHandler for F
where
	F: Fn(&Event),
{
	fn handle_event(&self, event: &Event) {
		self(event)
	}
}

/// Options attached to a listener registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ListenerOptions {
	/// Invoke during the capture phase instead of the bubble phase.
	pub capture: bool,
	/// Remove the listener after its first invocation.
	pub once: bool,
	/// The listener promises not to cancel the event.
	pub passive: bool,
}

impl ListenerOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the capture option.
	pub fn capture(mut self, capture: bool) -> Self {
		self.capture = capture;
		self
	}

	/// Sets the once option.
	pub fn once(mut self, once: bool) -> Self {
		self.once = once;
		self
	}

	/// Sets the passive option.
	pub fn passive(mut self, passive: bool) -> Self {
		self.passive = passive;
		self
	}
}

/// A dispatched event
pub struct Event {
	event_type: String,
	bubbles: bool,
	cancelable: bool,
	default_prevented: Cell<bool>,
	propagation_stopped: Cell<bool>,
	target: RefCell<Option<Node>>,
	current_target: RefCell<Option<Node>>,
}

impl Event {
	/// Create a non-bubbling, cancelable event of the given type
	pub fn new(event_type: impl Into<String>) -> Self {
		Self {
			event_type: event_type.into(),
			bubbles: false,
			cancelable: true,
			default_prevented: Cell::new(false),
			propagation_stopped: Cell::new(false),
			target: RefCell::new(None),
			current_target: RefCell::new(None),
		}
	}

	/// Sets whether the event bubbles to ancestors.
	pub fn bubbles(mut self, bubbles: bool) -> Self {
		self.bubbles = bubbles;
		self
	}

	/// Sets whether `prevent_default` has any effect.
	pub fn cancelable(mut self, cancelable: bool) -> Self {
		self.cancelable = cancelable;
		self
	}

	/// The event type, e.g. `"click"`
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Whether the event bubbles
	pub fn does_bubble(&self) -> bool {
		self.bubbles
	}

	/// Node the event was dispatched on
	pub fn target(&self) -> Option<Node> {
		self.target.borrow().clone()
	}

	/// Node whose listeners are currently running
	pub fn current_target(&self) -> Option<Node> {
		self.current_target.borrow().clone()
	}

	/// Cancel the default action, if the event is cancelable
	pub fn prevent_default(&self) {
		if self.cancelable {
			self.default_prevented.set(true);
		}
	}

	/// Whether `prevent_default` took effect
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	/// Stop propagation to further nodes
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
	}

	pub(crate) fn propagation_stopped(&self) -> bool {
		self.propagation_stopped.get()
	}

	pub(crate) fn set_target(&self, node: &Node) {
		*self.target.borrow_mut() = Some(node.clone());
	}

	pub(crate) fn set_current_target(&self, node: Option<&Node>) {
		*self.current_target.borrow_mut() = node.cloned();
	}
}

impl fmt::Debug for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("type", &self.event_type)
			.field("bubbles", &self.bubbles)
			.field("default_prevented", &self.default_prevented.get())
			.finish()
	}
}
