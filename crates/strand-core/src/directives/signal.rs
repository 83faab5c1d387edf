//! Signals as template values
//!
//! `Value::from(atom)` (or a computed signal) produces a [`SignalDirective`].
//! Its binding wraps the binding that the signal's current value would get on
//! the same part and keeps it in sync: every notification re-binds the inner
//! binding with the new value and schedules an update, without re-rendering
//! any block.

use std::cell::RefCell;
use std::rc::Rc;

use strand_dom::Node;
use strand_reactive::{Atom, Computed, Signal, SignalSource, Subscription};

use crate::binding::{Binding, resolve_binding};
use crate::directive::{AsAny, Directive, ensure_directive};
use crate::error::Result;
use crate::part::Part;
use crate::updater::UpdateContext;
use crate::value::Value;

/// A signal whose value can be placed into a part
pub trait ValueSignal: SignalSource + AsAny {
	fn current_value(&self) -> Value;

	/// Whether `other` is this very signal
	fn is_same_signal(&self, other: &dyn ValueSignal) -> bool;
}

impl<T> ValueSignal for Atom<T>
where
	T: Clone + Into<Value> + 'static,
{
	fn current_value(&self) -> Value {
		self.value().into()
	}

	fn is_same_signal(&self, other: &dyn ValueSignal) -> bool {
		other
			.as_any()
			.downcast_ref::<Atom<T>>()
			.is_some_and(|other| other.ptr_eq(self))
	}
}

impl<T> ValueSignal for Computed<T>
where
	T: Clone + Into<Value> + 'static,
{
	fn current_value(&self) -> Value {
		self.value().into()
	}

	fn is_same_signal(&self, other: &dyn ValueSignal) -> bool {
		other
			.as_any()
			.downcast_ref::<Computed<T>>()
			.is_some_and(|other| other.ptr_eq(self))
	}
}

pub struct SignalDirective {
	signal: Rc<dyn ValueSignal>,
}

impl SignalDirective {
	pub fn new<S: ValueSignal>(signal: S) -> Self {
		Self {
			signal: Rc::new(signal),
		}
	}

	pub fn signal(&self) -> &Rc<dyn ValueSignal> {
		&self.signal
	}
}

impl<T> From<Atom<T>> for Value
where
	T: Clone + Into<Value> + 'static,
{
	fn from(atom: Atom<T>) -> Self {
		Value::directive(SignalDirective::new(atom))
	}
}

impl<T> From<&Atom<T>> for Value
where
	T: Clone + Into<Value> + 'static,
{
	fn from(atom: &Atom<T>) -> Self {
		Value::directive(SignalDirective::new(atom.clone()))
	}
}

impl<T> From<Computed<T>> for Value
where
	T: Clone + Into<Value> + 'static,
{
	fn from(computed: Computed<T>) -> Self {
		Value::directive(SignalDirective::new(computed))
	}
}

impl Directive for SignalDirective {
	fn name(&self) -> &'static str {
		"Signal"
	}

	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>> {
		let inner = resolve_binding(self.signal.current_value(), part.clone(), context)?;
		Ok(Box::new(SignalBinding {
			directive: self,
			part,
			inner: Rc::new(RefCell::new(inner)),
			subscription: None,
		}))
	}
}

/// Binding that follows a signal
pub struct SignalBinding {
	directive: Rc<SignalDirective>,
	part: Part,
	inner: Rc<RefCell<Box<dyn Binding>>>,
	subscription: Option<Subscription>,
}

impl SignalBinding {
	pub fn is_subscribed(&self) -> bool {
		self.subscription.is_some()
	}

	fn subscribe(&mut self, context: &UpdateContext) {
		if self.subscription.is_some() {
			return;
		}
		let inner = Rc::downgrade(&self.inner);
		let signal = Rc::downgrade(&self.directive.signal);
		let context = context.detached();
		let subscription = self.directive.signal.subscribe(Rc::new(move || {
			let (Some(inner), Some(signal)) = (inner.upgrade(), signal.upgrade()) else {
				return;
			};
			let Ok(mut inner) = inner.try_borrow_mut() else {
				tracing::warn!("signal notified while its binding was busy, dropping notification");
				return;
			};
			if let Err(error) = inner.bind(signal.current_value(), &context) {
				tracing::error!(%error, "failed to bind signal value");
				return;
			}
			context.schedule_update();
		}));
		self.subscription = Some(subscription);
	}

	fn unsubscribe(&mut self) {
		if let Some(subscription) = self.subscription.take() {
			subscription.unsubscribe();
		}
	}
}

impl Binding for SignalBinding {
	fn value(&self) -> Value {
		Value::Directive(Rc::clone(&self.directive) as Rc<dyn Directive>)
	}

	fn part(&self) -> Part {
		self.part.clone()
	}

	fn start_node(&self) -> Node {
		self.inner.borrow().start_node()
	}

	fn end_node(&self) -> Node {
		self.inner.borrow().end_node()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		self.inner.borrow_mut().connect(context)?;
		self.subscribe(context);
		Ok(())
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let directive = ensure_directive::<SignalDirective>(&value, &self.part)?;
		if !directive.signal.is_same_signal(&*self.directive.signal) {
			self.unsubscribe();
		}
		self.directive = directive;
		self.inner
			.borrow_mut()
			.bind(self.directive.signal.current_value(), context)?;
		self.subscribe(context);
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		self.unsubscribe();
		self.inner.borrow_mut().unbind(context);
	}

	fn disconnect(&mut self) {
		self.unsubscribe();
		self.inner.borrow_mut().disconnect();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestHarness;
	use rstest::rstest;

	fn attribute_binding(harness: &TestHarness, node: &Node, value: Value) -> Box<dyn Binding> {
		let context = harness.context();
		let mut binding = resolve_binding(value, Part::attribute(node, "title"), &context).unwrap();
		binding.connect(&context).unwrap();
		harness.flush().unwrap();
		binding
	}

	#[rstest]
	fn test_follows_atom() {
		let harness = TestHarness::new();
		let node = Node::element("p");
		let atom = Atom::new(String::from("first"));
		let _binding = attribute_binding(&harness, &node, Value::from(&atom));
		assert_eq!(node.get_attribute("title").as_deref(), Some("first"));

		atom.set(String::from("second"));
		harness.flush().unwrap();

		assert_eq!(node.get_attribute("title").as_deref(), Some("second"));
	}

	#[rstest]
	fn test_follows_computed() {
		let harness = TestHarness::new();
		let node = Node::element("p");
		let count = Atom::new(1);
		let label = count.map(|count| format!("{count} items"));
		let _binding = attribute_binding(&harness, &node, Value::from(label));

		count.set(3);
		harness.flush().unwrap();

		assert_eq!(node.get_attribute("title").as_deref(), Some("3 items"));
	}

	#[rstest]
	fn test_unbind_releases_subscription() {
		let harness = TestHarness::new();
		let node = Node::element("p");
		let atom = Atom::new("a");
		let mut binding = attribute_binding(&harness, &node, Value::from(&atom));
		assert_eq!(atom.subscriber_count(), 1);

		binding.unbind(&harness.context());
		harness.flush().unwrap();

		assert_eq!(atom.subscriber_count(), 0);
		assert!(!node.has_attribute("title"));
	}

	#[rstest]
	fn test_switching_signals_moves_subscription() {
		let harness = TestHarness::new();
		let node = Node::element("p");
		let first = Atom::new("first");
		let second = Atom::new("second");
		let mut binding = attribute_binding(&harness, &node, Value::from(&first));

		binding.bind(Value::from(&second), &harness.context()).unwrap();
		harness.flush().unwrap();

		assert_eq!(first.subscriber_count(), 0);
		assert_eq!(second.subscriber_count(), 1);
		assert_eq!(node.get_attribute("title").as_deref(), Some("second"));
	}

	#[rstest]
	fn test_rebinding_same_signal_keeps_subscription() {
		let harness = TestHarness::new();
		let node = Node::element("p");
		let atom = Atom::new("a");
		let mut binding = attribute_binding(&harness, &node, Value::from(&atom));

		binding.bind(Value::from(&atom), &harness.context()).unwrap();

		assert_eq!(atom.subscriber_count(), 1);
	}
}
