use std::cell::RefCell;
use std::rc::{Rc, Weak};

use strand_dom::{Event, EventHandler, Node};

use super::{Binding, CommitState, request_commit};
use crate::effect::{CommitPhase, Effect};
use crate::error::{Error, Result};
use crate::part::{Part, report_part};
use crate::priority::TaskPriority;
use crate::updater::{UpdateContext, Updater};
use crate::value::{EventListener, Value};

/// Binds an [`EventListener`] (or `Null`) to an event part
///
/// The node only ever sees one handler per binding: an internal dispatcher
/// that forwards to the current listener. Switching between two
/// function-style listeners therefore leaves the node untouched; the
/// registration is only replaced when an object-style listener (whose options
/// matter) or `Null` is involved.
///
/// While the listener runs, the updater's priority context is set from the
/// event type (see [`TaskPriority::from_event_type`]), so state updates
/// dispatched by the listener inherit it.
pub struct EventBinding {
	state: Rc<RefCell<EventState>>,
}

struct EventState {
	part: Part,
	pending: Option<EventListener>,
	memoized: Option<EventListener>,
	handler: Rc<dyn EventHandler>,
	updater: Option<Rc<dyn Updater>>,
	dirty: bool,
}

struct EventDispatcher {
	state: Weak<RefCell<EventState>>,
}

impl EventHandler for EventDispatcher {
	fn handle_event(&self, event: &Event) {
		let Some(state) = self.state.upgrade() else {
			return;
		};
		let (listener, updater) = {
			let state = state.borrow();
			(state.memoized.clone(), state.updater.clone())
		};
		let Some(listener) = listener else {
			return;
		};
		let priority = TaskPriority::from_event_type(event.event_type());
		match updater {
			Some(updater) => updater.run_with_priority(priority, &mut || listener.invoke(event)),
			None => listener.invoke(event),
		}
	}
}

fn ensure_listener(value: &Value, part: &Part) -> Result<Option<EventListener>> {
	match value {
		Value::Listener(listener) => Ok(Some(listener.clone())),
		Value::Null => Ok(None),
		other => Err(Error::InvalidValue {
			binding: "EventBinding",
			expected: "an event listener or null",
			found: other.describe(),
			location: report_part(part),
		}),
	}
}

fn same_listener(a: &Option<EventListener>, b: &Option<EventListener>) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => a.is_same(b),
		(None, None) => true,
		_ => false,
	}
}

impl EventBinding {
	pub fn new(value: Value, part: Part) -> Result<Self> {
		let listener = ensure_listener(&value, &part)?;
		let state = Rc::new_cyclic(|weak: &Weak<RefCell<EventState>>| {
			RefCell::new(EventState {
				part,
				pending: listener,
				memoized: None,
				handler: Rc::new(EventDispatcher {
					state: weak.clone(),
				}),
				updater: None,
				dirty: false,
			})
		});
		Ok(Self { state })
	}
}

impl Binding for EventBinding {
	fn value(&self) -> Value {
		self.state
			.borrow()
			.pending
			.clone()
			.map_or(Value::Null, Value::Listener)
	}

	fn part(&self) -> Part {
		self.state.borrow().part.clone()
	}

	fn start_node(&self) -> Node {
		self.state.borrow().part.target().clone()
	}

	fn connect(&mut self, context: &UpdateContext) -> Result<()> {
		self.state.borrow_mut().updater = Some(Rc::clone(context.updater()));
		request_commit(&self.state, context);
		Ok(())
	}

	fn bind(&mut self, value: Value, context: &UpdateContext) -> Result<()> {
		let changed = {
			let mut state = self.state.borrow_mut();
			let listener = ensure_listener(&value, &state.part)?;
			state.updater = Some(Rc::clone(context.updater()));
			let changed = !same_listener(&listener, &state.memoized);
			state.pending = listener;
			changed
		};
		if changed {
			request_commit(&self.state, context);
		}
		Ok(())
	}

	fn unbind(&mut self, context: &UpdateContext) {
		let registered = {
			let mut state = self.state.borrow_mut();
			state.pending = None;
			state.memoized.is_some()
		};
		if registered {
			request_commit(&self.state, context);
		}
	}

	fn disconnect(&mut self) {
		let mut state = self.state.borrow_mut();
		state.pending = None;
		if let Some(listener) = state.memoized.take() {
			if let Part::Event { node, name } = &state.part {
				node.remove_event_listener(name, &state.handler, listener.options());
			}
		}
	}
}

impl CommitState for EventState {
	fn dirty(&mut self) -> &mut bool {
		&mut self.dirty
	}
}

impl Effect for RefCell<EventState> {
	fn commit(&self, _phase: CommitPhase) {
		let mut state = self.borrow_mut();
		state.dirty = false;
		let old = state.memoized.take();
		let new = state.pending.clone();
		let both_functions = old.as_ref().is_some_and(EventListener::is_function)
			&& new.as_ref().is_some_and(EventListener::is_function);

		if !both_functions {
			if let Part::Event { node, name } = &state.part {
				if let Some(old) = &old {
					node.remove_event_listener(name, &state.handler, old.options());
				}
				if let Some(new) = &new {
					node.add_event_listener(name, Rc::clone(&state.handler), new.options());
				}
			}
		}

		state.memoized = new;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestHarness;
	use rstest::rstest;
	use std::cell::Cell;
	use strand_dom::ListenerOptions;

	fn counting_listener(calls: &Rc<Cell<u32>>) -> EventListener {
		let calls = Rc::clone(calls);
		EventListener::new(move |_| calls.set(calls.get() + 1))
	}

	#[rstest]
	fn test_dispatches_to_current_listener() {
		let harness = TestHarness::new();
		let button = Node::element("button");
		let first_calls = Rc::new(Cell::new(0));
		let second_calls = Rc::new(Cell::new(0));
		let mut binding = EventBinding::new(
			Value::from(counting_listener(&first_calls)),
			Part::event(&button, "click"),
		)
		.unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		button.dispatch_event(&Event::new("click"));
		binding
			.bind(Value::from(counting_listener(&second_calls)), &harness.context())
			.unwrap();
		harness.flush().unwrap();
		button.dispatch_event(&Event::new("click"));

		assert_eq!(first_calls.get(), 1);
		assert_eq!(second_calls.get(), 1);
		assert_eq!(button.listener_count("click"), 1);
	}

	#[rstest]
	fn test_object_listener_reregisters_with_options() {
		let harness = TestHarness::new();
		let outer = Node::element("div");
		let inner = Node::element("span");
		outer.append_child(&inner);
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let mut binding = EventBinding::new(
			Value::from(EventListener::new(|_| {})),
			Part::event(&outer, "click"),
		)
		.unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		let capture = EventListener::with_options(
			move |event: &Event| {
				if event.current_target().is_some() {
					counter.set(counter.get() + 1);
				}
			},
			ListenerOptions::new().capture(true),
		);
		binding.bind(Value::from(capture), &harness.context()).unwrap();
		harness.flush().unwrap();
		inner.dispatch_event(&Event::new("click"));

		assert_eq!(calls.get(), 1);
		assert_eq!(outer.listener_count("click"), 1);
	}

	#[rstest]
	fn test_unbind_and_disconnect_remove_listener() {
		let harness = TestHarness::new();
		let button = Node::element("button");
		let calls = Rc::new(Cell::new(0));
		let mut binding = EventBinding::new(
			Value::from(counting_listener(&calls)),
			Part::event(&button, "click"),
		)
		.unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		binding.unbind(&harness.context());
		harness.flush().unwrap();
		assert_eq!(button.listener_count("click"), 0);

		binding
			.bind(Value::from(counting_listener(&calls)), &harness.context())
			.unwrap();
		harness.flush().unwrap();
		assert_eq!(button.listener_count("click"), 1);

		binding.disconnect();
		assert_eq!(button.listener_count("click"), 0);
	}

	#[rstest]
	fn test_listener_runs_with_event_priority() {
		let harness = TestHarness::new();
		let area = Node::element("div");
		let seen = Rc::new(RefCell::new(Vec::new()));
		let updater = Rc::clone(harness.context().updater());
		let log = Rc::clone(&seen);
		let listener = EventListener::new(move |_| log.borrow_mut().push(updater.get_current_priority()));
		let mut binding = EventBinding::new(Value::from(listener.clone()), Part::event(&area, "click")).unwrap();
		binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();
		let mut scroll_binding =
			EventBinding::new(Value::from(listener), Part::event(&area, "scroll")).unwrap();
		scroll_binding.connect(&harness.context()).unwrap();
		harness.flush().unwrap();

		area.dispatch_event(&Event::new("click"));
		area.dispatch_event(&Event::new("scroll"));

		assert_eq!(
			*seen.borrow(),
			vec![TaskPriority::UserBlocking, TaskPriority::UserVisible]
		);
	}

	#[rstest]
	fn test_rejects_non_listener() {
		let button = Node::element("button");

		let error = EventBinding::new(Value::from("nope"), Part::event(&button, "click"))
			.err()
			.unwrap();

		assert!(matches!(error, Error::InvalidValue { .. }));
	}
}
