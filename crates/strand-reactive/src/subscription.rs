//! Subscriber bookkeeping shared by every signal kind.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Callback invoked synchronously whenever a signal changes.
pub type Subscriber = Rc<dyn Fn()>;

struct Entry {
	id: u64,
	callback: Subscriber,
	active: Cell<bool>,
}

/// Ordered list of subscribers owned by a single signal.
///
/// Notification walks a snapshot of the list, so subscribers may subscribe or
/// unsubscribe from inside their own callback. An entry removed during a
/// notification round is not invoked for the remainder of that round.
#[derive(Default)]
pub struct SubscriberList {
	next_id: Cell<u64>,
	entries: RefCell<Vec<Rc<Entry>>>,
}

impl SubscriberList {
	/// Create an empty subscriber list
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a subscriber and return its registration id
	pub fn insert(&self, callback: Subscriber) -> u64 {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.entries.borrow_mut().push(Rc::new(Entry {
			id,
			callback,
			active: Cell::new(true),
		}));
		id
	}

	/// Remove the subscriber registered under `id`
	///
	/// Returns `false` when the id was already removed.
	pub fn remove(&self, id: u64) -> bool {
		let mut entries = self.entries.borrow_mut();
		match entries.iter().position(|entry| entry.id == id) {
			Some(index) => {
				let entry = entries.remove(index);
				entry.active.set(false);
				true
			}
			None => false,
		}
	}

	/// Invoke every subscriber registered at the start of the call, in
	/// registration order
	pub fn notify(&self) {
		let snapshot = self.entries.borrow().clone();
		for entry in snapshot {
			if entry.active.get() {
				(entry.callback)();
			}
		}
	}

	/// Number of live subscribers
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Whether no subscriber is registered
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl fmt::Debug for SubscriberList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriberList")
			.field("len", &self.len())
			.finish()
	}
}

/// Handle to a live subscription
///
/// Calling [`Subscription::unsubscribe`] (or dropping the handle) removes the
/// registration. Teardown runs at most once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Create a subscription that runs `teardown` when released
	pub fn new<F>(teardown: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			teardown: Some(Box::new(teardown)),
		}
	}

	/// A subscription that owns nothing
	pub fn empty() -> Self {
		Self { teardown: None }
	}

	/// Combine several subscriptions into one handle releasing all of them
	pub fn merge(subscriptions: Vec<Subscription>) -> Self {
		Self::new(move || {
			for subscription in subscriptions {
				subscription.unsubscribe();
			}
		})
	}

	/// Release the registration
	pub fn unsubscribe(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(teardown) = self.teardown.take() {
			teardown();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.teardown.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_notify_runs_in_registration_order() {
		let list = SubscriberList::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		for label in ["a", "b", "c"] {
			let log = Rc::clone(&log);
			list.insert(Rc::new(move || log.borrow_mut().push(label)));
		}

		list.notify();

		assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
	}

	#[rstest]
	fn test_removed_during_notify_is_skipped() {
		let list = Rc::new(SubscriberList::new());
		let calls = Rc::new(Cell::new(0));
		let second_id = Rc::new(Cell::new(0));

		let remover = {
			let list = Rc::clone(&list);
			let second_id = Rc::clone(&second_id);
			Rc::new(move || {
				list.remove(second_id.get());
			})
		};
		list.insert(remover);
		let counter = Rc::clone(&calls);
		second_id.set(list.insert(Rc::new(move || counter.set(counter.get() + 1))));

		list.notify();

		assert_eq!(calls.get(), 0);
		assert!(!list.remove(second_id.get()));
		assert_eq!(list.len(), 1);
	}

	#[rstest]
	fn test_subscription_teardown_runs_once() {
		let count = Rc::new(Cell::new(0));
		let counter = Rc::clone(&count);
		let subscription = Subscription::new(move || counter.set(counter.get() + 1));

		subscription.unsubscribe();

		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_subscription_drop_releases() {
		let count = Rc::new(Cell::new(0));
		{
			let counter = Rc::clone(&count);
			let _subscription = Subscription::new(move || counter.set(counter.get() + 1));
		}
		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_merge_releases_all() {
		let count = Rc::new(Cell::new(0));
		let parts = (0..3)
			.map(|_| {
				let counter = Rc::clone(&count);
				Subscription::new(move || counter.set(counter.get() + 1))
			})
			.collect();

		Subscription::merge(parts).unsubscribe();

		assert_eq!(count.get(), 3);
	}
}
