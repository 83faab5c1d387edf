//! Atom - writable signal

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::signal::{Signal, SignalSource};
use crate::subscription::{Subscriber, SubscriberList, Subscription};

/// A writable signal holding a single value
///
/// Every write replaces the value, bumps the version by exactly one and
/// notifies all subscribers synchronously, even when the new value equals the
/// old one. Clones share the same cell.
pub struct Atom<T> {
	inner: Rc<AtomInner<T>>,
}

struct AtomInner<T> {
	value: RefCell<T>,
	version: Cell<u64>,
	subscribers: SubscriberList,
}

impl<T> Clone for Atom<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: 'static> Atom<T> {
	/// Create a new atom with version 0
	///
	/// # Example
	///
	/// ```ignore
	/// let name = Atom::new(String::from("strand"));
	/// assert_eq!(name.version(), 0);
	/// ```
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(AtomInner {
				value: RefCell::new(value),
				version: Cell::new(0),
				subscribers: SubscriberList::new(),
			}),
		}
	}

	/// Borrow the current value without cloning it
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Replace the value and notify subscribers
	///
	/// # Arguments
	///
	/// * `value` - New value for the atom
	pub fn set(&self, value: T) {
		*self.inner.value.borrow_mut() = value;
		self.notify();
	}

	/// Mutate the value in place and notify subscribers once
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
	{
		f(&mut self.inner.value.borrow_mut());
		self.notify();
	}

	/// Bump the version and notify without touching the value
	///
	/// Use this after mutating data reachable through the value by other means.
	pub fn notify(&self) {
		let version = self.inner.version.get().wrapping_add(1);
		self.inner.version.set(version);
		tracing::trace!(version, subscribers = self.inner.subscribers.len(), "atom changed");
		self.inner.subscribers.notify();
	}

	/// Number of live subscribers
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.len()
	}

	/// Whether both handles point at the same atom
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T: 'static> SignalSource for Atom<T> {
	fn version(&self) -> u64 {
		self.inner.version.get()
	}

	fn subscribe(&self, subscriber: Subscriber) -> Subscription {
		let id = self.inner.subscribers.insert(subscriber);
		let inner: Weak<AtomInner<T>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = inner.upgrade() {
				inner.subscribers.remove(id);
			}
		})
	}
}

impl<T: Clone + 'static> Signal<T> for Atom<T> {
	fn value(&self) -> T {
		self.inner.value.borrow().clone()
	}
}

/// Atoms compare by identity, so they can serve as hook dependencies.
impl<T> PartialEq for Atom<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T> Eq for Atom<T> {}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Atom")
			.field("value", &self.inner.value.borrow())
			.field("version", &self.inner.version.get())
			.finish()
	}
}
