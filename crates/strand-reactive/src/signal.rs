//! Signal traits shared by atoms and computed values.

use std::rc::Rc;

use crate::computed::Computed;
use crate::subscription::{Subscriber, Subscription};

/// Type-erased view of a signal: a version counter plus change notification
///
/// This is what a [`Computed`] depends on, so dependencies of different value
/// types can be mixed in one list.
pub trait SignalSource {
	/// Current version. Grows every time the signal (or one of its
	/// dependencies) changes.
	fn version(&self) -> u64;

	/// Register `subscriber` to be called synchronously on every change
	fn subscribe(&self, subscriber: Subscriber) -> Subscription;
}

impl<S: SignalSource + ?Sized> SignalSource for Rc<S> {
	fn version(&self) -> u64 {
		(**self).version()
	}

	fn subscribe(&self, subscriber: Subscriber) -> Subscription {
		(**self).subscribe(subscriber)
	}
}

/// A readable signal producing values of type `T`
pub trait Signal<T>: SignalSource {
	/// Read the current value
	fn value(&self) -> T;

	/// Erase this signal into a dependency handle for [`Computed::new`]
	fn source(&self) -> Rc<dyn SignalSource>
	where
		Self: Clone + Sized + 'static,
	{
		Rc::new(self.clone())
	}

	/// Derive a computed signal by applying `selector` to this signal's value
	///
	/// # Example
	///
	/// ```ignore
	/// let count = Atom::new(3);
	/// let label = count.map(|n| format!("{n} items"));
	/// assert_eq!(label.value(), "3 items");
	/// ```
	fn map<U, F>(&self, selector: F) -> Computed<U>
	where
		Self: Clone + Sized + 'static,
		T: 'static,
		U: Clone + 'static,
		F: Fn(T) -> U + 'static,
	{
		let signal = self.clone();
		Computed::new(move || selector(signal.value()), vec![self.source()])
	}
}
