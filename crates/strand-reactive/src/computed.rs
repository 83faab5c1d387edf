//! Computed - derived signal over a fixed dependency list

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::signal::{Signal, SignalSource};
use crate::subscription::{Subscriber, Subscription};

/// A signal whose value is derived from other signals
///
/// The version of a computed signal is the sum of its dependency versions,
/// recomputed eagerly on every read of [`SignalSource::version`]. The value
/// itself is produced lazily: `factory` runs at most once per distinct version
/// and the result is cached until a dependency changes.
///
/// Dependencies are fixed at construction; there is no dynamic tracking.
pub struct Computed<T> {
	inner: Rc<ComputedInner<T>>,
}

struct ComputedInner<T> {
	factory: Box<dyn Fn() -> T>,
	dependencies: Vec<Rc<dyn SignalSource>>,
	memoized: RefCell<Option<(u64, T)>>,
}

impl<T> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Clone + 'static> Computed<T> {
	/// Create a computed signal
	///
	/// # Arguments
	///
	/// * `factory` - Produces the value; it should only read `dependencies`
	/// * `dependencies` - Signals whose changes invalidate the cached value
	///
	/// # Example
	///
	/// ```ignore
	/// let a = Atom::new(1);
	/// let b = Atom::new(2);
	/// let (x, y) = (a.clone(), b.clone());
	/// let sum = Computed::new(move || x.value() + y.value(), vec![a.source(), b.source()]);
	/// assert_eq!(sum.value(), 3);
	/// ```
	pub fn new<F>(factory: F, dependencies: Vec<Rc<dyn SignalSource>>) -> Self
	where
		F: Fn() -> T + 'static,
	{
		Self {
			inner: Rc::new(ComputedInner {
				factory: Box::new(factory),
				dependencies,
				memoized: RefCell::new(None),
			}),
		}
	}

	/// Number of dependencies
	pub fn dependency_count(&self) -> usize {
		self.inner.dependencies.len()
	}

	/// Whether both handles point at the same computed signal
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T> SignalSource for Computed<T> {
	fn version(&self) -> u64 {
		self.inner
			.dependencies
			.iter()
			.fold(0u64, |sum, dependency| sum.wrapping_add(dependency.version()))
	}

	fn subscribe(&self, subscriber: Subscriber) -> Subscription {
		let subscriptions = self
			.inner
			.dependencies
			.iter()
			.map(|dependency| dependency.subscribe(Rc::clone(&subscriber)))
			.collect();
		Subscription::merge(subscriptions)
	}
}

impl<T: Clone + 'static> Signal<T> for Computed<T> {
	fn value(&self) -> T {
		let version = self.version();
		if let Some((memoized_version, value)) = &*self.inner.memoized.borrow() {
			if *memoized_version == version {
				return value.clone();
			}
		}

		let value = (self.inner.factory)();
		*self.inner.memoized.borrow_mut() = Some((version, value.clone()));
		value
	}
}

/// Computed signals compare by identity, so they can serve as hook dependencies.
impl<T> PartialEq for Computed<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T> Eq for Computed<T> {}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Computed")
			.field("dependencies", &self.inner.dependencies.len())
			.field("memoized", &self.inner.memoized.borrow())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Atom;
	use rstest::rstest;
	use std::cell::Cell;

	fn counted_sum(a: &Atom<i32>, b: &Atom<i32>, runs: &Rc<Cell<u32>>) -> Computed<i32> {
		let (x, y, runs) = (a.clone(), b.clone(), Rc::clone(runs));
		Computed::new(
			move || {
				runs.set(runs.get() + 1);
				x.value() + y.value()
			},
			vec![a.source(), b.source()],
		)
	}

	#[rstest]
	fn test_version_is_sum_of_dependencies() {
		let a = Atom::new(0);
		let b = Atom::new(0);
		let runs = Rc::new(Cell::new(0));
		let sum = counted_sum(&a, &b, &runs);

		a.set(1);
		a.set(2);
		b.set(5);

		assert_eq!(sum.version(), 3);
	}

	#[rstest]
	fn test_recomputes_once_per_version() {
		let a = Atom::new(1);
		let b = Atom::new(2);
		let runs = Rc::new(Cell::new(0));
		let sum = counted_sum(&a, &b, &runs);

		assert_eq!(sum.value(), 3);
		assert_eq!(sum.value(), 3);
		assert_eq!(runs.get(), 1);

		b.set(10);
		assert_eq!(sum.value(), 11);
		assert_eq!(sum.value(), 11);
		assert_eq!(runs.get(), 2);
	}

	#[rstest]
	fn test_subscribe_fans_out_to_dependencies() {
		let a = Atom::new(1);
		let b = Atom::new(2);
		let runs = Rc::new(Cell::new(0));
		let sum = counted_sum(&a, &b, &runs);
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);

		let subscription = sum.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
		a.set(3);
		b.set(4);
		assert_eq!(calls.get(), 2);
		assert_eq!(a.subscriber_count(), 1);

		subscription.unsubscribe();
		a.set(5);
		assert_eq!(calls.get(), 2);
		assert_eq!(a.subscriber_count(), 0);
		assert_eq!(b.subscriber_count(), 0);
	}

	#[rstest]
	fn test_map_derives_value() {
		let count = Atom::new(3);
		let label = count.map(|n| format!("{n} items"));

		assert_eq!(label.value(), "3 items");
		count.set(4);
		assert_eq!(label.value(), "4 items");
		assert_eq!(label.version(), 1);
	}

	#[rstest]
	fn test_nested_computed_tracks_transitively() {
		let base = Atom::new(2);
		let doubled = base.map(|n| n * 2);
		let quadrupled = doubled.map(|n| n * 2);

		base.set(3);

		assert_eq!(quadrupled.value(), 12);
		assert_eq!(quadrupled.version(), 1);
	}
}
