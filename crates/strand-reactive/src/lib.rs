//! Reactive primitives for strand
//!
//! This crate provides the signal layer the rendering engine builds on. Unlike a
//! dependency-tracking runtime, signals here never record readers implicitly:
//! every observer subscribes explicitly and receives a [`Subscription`] handle
//! that tears the registration down again.
//!
//! ## Signals
//!
//! - [`Atom`]: a writable cell with a monotonically increasing version.
//! - [`Computed`]: a derived value over a fixed list of dependencies. Its
//!   version is the sum of the dependency versions and its value is recomputed
//!   lazily, at most once per distinct version.
//!
//! ## Example
//!
//! ```ignore
//! use strand_reactive::{Atom, Signal, SignalSource};
//!
//! let count = Atom::new(1);
//! let doubled = count.map(|n| n * 2);
//!
//! let subscription = doubled.subscribe(std::rc::Rc::new(|| println!("changed")));
//! count.set(2);
//! assert_eq!(doubled.value(), 4);
//!
//! subscription.unsubscribe();
//! ```

mod atom;
mod computed;
mod signal;
mod subscription;

pub use atom::Atom;
pub use computed::Computed;
pub use signal::{Signal, SignalSource};
pub use subscription::{Subscriber, SubscriberList, Subscription};
