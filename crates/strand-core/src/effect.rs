//! Effects committed by the updater after rendering.

use std::fmt;

/// Phase in which an effect is committed
///
/// Within one flush all mutation effects run before layout effects, and
/// layout effects before passive effects. Effects of the same phase run in
/// the order they were enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitPhase {
	/// Writes to the node tree
	Mutation,
	/// Reads/writes that must observe the committed tree before paint
	Layout,
	/// Everything else, such as subscriptions and logging
	Passive,
}

impl fmt::Display for CommitPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			CommitPhase::Mutation => "mutation",
			CommitPhase::Layout => "layout",
			CommitPhase::Passive => "passive",
		})
	}
}

/// Deferred work enqueued during rendering and executed by the updater
pub trait Effect {
	fn commit(&self, phase: CommitPhase);
}

/// Adapts a closure into an [`Effect`].
pub struct FnEffect<F>(pub F);

impl<F> Effect for FnEffect<F>
where
	F: Fn(CommitPhase),
{
	fn commit(&self, phase: CommitPhase) {
		(self.0)(phase)
	}
}
