//! Hook slots stored by component blocks between renders
//!
//! Hooks are identified by their call index. The first render of a component
//! appends one slot per hook call plus a trailing [`Hook::Finalizer`]; later
//! renders must call the same hooks in the same order, otherwise the slot at
//! the drifting index reports [`Error::HookTypeMismatch`].
//!
//! [`Error::HookTypeMismatch`]: crate::error::Error::HookTypeMismatch

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::effect::{CommitPhase, Effect};
use crate::error::HookType;

/// Cleanup returned by an effect callback
pub type Cleanup = Box<dyn FnOnce()>;

/// One positional hook slot
pub enum Hook {
	Effect(Rc<RefCell<EffectHook>>),
	Memo(MemoHook),
	Reducer(Rc<dyn Any>),
	Finalizer,
}

impl Hook {
	pub fn hook_type(&self) -> HookType {
		match self {
			Hook::Effect(_) => HookType::Effect,
			Hook::Memo(_) => HookType::Memo,
			Hook::Reducer(_) => HookType::Reducer,
			Hook::Finalizer => HookType::Finalizer,
		}
	}
}

impl fmt::Debug for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hook::{}", self.hook_type())
	}
}

/// State of an effect hook
#[derive(Default)]
pub struct EffectHook {
	pub(crate) cleanup: Option<Cleanup>,
	pub(crate) dependencies: Option<Box<dyn Any>>,
}

impl EffectHook {
	/// Run the pending cleanup, if any
	pub fn run_cleanup(&mut self) {
		if let Some(cleanup) = self.cleanup.take() {
			cleanup();
		}
	}
}

/// State of a memo hook
pub struct MemoHook {
	pub(crate) value: Rc<dyn Any>,
	pub(crate) dependencies: Box<dyn Any>,
}

/// Whether `next` differs from the stored dependencies
///
/// Missing or differently typed stored dependencies always count as changed.
pub(crate) fn dependencies_changed<D: PartialEq + 'static>(
	stored: Option<&dyn Any>,
	next: &D,
) -> bool {
	match stored.and_then(|stored| stored.downcast_ref::<D>()) {
		Some(stored) => stored != next,
		None => true,
	}
}

/// Passive or layout effect that re-runs an effect hook
///
/// On commit the previous cleanup runs first, then the callback, whose
/// return value becomes the next cleanup.
pub(crate) struct InvokeEffectHook {
	hook: Rc<RefCell<EffectHook>>,
	callback: RefCell<Option<Box<dyn FnOnce() -> Option<Cleanup>>>>,
}

impl InvokeEffectHook {
	pub(crate) fn new(
		hook: Rc<RefCell<EffectHook>>,
		callback: Box<dyn FnOnce() -> Option<Cleanup>>,
	) -> Self {
		Self {
			hook,
			callback: RefCell::new(Some(callback)),
		}
	}
}

impl Effect for InvokeEffectHook {
	fn commit(&self, _phase: CommitPhase) {
		let Some(callback) = self.callback.borrow_mut().take() else {
			return;
		};
		let cleanup = self.hook.borrow_mut().cleanup.take();
		if let Some(cleanup) = cleanup {
			cleanup();
		}
		let cleanup = callback();
		self.hook.borrow_mut().cleanup = cleanup;
	}
}

/// Passive effect running the cleanups of discarded hooks
pub(crate) struct CleanupHooks {
	hooks: RefCell<Vec<Hook>>,
}

impl CleanupHooks {
	pub(crate) fn new(hooks: Vec<Hook>) -> Self {
		Self {
			hooks: RefCell::new(hooks),
		}
	}
}

impl Effect for CleanupHooks {
	fn commit(&self, _phase: CommitPhase) {
		let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
		cleanup_hooks(&hooks);
	}
}

/// Run the cleanup of every effect hook in `hooks`
pub(crate) fn cleanup_hooks(hooks: &[Hook]) {
	for hook in hooks {
		if let Hook::Effect(effect) = hook {
			let cleanup = effect.borrow_mut().cleanup.take();
			if let Some(cleanup) = cleanup {
				cleanup();
			}
		}
	}
}
