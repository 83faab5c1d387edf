//! Blocks: the schedulable units of re-rendering
//!
//! A block owns a subtree of rendered content (a template result or a
//! component) and moves through these states:
//!
//! ```text
//!           request_update             perform_update        commit
//!  Idle ─────────────────────▶ Dirty ───────────────▶ Committing ─────▶ Idle
//!   ▲                            │
//!   └──────── cancel_update ─────┘
//! ```
//!
//! Blocks form a tree through weak parent references. A dirty block is only
//! rendered when none of its ancestors is dirty, because re-rendering the
//! ancestor will re-bind (and therefore re-render) it anyway.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::priority::TaskPriority;
use crate::updater::UpdateContext;

/// A unit of work the updater can render on its own
pub trait Block {
	fn parent(&self) -> Option<Rc<dyn Block>>;

	fn priority(&self) -> TaskPriority;

	fn is_connected(&self) -> bool;

	/// Whether an update was requested and has not been performed yet
	fn is_updating(&self) -> bool;

	/// Whether the updater should render this block now
	///
	/// True iff this block is dirty and no ancestor is.
	fn should_update(&self) -> bool {
		if !self.is_updating() {
			return false;
		}
		let mut current = self.parent();
		while let Some(block) = current {
			if block.is_updating() {
				return false;
			}
			current = block.parent();
		}
		true
	}

	/// Drop a pending update without rendering
	fn cancel_update(&self);

	/// Mark the block dirty at `priority` and enqueue it
	///
	/// Does nothing for a disconnected block, or when the block is already
	/// dirty at an equal or higher priority.
	fn request_update(&self, priority: TaskPriority, context: &UpdateContext);

	/// Re-render the block
	fn perform_update(&self, context: &UpdateContext) -> Result<()>;
}

/// Observable state of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
	Idle,
	Dirty,
	Committing,
}

#[derive(Debug, Clone, Copy, Default)]
struct BlockFlags {
	connected: bool,
	updating: bool,
	mutating: bool,
}

/// Flags, priority and parent link shared by the block implementations
pub struct BlockState {
	parent: Option<Weak<dyn Block>>,
	flags: Cell<BlockFlags>,
	priority: Cell<TaskPriority>,
}

impl BlockState {
	pub fn new(parent: Option<&Rc<dyn Block>>) -> Self {
		Self {
			parent: parent.map(Rc::downgrade),
			flags: Cell::new(BlockFlags::default()),
			priority: Cell::new(TaskPriority::default()),
		}
	}

	pub fn parent(&self) -> Option<Rc<dyn Block>> {
		self.parent.as_ref().and_then(Weak::upgrade)
	}

	pub fn priority(&self) -> TaskPriority {
		self.priority.get()
	}

	pub fn is_connected(&self) -> bool {
		self.flags.get().connected
	}

	pub fn is_updating(&self) -> bool {
		self.flags.get().updating
	}

	pub fn is_mutating(&self) -> bool {
		self.flags.get().mutating
	}

	pub fn status(&self) -> BlockStatus {
		let flags = self.flags.get();
		if flags.mutating {
			BlockStatus::Committing
		} else if flags.updating {
			BlockStatus::Dirty
		} else {
			BlockStatus::Idle
		}
	}

	fn modify(&self, f: impl FnOnce(&mut BlockFlags)) {
		let mut flags = self.flags.get();
		f(&mut flags);
		self.flags.set(flags);
	}

	pub fn set_connected(&self, connected: bool) {
		self.modify(|flags| flags.connected = connected);
	}

	pub fn set_mutating(&self, mutating: bool) {
		self.modify(|flags| flags.mutating = mutating);
	}

	pub fn finish_update(&self) {
		self.modify(|flags| flags.updating = false);
	}

	/// Clear every flag
	pub fn reset(&self) {
		self.flags.set(BlockFlags::default());
	}

	/// Mark dirty for an explicit update request
	///
	/// Returns whether the block has to be enqueued: it must be connected, and
	/// either idle or dirty at a lower priority.
	pub fn mark_requested(&self, priority: TaskPriority) -> bool {
		let flags = self.flags.get();
		if !flags.connected {
			return false;
		}
		if flags.updating && priority <= self.priority.get() {
			return false;
		}
		self.modify(|flags| flags.updating = true);
		self.priority.set(priority);
		true
	}

	/// Mark dirty because the block was (re)bound by its parent
	///
	/// Inherits the parent's priority. Returns whether the block has to be
	/// enqueued.
	pub fn mark_forced(&self) -> bool {
		if self.is_updating() {
			return false;
		}
		if let Some(parent) = self.parent() {
			self.priority.set(parent.priority());
		}
		self.modify(|flags| flags.updating = true);
		true
	}
}

impl fmt::Debug for BlockState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockState")
			.field("flags", &self.flags.get())
			.field("priority", &self.priority.get())
			.field("has_parent", &self.parent.is_some())
			.finish()
	}
}
