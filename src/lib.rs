//! # Strand
//!
//! A fine-grained reactive rendering engine. Templates expose holes, each hole
//! is reconciled by a binding, and components re-render through hooks and
//! signals scheduled by an updater.
//!
//! ## Feature Flags
//!
//! - `minimal` - Reactive primitives only (atoms, computed signals)
//! - `dom` - The host node tree used as the render target
//! - `core` - Bindings, directives, hooks, blocks and updaters (implies `dom`)
//! - `full` (default) - Everything
//!
//! ## Quick Start
//!
//! ```ignore
//! use strand::prelude::*;
//!
//! fn counter(initial: &i32, ctx: &mut RenderContext) -> Result<TemplateResult> {
//!     let (count, set_count) = ctx.use_state(*initial)?;
//!     ctx.use_effect_with(
//!         move || {
//!             set_count.set(10);
//!             None::<fn()>
//!         },
//!         (),
//!     )?;
//!     Ok(ctx.text(count.to_string()))
//! }
//!
//! let runtime = Runtime::default();
//! let container = Node::element("div");
//! let _root = runtime.mount(component(counter, 0), &container)?;
//! runtime.run_until_idle()?;
//! ```

pub use strand_reactive as reactive;
pub use strand_reactive::{Atom, Computed, Signal, SignalSource, Subscription};

#[cfg(feature = "dom")]
pub use strand_dom as dom;

#[cfg(feature = "core")]
pub use strand_core as engine;

/// Commonly used types, re-exported for glob import
pub mod prelude {
	pub use strand_reactive::{Atom, Computed, Signal, SignalSource};

	#[cfg(feature = "dom")]
	pub use strand_dom::{Event, Node};

	#[cfg(feature = "core")]
	pub use strand_core::{
		Binding, Block, Component, ContextKey, Dispatch, Error, Part, RenderContext, RenderHost,
		Result, Root, Runtime, RuntimeConfig, SetState, TaskPriority, TemplateResult, Updater,
		Value, child_node, component, condition, dynamic, element, mount, text, unless,
		unsafe_html, when,
	};
}
