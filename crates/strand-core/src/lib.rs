//! Strand Core - bindings, hooks, blocks and updaters
//!
//! The engine maps dynamic values onto a node tree with the smallest possible
//! set of writes. A rendered template is a static node structure plus one
//! [`Binding`](binding::Binding) per hole; re-rendering feeds new values to
//! the existing bindings, which commit only what changed.
//!
//! ## Architecture
//!
//! - [`part`]: typed locations in the node tree (attribute, child node, ...)
//! - [`value`]: values that can be placed into a part
//! - [`binding`]: per-part reconciliation and the `resolve_binding` dispatch
//! - [`directive`]: values that build their own bindings
//! - [`directives`]: the built-in directives (signals, conditions, raw HTML)
//! - [`template`]: templates, fragments and the template-result block
//! - [`component`]: component functions with hooks
//! - [`context`]: the hook API (`use_state`, `use_effect`, ...)
//! - [`block`]: the schedulable unit and its update state machine
//! - [`updater`]: sync and concurrent pipelines that render and commit
//! - [`scheduler`]: the host task queue abstraction
//! - [`host`]: scoped values, template lookup and mounting
//! - [`config`] / [`runtime`]: configuration and a ready-made wiring
//!
//! ## Update cycle
//!
//! ```text
//! request_update ─▶ enqueue block ─▶ perform_update (render) ─▶ bindings bind
//!        ▲                                                         │
//!        │                          mutation ─▶ layout ─▶ passive ◀┘
//!        └──────────── hooks / signals / events ◀───────── effects
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use strand_core::{Result, RenderContext, Runtime, TemplateResult, component};
//! use strand_dom::Node;
//!
//! fn counter(_props: &(), ctx: &mut RenderContext) -> Result<TemplateResult> {
//!     let (count, set_count) = ctx.use_state(0)?;
//!     ctx.use_effect_with(move || {
//!         if count < 3 {
//!             set_count.set(count + 1);
//!         }
//!         None::<fn()>
//!     }, count)?;
//!     Ok(ctx.text(count))
//! }
//!
//! let runtime = Runtime::default();
//! let container = Node::element("main");
//! runtime.mount(component(counter, ()), &container)?;
//! runtime.run_until_idle()?;
//! assert_eq!(container.to_html(), "<main>3<!----></main>");
//! ```

pub mod binding;
pub mod block;
pub mod component;
pub mod config;
pub mod context;
pub mod directive;
pub mod directives;
pub mod effect;
pub mod error;
pub mod hook;
pub mod host;
pub mod part;
pub mod priority;
pub mod runtime;
pub mod scheduler;
pub mod template;
pub mod updater;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{Binding, resolve_binding};
pub use block::{Block, BlockState};
pub use component::{Component, ComponentFn, component};
pub use config::{RuntimeConfig, UpdaterKind};
pub use context::{ContextKey, Dispatch, RenderContext, SetState, Usable, usable_fn};
pub use directive::{Directive, ensure_directive, ensure_non_directive};
pub use directives::{condition, dynamic, unless, unsafe_html, when};
pub use effect::{CommitPhase, Effect};
pub use error::{Error, HookType, Result};
pub use host::{RenderHost, Root, TemplateParser, UpdateHost, mount};
pub use part::{Part, PartType};
pub use priority::TaskPriority;
pub use runtime::Runtime;
pub use scheduler::{LocalScheduler, Scheduler};
pub use template::value::{child_node, element, text};
pub use template::{Template, TemplateFragment, TemplateResult};
pub use updater::{ConcurrentUpdater, SyncUpdater, UpdateContext, Updater};
pub use value::{EventListener, SpreadProps, Value};
