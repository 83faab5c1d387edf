//! Built-in directives
//!
//! | Directive        | Constructor                         | Parts            |
//! |------------------|-------------------------------------|------------------|
//! | [`SignalDirective`] | `Value::from(atom)` / `Value::from(computed)` | any |
//! | [`Condition`]    | [`condition`], [`when`], [`unless`] | any              |
//! | [`NoValue`]      | `Value::directive(NoValue)`         | any              |
//! | [`Dynamic`]      | [`dynamic`]                         | any              |
//! | [`UnsafeHtml`]   | [`unsafe_html`]                     | child node       |
//!
//! [`TemplateResult`](crate::template::TemplateResult) and
//! [`Component`](crate::component::Component) are directives as well; they
//! live next to the blocks that drive them.

mod condition;
mod dynamic;
mod no_value;
mod signal;
mod unsafe_html;

pub use condition::{Condition, ConditionBinding, condition, unless, when};
pub use dynamic::{Dynamic, DynamicBinding, dynamic};
pub use no_value::{NoValue, NoValueBinding};
pub use signal::{SignalBinding, SignalDirective, ValueSignal};
pub use unsafe_html::{UnsafeHtml, UnsafeHtmlBinding, unsafe_html};
