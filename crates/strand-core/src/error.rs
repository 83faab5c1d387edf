//! Error types for the rendering engine.

use std::fmt;

/// Kind of a hook slot, used to report positional drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
	/// `use_effect` / `use_layout_effect` and friends.
	Effect,
	/// `use_memo`, `use_ref`, `use_callback`.
	Memo,
	/// `use_reducer` and `use_state`.
	Reducer,
	/// Marker appended after the last hook of the first render.
	Finalizer,
}

impl fmt::Display for HookType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			HookType::Effect => "effect",
			HookType::Memo => "memo",
			HookType::Reducer => "reducer",
			HookType::Finalizer => "finalizer",
		})
	}
}

/// Errors produced while resolving bindings, rendering and flushing updates
///
/// Contract violations (wrong value for a part, a directive in the wrong
/// place, hooks called in a different order) are reported eagerly with the
/// location of the offending part.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A binding received a value it cannot commit
	#[error("{binding} expects {expected}, but got {found}.\n{location}")]
	InvalidValue {
		/// Binding that rejected the value
		binding: &'static str,
		/// Description of accepted values
		expected: &'static str,
		/// Description of the received value
		found: String,
		/// Marked location of the part
		location: String,
	},

	/// A directive was placed into a part kind it does not support
	#[error("{directive} must be used in {expected}, but it is used here:\n{location}")]
	InvalidPart {
		/// Directive name
		directive: &'static str,
		/// Supported part kind(s)
		expected: &'static str,
		/// Marked location of the part
		location: String,
	},

	/// A binding created for one directive type received a different value
	#[error(
		"a value must be an instance of {expected}, but got {found}. Consider using condition() or dynamic() to switch between kinds.\n{location}"
	)]
	UnexpectedDirective {
		/// Expected directive type
		expected: &'static str,
		/// Description of the received value
		found: String,
		/// Marked location of the part
		location: String,
	},

	/// A primitive binding received a directive
	#[error(
		"a value must not be a directive, but got {found}. Consider using condition() or dynamic() to switch between kinds.\n{location}"
	)]
	DirectiveNotAllowed {
		/// Description of the received value
		found: String,
		/// Marked location of the part
		location: String,
	},

	/// Hooks were called in a different order than in the first render
	#[error("unexpected hook at index {index}: expected {expected}, but got {found}. Hooks must be called in the same order on every render")]
	HookTypeMismatch {
		/// Position of the drifting hook
		index: usize,
		/// Hook kind requested by this render
		expected: HookType,
		/// Hook kind stored from the first render
		found: HookType,
	},

	/// A hook slot holds a value of a different type than requested
	#[error("hook at index {index} does not hold a value of type {expected}")]
	HookValueMismatch {
		/// Position of the hook
		index: usize,
		/// Requested type
		expected: &'static str,
	},

	/// `html`/`svg` was used without a template parser on the host
	#[error("no template parser is installed on the render host")]
	MissingTemplateParser,

	/// The template parser rejected a template
	#[error("failed to parse template: {0}")]
	TemplateParse(String),

	/// Runtime configuration could not be read
	#[error("invalid runtime configuration: {0}")]
	Config(#[from] toml::de::Error),

	/// A configuration file could not be read
	#[error("failed to read {path}: {source}")]
	ConfigFile {
		/// Path of the file
		path: std::path::PathBuf,
		/// Underlying I/O error
		source: std::io::Error,
	},
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
	let full = std::any::type_name::<T>();
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}
