//! Task priorities and their inference from events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority of a scheduled task, lowest first
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
	/// Work nobody is waiting on, such as passive effects and deferred values
	Background,
	/// Work whose result is visible but not blocking input
	#[default]
	UserVisible,
	/// Work responding directly to discrete user input
	UserBlocking,
}

/// Events that fire continuously while the user interacts.
const CONTINUOUS_EVENTS: &[&str] = &[
	"drag",
	"dragenter",
	"dragleave",
	"dragover",
	"mouseenter",
	"mouseleave",
	"mousemove",
	"mouseout",
	"mouseover",
	"pointerenter",
	"pointerleave",
	"pointermove",
	"pointerout",
	"pointerover",
	"scroll",
	"touchmove",
	"wheel",
];

impl TaskPriority {
	/// All priorities, highest first
	pub const DESCENDING: [TaskPriority; 3] = [
		TaskPriority::UserBlocking,
		TaskPriority::UserVisible,
		TaskPriority::Background,
	];

	/// Infer the priority of updates triggered while handling `event_type`
	///
	/// Continuous events map to [`TaskPriority::UserVisible`]; every other
	/// event is discrete input and maps to [`TaskPriority::UserBlocking`].
	///
	/// # Example
	///
	/// ```ignore
	/// assert_eq!(TaskPriority::from_event_type("click"), TaskPriority::UserBlocking);
	/// assert_eq!(TaskPriority::from_event_type("scroll"), TaskPriority::UserVisible);
	/// ```
	pub fn from_event_type(event_type: &str) -> Self {
		if is_continuous_event(event_type) {
			TaskPriority::UserVisible
		} else {
			TaskPriority::UserBlocking
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			TaskPriority::Background => "background",
			TaskPriority::UserVisible => "user-visible",
			TaskPriority::UserBlocking => "user-blocking",
		}
	}
}

impl fmt::Display for TaskPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Whether `event_type` fires continuously (pointer moves, scrolling, drags)
pub fn is_continuous_event(event_type: &str) -> bool {
	CONTINUOUS_EVENTS.contains(&event_type)
}
