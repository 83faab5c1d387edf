//! Runtime configuration
//!
//! Settings are read from TOML; every field is optional.
//!
//! ```toml
//! updater = "concurrent"   # or "sync"
//! frame-budget-ms = 5
//! default-priority = "user-visible"
//! ```

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::UpdateHost;
use crate::priority::TaskPriority;
use crate::scheduler::{DEFAULT_FRAME_BUDGET, Scheduler};
use crate::updater::{ConcurrentUpdater, SyncUpdater, Updater};

/// Which updater drives the render tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdaterKind {
	/// Drain everything in a single microtask
	Sync,
	/// Per-priority lanes with cooperative yielding
	#[default]
	Concurrent,
}

/// Settings for a [`Runtime`](crate::runtime::Runtime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
	/// Updater implementation
	pub updater: UpdaterKind,

	/// Time a render lane may run before yielding, in milliseconds
	pub frame_budget_ms: u64,

	/// Priority of updates requested outside any priority context
	pub default_priority: TaskPriority,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			updater: UpdaterKind::default(),
			frame_budget_ms: DEFAULT_FRAME_BUDGET.as_millis() as u64,
			default_priority: TaskPriority::default(),
		}
	}
}

impl RuntimeConfig {
	/// Parse configuration from a TOML string.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|source| Error::ConfigFile {
			path: path.as_ref().to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	pub fn with_updater(mut self, updater: UpdaterKind) -> Self {
		self.updater = updater;
		self
	}

	pub fn with_frame_budget_ms(mut self, frame_budget_ms: u64) -> Self {
		self.frame_budget_ms = frame_budget_ms;
		self
	}

	pub fn with_default_priority(mut self, priority: TaskPriority) -> Self {
		self.default_priority = priority;
		self
	}

	pub fn frame_budget(&self) -> Duration {
		Duration::from_millis(self.frame_budget_ms)
	}

	/// Construct the configured updater
	pub fn build_updater(
		&self,
		host: Rc<dyn UpdateHost>,
		scheduler: Rc<dyn Scheduler>,
	) -> Rc<dyn Updater> {
		match self.updater {
			UpdaterKind::Sync => SyncUpdater::new(host, scheduler) as Rc<dyn Updater>,
			UpdaterKind::Concurrent => ConcurrentUpdater::new(host, scheduler) as Rc<dyn Updater>,
		}
	}
}
