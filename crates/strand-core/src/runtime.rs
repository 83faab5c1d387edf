//! Runtime - host, scheduler and updater wired together
//!
//! ```ignore
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let container = Node::element("main");
//! let root = runtime.mount(component(app, AppProps::default()), &container)?;
//! runtime.run_until_idle()?;
//! ```

use std::rc::Rc;

use strand_dom::Node;

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::host::{RenderHost, Root, TemplateParser, UpdateHost, mount};
use crate::scheduler::{LocalScheduler, Scheduler};
use crate::updater::{UpdateContext, Updater, WaitForUpdate};
use crate::value::Value;

pub struct Runtime {
	config: RuntimeConfig,
	host: Rc<RenderHost>,
	scheduler: Rc<LocalScheduler>,
	updater: Rc<dyn Updater>,
}

impl Runtime {
	pub fn new(config: RuntimeConfig) -> Self {
		Self::with_host(config.clone(), RenderHost::from_config(&config))
	}

	/// Runtime whose host parses `html`/`svg` templates with `parser`
	pub fn with_template_parser(config: RuntimeConfig, parser: Rc<dyn TemplateParser>) -> Self {
		let host = RenderHost::from_config(&config).with_template_parser(parser);
		Self::with_host(config, host)
	}

	fn with_host(config: RuntimeConfig, host: RenderHost) -> Self {
		let host = Rc::new(host);
		let scheduler = Rc::new(LocalScheduler::from_config(&config));
		let updater = config.build_updater(
			Rc::clone(&host) as Rc<dyn UpdateHost>,
			Rc::clone(&scheduler) as Rc<dyn Scheduler>,
		);
		tracing::debug!(
			updater = ?config.updater,
			frame_budget_ms = config.frame_budget_ms,
			"runtime created"
		);
		Self {
			config,
			host,
			scheduler,
			updater,
		}
	}

	/// Parse the configuration from TOML and build a runtime from it
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(Self::new(RuntimeConfig::from_toml_str(content)?))
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	pub fn host(&self) -> &Rc<RenderHost> {
		&self.host
	}

	pub fn scheduler(&self) -> &Rc<LocalScheduler> {
		&self.scheduler
	}

	pub fn updater(&self) -> &Rc<dyn Updater> {
		&self.updater
	}

	/// A root context for bindings created outside any block
	pub fn context(&self) -> UpdateContext {
		UpdateContext::new(
			Rc::clone(&self.host) as Rc<dyn UpdateHost>,
			Rc::clone(&self.updater),
		)
	}

	/// Mount `value` at the end of `container` and schedule the first render
	pub fn mount(&self, value: impl Into<Value>, container: &Node) -> Result<Root> {
		mount(value, container, &self.context())
	}

	/// Run scheduled tasks until none are left
	pub fn run_until_idle(&self) -> Result<usize> {
		self.scheduler.run_until_idle()
	}

	/// Future resolving once every in-flight update has finished
	pub fn wait_for_update(&self) -> WaitForUpdate {
		self.updater.wait_for_update()
	}
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new(RuntimeConfig::default())
	}
}
