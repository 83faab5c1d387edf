//! The host environment of a render tree
//!
//! [`UpdateHost`] is everything the updaters and blocks need from the outside
//! world: committing effects, scoped values looked up along the block chain,
//! template construction and the default task priority. [`RenderHost`] is the
//! in-memory implementation used by [`Runtime`](crate::runtime::Runtime).
//!
//! ## Scoped values
//!
//! Values are stored per block and resolved by walking from a block up
//! through its ancestors, then falling back to host-wide constants:
//!
//! ```ignore
//! host.set_constant("theme", Rc::new("light"));
//! host.set_scoped_value("theme", Rc::new("dark"), &parent);
//!
//! // a child of `parent` sees "dark", a block outside it sees "light"
//! let theme = host.get_scoped_value("theme", Some(&child));
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use strand_dom::Node;

use crate::binding::{Binding, resolve_binding};
use crate::block::Block;
use crate::config::RuntimeConfig;
use crate::effect::{CommitPhase, Effect};
use crate::error::{Error, Result};
use crate::part::Part;
use crate::priority::TaskPriority;
use crate::template::Template;
use crate::updater::UpdateContext;
use crate::value::Value;

/// Services provided to the render tree by its environment
pub trait UpdateHost {
	/// Commit a batch of effects of the same phase, in order
	fn flush_effects(&self, effects: Vec<Rc<dyn Effect>>, phase: CommitPhase) {
		for effect in effects {
			effect.commit(phase);
		}
	}

	/// Look `key` up starting at `block` and walking its ancestors
	fn get_scoped_value(&self, key: &str, block: Option<&Rc<dyn Block>>) -> Option<Rc<dyn Any>>;

	/// Store `value` under `key` in the scope of `block`
	fn set_scoped_value(&self, key: &str, value: Rc<dyn Any>, block: &Rc<dyn Block>);

	/// Template for the given HTML token strings
	///
	/// The same static token slice always yields the same template instance.
	fn get_html_template(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>>;

	/// Template for the given SVG token strings
	fn get_svg_template(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>>;

	/// Priority used when no priority context is active
	fn default_priority(&self) -> TaskPriority {
		TaskPriority::UserVisible
	}
}

/// Turns tagged-template token strings into templates
///
/// `tokens` are the static strings between holes; a template built from
/// `n + 1` tokens has `n` holes.
pub trait TemplateParser {
	fn parse_html(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>>;

	fn parse_svg(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>>;
}

type TemplateKey = (usize, usize);

fn template_key(tokens: &'static [&'static str]) -> TemplateKey {
	(tokens.as_ptr() as usize, tokens.len())
}

struct BlockScope {
	block: Weak<dyn Block>,
	values: HashMap<String, Rc<dyn Any>>,
}

impl BlockScope {
	fn belongs_to(&self, block: &Rc<dyn Block>) -> bool {
		self.block.strong_count() > 0 && std::ptr::addr_eq(self.block.as_ptr(), Rc::as_ptr(block))
	}
}

/// In-memory [`UpdateHost`]
pub struct RenderHost {
	default_priority: TaskPriority,
	parser: Option<Rc<dyn TemplateParser>>,
	constants: RefCell<HashMap<String, Rc<dyn Any>>>,
	scopes: RefCell<Vec<BlockScope>>,
	html_templates: RefCell<HashMap<TemplateKey, Rc<dyn Template>>>,
	svg_templates: RefCell<HashMap<TemplateKey, Rc<dyn Template>>>,
}

impl Default for RenderHost {
	fn default() -> Self {
		Self::new()
	}
}

impl RenderHost {
	pub fn new() -> Self {
		Self {
			default_priority: TaskPriority::default(),
			parser: None,
			constants: RefCell::new(HashMap::new()),
			scopes: RefCell::new(Vec::new()),
			html_templates: RefCell::new(HashMap::new()),
			svg_templates: RefCell::new(HashMap::new()),
		}
	}

	pub fn from_config(config: &RuntimeConfig) -> Self {
		Self::new().with_default_priority(config.default_priority)
	}

	pub fn with_default_priority(mut self, priority: TaskPriority) -> Self {
		self.default_priority = priority;
		self
	}

	/// Install the parser used by `html` and `svg` templates
	pub fn with_template_parser(mut self, parser: Rc<dyn TemplateParser>) -> Self {
		self.parser = Some(parser);
		self
	}

	/// Store a value visible from every block
	pub fn set_constant(&self, key: impl Into<String>, value: Rc<dyn Any>) {
		self.constants.borrow_mut().insert(key.into(), value);
	}

	/// Number of live block scopes
	pub fn scope_count(&self) -> usize {
		self.scopes
			.borrow()
			.iter()
			.filter(|scope| scope.block.strong_count() > 0)
			.count()
	}

	fn lookup(&self, key: &str, block: &Rc<dyn Block>) -> Option<Rc<dyn Any>> {
		self.scopes
			.borrow()
			.iter()
			.find(|scope| scope.belongs_to(block))
			.and_then(|scope| scope.values.get(key).cloned())
	}

	fn cached_template(
		&self,
		cache: &RefCell<HashMap<TemplateKey, Rc<dyn Template>>>,
		tokens: &'static [&'static str],
		parse: impl FnOnce(&dyn TemplateParser) -> Result<Rc<dyn Template>>,
	) -> Result<Rc<dyn Template>> {
		let key = template_key(tokens);
		if let Some(template) = cache.borrow().get(&key) {
			return Ok(Rc::clone(template));
		}
		let parser = self.parser.as_ref().ok_or(Error::MissingTemplateParser)?;
		let template = parse(&**parser)?;
		tracing::debug!(holes = tokens.len().saturating_sub(1), "parsed template");
		cache.borrow_mut().insert(key, Rc::clone(&template));
		Ok(template)
	}
}

impl UpdateHost for RenderHost {
	fn get_scoped_value(&self, key: &str, block: Option<&Rc<dyn Block>>) -> Option<Rc<dyn Any>> {
		let mut current = block.cloned();
		while let Some(block) = current {
			if let Some(value) = self.lookup(key, &block) {
				return Some(value);
			}
			current = block.parent();
		}
		self.constants.borrow().get(key).cloned()
	}

	fn set_scoped_value(&self, key: &str, value: Rc<dyn Any>, block: &Rc<dyn Block>) {
		let mut scopes = self.scopes.borrow_mut();
		scopes.retain(|scope| scope.block.strong_count() > 0);
		match scopes.iter_mut().find(|scope| scope.belongs_to(block)) {
			Some(scope) => {
				scope.values.insert(key.to_owned(), value);
			}
			None => scopes.push(BlockScope {
				block: Rc::downgrade(block),
				values: HashMap::from([(key.to_owned(), value)]),
			}),
		}
	}

	fn get_html_template(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>> {
		self.cached_template(&self.html_templates, tokens, |parser| parser.parse_html(tokens))
	}

	fn get_svg_template(&self, tokens: &'static [&'static str]) -> Result<Rc<dyn Template>> {
		self.cached_template(&self.svg_templates, tokens, |parser| parser.parse_svg(tokens))
	}

	fn default_priority(&self) -> TaskPriority {
		self.default_priority
	}
}

/// A value mounted into a container
///
/// The root owns a comment anchor appended to the container; the mounted
/// content is inserted before it.
pub struct Root {
	anchor: Node,
	binding: Box<dyn Binding>,
}

struct AppendAnchor {
	container: Node,
	anchor: Node,
}

impl Effect for AppendAnchor {
	fn commit(&self, _phase: CommitPhase) {
		self.container.append_child(&self.anchor);
	}
}

struct RemoveAnchor {
	anchor: Node,
}

impl Effect for RemoveAnchor {
	fn commit(&self, _phase: CommitPhase) {
		self.anchor.remove();
	}
}

/// Mount `value` at the end of `container`
///
/// The anchor is appended by a mutation effect enqueued ahead of anything the
/// binding enqueues, so the content always lands in front of it. An update is
/// scheduled before returning.
pub fn mount(value: impl Into<Value>, container: &Node, context: &UpdateContext) -> Result<Root> {
	let anchor = Node::comment("");
	let mut binding = resolve_binding(value.into(), Part::child_node(&anchor), context)?;
	context.enqueue_mutation_effect(Rc::new(AppendAnchor {
		container: container.clone(),
		anchor: anchor.clone(),
	}));
	binding.connect(context)?;
	context.schedule_update();
	Ok(Root { anchor, binding })
}

impl Root {
	pub fn anchor(&self) -> &Node {
		&self.anchor
	}

	pub fn binding(&self) -> &dyn Binding {
		&*self.binding
	}

	/// Replace the mounted value
	pub fn update(&mut self, value: impl Into<Value>, context: &UpdateContext) -> Result<()> {
		self.binding.bind(value.into(), context)?;
		context.schedule_update();
		Ok(())
	}

	/// Remove the content and the anchor, releasing the binding
	pub fn unmount(mut self, context: &UpdateContext) {
		self.binding.unbind(context);
		context.enqueue_mutation_effect(Rc::new(RemoveAnchor {
			anchor: self.anchor.clone(),
		}));
		context.schedule_update();
		self.binding.disconnect();
	}
}
