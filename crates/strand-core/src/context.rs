//! RenderContext - the hook API available to component functions
//!
//! A [`RenderContext`] is created for every render of a component block. It
//! owns the block's hook list for the duration of the render and hands it
//! back through [`RenderContext::finalize`].
//!
//! ## Hook rules
//!
//! Hooks are addressed by call order. A component must call the same hooks,
//! in the same order, on every render:
//!
//! ```ignore
//! fn counter(props: &CounterProps, ctx: &mut RenderContext) -> Result<TemplateResult> {
//!     let (count, set_count) = ctx.use_state(props.initial)?;
//!     let label = ctx.use_memo(|| format!("clicked {count} times"), count)?;
//!     ctx.use_effect_with(
//!         move || {
//!             tracing::info!(count, "count changed");
//!             None::<fn()>
//!         },
//!         count,
//!     )?;
//!     Ok(ctx.text(label))
//! }
//! ```
//!
//! Calling a hook conditionally makes the stored slot at some index disagree
//! with the requested hook kind, which is reported as
//! [`Error::HookTypeMismatch`].

use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use strand_reactive::{Atom, Computed, Signal, SignalSource};

use crate::block::Block;
use crate::effect::CommitPhase;
use crate::error::{Error, HookType, Result};
use crate::hook::{Cleanup, EffectHook, Hook, InvokeEffectHook, MemoHook, dependencies_changed};
use crate::priority::TaskPriority;
use crate::template::{TemplateResult, value};
use crate::updater::UpdateContext;
use crate::value::Value;

/// Typed key for values shared down the block tree
///
/// # Example
///
/// ```ignore
/// static THEME: ContextKey<Theme> = ContextKey::new("theme");
///
/// ctx.set_context_value(&THEME, Theme::Dark);
/// let theme = ctx.get_context_value(&THEME);
/// ```
pub struct ContextKey<T> {
	name: &'static str,
	_marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			_marker: PhantomData,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl<T> Clone for ContextKey<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ContextKey").field(&self.name).finish()
	}
}

/// Stable handle that feeds actions into a reducer hook
///
/// The handle stays the same across renders, so it can be captured by event
/// listeners and used as an effect dependency.
pub struct Dispatch<A> {
	dispatch: Rc<dyn Fn(A, Option<TaskPriority>)>,
}

impl<A: 'static> Dispatch<A> {
	fn new(dispatch: impl Fn(A, Option<TaskPriority>) + 'static) -> Self {
		Self {
			dispatch: Rc::new(dispatch),
		}
	}
}

impl<A> Dispatch<A> {
	/// Apply `action`, requesting an update if the state changed
	pub fn dispatch(&self, action: A) {
		(self.dispatch)(action, None);
	}

	/// Like [`Dispatch::dispatch`], with an explicit update priority
	pub fn dispatch_with_priority(&self, action: A, priority: TaskPriority) {
		(self.dispatch)(action, Some(priority));
	}
}

impl<A> Clone for Dispatch<A> {
	fn clone(&self) -> Self {
		Self {
			dispatch: Rc::clone(&self.dispatch),
		}
	}
}

impl<A> PartialEq for Dispatch<A> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::addr_eq(Rc::as_ptr(&self.dispatch), Rc::as_ptr(&other.dispatch))
	}
}

impl<A> fmt::Debug for Dispatch<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatch").finish_non_exhaustive()
	}
}

enum StateAction<S> {
	Set(S),
	Update(Box<dyn FnOnce(&S) -> S>),
}

/// Setter returned by [`RenderContext::use_state`]
pub struct SetState<S> {
	dispatch: Dispatch<StateAction<S>>,
}

impl<S> SetState<S> {
	pub fn set(&self, value: S) {
		self.dispatch.dispatch(StateAction::Set(value));
	}

	/// Compute the next state from the current one
	pub fn update(&self, f: impl FnOnce(&S) -> S + 'static) {
		self.dispatch.dispatch(StateAction::Update(Box::new(f)));
	}

	pub fn set_with_priority(&self, value: S, priority: TaskPriority) {
		self.dispatch
			.dispatch_with_priority(StateAction::Set(value), priority);
	}
}

impl<S> Clone for SetState<S> {
	fn clone(&self) -> Self {
		Self {
			dispatch: self.dispatch.clone(),
		}
	}
}

impl<S> PartialEq for SetState<S> {
	fn eq(&self, other: &Self) -> bool {
		self.dispatch == other.dispatch
	}
}

impl<S> fmt::Debug for SetState<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SetState").finish_non_exhaustive()
	}
}

struct ReducerSlot<S, A> {
	state: Rc<RefCell<S>>,
	dispatch: Dispatch<A>,
}

/// Something a component can consume through [`RenderContext::use_usable`]
///
/// Signals subscribe the calling component and yield their current value.
pub trait Usable {
	type Output;

	fn use_in(self, context: &mut RenderContext) -> Result<Self::Output>;
}

impl<T: Clone + 'static> Usable for &Atom<T> {
	type Output = T;

	fn use_in(self, context: &mut RenderContext) -> Result<T> {
		context.use_sync_external_store(self, |atom| atom.value(), None)
	}
}

impl<T: Clone + 'static> Usable for &Computed<T> {
	type Output = T;

	fn use_in(self, context: &mut RenderContext) -> Result<T> {
		context.use_sync_external_store(self, |computed| computed.value(), None)
	}
}

/// Closure adapter for [`Usable`], see [`usable_fn`]
pub struct UsableFn<F>(F);

/// Package a custom hook as a [`Usable`]
pub fn usable_fn<F, T>(f: F) -> UsableFn<F>
where
	F: FnOnce(&mut RenderContext) -> Result<T>,
{
	UsableFn(f)
}

impl<F, T> Usable for UsableFn<F>
where
	F: FnOnce(&mut RenderContext) -> Result<T>,
{
	type Output = T;

	fn use_in(self, context: &mut RenderContext) -> Result<T> {
		(self.0)(context)
	}
}

fn mismatch(index: usize, expected: HookType, found: &Hook) -> Error {
	Error::HookTypeMismatch {
		index,
		expected,
		found: found.hook_type(),
	}
}

/// Per-render hook cursor of a component block
pub struct RenderContext {
	hooks: Vec<Hook>,
	hook_index: usize,
	block: Rc<dyn Block>,
	context: UpdateContext,
}

impl RenderContext {
	pub fn new(hooks: Vec<Hook>, block: Rc<dyn Block>, context: UpdateContext) -> Self {
		Self {
			hooks,
			hook_index: 0,
			block,
			context,
		}
	}

	pub fn block(&self) -> &Rc<dyn Block> {
		&self.block
	}

	pub fn update_context(&self) -> &UpdateContext {
		&self.context
	}

	/// Close the render, checking the hook count against the first render
	///
	/// The hook list is returned even when the check fails so the block can
	/// keep (and later clean up) the slots it already has.
	pub fn finalize(mut self) -> (Vec<Hook>, Result<()>) {
		let index = self.hook_index;
		let result = match self.hooks.get(index) {
			None => {
				self.hooks.push(Hook::Finalizer);
				Ok(())
			}
			Some(Hook::Finalizer) => Ok(()),
			Some(other) => Err(mismatch(index, HookType::Finalizer, other)),
		};
		(self.hooks, result)
	}

	fn next_index(&mut self) -> usize {
		let index = self.hook_index;
		self.hook_index += 1;
		index
	}

	/// Run `callback` as a passive effect after every render
	pub fn use_effect<F, C>(&mut self, callback: F) -> Result<()>
	where
		F: FnOnce() -> Option<C> + 'static,
		C: FnOnce() + 'static,
	{
		self.effect_hook(CommitPhase::Passive, callback, None::<()>)
	}

	/// Run `callback` as a passive effect when `dependencies` change
	pub fn use_effect_with<F, C, D>(&mut self, callback: F, dependencies: D) -> Result<()>
	where
		F: FnOnce() -> Option<C> + 'static,
		C: FnOnce() + 'static,
		D: PartialEq + 'static,
	{
		self.effect_hook(CommitPhase::Passive, callback, Some(dependencies))
	}

	/// Run `callback` as a layout effect after every render
	pub fn use_layout_effect<F, C>(&mut self, callback: F) -> Result<()>
	where
		F: FnOnce() -> Option<C> + 'static,
		C: FnOnce() + 'static,
	{
		self.effect_hook(CommitPhase::Layout, callback, None::<()>)
	}

	/// Run `callback` as a layout effect when `dependencies` change
	pub fn use_layout_effect_with<F, C, D>(&mut self, callback: F, dependencies: D) -> Result<()>
	where
		F: FnOnce() -> Option<C> + 'static,
		C: FnOnce() + 'static,
		D: PartialEq + 'static,
	{
		self.effect_hook(CommitPhase::Layout, callback, Some(dependencies))
	}

	fn effect_hook<F, C, D>(
		&mut self,
		phase: CommitPhase,
		callback: F,
		dependencies: Option<D>,
	) -> Result<()>
	where
		F: FnOnce() -> Option<C> + 'static,
		C: FnOnce() + 'static,
		D: PartialEq + 'static,
	{
		let index = self.next_index();
		let hook = match self.hooks.get(index) {
			Some(Hook::Effect(hook)) => Rc::clone(hook),
			Some(other) => return Err(mismatch(index, HookType::Effect, other)),
			None => {
				let hook = Rc::new(RefCell::new(EffectHook::default()));
				self.hooks.push(Hook::Effect(Rc::clone(&hook)));
				hook
			}
		};

		if let Some(dependencies) = dependencies {
			let mut state = hook.borrow_mut();
			if !dependencies_changed(state.dependencies.as_deref(), &dependencies) {
				return Ok(());
			}
			state.dependencies = Some(Box::new(dependencies));
		}

		let callback: Box<dyn FnOnce() -> Option<Cleanup>> =
			Box::new(move || callback().map(|cleanup| Box::new(cleanup) as Cleanup));
		let effect = Rc::new(InvokeEffectHook::new(hook, callback));
		match phase {
			CommitPhase::Layout => self.context.enqueue_layout_effect(effect),
			_ => self.context.enqueue_passive_effect(effect),
		}
		Ok(())
	}

	/// Cache the result of `factory` until `dependencies` change
	pub fn use_memo<T, D>(&mut self, factory: impl FnOnce() -> T, dependencies: D) -> Result<T>
	where
		T: Clone + 'static,
		D: PartialEq + 'static,
	{
		let index = self.next_index();
		match self.hooks.get_mut(index) {
			Some(Hook::Memo(memo)) => {
				if dependencies_changed(Some(&*memo.dependencies), &dependencies) {
					memo.value = Rc::new(factory());
					memo.dependencies = Box::new(dependencies);
				}
				memo.value
					.downcast_ref::<T>()
					.cloned()
					.ok_or(Error::HookValueMismatch {
						index,
						expected: type_name::<T>(),
					})
			}
			Some(other) => Err(mismatch(index, HookType::Memo, other)),
			None => {
				let value = factory();
				self.hooks.push(Hook::Memo(MemoHook {
					value: Rc::new(value.clone()),
					dependencies: Box::new(dependencies),
				}));
				Ok(value)
			}
		}
	}

	/// Keep the first `callback` until `dependencies` change
	pub fn use_callback<F, D>(&mut self, callback: F, dependencies: D) -> Result<Rc<F>>
	where
		F: 'static,
		D: PartialEq + 'static,
	{
		self.use_memo(move || Rc::new(callback), dependencies)
	}

	/// A mutable cell that lives as long as the component
	pub fn use_ref<T: 'static>(&mut self, initial: T) -> Result<Rc<RefCell<T>>> {
		self.use_memo(move || Rc::new(RefCell::new(initial)), ())
	}

	/// State driven by a reducer
	///
	/// Dispatching an action computes the next state with `reducer`. When the
	/// next state equals the current one nothing happens; otherwise the state
	/// is replaced and the component is re-rendered at the dispatch priority,
	/// falling back to the updater's current priority.
	///
	/// # Example
	///
	/// ```ignore
	/// let (count, dispatch) = ctx.use_reducer(|count: &i32, delta: i32| count + delta, 0)?;
	/// dispatch.dispatch(1);
	/// ```
	pub fn use_reducer<S, A, R>(&mut self, reducer: R, initial: S) -> Result<(S, Dispatch<A>)>
	where
		S: Clone + PartialEq + 'static,
		A: 'static,
		R: Fn(&S, A) -> S + 'static,
	{
		self.reducer_hook(reducer, initial, None)
	}

	/// [`RenderContext::use_reducer`] with a fixed update priority
	pub fn use_reducer_with_priority<S, A, R>(
		&mut self,
		reducer: R,
		initial: S,
		priority: TaskPriority,
	) -> Result<(S, Dispatch<A>)>
	where
		S: Clone + PartialEq + 'static,
		A: 'static,
		R: Fn(&S, A) -> S + 'static,
	{
		self.reducer_hook(reducer, initial, Some(priority))
	}

	fn reducer_hook<S, A, R>(
		&mut self,
		reducer: R,
		initial: S,
		priority: Option<TaskPriority>,
	) -> Result<(S, Dispatch<A>)>
	where
		S: Clone + PartialEq + 'static,
		A: 'static,
		R: Fn(&S, A) -> S + 'static,
	{
		let index = self.next_index();
		match self.hooks.get(index) {
			Some(Hook::Reducer(slot)) => {
				let slot = slot.downcast_ref::<ReducerSlot<S, A>>().ok_or(
					Error::HookValueMismatch {
						index,
						expected: type_name::<S>(),
					},
				)?;
				let state = slot.state.borrow().clone();
				Ok((state, slot.dispatch.clone()))
			}
			Some(other) => Err(mismatch(index, HookType::Reducer, other)),
			None => {
				let state = Rc::new(RefCell::new(initial));
				let dispatch = self.reducer_dispatch(Rc::clone(&state), reducer, priority);
				let current = state.borrow().clone();
				self.hooks.push(Hook::Reducer(Rc::new(ReducerSlot {
					state,
					dispatch: dispatch.clone(),
				})));
				Ok((current, dispatch))
			}
		}
	}

	fn reducer_dispatch<S, A, R>(
		&self,
		state: Rc<RefCell<S>>,
		reducer: R,
		priority: Option<TaskPriority>,
	) -> Dispatch<A>
	where
		S: PartialEq + 'static,
		A: 'static,
		R: Fn(&S, A) -> S + 'static,
	{
		let block = Rc::downgrade(&self.block);
		let context = self.context.detached();
		Dispatch::new(move |action: A, explicit: Option<TaskPriority>| {
			let next = reducer(&*state.borrow(), action);
			if *state.borrow() == next {
				return;
			}
			*state.borrow_mut() = next;
			if let Some(block) = block.upgrade() {
				let priority = explicit
					.or(priority)
					.unwrap_or_else(|| context.current_priority());
				tracing::trace!(%priority, "state changed, requesting update");
				block.request_update(priority, &context);
			}
		})
	}

	/// A single state value
	pub fn use_state<S>(&mut self, initial: S) -> Result<(S, SetState<S>)>
	where
		S: Clone + PartialEq + 'static,
	{
		self.state_hook(initial, None)
	}

	/// [`RenderContext::use_state`] with a fixed update priority
	pub fn use_state_with_priority<S>(
		&mut self,
		initial: S,
		priority: TaskPriority,
	) -> Result<(S, SetState<S>)>
	where
		S: Clone + PartialEq + 'static,
	{
		self.state_hook(initial, Some(priority))
	}

	fn state_hook<S>(
		&mut self,
		initial: S,
		priority: Option<TaskPriority>,
	) -> Result<(S, SetState<S>)>
	where
		S: Clone + PartialEq + 'static,
	{
		let (state, dispatch) = self.reducer_hook(
			|state: &S, action: StateAction<S>| match action {
				StateAction::Set(value) => value,
				StateAction::Update(f) => f(state),
			},
			initial,
			priority,
		)?;
		Ok((state, SetState { dispatch }))
	}

	/// A copy of `value` that lags behind it at background priority
	///
	/// The first render returns `initial` (or `value`); afterwards a passive
	/// effect moves the deferred copy to the latest `value`.
	pub fn use_deferred_value<T>(&mut self, value: T, initial: Option<T>) -> Result<T>
	where
		T: Clone + PartialEq + 'static,
	{
		let (deferred, set_deferred) = self.use_state_with_priority(
			initial.unwrap_or_else(|| value.clone()),
			TaskPriority::Background,
		)?;
		let latest = value.clone();
		self.use_effect_with(
			move || {
				set_deferred.set(latest);
				None::<fn()>
			},
			value,
		)?;
		Ok(deferred)
	}

	/// Read `store` and re-render whenever it notifies
	///
	/// The subscription is made in a passive effect and replaced when the
	/// store or the priority changes. A change that happens between the
	/// render and the subscription still triggers an update.
	pub fn use_sync_external_store<S, T>(
		&mut self,
		store: &S,
		snapshot: impl FnOnce(&S) -> T,
		priority: Option<TaskPriority>,
	) -> Result<T>
	where
		S: SignalSource + Clone + PartialEq + 'static,
	{
		let rendered_version = store.version();
		let block = Rc::downgrade(&self.block);
		let context = self.context.detached();
		let subscribed = store.clone();
		self.use_effect_with(
			move || {
				let request = Rc::new(move || {
					if let Some(block) = block.upgrade() {
						let priority = priority.unwrap_or_else(|| context.current_priority());
						block.request_update(priority, &context);
					}
				});
				let subscription = subscribed.subscribe(request.clone());
				if subscribed.version() != rendered_version {
					request();
				}
				Some(move || subscription.unsubscribe())
			},
			(store.clone(), priority),
		)?;
		Ok(snapshot(store))
	}

	/// Consume a [`Usable`]
	pub fn use_usable<U: Usable>(&mut self, usable: U) -> Result<U::Output> {
		usable.use_in(self)
	}

	/// Re-render this component at the current priority
	pub fn request_update(&self) {
		self.block
			.request_update(self.context.current_priority(), &self.context);
	}

	/// Nearest value stored under `key` in this block or an ancestor
	pub fn get_context_value<T: Clone + 'static>(&self, key: &ContextKey<T>) -> Option<T> {
		self.context
			.host()
			.get_scoped_value(key.name(), Some(&self.block))
			.and_then(|value| value.downcast_ref::<T>().cloned())
	}

	/// Store a value visible to this block and its descendants
	pub fn set_context_value<T: 'static>(&self, key: &ContextKey<T>, value: T) {
		self.context
			.host()
			.set_scoped_value(key.name(), Rc::new(value), &self.block);
	}

	/// Instantiate an HTML template from its token strings
	pub fn html(&self, tokens: &'static [&'static str], data: Vec<Value>) -> Result<TemplateResult> {
		let template = self.context.host().get_html_template(tokens)?;
		Ok(TemplateResult::new(template, data))
	}

	/// Instantiate an SVG template from its token strings
	pub fn svg(&self, tokens: &'static [&'static str], data: Vec<Value>) -> Result<TemplateResult> {
		let template = self.context.host().get_svg_template(tokens)?;
		Ok(TemplateResult::new(template, data))
	}

	pub fn text(&self, value: impl Into<Value>) -> TemplateResult {
		value::text(value)
	}

	pub fn child_node(&self, value: impl Into<Value>) -> TemplateResult {
		value::child_node(value)
	}

	pub fn element(
		&self,
		tag: impl Into<String>,
		props: impl Into<Value>,
		child: impl Into<Value>,
	) -> TemplateResult {
		value::element(tag, props, child)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{MockBlock, TestHarness};
	use rstest::rstest;
	use std::cell::Cell;

	fn render_context(harness: &TestHarness, block: &Rc<MockBlock>, hooks: Vec<Hook>) -> RenderContext {
		RenderContext::new(hooks, Rc::clone(block) as Rc<dyn Block>, harness.context())
	}

	#[rstest]
	fn test_memo_recomputes_on_dependency_change() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let calls = Cell::new(0);
		let mut hooks = Vec::new();

		for (deps, expected) in [(1, 10), (1, 10), (2, 20)] {
			let mut ctx = render_context(&harness, &block, hooks);
			let value = ctx
				.use_memo(
					|| {
						calls.set(calls.get() + 1);
						deps * 10
					},
					deps,
				)
				.unwrap();
			assert_eq!(value, expected);
			let (next, result) = ctx.finalize();
			result.unwrap();
			hooks = next;
		}

		assert_eq!(calls.get(), 2);
	}

	#[rstest]
	fn test_reducer_updates_only_on_change() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let mut ctx = render_context(&harness, &block, Vec::new());
		let (count, dispatch) = ctx
			.use_reducer(|count: &i32, delta: i32| count + delta, 0)
			.unwrap();
		let (hooks, result) = ctx.finalize();
		result.unwrap();
		assert_eq!(count, 0);
		block.reset_updates();

		dispatch.dispatch(0);
		assert_eq!(block.requested_updates(), 0);

		dispatch.dispatch(1);
		dispatch.dispatch(1);
		assert_eq!(block.requested_updates(), 2);

		let mut ctx = render_context(&harness, &block, hooks);
		let (count, again) = ctx
			.use_reducer(|count: &i32, delta: i32| count + delta, 0)
			.unwrap();
		assert_eq!(count, 2);
		assert_eq!(again, dispatch);
	}

	#[rstest]
	fn test_dispatch_priority() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let mut ctx = render_context(&harness, &block, Vec::new());
		let (_, set_state) = ctx.use_state(0).unwrap();
		let (_, set_background) = ctx
			.use_state_with_priority(0, TaskPriority::Background)
			.unwrap();

		set_state.set(1);
		assert_eq!(block.last_requested_priority(), Some(TaskPriority::UserVisible));

		set_state.set_with_priority(2, TaskPriority::UserBlocking);
		assert_eq!(block.last_requested_priority(), Some(TaskPriority::UserBlocking));

		set_background.update(|value| value + 1);
		assert_eq!(block.last_requested_priority(), Some(TaskPriority::Background));
	}

	#[rstest]
	fn test_effects_run_in_phase_and_clean_up() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let log = Rc::new(RefCell::new(Vec::<String>::new()));
		let mut hooks = Vec::new();

		for deps in [1, 1, 2] {
			let mut ctx = render_context(&harness, &block, hooks);
			let passive_log = Rc::clone(&log);
			ctx.use_effect_with(
				move || {
					passive_log.borrow_mut().push(format!("passive {deps}"));
					let passive_log = Rc::clone(&passive_log);
					Some(move || passive_log.borrow_mut().push(format!("cleanup {deps}")))
				},
				deps,
			)
			.unwrap();
			let layout_log = Rc::clone(&log);
			ctx.use_layout_effect(move || {
				layout_log.borrow_mut().push(format!("layout {deps}"));
				None::<fn()>
			})
			.unwrap();
			let (next, result) = ctx.finalize();
			result.unwrap();
			hooks = next;
			harness.flush().unwrap();
		}

		assert_eq!(
			*log.borrow(),
			[
				"layout 1",
				"passive 1",
				"layout 1",
				"layout 2",
				"cleanup 1",
				"passive 2",
			]
		);
	}

	#[rstest]
	fn test_hook_type_drift_is_an_error() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let mut ctx = render_context(&harness, &block, Vec::new());
		ctx.use_state(0).unwrap();
		let (hooks, _) = ctx.finalize();

		let mut ctx = render_context(&harness, &block, hooks);
		let result = ctx.use_memo(|| 0, ());

		assert!(matches!(
			result,
			Err(Error::HookTypeMismatch {
				index: 0,
				expected: HookType::Memo,
				found: HookType::Reducer,
			})
		));
	}

	#[rstest]
	fn test_hook_count_drift_is_an_error() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let mut ctx = render_context(&harness, &block, Vec::new());
		ctx.use_ref(0).unwrap();
		let (hooks, _) = ctx.finalize();

		let mut ctx = render_context(&harness, &block, hooks);
		ctx.use_ref(0).unwrap();
		let extra = ctx.use_ref(1);
		assert!(matches!(
			extra,
			Err(Error::HookTypeMismatch {
				index: 1,
				expected: HookType::Memo,
				found: HookType::Finalizer,
			})
		));
		let (hooks, _) = ctx.finalize();

		let ctx = render_context(&harness, &block, hooks);
		let (_, result) = ctx.finalize();
		assert!(matches!(
			result,
			Err(Error::HookTypeMismatch {
				index: 0,
				expected: HookType::Finalizer,
				found: HookType::Memo,
			})
		));
	}

	#[rstest]
	fn test_context_values_are_inherited() {
		static NAME: ContextKey<String> = ContextKey::new("name");
		let harness = TestHarness::new();
		let parent = MockBlock::new(None);
		let child = MockBlock::new(Some(&(Rc::clone(&parent) as Rc<dyn Block>)));

		let parent_ctx = render_context(&harness, &parent, Vec::new());
		parent_ctx.set_context_value(&NAME, "outer".to_string());
		let child_ctx = render_context(&harness, &child, Vec::new());

		assert_eq!(child_ctx.get_context_value(&NAME).as_deref(), Some("outer"));
	}

	#[rstest]
	fn test_usable_atom_subscribes_component() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let atom = Atom::new(1);
		let mut ctx = render_context(&harness, &block, Vec::new());

		let value = ctx.use_usable(&atom).unwrap();
		let (_hooks, result) = ctx.finalize();
		result.unwrap();
		harness.flush().unwrap();
		block.reset_updates();

		assert_eq!(value, 1);
		atom.set(2);
		assert_eq!(block.requested_updates(), 1);
	}

	#[rstest]
	fn test_usable_fn() {
		let harness = TestHarness::new();
		let block = MockBlock::new(None);
		let mut ctx = render_context(&harness, &block, Vec::new());

		let doubled = ctx
			.use_usable(usable_fn(|ctx: &mut RenderContext| {
				let (value, _) = ctx.use_state(21)?;
				Ok(value * 2)
			}))
			.unwrap();

		assert_eq!(doubled, 42);
	}
}
