//! End-to-end rendering through a [`Runtime`] with both updaters

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;
use strand_core::{
	ContextKey, Dispatch, Error, HookType, RenderContext, Result, Runtime, RuntimeConfig,
	TaskPriority, TemplateResult, UpdaterKind, component, condition, text, unsafe_html,
};
use strand_dom::Node;
use strand_reactive::Atom;

type Log = Rc<RefCell<Vec<String>>>;

fn runtime(updater: UpdaterKind) -> Runtime {
	Runtime::new(RuntimeConfig::default().with_updater(updater))
}

struct CounterProps {
	label: &'static str,
	log: Log,
	dispatch: Rc<RefCell<Option<Dispatch<i32>>>>,
}

impl CounterProps {
	fn new(label: &'static str, log: &Log) -> Self {
		Self {
			label,
			log: Rc::clone(log),
			dispatch: Rc::new(RefCell::new(None)),
		}
	}
}

fn counter(props: &CounterProps, ctx: &mut RenderContext) -> Result<TemplateResult> {
	let (count, dispatch) = ctx.use_reducer(|count: &i32, delta: i32| count + delta, 0)?;
	props.log.borrow_mut().push(format!("{} {count}", props.label));
	*props.dispatch.borrow_mut() = Some(dispatch);
	Ok(ctx.text(format!("{}={count}", props.label)))
}

fn dispatch(props_dispatch: &Rc<RefCell<Option<Dispatch<i32>>>>) -> Dispatch<i32> {
	props_dispatch
		.borrow()
		.clone()
		.expect("component rendered at least once")
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_reducer_dispatch_rerenders(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let log: Log = Rc::default();
	let props = CounterProps::new("a", &log);
	let handle = Rc::clone(&props.dispatch);

	let _root = runtime.mount(component(counter, props), &container).unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main>a=0<!----></main>");

	dispatch(&handle).dispatch(2);
	dispatch(&handle).dispatch(3);
	runtime.run_until_idle().unwrap();

	assert_eq!(container.to_html(), "<main>a=5<!----></main>");
	assert_eq!(*log.borrow(), ["a 0", "a 5"]);
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_unchanged_state_skips_render(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let log: Log = Rc::default();
	let props = CounterProps::new("a", &log);
	let handle = Rc::clone(&props.dispatch);
	let _root = runtime.mount(component(counter, props), &container).unwrap();
	runtime.run_until_idle().unwrap();

	dispatch(&handle).dispatch(0);

	assert!(!runtime.updater().is_scheduled());
	runtime.run_until_idle().unwrap();
	assert_eq!(log.borrow().len(), 1);
}

#[rstest]
fn test_concurrent_renders_by_priority() {
	let runtime = runtime(UpdaterKind::Concurrent);
	let container = Node::element("main");
	let log: Log = Rc::default();
	let background = CounterProps::new("background", &log);
	let blocking = CounterProps::new("blocking", &log);
	let background_handle = Rc::clone(&background.dispatch);
	let blocking_handle = Rc::clone(&blocking.dispatch);
	let _first = runtime.mount(component(counter, background), &container).unwrap();
	let _second = runtime.mount(component(counter, blocking), &container).unwrap();
	runtime.run_until_idle().unwrap();
	log.borrow_mut().clear();

	dispatch(&background_handle).dispatch_with_priority(1, TaskPriority::Background);
	dispatch(&blocking_handle).dispatch_with_priority(1, TaskPriority::UserBlocking);
	runtime.run_until_idle().unwrap();

	assert_eq!(*log.borrow(), ["blocking 1", "background 1"]);
	assert_eq!(
		container.to_html(),
		"<main>background=1<!---->blocking=1<!----></main>"
	);
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_root_update_and_unmount(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let mut root = runtime.mount(condition(true, text("on"), text("off")), &container).unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main>on<!----></main>");

	root.update(condition(false, text("on"), text("off")), &runtime.context())
		.unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main>off<!----></main>");

	root.unmount(&runtime.context());
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main></main>");
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_unsafe_html_is_replaced_and_cleared(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let mut root = runtime.mount(unsafe_html("<b>bold</b>"), &container).unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main><b>bold</b><!----></main>");

	root.update(unsafe_html("<i>it</i>"), &runtime.context()).unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main><i>it</i><!----></main>");

	root.unmount(&runtime.context());
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main></main>");
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_text_follows_atom(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let name = Atom::new(String::from("first"));
	let _root = runtime.mount(text(&name), &container).unwrap();
	runtime.run_until_idle().unwrap();
	assert_eq!(container.to_html(), "<main>first<!----></main>");

	name.set(String::from("second"));
	runtime.run_until_idle().unwrap();

	assert_eq!(container.to_html(), "<main>second<!----></main>");
	assert_eq!(name.subscriber_count(), 1);
}

const THEME: ContextKey<&'static str> = ContextKey::new("theme");

fn themed_page(theme: &&'static str, ctx: &mut RenderContext) -> Result<TemplateResult> {
	ctx.set_context_value(&THEME, *theme);
	Ok(ctx.child_node(component(themed_label, ())))
}

fn themed_label(_props: &(), ctx: &mut RenderContext) -> Result<TemplateResult> {
	let theme = ctx.get_context_value(&THEME).unwrap_or("none");
	Ok(ctx.text(theme))
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_context_value_reaches_descendants(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let page = Node::element("main");
	let orphan = Node::element("aside");

	let _page = runtime.mount(component(themed_page, "dark"), &page).unwrap();
	let _orphan = runtime.mount(component(themed_label, ()), &orphan).unwrap();
	runtime.run_until_idle().unwrap();

	assert_eq!(page.to_html(), "<main>dark<!----><!----></main>");
	assert_eq!(orphan.to_html(), "<aside>none<!----></aside>");
}

fn drifting(label: &&'static str, ctx: &mut RenderContext) -> Result<TemplateResult> {
	if *label == "memo" {
		ctx.use_memo(|| 0, ())?;
	} else {
		ctx.use_state(0)?;
	}
	Ok(ctx.text(*label))
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_hook_order_change_fails_the_update(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let mut root = runtime.mount(component(drifting, "memo"), &container).unwrap();
	runtime.run_until_idle().unwrap();

	root.update(component(drifting, "state"), &runtime.context()).unwrap();
	let result = runtime.run_until_idle();

	assert!(matches!(
		result,
		Err(Error::HookTypeMismatch {
			index: 0,
			expected: HookType::Reducer,
			found: HookType::Memo,
		})
	));
}

struct PhaseProps {
	container: Node,
	log: Log,
}

fn phases(props: &PhaseProps, ctx: &mut RenderContext) -> Result<TemplateResult> {
	props.log.borrow_mut().push(String::from("render"));
	let (container, log) = (props.container.clone(), Rc::clone(&props.log));
	ctx.use_layout_effect_with(
		move || {
			log.borrow_mut().push(format!("layout {}", container.to_html()));
			None::<fn()>
		},
		(),
	)?;
	let log = Rc::clone(&props.log);
	ctx.use_effect_with(
		move || {
			log.borrow_mut().push(String::from("passive"));
			let log = Rc::clone(&log);
			Some(move || log.borrow_mut().push(String::from("cleanup")))
		},
		(),
	)?;
	Ok(ctx.text("body"))
}

#[rstest]
#[case(UpdaterKind::Sync)]
#[case(UpdaterKind::Concurrent)]
fn test_effects_run_after_mutations(#[case] updater: UpdaterKind) {
	let runtime = runtime(updater);
	let container = Node::element("main");
	let log: Log = Rc::default();
	let props = PhaseProps {
		container: container.clone(),
		log: Rc::clone(&log),
	};

	let root = runtime.mount(component(phases, props), &container).unwrap();
	runtime.run_until_idle().unwrap();

	assert_eq!(
		*log.borrow(),
		["render", "layout <main>body<!----></main>", "passive"]
	);

	root.unmount(&runtime.context());
	runtime.run_until_idle().unwrap();

	assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup"));
	assert_eq!(container.to_html(), "<main></main>");
}
