//! Values placed into template holes.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use strand_dom::{Event, EventHandler, ListenerOptions};

use crate::directive::Directive;

/// A dynamic value inserted into a part
///
/// Primitive variants compare by value; every reference-like variant compares
/// by pointer identity (see [`Value::is_same`]). Directives are recognized
/// through the explicit [`Value::Directive`] variant and always take
/// precedence over the part-kind default when a binding is resolved.
#[derive(Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(Rc<str>),
	Listener(EventListener),
	Props(SpreadProps),
	Object(Rc<dyn Any>),
	Directive(Rc<dyn Directive>),
}

impl Value {
	/// Wrap an arbitrary object, compared by identity
	pub fn object<T: Any>(value: T) -> Self {
		Value::Object(Rc::new(value))
	}

	/// Wrap a directive
	pub fn directive<D: Directive>(directive: D) -> Self {
		Value::Directive(Rc::new(directive))
	}

	/// Identity comparison used to skip redundant binds
	///
	/// Numbers follow IEEE identity rather than equality: `NaN` is the same as
	/// `NaN`, `0.0` is not the same as `-0.0`.
	pub fn is_same(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => {
				a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
			}
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Listener(a), Value::Listener(b)) => a.is_same(b),
			(Value::Props(a), Value::Props(b)) => a.ptr_eq(b),
			(Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
			(Value::Directive(a), Value::Directive(b)) => {
				std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
			}
			_ => false,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// The directive carried by this value, if any
	pub fn as_directive(&self) -> Option<&Rc<dyn Directive>> {
		match self {
			Value::Directive(directive) => Some(directive),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(value) => Some(&**value),
			_ => None,
		}
	}

	/// Stringified form committed into text, comments and attributes
	///
	/// `Null` has no string form.
	pub fn to_display_string(&self) -> Option<String> {
		match self {
			Value::Null => None,
			Value::Bool(value) => Some(value.to_string()),
			Value::Number(value) => Some(format_number(*value)),
			Value::String(value) => Some(value.to_string()),
			Value::Listener(_) => Some(String::from("[object Function]")),
			Value::Props(_) | Value::Object(_) => Some(String::from("[object Object]")),
			Value::Directive(directive) => Some(format!("[object {}]", directive.name())),
		}
	}

	/// Short description used in error messages
	pub fn describe(&self) -> String {
		match self {
			Value::Null => String::from("null"),
			Value::Bool(value) => format!("boolean {value}"),
			Value::Number(value) => format!("number {}", format_number(*value)),
			Value::String(value) => format!("string {value:?}"),
			Value::Listener(_) => String::from("an event listener"),
			Value::Props(_) => String::from("spread props"),
			Value::Object(_) => String::from("an object"),
			Value::Directive(directive) => format!("directive {}", directive.name()),
		}
	}
}

fn format_number(value: f64) -> String {
	if value.is_nan() {
		String::from("NaN")
	} else if value.is_infinite() {
		String::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
	} else if value.fract() == 0.0 && value.abs() < 1e15 {
		format!("{}", value as i64)
	} else {
		value.to_string()
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("Null"),
			Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			Value::Number(value) => f.debug_tuple("Number").field(value).finish(),
			Value::String(value) => f.debug_tuple("String").field(value).finish(),
			Value::Listener(listener) => f.debug_tuple("Listener").field(listener).finish(),
			Value::Props(props) => f.debug_tuple("Props").field(props).finish(),
			Value::Object(_) => f.write_str("Object(..)"),
			Value::Directive(directive) => f.debug_tuple("Directive").field(&directive.name()).finish(),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(Rc::from(value))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(Rc::from(value))
	}
}

impl From<Rc<str>> for Value {
	fn from(value: Rc<str>) -> Self {
		Value::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

macro_rules! impl_from_number {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Value::Number(value as f64)
				}
			}
		)*
	};
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

impl From<EventListener> for Value {
	fn from(value: EventListener) -> Self {
		Value::Listener(value)
	}
}

impl From<SpreadProps> for Value {
	fn from(value: SpreadProps) -> Self {
		Value::Props(value)
	}
}

impl<D: Directive> From<Rc<D>> for Value {
	fn from(value: Rc<D>) -> Self {
		Value::Directive(value)
	}
}

/// An event listener bound through an event part
///
/// Function-style listeners are invoked through the binding's own registered
/// handler, so swapping one function for another never touches the node.
/// Object-style listeners carry registration options and are re-registered
/// whenever they change.
#[derive(Clone)]
pub enum EventListener {
	Function(Rc<dyn Fn(&Event)>),
	Object {
		handler: Rc<dyn EventHandler>,
		options: ListenerOptions,
	},
}

impl EventListener {
	/// Function-style listener
	///
	/// # Example
	///
	/// ```ignore
	/// let on_click = EventListener::new(move |_event| count.update(|n| *n += 1));
	/// ```
	pub fn new<F>(listener: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		EventListener::Function(Rc::new(listener))
	}

	/// Object-style listener with registration options
	pub fn with_options<H>(handler: H, options: ListenerOptions) -> Self
	where
		H: EventHandler + 'static,
	{
		EventListener::Object {
			handler: Rc::new(handler),
			options,
		}
	}

	pub fn is_function(&self) -> bool {
		matches!(self, EventListener::Function(_))
	}

	/// Registration options; function-style listeners use the defaults
	pub fn options(&self) -> ListenerOptions {
		match self {
			EventListener::Function(_) => ListenerOptions::default(),
			EventListener::Object { options, .. } => *options,
		}
	}

	pub fn is_same(&self, other: &EventListener) -> bool {
		match (self, other) {
			(EventListener::Function(a), EventListener::Function(b)) => {
				std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
			}
			(
				EventListener::Object {
					handler: a,
					options: a_options,
				},
				EventListener::Object {
					handler: b,
					options: b_options,
				},
			) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)) && a_options == b_options,
			_ => false,
		}
	}

	pub fn invoke(&self, event: &Event) {
		match self {
			EventListener::Function(listener) => listener(event),
			EventListener::Object { handler, .. } => handler.handle_event(event),
		}
	}
}

impl fmt::Debug for EventListener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EventListener::Function(_) => f.write_str("Function(..)"),
			EventListener::Object { options, .. } => f
				.debug_struct("Object")
				.field("options", options)
				.finish_non_exhaustive(),
		}
	}
}

/// Props spread onto an element part, in insertion order
///
/// Keys starting with `@` bind events, keys starting with `.` bind
/// properties, every other key binds an attribute. Two `SpreadProps` are the
/// same value only if they share the same allocation.
#[derive(Clone, Default)]
pub struct SpreadProps(Rc<IndexMap<String, Value>>);

impl SpreadProps {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn ptr_eq(&self, other: &SpreadProps) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl<K, V> FromIterator<(K, V)> for SpreadProps
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		SpreadProps(Rc::new(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		))
	}
}

impl fmt::Debug for SpreadProps {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter()).finish()
	}
}
