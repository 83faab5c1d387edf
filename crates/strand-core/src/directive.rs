//! Directives: values that construct their own bindings.

use std::any::Any;
use std::rc::Rc;

use crate::binding::Binding;
use crate::error::{Error, Result, short_type_name};
use crate::part::{Part, report_part};
use crate::updater::UpdateContext;
use crate::value::Value;

/// Object-safe access to `Any` for trait objects built on top of it.
pub trait AsAny: Any {
	fn as_any(&self) -> &dyn Any;
	fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

/// A value that knows how to bind itself to a part
///
/// When a hole receives a [`Value::Directive`], the directive's own
/// [`Directive::resolve_binding`] is used regardless of the part kind. A
/// directive that only supports some part kinds rejects the others with
/// [`Error::InvalidPart`].
pub trait Directive: AsAny {
	/// Display name used in diagnostics
	fn name(&self) -> &'static str;

	/// Create the binding that will own `part` for this directive
	fn resolve_binding(
		self: Rc<Self>,
		part: Part,
		context: &UpdateContext,
	) -> Result<Box<dyn Binding>>;
}

/// Downcast `value` to the directive type `D`, or fail with a located error
pub fn ensure_directive<D: Directive>(value: &Value, part: &Part) -> Result<Rc<D>> {
	if let Some(directive) = value.as_directive() {
		if let Ok(directive) = Rc::clone(directive).into_any_rc().downcast::<D>() {
			return Ok(directive);
		}
	}
	Err(Error::UnexpectedDirective {
		expected: short_type_name::<D>(),
		found: value.describe(),
		location: report_part(part),
	})
}

/// Fail with a located error when `value` is a directive
pub fn ensure_non_directive(value: &Value, part: &Part) -> Result<()> {
	match value {
		Value::Directive(_) => Err(Error::DirectiveNotAllowed {
			found: value.describe(),
			location: report_part(part),
		}),
		_ => Ok(()),
	}
}

/// Fail with [`Error::InvalidPart`] unless `part` has one of the accepted kinds
pub(crate) fn ensure_part(
	directive: &'static str,
	expected: &'static str,
	part: &Part,
	accepted: &[crate::part::PartType],
) -> Result<()> {
	if accepted.contains(&part.part_type()) {
		Ok(())
	} else {
		Err(Error::InvalidPart {
			directive,
			expected,
			location: report_part(part),
		})
	}
}
