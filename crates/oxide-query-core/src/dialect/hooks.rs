//! Behavioral toggles consulted by the renderer.

use std::fmt;

use crate::expr::Constant;
use crate::ops::{self, Operator};

/// The override points of a dialect, one function per hook.
#[derive(Clone, Copy)]
pub struct DialectHooks {
    /// Whether a list operand of `operator` must be wrapped in parentheses.
    pub wrap_elements: fn(&Operator) -> bool,
    /// Whether a constant is written as a quoted, escaped literal. When false
    /// the raw value is emitted.
    pub wrap_constant: fn(&Constant) -> bool,
    /// Whether type tests compare against the type name as a string literal
    /// instead of a bare type reference.
    pub type_as_string: fn() -> bool,
}

impl DialectHooks {
    /// Replaces the element wrapping hook.
    #[must_use]
    pub const fn with_wrap_elements(mut self, hook: fn(&Operator) -> bool) -> Self {
        self.wrap_elements = hook;
        self
    }

    /// Replaces the constant wrapping hook.
    #[must_use]
    pub const fn with_wrap_constant(mut self, hook: fn(&Constant) -> bool) -> Self {
        self.wrap_constant = hook;
        self
    }

    /// Replaces the type test hook.
    #[must_use]
    pub const fn with_type_as_string(mut self, hook: fn() -> bool) -> Self {
        self.type_as_string = hook;
        self
    }
}

impl Default for DialectHooks {
    fn default() -> Self {
        Self {
            wrap_elements: never,
            wrap_constant: textual_constants,
            type_as_string: native_type_test,
        }
    }
}

impl fmt::Debug for DialectHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectHooks")
            .field("wrap_in_elements", &(self.wrap_elements)(&ops::IN))
            .field("type_as_string", &(self.type_as_string)())
            .finish_non_exhaustive()
    }
}

/// Never wraps list operands.
#[must_use]
pub fn never(_operator: &Operator) -> bool {
    false
}

/// Wraps the list operand of `in`.
#[must_use]
pub fn in_lists(operator: &Operator) -> bool {
    *operator == ops::IN
}

/// Quotes strings, characters, temporal values and enum members.
#[must_use]
pub const fn textual_constants(constant: &Constant) -> bool {
    constant.is_textual()
}

/// Quotes every constant except `null` and lists.
#[must_use]
pub const fn all_constants(constant: &Constant) -> bool {
    !matches!(constant, Constant::Null | Constant::List(_))
}

/// Quotes nothing.
#[must_use]
pub const fn no_constants(_constant: &Constant) -> bool {
    false
}

/// Bare type references in type tests.
#[must_use]
pub const fn native_type_test() -> bool {
    false
}

/// String literals in type tests.
#[must_use]
pub const fn string_type_test() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hooks() {
        let hooks = DialectHooks::default();
        assert!(!(hooks.wrap_elements)(&ops::IN));
        assert!((hooks.wrap_constant)(&Constant::from("x")));
        assert!(!(hooks.wrap_constant)(&Constant::from(1)));
        assert!(!(hooks.type_as_string)());
    }

    #[test]
    fn test_overrides() {
        let hooks = DialectHooks::default()
            .with_wrap_elements(in_lists)
            .with_wrap_constant(all_constants)
            .with_type_as_string(string_type_test);
        assert!((hooks.wrap_elements)(&ops::IN));
        assert!(!(hooks.wrap_elements)(&ops::EQ));
        assert!((hooks.wrap_constant)(&Constant::from(1)));
        assert!(!(hooks.wrap_constant)(&Constant::Null));
        assert!((hooks.type_as_string)());
    }
}
