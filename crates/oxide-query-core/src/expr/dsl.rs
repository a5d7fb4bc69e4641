//! Combinators for building operations.
//!
//! Each combinator wraps its operands in an [`Operation`] of the matching
//! built-in operator. Arity is fixed by the method signature, so these never
//! fail.

use std::sync::Arc;

use super::{Constant, Expression, Operation};
use crate::ops::{self, Operator};

impl Expression {
    fn unary(self, operator: Operator) -> Self {
        Self::Operation(Arc::new(Operation::from_parts(operator, vec![self])))
    }

    fn binary(self, operator: Operator, right: impl Into<Self>) -> Self {
        Self::Operation(Arc::new(Operation::from_parts(
            operator,
            vec![self, right.into()],
        )))
    }

    /// `self = right`
    #[must_use]
    pub fn eq(self, right: impl Into<Self>) -> Self {
        self.binary(ops::EQ, right)
    }

    /// `self <> right`
    #[must_use]
    pub fn ne(self, right: impl Into<Self>) -> Self {
        self.binary(ops::NE, right)
    }

    /// `self < right`
    #[must_use]
    pub fn lt(self, right: impl Into<Self>) -> Self {
        self.binary(ops::LT, right)
    }

    /// `self > right`
    #[must_use]
    pub fn gt(self, right: impl Into<Self>) -> Self {
        self.binary(ops::GT, right)
    }

    /// `self <= right`
    #[must_use]
    pub fn loe(self, right: impl Into<Self>) -> Self {
        self.binary(ops::LOE, right)
    }

    /// `self >= right`
    #[must_use]
    pub fn goe(self, right: impl Into<Self>) -> Self {
        self.binary(ops::GOE, right)
    }

    /// Logical conjunction.
    #[must_use]
    pub fn and(self, right: impl Into<Self>) -> Self {
        self.binary(ops::AND, right)
    }

    /// Logical disjunction.
    #[must_use]
    pub fn or(self, right: impl Into<Self>) -> Self {
        self.binary(ops::OR, right)
    }

    /// Logical negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.unary(ops::NOT)
    }

    /// `self is null`
    #[must_use]
    pub fn is_null(self) -> Self {
        self.unary(ops::IS_NULL)
    }

    /// `self is not null`
    #[must_use]
    pub fn is_not_null(self) -> Self {
        self.unary(ops::IS_NOT_NULL)
    }

    /// `self between low and high`
    #[must_use]
    pub fn between(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        Self::Operation(Arc::new(Operation::from_parts(
            ops::BETWEEN,
            vec![self, low.into(), high.into()],
        )))
    }

    /// `self in (values...)`
    #[must_use]
    pub fn in_list<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Constant>,
    {
        let list = Constant::List(values.into_iter().map(Into::into).collect());
        self.binary(ops::IN, list)
    }

    /// `self like pattern`, with the pattern used as given.
    #[must_use]
    pub fn like(self, pattern: impl Into<Self>) -> Self {
        self.binary(ops::LIKE, pattern)
    }

    /// Prefix match.
    #[must_use]
    pub fn starts_with(self, prefix: impl Into<Self>) -> Self {
        self.binary(ops::STARTS_WITH, prefix)
    }

    /// Case-insensitive prefix match.
    #[must_use]
    pub fn starts_with_ignore_case(self, prefix: impl Into<Self>) -> Self {
        self.binary(ops::STARTS_WITH_IC, prefix)
    }

    /// Suffix match.
    #[must_use]
    pub fn ends_with(self, suffix: impl Into<Self>) -> Self {
        self.binary(ops::ENDS_WITH, suffix)
    }

    /// Case-insensitive suffix match.
    #[must_use]
    pub fn ends_with_ignore_case(self, suffix: impl Into<Self>) -> Self {
        self.binary(ops::ENDS_WITH_IC, suffix)
    }

    /// Substring match.
    #[must_use]
    pub fn contains(self, infix: impl Into<Self>) -> Self {
        self.binary(ops::STRING_CONTAINS, infix)
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn contains_ignore_case(self, infix: impl Into<Self>) -> Self {
        self.binary(ops::STRING_CONTAINS_IC, infix)
    }

    /// Case-insensitive equality.
    #[must_use]
    pub fn eq_ignore_case(self, right: impl Into<Self>) -> Self {
        self.binary(ops::EQ_IGNORE_CASE, right)
    }

    /// `lower(self)`
    #[must_use]
    pub fn lower(self) -> Self {
        self.unary(ops::LOWER)
    }

    /// `upper(self)`
    #[must_use]
    pub fn upper(self) -> Self {
        self.unary(ops::UPPER)
    }

    /// String concatenation.
    #[must_use]
    pub fn concat(self, right: impl Into<Self>) -> Self {
        self.binary(ops::CONCAT, right)
    }

    /// `self + right`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, right: impl Into<Self>) -> Self {
        self.binary(ops::ADD, right)
    }

    /// `self - right`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, right: impl Into<Self>) -> Self {
        self.binary(ops::SUB, right)
    }

    /// `self * right`
    #[must_use]
    pub fn mult(self, right: impl Into<Self>) -> Self {
        self.binary(ops::MULT, right)
    }

    /// `self / right`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn div(self, right: impl Into<Self>) -> Self {
        self.binary(ops::DIV, right)
    }

    /// Type test against the named type.
    #[must_use]
    pub fn instance_of(self, type_name: impl Into<String>) -> Self {
        self.binary(ops::INSTANCE_OF, Constant::Type(type_name.into()))
    }

    /// Collection size.
    #[must_use]
    pub fn size(self) -> Self {
        self.unary(ops::COL_SIZE)
    }

    /// `self is empty`, for collections.
    #[must_use]
    pub fn is_empty(self) -> Self {
        self.unary(ops::COL_IS_EMPTY)
    }

    /// `case self when v1 then r1 ... else otherwise end`.
    ///
    /// With no branches the result is `otherwise` itself.
    #[must_use]
    pub fn case_eq<I, V, R>(self, branches: I, otherwise: impl Into<Self>) -> Self
    where
        I: IntoIterator<Item = (V, R)>,
        V: Into<Self>,
        R: Into<Self>,
    {
        let branches: Vec<(Self, Self)> = branches
            .into_iter()
            .map(|(value, result)| (value.into(), result.into()))
            .collect();
        let otherwise: Self = otherwise.into();
        if branches.is_empty() {
            return otherwise;
        }
        let chain = branches.into_iter().rev().fold(
            otherwise.unary(ops::CASE_EQ_ELSE),
            |rest, (value, result)| {
                Self::Operation(Arc::new(Operation::from_parts(
                    ops::CASE_EQ_WHEN,
                    vec![value, result, rest],
                )))
            },
        );
        self.binary(ops::CASE_EQ, chain)
    }
}
