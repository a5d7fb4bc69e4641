//! Operation nodes.

use serde::{Deserialize, Serialize};

use super::Expression;
use crate::error::ExpressionError;
use crate::ops::Operator;

/// An operator applied to operands.
///
/// The operand count always equals the operator's arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation")]
pub struct Operation {
    operator: Operator,
    operands: Vec<Expression>,
}

impl Operation {
    /// Creates an operation.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::ArityMismatch`] when the number of operands
    /// differs from the operator's arity.
    pub fn new(operator: Operator, operands: Vec<Expression>) -> Result<Self, ExpressionError> {
        if operands.len() != operator.arity() {
            return Err(ExpressionError::ArityMismatch {
                operator: operator.name(),
                expected: operator.arity(),
                actual: operands.len(),
            });
        }
        Ok(Self { operator, operands })
    }

    /// Creates an operation whose arity is correct by construction.
    pub(crate) fn from_parts(operator: Operator, operands: Vec<Expression>) -> Self {
        debug_assert_eq!(operands.len(), operator.arity(), "{operator}");
        Self { operator, operands }
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the operands.
    #[must_use]
    pub fn operands(&self) -> &[Expression] {
        &self.operands
    }

    /// Returns operand `index`.
    #[must_use]
    pub fn operand(&self, index: usize) -> Option<&Expression> {
        self.operands.get(index)
    }
}

#[derive(Deserialize)]
struct RawOperation {
    operator: Operator,
    operands: Vec<Expression>,
}

impl TryFrom<RawOperation> for Operation {
    type Error = ExpressionError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        Self::new(raw.operator, raw.operands)
    }
}
