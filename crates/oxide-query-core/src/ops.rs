//! Operator catalog.
//!
//! Operators are identified by name and carry a fixed operand arity and a
//! category. The built-in set is a static table; dialects may declare extra
//! operators through [`OperatorCatalog::declare`].

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DialectError, ExpressionError};

/// Broad operator family. Used to pick a default template precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Logical connectives.
    Boolean,
    /// Comparisons and predicates.
    Comparison,
    /// Arithmetic and numeric functions.
    Numeric,
    /// String functions and pattern matching.
    String,
    /// Collection predicates and functions.
    Collection,
    /// Date and time functions.
    DateTime,
    /// Path rendering pseudo-operators.
    Path,
    /// Casts and other control constructs.
    Control,
}

/// An abstract operator with a declared arity.
///
/// Two operators are equal when their names are equal.
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    name: &'static str,
    arity: usize,
    category: Category,
}

impl Operator {
    /// Creates a new operator.
    #[must_use]
    pub const fn new(name: &'static str, arity: usize, category: Category) -> Self {
        Self {
            name,
            arity,
            category,
        }
    }

    /// Returns the operator name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of operands.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the operator category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    const fn same_signature(&self, other: &Self) -> bool {
        self.arity == other.arity && self.category as u8 == other.category as u8
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Operator {}

impl Hash for Operator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        lookup(&name).ok_or_else(|| serde::de::Error::custom(ExpressionError::UnknownOperator(name)))
    }
}

macro_rules! operators {
    ($category:ident: $($ident:ident = ($name:literal, $arity:literal)),+ $(,)?) => {
        $(
            #[doc = concat!("`", $name, "`, ", stringify!($arity), " operand(s).")]
            pub const $ident: Operator = Operator::new($name, $arity, Category::$category);
        )+
    };
}

// boolean
operators!(Boolean:
    AND = ("AND", 2),
    OR = ("OR", 2),
    NOT = ("NOT", 1),
    XOR = ("XOR", 2),
    XNOR = ("XNOR", 2),
);

// comparison
operators!(Comparison:
    EQ = ("EQ", 2),
    NE = ("NE", 2),
    LT = ("LT", 2),
    GT = ("GT", 2),
    LOE = ("LOE", 2),
    GOE = ("GOE", 2),
    BETWEEN = ("BETWEEN", 3),
    IN = ("IN", 2),
    IS_NULL = ("IS_NULL", 1),
    IS_NOT_NULL = ("IS_NOT_NULL", 1),
    INSTANCE_OF = ("INSTANCE_OF", 2),
);

// numeric
operators!(Numeric:
    ADD = ("ADD", 2),
    SUB = ("SUB", 2),
    MULT = ("MULT", 2),
    DIV = ("DIV", 2),
    MOD = ("MOD", 2),
    NEGATE = ("NEGATE", 1),
    ABS = ("ABS", 1),
    SQRT = ("SQRT", 1),
);

// string
operators!(String:
    CONCAT = ("CONCAT", 2),
    LOWER = ("LOWER", 1),
    UPPER = ("UPPER", 1),
    TRIM = ("TRIM", 1),
    LIKE = ("LIKE", 2),
    MATCHES = ("MATCHES", 2),
    STARTS_WITH = ("STARTS_WITH", 2),
    STARTS_WITH_IC = ("STARTS_WITH_IC", 2),
    ENDS_WITH = ("ENDS_WITH", 2),
    ENDS_WITH_IC = ("ENDS_WITH_IC", 2),
    STRING_CONTAINS = ("STRING_CONTAINS", 2),
    STRING_CONTAINS_IC = ("STRING_CONTAINS_IC", 2),
    EQ_IGNORE_CASE = ("EQ_IGNORE_CASE", 2),
    STRING_LENGTH = ("STRING_LENGTH", 1),
    STRING_IS_EMPTY = ("STRING_IS_EMPTY", 1),
    SUBSTR_1ARG = ("SUBSTR_1ARG", 2),
    SUBSTR_2ARGS = ("SUBSTR_2ARGS", 3),
    INDEX_OF = ("INDEX_OF", 2),
    CHAR_AT = ("CHAR_AT", 2),
);

// collection
operators!(Collection:
    COL_SIZE = ("COL_SIZE", 1),
    COL_IS_EMPTY = ("COL_IS_EMPTY", 1),
    MEMBER_OF = ("MEMBER_OF", 2),
);

// date and time
operators!(DateTime:
    CURRENT_DATE = ("CURRENT_DATE", 0),
    CURRENT_TIME = ("CURRENT_TIME", 0),
    CURRENT_TIMESTAMP = ("CURRENT_TIMESTAMP", 0),
    YEAR = ("YEAR", 1),
    MONTH = ("MONTH", 1),
    DAY_OF_MONTH = ("DAY_OF_MONTH", 1),
);

// control
//
// A simple `case` is a `CASE_EQ` over the subject and a chain of
// `CASE_EQ_WHEN` nodes (value, result, rest) ending in `CASE_EQ_ELSE`.
operators!(Control:
    CASE_EQ = ("CASE_EQ", 2),
    CASE_EQ_WHEN = ("CASE_EQ_WHEN", 3),
    CASE_EQ_ELSE = ("CASE_EQ_ELSE", 1),
    CAST = ("CAST", 2),
);

/// Pseudo-operators used to render path nodes.
///
/// Operand 0 of the parented kinds is the parent path; the last operand is
/// the name, index or key.
pub mod path {
    use super::{Category, Operator};

    operators!(Path:
        VARIABLE = ("PATH_VARIABLE", 1),
        ROOT = ("PATH_ROOT", 1),
        PROPERTY = ("PATH_PROPERTY", 2),
        LIST_VALUE = ("PATH_LIST_VALUE", 2),
        MAP_VALUE = ("PATH_MAP_VALUE", 2),
    );
}

/// Every built-in operator.
pub const BUILTIN: &[Operator] = &[
    AND, OR, NOT, XOR, XNOR,
    EQ, NE, LT, GT, LOE, GOE, BETWEEN, IN, IS_NULL, IS_NOT_NULL, INSTANCE_OF,
    ADD, SUB, MULT, DIV, MOD, NEGATE, ABS, SQRT,
    CONCAT, LOWER, UPPER, TRIM, LIKE, MATCHES, STARTS_WITH, STARTS_WITH_IC, ENDS_WITH,
    ENDS_WITH_IC, STRING_CONTAINS, STRING_CONTAINS_IC, EQ_IGNORE_CASE, STRING_LENGTH,
    STRING_IS_EMPTY, SUBSTR_1ARG, SUBSTR_2ARGS, INDEX_OF, CHAR_AT,
    COL_SIZE, COL_IS_EMPTY, MEMBER_OF,
    CURRENT_DATE, CURRENT_TIME, CURRENT_TIMESTAMP, YEAR, MONTH, DAY_OF_MONTH,
    CASE_EQ, CASE_EQ_WHEN, CASE_EQ_ELSE, CAST,
    path::VARIABLE, path::ROOT, path::PROPERTY, path::LIST_VALUE, path::MAP_VALUE,
];

/// Finds a built-in operator by name.
#[must_use]
pub fn lookup(name: &str) -> Option<Operator> {
    BUILTIN.iter().copied().find(|op| op.name == name)
}

/// The set of operators a dialect may register templates for.
#[derive(Debug, Clone)]
pub struct OperatorCatalog {
    operators: BTreeMap<&'static str, Operator>,
}

impl OperatorCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            operators: BTreeMap::new(),
        }
    }

    /// Creates a catalog holding every built-in operator.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            operators: BUILTIN.iter().map(|op| (op.name, *op)).collect(),
        }
    }

    /// Adds an operator.
    ///
    /// Re-declaring an operator with the same signature is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::ConflictingOperator`] when an operator with the
    /// same name but a different arity or category is already present.
    pub fn declare(&mut self, operator: Operator) -> Result<(), DialectError> {
        match self.operators.get(operator.name) {
            Some(existing) if !existing.same_signature(&operator) => {
                Err(DialectError::ConflictingOperator(operator.name))
            }
            Some(_) => Ok(()),
            None => {
                self.operators.insert(operator.name, operator);
                Ok(())
            }
        }
    }

    /// Returns whether the operator is part of the catalog with a matching
    /// signature.
    #[must_use]
    pub fn contains(&self, operator: &Operator) -> bool {
        self.operators
            .get(operator.name)
            .is_some_and(|existing| existing.same_signature(operator))
    }

    /// Looks up an operator by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Operator> {
        self.operators.get(name).copied()
    }

    /// Iterates over the operators, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    /// Returns the number of operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
