//! Expression tree types.
//!
//! Trees are made of three node kinds: [`Path`], [`Operation`] and
//! [`Constant`]. Nodes are immutable once built and subtrees are shared
//! through [`Arc`], so cloning an [`Expression`] is cheap and trees can be
//! read from any thread.

mod constant;
mod dsl;
mod operation;
mod path;

pub use constant::Constant;
pub(crate) use constant::quote;
pub use operation::Operation;
pub use path::{ElementKind, Path, PathElement, PathMetadata, PathType};

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// A path.
    Path(Arc<Path>),
    /// An operation.
    Operation(Arc<Operation>),
    /// A literal.
    Constant(Constant),
}

impl Expression {
    /// Creates a variable path expression for hand-built trees.
    #[must_use]
    pub fn variable(name: &str) -> Self {
        Self::Path(Path::variable(name, ElementKind::Entity(name.to_string())))
    }

    /// Creates a constant expression.
    #[must_use]
    pub fn constant(value: impl Into<Constant>) -> Self {
        Self::Constant(value.into())
    }

    /// Returns the path, if this is one.
    #[must_use]
    pub const fn as_path(&self) -> Option<&Arc<Path>> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the operation, if this is one.
    #[must_use]
    pub const fn as_operation(&self) -> Option<&Arc<Operation>> {
        match self {
            Self::Operation(operation) => Some(operation),
            _ => None,
        }
    }

    /// Returns the constant, if this is one.
    #[must_use]
    pub const fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Constant(constant) => Some(constant),
            _ => None,
        }
    }
}

impl From<Arc<Path>> for Expression {
    fn from(path: Arc<Path>) -> Self {
        Self::Path(path)
    }
}

impl From<&Arc<Path>> for Expression {
    fn from(path: &Arc<Path>) -> Self {
        Self::Path(Arc::clone(path))
    }
}

impl From<Path> for Expression {
    fn from(path: Path) -> Self {
        Self::Path(Arc::new(path))
    }
}

impl From<Operation> for Expression {
    fn from(operation: Operation) -> Self {
        Self::Operation(Arc::new(operation))
    }
}

impl From<Constant> for Expression {
    fn from(constant: Constant) -> Self {
        Self::Constant(constant)
    }
}

macro_rules! constant_expression {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(value: $ty) -> Self {
                    Self::Constant(Constant::from(value))
                }
            }
        )+
    };
}

constant_expression!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    char,
    &str,
    String,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
);
