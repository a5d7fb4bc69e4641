//! # oxide-query-core
//!
//! Dialect-independent query expressions captured from typed navigation.
//!
//! This crate provides:
//! - An operator catalog and a template registry that maps every operator to
//!   a rendering pattern with a precedence, per query dialect
//! - An immutable expression tree of paths, operations and constants
//! - A renderer that turns a tree into dialect text with minimal parentheses
//! - An alias session that records navigation over a domain model as paths
//!
//! ## Building and rendering
//!
//! ```rust
//! use oxide_query_core::{Dialect, Expression};
//!
//! let x = Expression::variable("x");
//! let y = Expression::variable("y");
//! let z = Expression::variable("z");
//! let condition = x.eq(1).and(y.eq(2).or(z.eq(3)));
//!
//! let jpql = Dialect::jpql().unwrap();
//! assert_eq!(jpql.render(&condition).unwrap(), "x = 1 and (y = 2 or z = 3)");
//! ```
//!
//! ## Wildcards are escaped
//!
//! Pattern helpers escape `%` and `_` in user input before adding their own
//! wildcards:
//!
//! ```rust
//! use oxide_query_core::{Dialect, Expression};
//!
//! let expr = Expression::variable("x").starts_with("ab%c");
//! let jpql = Dialect::jpql().unwrap();
//! assert_eq!(jpql.render(&expr).unwrap(), r"x like 'ab\%c%'");
//! ```
//!
//! ## Custom dialects
//!
//! ```rust
//! use oxide_query_core::{ops, BuiltinDialect, Expression};
//!
//! let mut builder = BuiltinDialect::Jpql.builder("shouting").unwrap();
//! builder.override_template(ops::AND, "{0} AND {1}", None).unwrap();
//! let dialect = builder.build().unwrap();
//!
//! let expr = Expression::variable("a").eq(1).and(Expression::variable("b").eq(2));
//! assert_eq!(dialect.render(&expr).unwrap(), "a = 1 AND b = 2");
//! ```

pub mod alias;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod expr;
pub mod ops;
pub mod render;
pub mod template;

pub use alias::{AliasId, AliasSession, Navigation};
pub use dialect::{BuiltinDialect, Dialect, DialectBuilder, DialectConfig, DialectHooks};
pub use domain::{Domain, TypeInfo};
pub use error::{AliasError, DialectError, Error, ExpressionError, RenderError, Result};
pub use expr::{Constant, Expression, Operation, Path, PathMetadata, PathType};
pub use ops::Operator;
pub use render::render;
pub use template::Template;
