//! Built-in template tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{hooks, Dialect, DialectBuilder, DialectHooks};
use crate::error::DialectError;
use crate::ops::{self, Operator};
use crate::template::precedence as prec;

type Row = (Operator, &'static str, Option<i32>);

/// Templates shared by every built-in dialect. Patterns follow JPQL.
const BASE: &[Row] = &[
    // boolean
    (ops::AND, "{0} and {1}", Some(prec::AND)),
    (ops::OR, "{0} or {1}", Some(prec::OR)),
    (ops::NOT, "not {0}", Some(prec::NOT)),
    // comparison
    (ops::EQ, "{0} = {1}", None),
    (ops::NE, "{0} != {1}", None),
    (ops::LT, "{0} < {1}", None),
    (ops::GT, "{0} > {1}", None),
    (ops::LOE, "{0} <= {1}", None),
    (ops::GOE, "{0} >= {1}", None),
    (ops::BETWEEN, "{0} between {1} and {2}", None),
    (ops::IN, "{0} in {1}", None),
    (ops::IS_NULL, "{0} is null", None),
    (ops::IS_NOT_NULL, "{0} is not null", None),
    (ops::INSTANCE_OF, "type({0}) = {1}", None),
    // arithmetic
    (ops::ADD, "{0} + {1}", Some(prec::ADDITIVE)),
    (ops::SUB, "{0} - {1}", Some(prec::ADDITIVE)),
    (ops::MULT, "{0} * {1}", Some(prec::MULTIPLICATIVE)),
    (ops::DIV, "{0} / {1}", Some(prec::MULTIPLICATIVE)),
    (ops::MOD, "mod({0},{1})", None),
    (ops::NEGATE, "-{0}", Some(prec::UNARY)),
    (ops::ABS, "abs({0})", None),
    (ops::SQRT, "sqrt({0})", None),
    // string
    (ops::CONCAT, "concat({0},{1})", None),
    (ops::LOWER, "lower({0})", None),
    (ops::UPPER, "upper({0})", None),
    (ops::TRIM, "trim({0})", None),
    (ops::LIKE, "{0} like {1}", Some(prec::LIKE)),
    (ops::MATCHES, "{0} like {1}", Some(prec::LIKE)),
    (ops::STARTS_WITH, "{0} like {1%}", Some(prec::LIKE)),
    (ops::STARTS_WITH_IC, "{0l} like {1%%}", Some(prec::LIKE)),
    (ops::ENDS_WITH, "{0} like {%1}", Some(prec::LIKE)),
    (ops::ENDS_WITH_IC, "{0l} like {%%1}", Some(prec::LIKE)),
    (ops::STRING_CONTAINS, "{0} like {%1%}", Some(prec::LIKE)),
    (ops::STRING_CONTAINS_IC, "{0l} like {%%1%%}", Some(prec::LIKE)),
    (ops::EQ_IGNORE_CASE, "{0l} = {1l}", Some(prec::COMPARISON)),
    (ops::STRING_LENGTH, "length({0})", None),
    (ops::STRING_IS_EMPTY, "length({0}) = 0", Some(prec::COMPARISON)),
    (ops::SUBSTR_1ARG, "substring({0},{1}+1)", None),
    (ops::SUBSTR_2ARGS, "substring({0},{1}+1,{2})", None),
    (ops::INDEX_OF, "locate({1},{0}) - 1", Some(prec::ADDITIVE)),
    (ops::CHAR_AT, "cast(substring({0},{1}+1,1) as char)", None),
    // collection
    (ops::COL_SIZE, "size({0})", None),
    (ops::COL_IS_EMPTY, "{0} is empty", Some(prec::COMPARISON)),
    (ops::MEMBER_OF, "{0} member of {1}", Some(prec::COMPARISON)),
    // date and time
    (ops::CURRENT_DATE, "current_date", None),
    (ops::CURRENT_TIME, "current_time", None),
    (ops::CURRENT_TIMESTAMP, "current_timestamp", None),
    (ops::YEAR, "year({0})", None),
    (ops::MONTH, "month({0})", None),
    (ops::DAY_OF_MONTH, "day({0})", None),
    // control
    (ops::CASE_EQ, "case {0} {1} end", Some(prec::CALL)),
    (ops::CASE_EQ_WHEN, "when {0} then {1} {2}", Some(prec::CALL)),
    (ops::CASE_EQ_ELSE, "else {0}", Some(prec::CALL)),
    (ops::CAST, "cast({0} as {1s})", None),
    // paths
    (ops::path::VARIABLE, "{0s}", None),
    (ops::path::ROOT, "{0s}", None),
    (ops::path::PROPERTY, "{0}.{1s}", None),
    (ops::path::LIST_VALUE, "{0}[{1}]", None),
    (ops::path::MAP_VALUE, "{0}[{1}]", None),
];

const JPQL: &[Row] = &[(ops::NE, "{0} <> {1}", None)];

const HQL: &[Row] = &[
    (ops::XOR, "({0} or {1}) and not ({0} and {1})", Some(prec::AND)),
    (ops::XNOR, "({0} and {1}) or not ({0} or {1})", Some(prec::OR)),
    (ops::INSTANCE_OF, "{0}.class = {1}", None),
];

const SQL: &[Row] = &[
    (ops::NE, "{0} <> {1}", None),
    (ops::CONCAT, "{0} || {1}", Some(prec::ADDITIVE)),
    (ops::MOD, "{0} % {1}", Some(prec::MULTIPLICATIVE)),
    (ops::STRING_LENGTH, "char_length({0})", None),
    (ops::STRING_IS_EMPTY, "char_length({0}) = 0", Some(prec::COMPARISON)),
    (ops::INDEX_OF, "position({1} in {0}) - 1", Some(prec::ADDITIVE)),
    (ops::STARTS_WITH, "{0} like {1%} escape '\\'", Some(prec::LIKE)),
    (ops::STARTS_WITH_IC, "{0l} like {1%%} escape '\\'", Some(prec::LIKE)),
    (ops::ENDS_WITH, "{0} like {%1} escape '\\'", Some(prec::LIKE)),
    (ops::ENDS_WITH_IC, "{0l} like {%%1} escape '\\'", Some(prec::LIKE)),
    (ops::STRING_CONTAINS, "{0} like {%1%} escape '\\'", Some(prec::LIKE)),
    (ops::STRING_CONTAINS_IC, "{0l} like {%%1%%} escape '\\'", Some(prec::LIKE)),
    (ops::DAY_OF_MONTH, "extract(day from {0})", None),
    (ops::YEAR, "extract(year from {0})", None),
    (ops::MONTH, "extract(month from {0})", None),
];

/// Returns a builder holding the shared template table.
///
/// # Errors
///
/// Propagates registration errors.
pub fn base_builder(name: impl Into<String>) -> Result<DialectBuilder, DialectError> {
    let mut builder = Dialect::builder(name);
    builder.register_all(BASE)?;
    Ok(builder)
}

/// The dialects shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinDialect {
    /// Java Persistence Query Language.
    Jpql,
    /// Hibernate Query Language.
    Hql,
    /// Generic SQL.
    Sql,
}

impl BuiltinDialect {
    /// All built-in dialects.
    pub const ALL: [Self; 3] = [Self::Jpql, Self::Hql, Self::Sql];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jpql => "jpql",
            Self::Hql => "hql",
            Self::Sql => "sql",
        }
    }

    /// Returns a builder pre-populated with this dialect's templates and
    /// hooks, for further customization.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn builder(self, name: impl Into<String>) -> Result<DialectBuilder, DialectError> {
        let mut builder = base_builder(name)?;
        match self {
            Self::Jpql => {
                builder.override_all(JPQL)?;
            }
            Self::Hql => {
                builder.override_all(JPQL)?.override_all(HQL)?.hooks(
                    DialectHooks::default()
                        .with_wrap_elements(hooks::in_lists)
                        .with_type_as_string(hooks::string_type_test),
                );
            }
            Self::Sql => {
                builder.override_all(SQL)?.hooks(
                    DialectHooks::default()
                        .with_wrap_elements(hooks::in_lists)
                        .with_type_as_string(hooks::string_type_test),
                );
            }
        }
        Ok(builder)
    }

    /// Builds the dialect.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn build(self) -> Result<Dialect, DialectError> {
        self.builder(self.name())?.build()
    }
}

impl fmt::Display for BuiltinDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinDialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DialectError::UnknownDialect(s.to_string()))
    }
}
