//! Error types for query construction and rendering.

use thiserror::Error;

/// Errors raised while parsing a template pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{` was opened but never closed.
    #[error("unterminated placeholder at byte {position} in pattern '{pattern}'")]
    Unterminated {
        /// The offending pattern.
        pattern: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A placeholder did not match `{[%[%]]N[%[%]][l|u|s]}`.
    #[error("invalid placeholder '{element}' in pattern '{pattern}'")]
    InvalidPlaceholder {
        /// The offending pattern.
        pattern: String,
        /// The placeholder text, braces included.
        element: String,
    },
}

/// Registration-time errors. Any of these prevents a dialect from being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// The operator is not part of the builder's catalog.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// The operator already has a template in this dialect.
    #[error("operator '{0}' is already registered")]
    DuplicateOperator(&'static str),

    /// A custom operator clashes with a catalog entry of the same name.
    #[error("operator '{0}' is already declared with a different signature")]
    ConflictingOperator(&'static str),

    /// The pattern does not reference exactly `arity` distinct operands.
    #[error(
        "template '{pattern}' for '{operator}' references {placeholders} distinct operands, \
         operator arity is {arity}"
    )]
    ArityMismatch {
        /// Operator name.
        operator: &'static str,
        /// Declared operand count.
        arity: usize,
        /// Distinct placeholder indices found.
        placeholders: usize,
        /// The rejected pattern.
        pattern: String,
    },

    /// A placeholder index is outside `0..arity`.
    #[error("template for '{operator}' references operand {index}, operator arity is {arity}")]
    PlaceholderOutOfRange {
        /// Operator name.
        operator: &'static str,
        /// The offending index.
        index: usize,
        /// Declared operand count.
        arity: usize,
    },

    /// The pattern could not be parsed.
    #[error("invalid template for '{operator}': {source}")]
    Template {
        /// Operator name.
        operator: &'static str,
        /// Parse failure.
        #[source]
        source: TemplateError,
    },

    /// No built-in dialect has this name.
    #[error("unknown dialect '{0}', expected one of: jpql, hql, sql")]
    UnknownDialect(String),

    /// A template relies on another operator the dialect does not define.
    #[error("dialect '{dialect}' has no template for '{missing}', required by '{required_by}'")]
    MissingDependency {
        /// Dialect name.
        dialect: String,
        /// The operator without a template.
        missing: &'static str,
        /// The template or path kind needing it.
        required_by: &'static str,
    },
}

/// Errors raised while assembling expression nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// Operand count differs from the operator's arity.
    #[error("operator '{operator}' takes {expected} operands, got {actual}")]
    ArityMismatch {
        /// Operator name.
        operator: &'static str,
        /// Declared arity.
        expected: usize,
        /// Supplied operand count.
        actual: usize,
    },

    /// A path node was described without the parent its kind requires, or with
    /// one it must not have.
    #[error("invalid {path_type} path metadata: {reason}")]
    InvalidPath {
        /// The path kind.
        path_type: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A serialized operation named an operator outside the built-in catalog.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}

/// Misuse of the alias path builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// Navigation on an alias whose root path was never bound.
    #[error("alias {alias} has no bound path (navigating '{property}')")]
    Unbound {
        /// Description of the alias.
        alias: String,
        /// The property being navigated.
        property: String,
    },

    /// The handle belongs to another session or does not exist.
    #[error("alias {0} does not belong to this session")]
    ForeignAlias(String),

    /// The alias is already bound to a path.
    #[error("alias {0} is already bound")]
    AlreadyBound(String),

    /// The entity type has no such property.
    #[error("type '{type_name}' has no property '{property}'")]
    UnknownProperty {
        /// Entity type name.
        type_name: String,
        /// Requested property.
        property: String,
    },

    /// Property navigation on an alias that is not an entity.
    #[error("alias {alias} of type '{type_name}' has no properties")]
    NotAnEntity {
        /// Description of the alias.
        alias: String,
        /// Its type name.
        type_name: String,
    },

    /// Size navigation on an alias that is neither a collection nor a map.
    #[error("alias {alias} of type '{type_name}' is not a collection")]
    NotACollection {
        /// Description of the alias.
        alias: String,
        /// Its type name.
        type_name: String,
    },

    /// Index navigation on an alias that is not a list.
    #[error("alias {alias} of type '{type_name}' is not a list")]
    NotAList {
        /// Description of the alias.
        alias: String,
        /// Its type name.
        type_name: String,
    },

    /// Key navigation on an alias that is not a map.
    #[error("alias {alias} of type '{type_name}' is not a map")]
    NotAMap {
        /// Description of the alias.
        alias: String,
        /// Its type name.
        type_name: String,
    },

    /// An enumerated type without members cannot yield a representative value.
    #[error("enum '{0}' declares no members")]
    EmptyEnum(&'static str),

    /// `capture` was called before any navigation happened.
    #[error("no navigation has been captured")]
    NothingCaptured,
}

/// Rendering defects. These indicate inconsistent wiring between the
/// operator catalog and a dialect, never bad user data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The dialect has no template for the operator.
    #[error("dialect '{dialect}' has no template for operator '{operator}'")]
    MissingTemplate {
        /// Dialect name.
        dialect: String,
        /// Operator name.
        operator: &'static str,
    },

    /// A template references an operand the operation does not have.
    #[error("template for '{operator}' references operand {index}, operation has {available}")]
    MissingOperand {
        /// Operator name.
        operator: &'static str,
        /// The referenced index.
        index: usize,
        /// Operands present.
        available: usize,
    },

    /// A list index does not fit the integer literal type.
    #[error("list index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Errors raised while loading a dialect configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid JSON for a dialect configuration.
    #[error("invalid dialect configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured templates were rejected.
    #[error(transparent)]
    Dialect(#[from] DialectError),
}

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Template syntax error.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Dialect registration error.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// Expression construction error.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Alias misuse.
    #[error(transparent)]
    Alias(#[from] AliasError),

    /// Rendering defect.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
