//! Query dialects.
//!
//! A [`Dialect`] maps operators to [`Template`]s and carries the
//! [`DialectHooks`] the renderer consults for quoting and grouping decisions.
//! Dialects are assembled once through a [`DialectBuilder`], which validates
//! every registration as it happens, and are immutable afterwards. They are
//! `Send + Sync` and can be shared freely.

mod builtin;
mod config;
pub mod hooks;

pub use builtin::{base_builder, BuiltinDialect};
pub use config::{ConstantQuoting, DialectConfig, TemplateConfig};
pub use hooks::DialectHooks;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{DialectError, RenderError};
use crate::expr::Expression;
use crate::ops::{self, Operator, OperatorCatalog};
use crate::render::Renderer;
use crate::template::{default_precedence, ArityProblem, CaseFold, Template, Wildcard};

/// The escape character used for wildcard literals unless configured
/// otherwise.
pub const DEFAULT_ESCAPE: char = '\\';

/// An operator together with its template.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    operator: Operator,
    template: Template,
}

impl TemplateEntry {
    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the template.
    #[must_use]
    pub const fn template(&self) -> &Template {
        &self.template
    }
}

/// A complete, immutable set of templates plus override hooks.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    templates: HashMap<&'static str, TemplateEntry>,
    hooks: DialectHooks,
    escape: char,
}

impl Dialect {
    /// Starts an empty dialect over the built-in operator catalog.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> DialectBuilder {
        DialectBuilder::new(name)
    }

    /// Starts a new dialect pre-populated with this dialect's templates,
    /// hooks and escape character.
    #[must_use]
    pub fn derive(&self, name: impl Into<String>) -> DialectBuilder {
        let mut catalog = OperatorCatalog::builtin();
        for entry in self.templates.values() {
            // operators already registered here passed the same check
            let _ = catalog.declare(entry.operator);
        }
        DialectBuilder {
            name: name.into(),
            catalog,
            templates: self.templates.clone(),
            hooks: self.hooks,
            escape: self.escape,
        }
    }

    /// The JPQL dialect.
    ///
    /// # Errors
    ///
    /// Propagates registration errors; the built-in tables are expected to be
    /// valid.
    pub fn jpql() -> Result<Self, DialectError> {
        BuiltinDialect::Jpql.build()
    }

    /// The HQL dialect.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn hql() -> Result<Self, DialectError> {
        BuiltinDialect::Hql.build()
    }

    /// A generic SQL dialect.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn sql() -> Result<Self, DialectError> {
        BuiltinDialect::Sql.build()
    }

    /// Returns the dialect name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the template registered for `operator`.
    #[must_use]
    pub fn template(&self, operator: &Operator) -> Option<&Template> {
        self.templates
            .get(operator.name())
            .filter(|entry| entry.operator == *operator)
            .map(|entry| &entry.template)
    }

    /// Iterates over all registrations, ordered by operator name.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateEntry> {
        let mut entries: Vec<&TemplateEntry> = self.templates.values().collect();
        entries.sort_by_key(|entry| entry.operator.name());
        entries.into_iter()
    }

    /// Returns the number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns the hooks.
    #[must_use]
    pub const fn hooks(&self) -> &DialectHooks {
        &self.hooks
    }

    /// Returns the wildcard escape character.
    #[must_use]
    pub const fn escape(&self) -> char {
        self.escape
    }

    /// Whether a list operand of `operator` is wrapped in parentheses.
    #[must_use]
    pub fn wrap_elements(&self, operator: &Operator) -> bool {
        (self.hooks.wrap_elements)(operator)
    }

    /// Whether `constant` is written as a quoted literal.
    #[must_use]
    pub fn wrap_constant(&self, constant: &crate::expr::Constant) -> bool {
        (self.hooks.wrap_constant)(constant)
    }

    /// Whether type tests use string literals.
    #[must_use]
    pub fn is_type_as_string(&self) -> bool {
        (self.hooks.type_as_string)()
    }

    /// Returns a variant of this dialect whose templates have every
    /// whitespace run containing a line break collapsed to one space.
    #[must_use]
    pub fn new_line_to_single_space(&self) -> Self {
        let templates = self
            .templates
            .iter()
            .map(|(name, entry)| {
                (
                    *name,
                    TemplateEntry {
                        operator: entry.operator,
                        template: entry.template.single_line(),
                    },
                )
            })
            .collect();
        Self {
            name: self.name.clone(),
            templates,
            hooks: self.hooks,
            escape: self.escape,
        }
    }

    /// Renders an expression tree.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingTemplate`] when the tree uses an operator
    /// this dialect has no template for.
    pub fn render(&self, expression: &Expression) -> Result<String, RenderError> {
        Renderer::new(self).render(expression)
    }
}

/// Assembles a [`Dialect`], validating each registration immediately.
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    name: String,
    catalog: OperatorCatalog,
    templates: HashMap<&'static str, TemplateEntry>,
    hooks: DialectHooks,
    escape: char,
}

impl DialectBuilder {
    /// Creates an empty builder over the built-in operator catalog.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: OperatorCatalog::builtin(),
            templates: HashMap::new(),
            hooks: DialectHooks::default(),
            escape: DEFAULT_ESCAPE,
        }
    }

    /// Adds a custom operator to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::ConflictingOperator`] when the name is taken by
    /// an operator with another signature.
    pub fn declare_operator(&mut self, operator: Operator) -> Result<&mut Self, DialectError> {
        self.catalog.declare(operator)?;
        Ok(self)
    }

    /// Registers the template for an operator.
    ///
    /// The precedence defaults from the operator category when `None`.
    ///
    /// # Errors
    ///
    /// Fails when the operator is unknown or already registered, when the
    /// pattern does not parse, or when its distinct placeholders do not
    /// cover exactly the operands `0..arity`.
    pub fn register(
        &mut self,
        operator: Operator,
        pattern: &str,
        precedence: impl Into<Option<i32>>,
    ) -> Result<&mut Self, DialectError> {
        if self.templates.contains_key(operator.name()) {
            return Err(DialectError::DuplicateOperator(operator.name()));
        }
        self.insert(operator, pattern, precedence.into())
    }

    /// Replaces the template for an operator, registering it if absent.
    ///
    /// # Errors
    ///
    /// Same validation as [`register`](Self::register), minus the duplicate
    /// check.
    pub fn override_template(
        &mut self,
        operator: Operator,
        pattern: &str,
        precedence: impl Into<Option<i32>>,
    ) -> Result<&mut Self, DialectError> {
        self.insert(operator, pattern, precedence.into())
    }

    /// Registers a table of `(operator, pattern, precedence)` rows.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected row.
    pub fn register_all(
        &mut self,
        rows: &[(Operator, &str, Option<i32>)],
    ) -> Result<&mut Self, DialectError> {
        for &(operator, pattern, precedence) in rows {
            self.register(operator, pattern, precedence)?;
        }
        Ok(self)
    }

    /// Overrides a table of `(operator, pattern, precedence)` rows.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected row.
    pub fn override_all(
        &mut self,
        rows: &[(Operator, &str, Option<i32>)],
    ) -> Result<&mut Self, DialectError> {
        for &(operator, pattern, precedence) in rows {
            self.override_template(operator, pattern, precedence)?;
        }
        Ok(self)
    }

    /// Returns the hooks configured so far.
    #[must_use]
    pub const fn current_hooks(&self) -> DialectHooks {
        self.hooks
    }

    /// Sets the hooks.
    pub fn hooks(&mut self, hooks: DialectHooks) -> &mut Self {
        self.hooks = hooks;
        self
    }

    /// Sets the wildcard escape character.
    pub fn escape(&mut self, escape: char) -> &mut Self {
        self.escape = escape;
        self
    }

    fn insert(
        &mut self,
        operator: Operator,
        pattern: &str,
        precedence: Option<i32>,
    ) -> Result<&mut Self, DialectError> {
        if !self.catalog.contains(&operator) {
            return Err(DialectError::UnknownOperator(operator.name().to_string()));
        }
        let template = Template::parse(pattern, precedence.unwrap_or_default()).map_err(|source| {
            DialectError::Template {
                operator: operator.name(),
                source,
            }
        })?;
        let template = match precedence {
            Some(_) => template,
            None => {
                let inferred = default_precedence(operator.category(), &template);
                template.with_precedence(inferred)
            }
        };
        template.check_arity(&operator).map_err(|problem| match problem {
            ArityProblem::Count(placeholders) => DialectError::ArityMismatch {
                operator: operator.name(),
                arity: operator.arity(),
                placeholders,
                pattern: pattern.to_string(),
            },
            ArityProblem::OutOfRange(index) => DialectError::PlaceholderOutOfRange {
                operator: operator.name(),
                index,
                arity: operator.arity(),
            },
        })?;
        self.templates
            .insert(operator.name(), TemplateEntry { operator, template });
        Ok(self)
    }

    /// Finishes the dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingDependency`] when a registered template
    /// relies on a template that is absent: every path kind needs its path
    /// template, case modifiers need `LOWER`/`UPPER` and wildcard modifiers
    /// need `CONCAT`.
    pub fn build(self) -> Result<Dialect, DialectError> {
        let required_paths = [
            (ops::path::VARIABLE, "variable paths"),
            (ops::path::ROOT, "root paths"),
            (ops::path::PROPERTY, "property paths"),
            (ops::path::LIST_VALUE, "list value paths"),
            (ops::path::MAP_VALUE, "map value paths"),
            (ops::COL_SIZE, "size paths"),
        ];
        for (operator, required_by) in required_paths {
            self.require(operator, required_by)?;
        }
        for entry in self.templates.values() {
            for placeholder in entry.template.placeholders() {
                match placeholder.case {
                    CaseFold::Lower => self.require(ops::LOWER, entry.operator.name())?,
                    CaseFold::Upper => self.require(ops::UPPER, entry.operator.name())?,
                    CaseFold::None => {}
                }
                if placeholder.wildcard != Wildcard::None {
                    self.require(ops::CONCAT, entry.operator.name())?;
                }
            }
        }

        debug!(
            dialect = %self.name,
            templates = self.templates.len(),
            "dialect built"
        );
        Ok(Dialect {
            name: self.name,
            templates: self.templates,
            hooks: self.hooks,
            escape: self.escape,
        })
    }

    fn require(&self, operator: Operator, required_by: &'static str) -> Result<(), DialectError> {
        if self.templates.contains_key(operator.name()) {
            Ok(())
        } else {
            Err(DialectError::MissingDependency {
                dialect: self.name.clone(),
                missing: operator.name(),
                required_by,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Category;
    use crate::template::precedence;

    fn minimal() -> DialectBuilder {
        let mut builder = Dialect::builder("minimal");
        builder
            .register_all(&[
                (ops::path::VARIABLE, "{0s}", None),
                (ops::path::ROOT, "{0s}", None),
                (ops::path::PROPERTY, "{0}.{1s}", None),
                (ops::path::LIST_VALUE, "{0}[{1}]", None),
                (ops::path::MAP_VALUE, "{0}[{1}]", None),
                (ops::COL_SIZE, "size({0})", None),
            ])
            .unwrap();
        builder
    }

    #[test]
    fn test_register_and_build() {
        let mut builder = minimal();
        builder.register(ops::AND, "{0} and {1}", None).unwrap();
        let dialect = builder.build().unwrap();
        let and = dialect.template(&ops::AND).unwrap();
        assert_eq!(and.pattern(), "{0} and {1}");
        assert_eq!(and.precedence(), precedence::AND);
        assert_eq!(dialect.len(), 7);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let mut builder = minimal();
        let err = builder.register(ops::EQ, "{0} = {0}", None).unwrap_err();
        assert_eq!(
            err,
            DialectError::ArityMismatch {
                operator: "EQ",
                arity: 2,
                placeholders: 1,
                pattern: "{0} = {0}".into(),
            }
        );
        let err = builder.register(ops::NOT, "not {1}", None).unwrap_err();
        assert_eq!(
            err,
            DialectError::PlaceholderOutOfRange {
                operator: "NOT",
                index: 1,
                arity: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_rejected_override_allowed() {
        let mut builder = minimal();
        builder.register(ops::NE, "{0} != {1}", None).unwrap();
        assert_eq!(
            builder.register(ops::NE, "{0} <> {1}", None).unwrap_err(),
            DialectError::DuplicateOperator("NE")
        );
        builder.override_template(ops::NE, "{0} <> {1}", None).unwrap();
        let dialect = builder.build().unwrap();
        assert_eq!(dialect.template(&ops::NE).unwrap().pattern(), "{0} <> {1}");
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let mut builder = minimal();
        let custom = Operator::new("MEMBER_OF_ANY", 2, Category::Collection);
        assert_eq!(
            builder.register(custom, "{0} member of any {1}", None).unwrap_err(),
            DialectError::UnknownOperator("MEMBER_OF_ANY".into())
        );
        builder.declare_operator(custom).unwrap();
        builder.register(custom, "{0} member of any {1}", None).unwrap();
        assert!(builder.build().unwrap().template(&custom).is_some());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut builder = minimal();
        assert!(matches!(
            builder.register(ops::OR, "{0} or {1", None),
            Err(DialectError::Template { operator: "OR", .. })
        ));
    }

    #[test]
    fn test_missing_dependencies() {
        let err = Dialect::builder("empty").build().unwrap_err();
        assert!(matches!(
            err,
            DialectError::MissingDependency { missing: "PATH_VARIABLE", .. }
        ));

        let mut builder = minimal();
        builder.register(ops::STARTS_WITH, "{0} like {1%}", None).unwrap();
        assert_eq!(
            builder.clone().build().unwrap_err(),
            DialectError::MissingDependency {
                dialect: "minimal".into(),
                missing: "CONCAT",
                required_by: "STARTS_WITH",
            }
        );
        builder.register(ops::CONCAT, "{0} || {1}", None).unwrap();
        assert!(builder.build().is_ok());

        let mut builder = minimal();
        builder.register(ops::EQ_IGNORE_CASE, "{0l} = {1l}", None).unwrap();
        assert!(matches!(
            builder.build(),
            Err(DialectError::MissingDependency { missing: "LOWER", .. })
        ));
    }

    #[test]
    fn test_derive_keeps_templates() {
        let mut builder = minimal();
        builder.register(ops::EQ, "{0} = {1}", None).unwrap();
        let base = builder.build().unwrap();
        let mut derived = base.derive("derived");
        derived.override_template(ops::EQ, "{0} == {1}", None).unwrap();
        let derived = derived.build().unwrap();
        assert_eq!(derived.name(), "derived");
        assert_eq!(base.template(&ops::EQ).unwrap().pattern(), "{0} = {1}");
        assert_eq!(derived.template(&ops::EQ).unwrap().pattern(), "{0} == {1}");
    }

    #[test]
    fn test_new_line_to_single_space() {
        let mut builder = minimal();
        builder
            .register(ops::BETWEEN, "{0}\n  between {1}\n  and {2}", None)
            .unwrap();
        let dialect = builder.build().unwrap();
        let flat = dialect.new_line_to_single_space();
        assert_eq!(
            flat.template(&ops::BETWEEN).unwrap().pattern(),
            "{0} between {1} and {2}"
        );
        // the source dialect is untouched
        assert!(dialect.template(&ops::BETWEEN).unwrap().pattern().contains('\n'));
    }

    #[test]
    fn test_dialect_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dialect>();
    }
}
