//! Dialects described in JSON.
//!
//! ```json
//! {
//!   "name": "jpql-flat",
//!   "base": "jpql",
//!   "quote_constants": "all",
//!   "templates": [{ "operator": "NE", "pattern": "{0} != {1}" }],
//!   "normalize_whitespace": true
//! }
//! ```
//!
//! Configured templates replace those of the base dialect and go through the
//! same validation as programmatic registrations.

use serde::{Deserialize, Serialize};

use super::{hooks, BuiltinDialect, Dialect};
use crate::error::{ConfigError, DialectError};
use crate::ops::Operator;

/// Which constants are written as quoted literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantQuoting {
    /// Strings, characters, temporal values and enum members.
    Text,
    /// Every constant except `null` and lists.
    All,
    /// No constant.
    None,
}

impl ConstantQuoting {
    const fn hook(self) -> fn(&crate::expr::Constant) -> bool {
        match self {
            Self::Text => hooks::textual_constants,
            Self::All => hooks::all_constants,
            Self::None => hooks::no_constants,
        }
    }
}

/// One template row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// A built-in operator name, such as `"STARTS_WITH"`.
    pub operator: Operator,
    /// The pattern.
    pub pattern: String,
    /// Precedence; defaults from the operator category.
    #[serde(default)]
    pub precedence: Option<i32>,
}

/// A dialect definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    /// Dialect name.
    pub name: String,
    /// Built-in dialect to start from; `null` starts empty.
    #[serde(default)]
    pub base: Option<BuiltinDialect>,
    /// Wildcard escape character.
    #[serde(default)]
    pub escape: Option<char>,
    /// Parenthesize `in` lists.
    #[serde(default)]
    pub wrap_elements: Option<bool>,
    /// Constant quoting policy.
    #[serde(default)]
    pub quote_constants: Option<ConstantQuoting>,
    /// Type tests against string literals.
    #[serde(default)]
    pub type_as_string: Option<bool>,
    /// Templates added to or replacing those of the base.
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
    /// Collapse line breaks in every template.
    #[serde(default)]
    pub normalize_whitespace: bool,
}

impl DialectConfig {
    /// Parses a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the text is not a valid
    /// configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses and builds in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON or rejected templates.
    pub fn load(json: &str) -> Result<Dialect, ConfigError> {
        Ok(Self::from_json(json)?.build()?)
    }

    /// Builds the dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError`] when a template is rejected or a dependency
    /// is missing.
    pub fn build(&self) -> Result<Dialect, DialectError> {
        let mut builder = match self.base {
            Some(base) => base.builder(self.name.as_str())?,
            None => Dialect::builder(self.name.as_str()),
        };

        let mut dialect_hooks = builder.current_hooks();
        if let Some(wrap) = self.wrap_elements {
            dialect_hooks = dialect_hooks.with_wrap_elements(if wrap {
                hooks::in_lists
            } else {
                hooks::never
            });
        }
        if let Some(quoting) = self.quote_constants {
            dialect_hooks = dialect_hooks.with_wrap_constant(quoting.hook());
        }
        if let Some(as_string) = self.type_as_string {
            dialect_hooks = dialect_hooks.with_type_as_string(if as_string {
                hooks::string_type_test
            } else {
                hooks::native_type_test
            });
        }
        builder.hooks(dialect_hooks);
        if let Some(escape) = self.escape {
            builder.escape(escape);
        }

        for row in &self.templates {
            builder.override_template(row.operator, &row.pattern, row.precedence)?;
        }

        let dialect = builder.build()?;
        Ok(if self.normalize_whitespace {
            dialect.new_line_to_single_space()
        } else {
            dialect
        })
    }
}
