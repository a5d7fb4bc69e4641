//! Building blocks of the `oxide-query` command-line tool.
//!
//! The binary reads expression trees serialized as JSON and renders them
//! with a built-in or configured dialect.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use oxide_query_core::{BuiltinDialect, Dialect, DialectConfig, Expression};

/// One expression or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Input {
    /// A single tree.
    One(Expression),
    /// Several trees, rendered one per line.
    Many(Vec<Expression>),
}

impl Input {
    /// Returns the trees in input order.
    #[must_use]
    pub fn into_expressions(self) -> Vec<Expression> {
        match self {
            Self::One(expression) => vec![expression],
            Self::Many(expressions) => expressions,
        }
    }
}

/// Resolves the dialect to use: the configuration file when given, the
/// built-in dialect otherwise.
///
/// # Errors
///
/// Fails when the configuration cannot be read or is rejected.
pub fn load_dialect(
    builtin: BuiltinDialect,
    config: Option<&Path>,
    single_line: bool,
) -> Result<Dialect> {
    let dialect = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let dialect = DialectConfig::load(&json)
                .with_context(|| format!("invalid dialect configuration {}", path.display()))?;
            info!("Loaded dialect '{}' from {}", dialect.name(), path.display());
            dialect
        }
        None => builtin.build()?,
    };
    debug!("Dialect '{}' has {} templates", dialect.name(), dialect.len());
    Ok(if single_line {
        dialect.new_line_to_single_space()
    } else {
        dialect
    })
}

/// Reads JSON from `path`, or from standard input when `path` is `-`.
///
/// # Errors
///
/// Fails when the input cannot be read.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read standard input")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Renders every tree in `json`, one result per line.
///
/// # Errors
///
/// Fails when the JSON is not an expression tree or a list of them, or when
/// the dialect cannot render a tree.
pub fn render_json(dialect: &Dialect, json: &str) -> Result<String> {
    let input: Input = serde_json::from_str(json).context("input is not an expression tree")?;
    let mut out = String::new();
    for (i, expression) in input.into_expressions().iter().enumerate() {
        let text = dialect
            .render(expression)
            .with_context(|| format!("failed to render expression {i}"))?;
        out.push_str(&text);
        out.push('\n');
    }
    Ok(out)
}

/// Lists the dialect's templates as `OPERATOR  precedence  pattern` lines.
#[must_use]
pub fn template_listing(dialect: &Dialect) -> String {
    let width = dialect
        .templates()
        .map(|entry| entry.operator().name().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in dialect.templates() {
        let _ = writeln!(
            out,
            "{:<width$}  {:>3}  {}",
            entry.operator().name(),
            entry.template().precedence(),
            entry.template().pattern().escape_debug(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_and_many() {
        let dialect = BuiltinDialect::Jpql.build().unwrap();
        let x = Expression::variable("x");
        let one = serde_json::to_string(&x.clone().eq(1)).unwrap();
        assert_eq!(render_json(&dialect, &one).unwrap(), "x = 1\n");

        let many = serde_json::to_string(&vec![x.clone().eq(1), x.is_null()]).unwrap();
        assert_eq!(render_json(&dialect, &many).unwrap(), "x = 1\nx is null\n");
    }

    #[test]
    fn test_render_rejects_garbage() {
        let dialect = BuiltinDialect::Jpql.build().unwrap();
        let err = render_json(&dialect, r#"{"constant": 1}"#).unwrap_err();
        assert!(err.to_string().contains("not an expression tree"));
    }

    #[test]
    fn test_template_listing() {
        let dialect = BuiltinDialect::Sql.build().unwrap();
        let listing = template_listing(&dialect);
        assert_eq!(listing.lines().count(), dialect.len());
        let concat = listing
            .lines()
            .find(|line| line.starts_with("CONCAT "))
            .unwrap();
        assert!(concat.ends_with("{0} || {1}"));
        assert!(concat.contains(" 50 "));
    }
}
