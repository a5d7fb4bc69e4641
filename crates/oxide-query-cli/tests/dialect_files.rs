//! Tests for dialect and expression files read by the CLI.

use std::io::Write;

use oxide_query_cli::{load_dialect, read_input, render_json, template_listing};
use oxide_query_core::{BuiltinDialect, Expression};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_builtin_dialect_without_config() {
    let dialect = load_dialect(BuiltinDialect::Hql, None, false).unwrap();
    assert_eq!(dialect.name(), "hql");
}

#[test]
fn test_config_file_overrides_builtin() {
    let config = write_temp(
        r#"{
            "name": "reporting",
            "base": "sql",
            "templates": [
                { "operator": "AND", "pattern": "{0}\n  AND {1}", "precedence": 20 }
            ]
        }"#,
    );
    let expr = Expression::variable("a")
        .eq(1)
        .and(Expression::variable("b").eq("x"));
    let input = write_temp(&serde_json::to_string(&expr).unwrap());
    let json = read_input(input.path()).unwrap();

    let dialect = load_dialect(BuiltinDialect::Jpql, Some(config.path()), false).unwrap();
    assert_eq!(dialect.name(), "reporting");
    assert_eq!(render_json(&dialect, &json).unwrap(), "a = 1\n  AND b = 'x'\n");

    let flat = load_dialect(BuiltinDialect::Jpql, Some(config.path()), true).unwrap();
    assert_eq!(render_json(&flat, &json).unwrap(), "a = 1 AND b = 'x'\n");
    assert!(template_listing(&flat).contains("{0} AND {1}"));
}

#[test]
fn test_invalid_config_file() {
    let config = write_temp(
        r#"{ "name": "bad", "base": "jpql",
             "templates": [{ "operator": "NOT", "pattern": "not {0} {1}" }] }"#,
    );
    let err = load_dialect(BuiltinDialect::Jpql, Some(config.path()), false).unwrap_err();
    assert!(err.to_string().contains("invalid dialect configuration"));
    assert!(format!("{err:#}").contains("NOT"));
}

#[test]
fn test_missing_files() {
    let missing = std::path::Path::new("/nonexistent/oxide-query/dialect.json");
    assert!(load_dialect(BuiltinDialect::Sql, Some(missing), false).is_err());
    assert!(read_input(missing).is_err());
}
