//! Dialects loaded from JSON configuration.

mod common;

use common::render;
use oxide_query_core::error::ConfigError;
use oxide_query_core::{DialectConfig, DialectError, Expression};

#[test]
fn test_config_layered_on_sql() {
    let dialect = DialectConfig::load(
        r#"{
            "name": "warehouse",
            "base": "sql",
            "escape": "!",
            "templates": [
                { "operator": "STARTS_WITH", "pattern": "{0} like {1%} escape '!'" },
                { "operator": "LOWER", "pattern": "lcase({0})" }
            ]
        }"#,
    )
    .unwrap();

    let expr = Expression::variable("sku").starts_with("10%");
    assert_eq!(render(&dialect, &expr), "sku like '10!%%' escape '!'");
    let expr = Expression::variable("sku").eq_ignore_case(Expression::variable("code"));
    assert_eq!(render(&dialect, &expr), "lcase(sku) = lcase(code)");
}

#[test]
fn test_config_quoting_policies() {
    let expr = Expression::variable("x").in_list([1, 2]);
    let all = DialectConfig::load(
        r#"{ "name": "quoted", "base": "jpql", "quote_constants": "all", "wrap_elements": true }"#,
    )
    .unwrap();
    assert_eq!(render(&all, &expr), "x in ('1', '2')");

    let none = DialectConfig::load(
        r#"{ "name": "bare", "base": "jpql", "quote_constants": "none" }"#,
    )
    .unwrap();
    assert_eq!(
        render(&none, &Expression::variable("x").eq("a")),
        "x = a"
    );
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        DialectConfig::load("{ not json"),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        DialectConfig::load(
            r#"{ "name": "n", "base": "hql", "templates": [{ "operator": "AND", "pattern": "{0} and" }] }"#
        ),
        Err(ConfigError::Dialect(DialectError::ArityMismatch { .. }))
    ));
}

#[test]
fn test_config_serializes_back() {
    let config = DialectConfig::from_json(r#"{ "name": "n", "base": "jpql" }"#).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(DialectConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_config_templates_without_precedence_group_operands() {
    let dialect = DialectConfig::load(
        r#"{
            "name": "plain",
            "base": "jpql",
            "templates": [
                { "operator": "ADD", "pattern": "{0} + {1}" },
                { "operator": "MULT", "pattern": "{0} * {1}" },
                { "operator": "CONCAT", "pattern": "{0} || {1}" }
            ]
        }"#,
    )
    .unwrap();

    let x = Expression::variable("x");
    assert_eq!(render(&dialect, &x.clone().add(1).mult(2)), "(x + 1) * 2");
    assert_eq!(
        render(&dialect, &x.concat("a").starts_with("b")),
        "x || 'a' like 'b%'"
    );
}
