#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use oxide_query_core::{Dialect, Expression, Path};
use oxide_query_derive::Domain;

#[derive(Debug, Domain)]
pub struct Cat {
    pub name: String,
    #[domain(rename = "bodyWeight")]
    pub body_weight: f64,
    pub birthdate: NaiveDate,
    pub color: Color,
    pub kittens: Vec<Cat>,
    pub mate: Option<Box<Cat>>,
    pub toys: HashMap<String, Toy>,
    #[domain(skip)]
    pub cached_label: String,
}

#[derive(Debug, Domain)]
pub struct Toy {
    pub label: String,
    pub squeaks: bool,
}

#[derive(Debug, Domain)]
pub enum Color {
    Tabby,
    Black,
    Ginger,
}

pub fn jpql() -> Dialect {
    Dialect::jpql().unwrap_or_else(|e| panic!("JPQL dialect failed to build: {e}"))
}

pub fn render(dialect: &Dialect, expr: &Expression) -> String {
    dialect
        .render(expr)
        .unwrap_or_else(|e| panic!("Failed to render {expr:?}\nError: {e}"))
}

pub fn render_jpql(expr: &Expression) -> String {
    render(&jpql(), expr)
}

/// Collects every path node reachable from `expr`, parents included, once
/// per distinct allocation.
pub fn distinct_paths(expr: &Expression) -> Vec<Arc<Path>> {
    let mut found: Vec<Arc<Path>> = Vec::new();
    collect(expr, &mut found);
    found
}

fn collect(expr: &Expression, found: &mut Vec<Arc<Path>>) {
    match expr {
        Expression::Path(path) => {
            let mut current = Some(path);
            while let Some(path) = current {
                if !found.iter().any(|seen| Arc::ptr_eq(seen, path)) {
                    found.push(Arc::clone(path));
                }
                current = path.parent();
            }
        }
        Expression::Operation(operation) => {
            for operand in operation.operands() {
                collect(operand, found);
            }
        }
        Expression::Constant(_) => {}
    }
}
