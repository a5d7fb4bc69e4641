//! Template-driven serialization of expression trees.
//!
//! Rendering is a pure function of the tree and the dialect. Each operation is
//! written by substituting its operands into the operator's template. Whether
//! an operand operation gets parentheses depends on its slot's
//! [`Grouping`]: top-level slots compare against the enclosing template's
//! precedence (never wrapping inside a self-delimiting template, see
//! [`precedence::CALL`]), slots inside literal brackets wrap anything short
//! of `CALL`, and whole argument slots are never wrapped.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::trace;

use crate::dialect::Dialect;
use crate::error::RenderError;
use crate::expr::{quote, Constant, Expression, Operation, Path, PathElement, PathType};
use crate::ops::{self, Operator};
use crate::template::{precedence, CaseFold, Element, Grouping, Placeholder, Template, Wildcard};

/// Renders `expression` with `dialect`.
///
/// # Errors
///
/// Returns [`RenderError`] when the dialect lacks a template used by the tree.
pub fn render(expression: &Expression, dialect: &Dialect) -> Result<String, RenderError> {
    Renderer::new(dialect).render(expression)
}

/// Rendered text plus the precedence of its outermost template, if it came
/// from an operation.
struct Fragment {
    text: String,
    precedence: Option<i32>,
}

impl Fragment {
    const fn atom(text: String) -> Self {
        Self {
            text,
            precedence: None,
        }
    }
}

pub(crate) struct Renderer<'d> {
    dialect: &'d Dialect,
}

impl<'d> Renderer<'d> {
    pub(crate) const fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    pub(crate) fn render(&self, expression: &Expression) -> Result<String, RenderError> {
        let text = self.expression(expression, None)?.text;
        trace!(dialect = self.dialect.name(), %text, "rendered expression");
        Ok(text)
    }

    fn expression(
        &self,
        expression: &Expression,
        enclosing: Option<&Operator>,
    ) -> Result<Fragment, RenderError> {
        match expression {
            Expression::Constant(constant) => {
                Ok(Fragment::atom(self.constant(constant, enclosing)))
            }
            Expression::Path(path) => self.path(path).map(Fragment::atom),
            Expression::Operation(operation) => {
                self.operation(operation.operator(), operation.operands())
            }
        }
    }

    fn template(&self, operator: &Operator) -> Result<&'d Template, RenderError> {
        self.dialect
            .template(operator)
            .ok_or_else(|| RenderError::MissingTemplate {
                dialect: self.dialect.name().to_string(),
                operator: operator.name(),
            })
    }

    fn operation(
        &self,
        operator: Operator,
        operands: &[Expression],
    ) -> Result<Fragment, RenderError> {
        let template = self.template(&operator)?;
        let mut text = String::new();
        for element in template.elements() {
            match element {
                Element::Text(literal) => text.push_str(literal),
                Element::Operand(placeholder) => {
                    let operand =
                        operands
                            .get(placeholder.index)
                            .ok_or(RenderError::MissingOperand {
                                operator: operator.name(),
                                index: placeholder.index,
                                available: operands.len(),
                            })?;
                    let fragment = self.operand(operand, placeholder, &operator)?;
                    let wrap = fragment.precedence.is_some_and(|inner| match placeholder.grouping {
                        Grouping::TopLevel => {
                            !template.is_self_delimiting() && inner < template.precedence()
                        }
                        Grouping::Nested => inner < precedence::CALL,
                        Grouping::Delimited => false,
                    });
                    if wrap {
                        text.push('(');
                        text.push_str(&fragment.text);
                        text.push(')');
                    } else {
                        text.push_str(&fragment.text);
                    }
                }
            }
        }
        Ok(Fragment {
            text,
            precedence: Some(template.precedence()),
        })
    }

    /// Renders one operand with the placeholder's modifiers applied.
    fn operand(
        &self,
        operand: &Expression,
        placeholder: &Placeholder,
        enclosing: &Operator,
    ) -> Result<Fragment, RenderError> {
        if let Expression::Constant(constant) = operand {
            return Ok(Fragment::atom(
                self.modified_constant(constant, placeholder, enclosing),
            ));
        }
        if placeholder.case == CaseFold::None && placeholder.wildcard == Wildcard::None {
            return self.expression(operand, Some(enclosing));
        }

        // non-constant operands are transformed through the dialect's own
        // templates, without touching the caller's tree
        let mut transformed = match placeholder.case {
            CaseFold::None => operand.clone(),
            CaseFold::Lower => unary(ops::LOWER, operand.clone()),
            CaseFold::Upper => unary(ops::UPPER, operand.clone()),
        };
        let wildcard = || Expression::Constant(Constant::Text("%".to_string()));
        if placeholder.wildcard.at_start() {
            transformed = binary(ops::CONCAT, wildcard(), transformed);
        }
        if placeholder.wildcard.at_end() {
            transformed = binary(ops::CONCAT, transformed, wildcard());
        }
        self.expression(&transformed, Some(enclosing))
    }

    fn modified_constant(
        &self,
        constant: &Constant,
        placeholder: &Placeholder,
        enclosing: &Operator,
    ) -> String {
        let value = match placeholder.case {
            CaseFold::None => Cow::Borrowed(constant),
            CaseFold::Lower => Cow::Owned(constant.to_lowercase()),
            CaseFold::Upper => Cow::Owned(constant.to_uppercase()),
        };

        if placeholder.wildcard != Wildcard::None {
            let mut text = String::new();
            if placeholder.wildcard.at_start() {
                text.push('%');
            }
            text.push_str(&escape_wildcards(&value.to_raw_string(), self.dialect.escape()));
            if placeholder.wildcard.at_end() {
                text.push('%');
            }
            let pattern = Constant::Text(text);
            return if placeholder.as_string {
                pattern.to_raw_string()
            } else {
                self.literal(&pattern)
            };
        }

        if placeholder.as_string {
            value.to_raw_string()
        } else {
            self.constant(&value, Some(enclosing))
        }
    }

    fn constant(&self, constant: &Constant, enclosing: Option<&Operator>) -> String {
        match constant {
            Constant::List(values) => {
                let joined = values
                    .iter()
                    .map(|value| self.literal(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                if enclosing.is_some_and(|operator| self.dialect.wrap_elements(operator)) {
                    format!("({joined})")
                } else {
                    joined
                }
            }
            other => self.literal(other),
        }
    }

    fn literal(&self, constant: &Constant) -> String {
        match constant {
            Constant::Type(name) if self.dialect.is_type_as_string() => quote(name),
            Constant::Type(name) => name.clone(),
            Constant::List(_) => self.constant(constant, None),
            other if self.dialect.wrap_constant(other) => other.to_quoted_string(),
            other => other.to_raw_string(),
        }
    }

    fn path(&self, path: &Arc<Path>) -> Result<String, RenderError> {
        let last = match path.metadata().element() {
            PathElement::Name(name) => Constant::Text(name.clone()),
            PathElement::Index(index) => Constant::Integer(
                i64::try_from(*index).map_err(|_| RenderError::IndexOutOfRange(*index))?,
            ),
            PathElement::Key(key) => key.clone(),
            PathElement::None => Constant::Null,
        };
        let parent = path.parent().map(|parent| Expression::Path(Arc::clone(parent)));

        let (operator, operands) = match (path.path_type(), parent) {
            (PathType::Variable, _) => (ops::path::VARIABLE, vec![Expression::Constant(last)]),
            (PathType::Root, _) => (ops::path::ROOT, vec![Expression::Constant(last)]),
            (PathType::Size, Some(parent)) => (ops::COL_SIZE, vec![parent]),
            (PathType::Property, Some(parent)) => {
                (ops::path::PROPERTY, vec![parent, Expression::Constant(last)])
            }
            (PathType::ListValue, Some(parent)) => {
                (ops::path::LIST_VALUE, vec![parent, Expression::Constant(last)])
            }
            (PathType::MapValue, Some(parent)) => {
                (ops::path::MAP_VALUE, vec![parent, Expression::Constant(last)])
            }
            // parented kinds always carry a parent; treat a detached one as a
            // variable rather than fail
            (_, None) => (ops::path::VARIABLE, vec![Expression::Constant(last)]),
        };
        Ok(self.operation(operator, &operands)?.text)
    }
}

fn unary(operator: Operator, operand: Expression) -> Expression {
    Expression::Operation(Arc::new(Operation::from_parts(operator, vec![operand])))
}

fn binary(operator: Operator, left: Expression, right: Expression) -> Expression {
    Expression::Operation(Arc::new(Operation::from_parts(operator, vec![left, right])))
}

/// Escapes the escape character itself and the `%` and `_` wildcards.
fn escape_wildcards(raw: &str, escape: char) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == escape || c == '%' || c == '_' {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CollectionKind;
    use crate::expr::ElementKind;

    fn jpql() -> Dialect {
        Dialect::jpql().unwrap()
    }

    fn x() -> Expression {
        Expression::variable("x")
    }

    #[test]
    fn test_escape_wildcards() {
        assert_eq!(escape_wildcards("a_b%c\\d", '\\'), "a\\_b\\%c\\\\d");
        assert_eq!(escape_wildcards("50%", '!'), "50!%");
    }

    #[test]
    fn test_constants() {
        let dialect = jpql();
        assert_eq!(render(&x().eq("it's"), &dialect).unwrap(), "x = 'it''s'");
        assert_eq!(render(&x().eq(3), &dialect).unwrap(), "x = 3");
        assert_eq!(render(&x().eq(true), &dialect).unwrap(), "x = true");
        assert_eq!(render(&x().eq(42.0), &dialect).unwrap(), "x = 42.0");
        assert_eq!(
            render(&Expression::constant(Constant::Null), &dialect).unwrap(),
            "null"
        );
    }

    #[test]
    fn test_in_list_wrapping() {
        let expr = x().in_list(["a", "b"]);
        assert_eq!(render(&expr, &jpql()).unwrap(), "x in 'a', 'b'");
        let hql = Dialect::hql().unwrap();
        assert_eq!(render(&expr, &hql).unwrap(), "x in ('a', 'b')");
    }

    #[test]
    fn test_wildcards_on_constants() {
        let dialect = jpql();
        assert_eq!(
            render(&x().starts_with("ab%c"), &dialect).unwrap(),
            "x like 'ab\\%c%'"
        );
        assert_eq!(
            render(&x().ends_with("a_b"), &dialect).unwrap(),
            "x like '%a\\_b'"
        );
        assert_eq!(
            render(&x().contains_ignore_case("AbC"), &dialect).unwrap(),
            "lower(x) like '%abc%'"
        );
    }

    #[test]
    fn test_wildcards_on_paths() {
        let dialect = jpql();
        let y = Expression::variable("y");
        assert_eq!(
            render(&x().starts_with(y.clone()), &dialect).unwrap(),
            "x like concat(y,'%')"
        );
        assert_eq!(
            render(&x().ends_with_ignore_case(y), &dialect).unwrap(),
            "lower(x) like concat('%',lower(y))"
        );
    }

    #[test]
    fn test_case_fold_constants() {
        let dialect = jpql();
        assert_eq!(
            render(&x().eq_ignore_case("MiXeD"), &dialect).unwrap(),
            "lower(x) = 'mixed'"
        );
    }

    #[test]
    fn test_instance_of() {
        let cat = x().instance_of("Cat");
        assert_eq!(render(&cat, &jpql()).unwrap(), "type(x) = Cat");
        assert_eq!(render(&cat, &Dialect::hql().unwrap()).unwrap(), "x.class = 'Cat'");
    }

    #[test]
    fn test_call_operands_not_wrapped() {
        let dialect = jpql();
        let sum = x().add(1);
        let expr = Expression::from(Operation::new(ops::ABS, vec![sum]).unwrap());
        assert_eq!(render(&expr, &dialect).unwrap(), "abs(x + 1)");
    }

    #[test]
    fn test_bracketed_operands_are_wrapped() {
        let dialect = Dialect::sql().unwrap();
        let haystack = x().concat(Expression::variable("y"));
        let expr = Expression::from(
            Operation::new(ops::INDEX_OF, vec![haystack, Expression::from("a")]).unwrap(),
        );
        assert_eq!(
            render(&expr, &dialect).unwrap(),
            "position('a' in (x || y)) - 1"
        );
    }

    #[test]
    fn test_list_index_out_of_range() {
        let dialect = jpql();
        let list = Path::variable("xs", ElementKind::Collection(CollectionKind::List));
        let last = Path::new(
            crate::expr::PathMetadata::for_list_value(list, usize::MAX),
            ElementKind::Map,
        );
        assert_eq!(
            render(&Expression::from(last), &dialect).unwrap_err(),
            RenderError::IndexOutOfRange(usize::MAX)
        );
    }

    #[test]
    fn test_arithmetic_grouping() {
        let dialect = jpql();
        let expr = x().add(1).mult(2);
        assert_eq!(render(&expr, &dialect).unwrap(), "(x + 1) * 2");
        let expr = x().mult(2).add(1);
        assert_eq!(render(&expr, &dialect).unwrap(), "x * 2 + 1");
    }

    #[test]
    fn test_paths() {
        let dialect = jpql();
        let cat = Path::variable("cat", ElementKind::Entity("Cat".into()));
        let kittens = Path::property(&cat, "kittens", ElementKind::Map);
        let first = Arc::new(Path::new(
            crate::expr::PathMetadata::for_map_value(Arc::clone(&kittens), "first"),
            ElementKind::Entity("Cat".into()),
        ));
        let name = Path::property(&first, "name", ElementKind::Scalar(crate::domain::ScalarKind::Text));
        assert_eq!(
            render(&Expression::from(&name), &dialect).unwrap(),
            "cat.kittens['first'].name"
        );
        assert_eq!(
            render(&Expression::from(Path::size(&kittens)), &dialect).unwrap(),
            "size(cat.kittens)"
        );
    }

    #[test]
    fn test_missing_template() {
        let mut builder = Dialect::jpql().unwrap().derive("tiny");
        builder.hooks(crate::dialect::DialectHooks::default());
        let dialect = builder.build().unwrap();
        let expr = x().eq(1).and(Expression::from(
            Operation::new(ops::XOR, vec![x(), x()]).unwrap(),
        ));
        assert_eq!(
            render(&expr, &dialect).unwrap_err(),
            RenderError::MissingTemplate {
                dialect: "tiny".into(),
                operator: "XOR",
            }
        );
    }
}
