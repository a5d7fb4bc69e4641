//! Rendering templates.
//!
//! A template is a pattern such as `{0} like {1%}` plus a precedence. Literal
//! text is copied verbatim; `{..}` elements are replaced by rendered operands.
//!
//! Element syntax: `{` prefix? index suffix? modifier? `}` where
//!
//! - `index` is the zero-based operand position,
//! - a `%` prefix/suffix adds a pattern-matching wildcard before/after the
//!   operand, `%%` does the same and also lower-cases it,
//! - modifier `l` lower-cases, `u` upper-cases, `s` renders a constant
//!   operand as raw text.

use std::collections::BTreeSet;

use crate::error::TemplateError;
use crate::ops::{Category, Operator};

/// Named precedence levels. A higher value binds tighter.
pub mod precedence {
    /// `xor`, `xnor`.
    pub const XOR: i32 = 5;
    /// `or`.
    pub const OR: i32 = 10;
    /// `and`.
    pub const AND: i32 = 20;
    /// Prefix `not`.
    pub const NOT: i32 = 30;
    /// `=`, `<`, `in`, `between`, `is null`, ...
    pub const COMPARISON: i32 = 40;
    /// `like` and its wildcard variants.
    pub const LIKE: i32 = 45;
    /// `+`, `-`, `||`.
    pub const ADDITIVE: i32 = 50;
    /// `*`, `/`.
    pub const MULTIPLICATIVE: i32 = 60;
    /// Prefix `-`.
    pub const UNARY: i32 = 70;
    /// Self-delimiting templates such as function calls and path accessors.
    /// Operands of a `CALL` template are never parenthesized.
    pub const CALL: i32 = 100;
}

/// Returns the precedence used when a registration omits one.
///
/// Path pseudo-operators and patterns with no top-level operand or
/// whitespace (`lower({0})`, `current_date`) are self-delimiting. Otherwise the
/// first operator word or symbol outside brackets decides (`{0} * {1}` binds
/// like multiplication), falling back to the operator's category.
#[must_use]
pub fn default_precedence(category: Category, template: &Template) -> i32 {
    if matches!(category, Category::Path) || template.is_atomic() {
        return precedence::CALL;
    }
    template
        .leading_operator_precedence()
        .unwrap_or(match category {
            Category::Boolean => precedence::AND,
            Category::Numeric => precedence::ADDITIVE,
            Category::String => precedence::LIKE,
            Category::Comparison
            | Category::Collection
            | Category::DateTime
            | Category::Path
            | Category::Control => precedence::COMPARISON,
        })
}

fn token_precedence(token: &str, prefix: bool) -> Option<i32> {
    let level = match token {
        "xor" | "xnor" => precedence::XOR,
        "or" => precedence::OR,
        "and" => precedence::AND,
        "not" if prefix => precedence::NOT,
        "=" | "<>" | "!=" | "<" | ">" | "<=" | ">=" | "in" | "is" | "between" | "member" => {
            precedence::COMPARISON
        }
        "like" => precedence::LIKE,
        "+" | "-" if prefix => precedence::UNARY,
        "+" | "-" | "||" => precedence::ADDITIVE,
        "*" | "/" | "%" => precedence::MULTIPLICATIVE,
        _ => return None,
    };
    Some(level)
}

/// How an operand slot relates to the literal text around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Outside any literal bracket; the template precedence applies.
    TopLevel,
    /// Inside literal brackets next to other text, as in `({0} and {1})` or
    /// `position({1} in {0})`. Any operation short of `CALL` is wrapped.
    Nested,
    /// A whole argument slot such as `f({0},{1})` or `{0}[{1}]`. Never
    /// wrapped.
    Delimited,
}

/// Bracket and quote depth while walking literal text.
#[derive(Default)]
struct Nesting {
    depth: usize,
    quoted: bool,
}

impl Nesting {
    /// Advances over `text`, handing every character outside brackets and
    /// quotes to `top_level`.
    fn feed(&mut self, text: &str, mut top_level: impl FnMut(char)) {
        for c in text.chars() {
            if self.quoted {
                self.quoted = c != '\'';
                continue;
            }
            match c {
                '\'' => self.quoted = true,
                '(' | '[' => self.depth += 1,
                ')' | ']' => self.depth = self.depth.saturating_sub(1),
                _ if self.depth == 0 => top_level(c),
                _ => {}
            }
        }
    }
}

/// Case transform applied to a rendered operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFold {
    /// Leave as is.
    None,
    /// Lower-case.
    Lower,
    /// Upper-case.
    Upper,
}

/// Wildcards added around a rendered operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// No wildcard.
    None,
    /// `%value`
    Start,
    /// `value%`
    End,
    /// `%value%`
    Both,
}

impl Wildcard {
    const fn from_sides(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, false) => Self::None,
            (true, false) => Self::Start,
            (false, true) => Self::End,
            (true, true) => Self::Both,
        }
    }

    /// Whether a wildcard goes before the value.
    #[must_use]
    pub const fn at_start(self) -> bool {
        matches!(self, Self::Start | Self::Both)
    }

    /// Whether a wildcard goes after the value.
    #[must_use]
    pub const fn at_end(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

/// A reference to an operand inside a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// Operand index.
    pub index: usize,
    /// Case transform.
    pub case: CaseFold,
    /// Wildcards to add.
    pub wildcard: Wildcard,
    /// Render constants without quoting.
    pub as_string: bool,
    /// Position relative to the surrounding literal text.
    pub grouping: Grouping,
}

/// A parsed piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Literal text.
    Text(String),
    /// An operand reference.
    Operand(Placeholder),
}

/// A parsed pattern with its precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
    elements: Vec<Element>,
    precedence: i32,
}

impl Template {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when a `{` is not closed or the element
    /// between braces is malformed.
    pub fn parse(pattern: &str, precedence: i32) -> Result<Self, TemplateError> {
        let mut elements = Vec::new();
        let mut text = String::new();
        let mut rest = pattern;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| TemplateError::Unterminated {
                pattern: pattern.to_string(),
                position: offset + open,
            })?;
            let body = &after[..close];
            let placeholder = parse_element(body).ok_or_else(|| TemplateError::InvalidPlaceholder {
                pattern: pattern.to_string(),
                element: format!("{{{body}}}"),
            })?;
            if !text.is_empty() {
                elements.push(Element::Text(std::mem::take(&mut text)));
            }
            elements.push(Element::Operand(placeholder));
            let consumed = open + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        text.push_str(rest);
        if !text.is_empty() {
            elements.push(Element::Text(text));
        }

        assign_grouping(&mut elements);

        Ok(Self {
            pattern: pattern.to_string(),
            elements,
            precedence,
        })
    }

    /// Returns a copy with another precedence.
    #[must_use]
    pub fn with_precedence(self, precedence: i32) -> Self {
        Self { precedence, ..self }
    }

    /// Returns the source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parsed elements.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns the precedence.
    #[must_use]
    pub const fn precedence(&self) -> i32 {
        self.precedence
    }

    /// Returns whether operands of this template must never be parenthesized.
    #[must_use]
    pub const fn is_self_delimiting(&self) -> bool {
        self.precedence >= precedence::CALL
    }

    /// Returns the distinct operand indices referenced, ascending.
    #[must_use]
    pub fn placeholder_indices(&self) -> BTreeSet<usize> {
        self.placeholders().map(|p| p.index).collect()
    }

    /// Iterates over the operand references in pattern order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.elements.iter().filter_map(|element| match element {
            Element::Operand(placeholder) => Some(placeholder),
            Element::Text(_) => None,
        })
    }

    /// Returns a copy where every whitespace run containing a line break is
    /// collapsed to a single space.
    #[must_use]
    pub fn single_line(&self) -> Self {
        let elements: Vec<Element> = self
            .elements
            .iter()
            .map(|element| match element {
                Element::Text(text) => Element::Text(collapse_line_breaks(text)),
                Element::Operand(p) => Element::Operand(*p),
            })
            .collect();
        Self {
            pattern: collapse_line_breaks(&self.pattern),
            elements,
            precedence: self.precedence,
        }
    }

    /// Returns whether the pattern reads as a single term: no operand outside
    /// brackets and no top-level whitespace.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        let mut nesting = Nesting::default();
        let mut spaced = false;
        for element in &self.elements {
            match element {
                Element::Text(text) => nesting.feed(text, |c| spaced |= c.is_whitespace()),
                Element::Operand(p) if p.grouping == Grouping::TopLevel => return false,
                Element::Operand(_) => {}
            }
        }
        !spaced
    }

    /// Precedence of the first operator word or symbol outside brackets.
    fn leading_operator_precedence(&self) -> Option<i32> {
        let mut nesting = Nesting::default();
        let mut leading = true;
        for element in &self.elements {
            match element {
                Element::Text(text) => {
                    let mut top = String::new();
                    nesting.feed(text, |c| top.push(c));
                    for token in tokens(&top) {
                        if let Some(level) = token_precedence(&token, leading) {
                            return Some(level);
                        }
                        leading = false;
                    }
                }
                Element::Operand(_) => leading = false,
            }
        }
        None
    }

    /// Checks that the template references exactly the operands `0..arity`.
    pub(crate) fn check_arity(&self, operator: &Operator) -> Result<(), ArityProblem> {
        let indices = self.placeholder_indices();
        if let Some(&index) = indices.iter().find(|&&i| i >= operator.arity()) {
            return Err(ArityProblem::OutOfRange(index));
        }
        if indices.len() != operator.arity() {
            return Err(ArityProblem::Count(indices.len()));
        }
        Ok(())
    }
}

pub(crate) enum ArityProblem {
    Count(usize),
    OutOfRange(usize),
}

fn parse_element(body: &str) -> Option<Placeholder> {
    let bytes = body.as_bytes();
    let mut pos = 0;

    let prefix = count_percent(&bytes[pos..]);
    pos += prefix;

    let digits = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let index: usize = body[pos..pos + digits].parse().ok()?;
    pos += digits;

    let suffix = count_percent(&bytes[pos..]);
    pos += suffix;

    let mut case = if prefix == 2 || suffix == 2 {
        CaseFold::Lower
    } else {
        CaseFold::None
    };
    let mut as_string = false;
    match &bytes[pos..] {
        [] => {}
        [b'l'] => case = CaseFold::Lower,
        [b'u'] => case = CaseFold::Upper,
        [b's'] => as_string = true,
        _ => return None,
    }

    Some(Placeholder {
        index,
        case,
        wildcard: Wildcard::from_sides(prefix > 0, suffix > 0),
        as_string,
        grouping: Grouping::TopLevel,
    })
}

/// Classifies every operand by the literal text around it.
fn assign_grouping(elements: &mut [Element]) {
    let mut nesting = Nesting::default();
    for i in 0..elements.len() {
        let before = match i.checked_sub(1).map(|j| &elements[j]) {
            Some(Element::Text(text)) => text.trim_end().chars().last(),
            _ => None,
        };
        let after = match elements.get(i + 1) {
            Some(Element::Text(text)) => text.trim_start().chars().next(),
            _ => None,
        };
        match &mut elements[i] {
            Element::Text(text) => nesting.feed(text, |_| {}),
            Element::Operand(placeholder) => {
                placeholder.grouping = if matches!(before, Some('(' | ',' | '['))
                    && matches!(after, Some(')' | ',' | ']'))
                {
                    Grouping::Delimited
                } else if nesting.depth > 0 {
                    Grouping::Nested
                } else {
                    Grouping::TopLevel
                };
            }
        }
    }
}

/// Splits top-level text into lower-cased words and operator symbol runs.
fn tokens(text: &str) -> Vec<String> {
    const SYMBOLS: &str = "=<>!+-*/%|";
    let mut out = Vec::new();
    let mut current = String::new();
    let mut symbolic = false;
    for c in text.chars() {
        let is_symbol = SYMBOLS.contains(c);
        let is_word = c.is_alphanumeric() || c == '_';
        if !current.is_empty() && (!(is_symbol || is_word) || is_symbol != symbolic) {
            out.push(std::mem::take(&mut current));
        }
        if is_symbol || is_word {
            symbolic = is_symbol;
            current.push(c.to_ascii_lowercase());
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn count_percent(bytes: &[u8]) -> usize {
    bytes.iter().take(2).take_while(|&&b| b == b'%').count()
}

fn collapse_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_whitespace(&mut out, &mut run);
        out.push(c);
    }
    flush_whitespace(&mut out, &mut run);
    out
}

fn flush_whitespace(out: &mut String, run: &mut String) {
    if run.contains(['\n', '\r']) {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}
