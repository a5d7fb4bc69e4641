//! Literal values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A literal value embedded in an expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Constant {
    /// `null`.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Text(String),
    /// Character literal.
    Char(char),
    /// Date literal.
    Date(NaiveDate),
    /// Date-time literal.
    DateTime(NaiveDateTime),
    /// Time literal.
    Time(NaiveTime),
    /// A member of an enumerated type.
    Enum {
        /// The enum type.
        type_name: String,
        /// The member name.
        member: String,
    },
    /// A type name, used by type tests.
    Type(String),
    /// A list of values, used by `in`.
    List(Vec<Constant>),
}

impl Constant {
    /// Returns the value as unquoted text.
    #[must_use]
    pub fn to_raw_string(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Boolean(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => format!("{f:?}"),
            Self::Text(s) | Self::Type(s) => s.clone(),
            Self::Char(c) => c.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Time(t) => t.format("%H:%M:%S").to_string(),
            Self::Enum { member, .. } => member.clone(),
            Self::List(values) => values
                .iter()
                .map(Self::to_raw_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Returns the value as a quoted literal, doubling embedded single quotes.
    #[must_use]
    pub fn to_quoted_string(&self) -> String {
        quote(&self.to_raw_string())
    }

    /// Returns true for literal kinds that are written as text in most query
    /// languages.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::Char(_)
                | Self::Date(_)
                | Self::DateTime(_)
                | Self::Time(_)
                | Self::Enum { .. }
        )
    }

    /// Returns a case-folded copy. Only textual kinds change.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.to_lowercase()),
            Self::Char(c) => Self::Char(c.to_lowercase().next().unwrap_or(*c)),
            other => other.clone(),
        }
    }

    /// Returns an upper-cased copy. Only textual kinds change.
    #[must_use]
    pub fn to_uppercase(&self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.to_uppercase()),
            Self::Char(c) => Self::Char(c.to_uppercase().next().unwrap_or(*c)),
            other => other.clone(),
        }
    }
}

pub(crate) fn quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! integer_constant {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Constant {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )+
    };
}

integer_constant!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Constant {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<char> for Constant {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<NaiveDate> for Constant {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Constant {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveTime> for Constant {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Constant {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Constant {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}
