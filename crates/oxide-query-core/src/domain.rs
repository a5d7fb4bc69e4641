//! Domain-model metadata.
//!
//! The alias path builder navigates a type graph described by [`TypeInfo`].
//! Types expose their metadata through the [`Domain`] trait, usually via
//! `#[derive(Domain)]`. Child types are referenced through [`TypeRef`]
//! function pointers and resolved only when navigated, so self-referencing
//! entities need no special handling.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lazily resolved type metadata.
pub type TypeRef = fn() -> TypeInfo;

/// A type that can be navigated by the alias path builder.
pub trait Domain {
    /// Returns the metadata describing this type.
    fn type_info() -> TypeInfo;
}

/// Scalar value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Character strings.
    Text,
    /// A single character.
    Char,
    /// `true`/`false`.
    Boolean,
    /// Signed and unsigned integers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Calendar dates.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
}

impl ScalarKind {
    /// Returns a readable type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
        }
    }
}

/// The shape of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Ordered, indexable.
    List,
    /// Unordered, unique elements.
    Set,
}

/// A property of an entity.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor {
    /// Property name as used in rendered paths.
    pub name: &'static str,
    /// Declared type.
    pub ty: TypeRef,
}

/// A composite type with named properties.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Entity name.
    pub name: &'static str,
    /// Properties in declaration order.
    pub properties: &'static [PropertyDescriptor],
}

impl EntityDescriptor {
    /// Finds a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// An enumerated type.
#[derive(Debug)]
pub struct EnumDescriptor {
    /// Enum name.
    pub name: &'static str,
    /// Members in declaration order.
    pub members: &'static [&'static str],
}

/// Metadata for one type in the domain graph.
#[derive(Clone, Copy)]
pub enum TypeInfo {
    /// A scalar.
    Scalar(ScalarKind),
    /// An enumerated type.
    Enum(&'static EnumDescriptor),
    /// A composite entity.
    Entity(&'static EntityDescriptor),
    /// A list or set.
    Collection {
        /// List or set.
        kind: CollectionKind,
        /// Element type.
        element: TypeRef,
    },
    /// A map.
    Map {
        /// Key type.
        key: TypeRef,
        /// Value type.
        value: TypeRef,
    },
}

impl TypeInfo {
    /// Returns a readable type name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Enum(descriptor) => descriptor.name.to_string(),
            Self::Entity(descriptor) => descriptor.name.to_string(),
            Self::Collection { kind, element } => {
                let kind = match kind {
                    CollectionKind::List => "list",
                    CollectionKind::Set => "set",
                };
                format!("{kind}<{}>", element().name())
            }
            Self::Map { key, value } => format!("map<{}, {}>", key().name(), value().name()),
        }
    }

    /// Returns the entity descriptor, if this is an entity.
    #[must_use]
    pub const fn as_entity(&self) -> Option<&'static EntityDescriptor> {
        match self {
            Self::Entity(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Enum(d) => f.debug_tuple("Enum").field(&d.name).finish(),
            Self::Entity(d) => f.debug_tuple("Entity").field(&d.name).finish(),
            Self::Collection { kind, .. } => f
                .debug_struct("Collection")
                .field("kind", kind)
                .field("type", &self.name())
                .finish(),
            Self::Map { .. } => f.debug_struct("Map").field("type", &self.name()).finish(),
        }
    }
}

macro_rules! scalar_domain {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Domain for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Scalar(ScalarKind::$kind)
                }
            }
        )+
    };
}

scalar_domain! {
    String => Text,
    &'static str => Text,
    char => Char,
    bool => Boolean,
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    i128 => Integer,
    isize => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    u64 => Integer,
    u128 => Integer,
    usize => Integer,
    f32 => Float,
    f64 => Float,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => DateTime,
    NaiveTime => Time,
}

impl<T: Domain> Domain for Option<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl<T: Domain> Domain for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

macro_rules! collection_domain {
    ($($ty:ident<$param:ident> => $kind:ident),+ $(,)?) => {
        $(
            impl<$param: Domain> Domain for $ty<$param> {
                fn type_info() -> TypeInfo {
                    TypeInfo::Collection {
                        kind: CollectionKind::$kind,
                        element: $param::type_info,
                    }
                }
            }
        )+
    };
}

collection_domain! {
    Vec<T> => List,
    VecDeque<T> => List,
    HashSet<T> => Set,
    BTreeSet<T> => Set,
}

impl<K: Domain, V: Domain, S> Domain for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map {
            key: K::type_info,
            value: V::type_info,
        }
    }
}

impl<K: Domain, V: Domain> Domain for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map {
            key: K::type_info,
            value: V::type_info,
        }
    }
}
