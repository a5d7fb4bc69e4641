//! Path nodes.
//!
//! A path names a position in the domain graph: a root variable, a property
//! of another path, the size of a collection path, or an element of a list
//! or map path. Paths are immutable and shared through [`Arc`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Constant;
use crate::domain::{CollectionKind, ScalarKind, TypeInfo};
use crate::error::ExpressionError;

/// The kind of a path node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    /// An anonymous root named after its entity type.
    Root,
    /// A named query variable.
    Variable,
    /// A property of the parent.
    Property,
    /// The size of the parent collection.
    Size,
    /// An indexed element of the parent list.
    ListValue,
    /// A keyed value of the parent map.
    MapValue,
}

impl PathType {
    /// Returns whether paths of this kind hang off a parent path.
    #[must_use]
    pub const fn has_parent(self) -> bool {
        !matches!(self, Self::Root | Self::Variable)
    }

    /// Returns the kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Variable => "variable",
            Self::Property => "property",
            Self::Size => "size",
            Self::ListValue => "list value",
            Self::MapValue => "map value",
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The last step of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathElement {
    /// A variable, root or property name.
    Name(String),
    /// A list index.
    Index(usize),
    /// A map key.
    Key(Constant),
    /// Nothing, for size paths.
    None,
}

/// How a path came to be.
///
/// Invariant: property, size, list-value and map-value metadata always have a
/// parent; root and variable metadata never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPathMetadata")]
pub struct PathMetadata {
    path_type: PathType,
    parent: Option<Arc<Path>>,
    element: PathElement,
}

impl PathMetadata {
    /// Metadata for an anonymous root.
    #[must_use]
    pub fn for_root(name: impl Into<String>) -> Self {
        Self {
            path_type: PathType::Root,
            parent: None,
            element: PathElement::Name(name.into()),
        }
    }

    /// Metadata for a named variable.
    #[must_use]
    pub fn for_variable(name: impl Into<String>) -> Self {
        Self {
            path_type: PathType::Variable,
            parent: None,
            element: PathElement::Name(name.into()),
        }
    }

    /// Metadata for a property of `parent`.
    #[must_use]
    pub fn for_property(parent: Arc<Path>, name: impl Into<String>) -> Self {
        Self {
            path_type: PathType::Property,
            parent: Some(parent),
            element: PathElement::Name(name.into()),
        }
    }

    /// Metadata for the size of the `parent` collection.
    #[must_use]
    pub fn for_size(parent: Arc<Path>) -> Self {
        Self {
            path_type: PathType::Size,
            parent: Some(parent),
            element: PathElement::None,
        }
    }

    /// Metadata for element `index` of the `parent` list.
    #[must_use]
    pub fn for_list_value(parent: Arc<Path>, index: usize) -> Self {
        Self {
            path_type: PathType::ListValue,
            parent: Some(parent),
            element: PathElement::Index(index),
        }
    }

    /// Metadata for the value stored under `key` in the `parent` map.
    #[must_use]
    pub fn for_map_value(parent: Arc<Path>, key: impl Into<Constant>) -> Self {
        Self {
            path_type: PathType::MapValue,
            parent: Some(parent),
            element: PathElement::Key(key.into()),
        }
    }

    /// Returns the path kind.
    #[must_use]
    pub const fn path_type(&self) -> PathType {
        self.path_type
    }

    /// Returns the parent path.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Path>> {
        self.parent.as_ref()
    }

    /// Returns the last step.
    #[must_use]
    pub const fn element(&self) -> &PathElement {
        &self.element
    }

    /// Returns the name for root, variable and property metadata.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.element {
            PathElement::Name(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawPathMetadata {
    path_type: PathType,
    parent: Option<Arc<Path>>,
    element: PathElement,
}

impl TryFrom<RawPathMetadata> for PathMetadata {
    type Error = ExpressionError;

    fn try_from(raw: RawPathMetadata) -> Result<Self, Self::Error> {
        let invalid = |reason| ExpressionError::InvalidPath {
            path_type: raw.path_type.name(),
            reason,
        };
        if raw.path_type.has_parent() != raw.parent.is_some() {
            return Err(invalid(if raw.path_type.has_parent() {
                "a parent is required"
            } else {
                "a parent is not allowed"
            }));
        }
        let element_ok = match raw.path_type {
            PathType::Root | PathType::Variable | PathType::Property => {
                matches!(raw.element, PathElement::Name(_))
            }
            PathType::Size => matches!(raw.element, PathElement::None),
            PathType::ListValue => matches!(raw.element, PathElement::Index(_)),
            PathType::MapValue => matches!(raw.element, PathElement::Key(_)),
        };
        if !element_ok {
            return Err(invalid("element does not match the path kind"));
        }
        Ok(Self {
            path_type: raw.path_type,
            parent: raw.parent,
            element: raw.element,
        })
    }
}

/// The kind of value a path refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A scalar.
    Scalar(ScalarKind),
    /// A composite entity.
    Entity(String),
    /// A list or set.
    Collection(CollectionKind),
    /// A map.
    Map,
    /// An enumerated type.
    Enum(String),
}

impl From<&TypeInfo> for ElementKind {
    fn from(info: &TypeInfo) -> Self {
        match info {
            TypeInfo::Scalar(kind) => Self::Scalar(*kind),
            TypeInfo::Enum(descriptor) => Self::Enum(descriptor.name.to_string()),
            TypeInfo::Entity(descriptor) => Self::Entity(descriptor.name.to_string()),
            TypeInfo::Collection { kind, .. } => Self::Collection(*kind),
            TypeInfo::Map { .. } => Self::Map,
        }
    }
}

/// A typed path node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    metadata: PathMetadata,
    kind: ElementKind,
}

impl Path {
    /// Creates a path node.
    #[must_use]
    pub const fn new(metadata: PathMetadata, kind: ElementKind) -> Self {
        Self { metadata, kind }
    }

    /// Creates a variable path.
    #[must_use]
    pub fn variable(name: impl Into<String>, kind: ElementKind) -> Arc<Self> {
        Arc::new(Self::new(PathMetadata::for_variable(name), kind))
    }

    /// Creates a property path below `parent`.
    #[must_use]
    pub fn property(parent: &Arc<Self>, name: impl Into<String>, kind: ElementKind) -> Arc<Self> {
        Arc::new(Self::new(
            PathMetadata::for_property(Arc::clone(parent), name),
            kind,
        ))
    }

    /// Creates the size path of `parent`.
    #[must_use]
    pub fn size(parent: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self::new(
            PathMetadata::for_size(Arc::clone(parent)),
            ElementKind::Scalar(ScalarKind::Integer),
        ))
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &PathMetadata {
        &self.metadata
    }

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Returns the path kind.
    #[must_use]
    pub const fn path_type(&self) -> PathType {
        self.metadata.path_type
    }

    /// Returns the parent path.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.metadata.parent()
    }

    /// Returns the root of this path.
    #[must_use]
    pub fn root(&self) -> &Self {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Returns the number of steps from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat() -> Arc<Path> {
        Path::variable("cat", ElementKind::Entity("Cat".into()))
    }

    #[test]
    fn test_parent_invariant() {
        let cat = cat();
        let name = Path::property(&cat, "name", ElementKind::Scalar(ScalarKind::Text));
        assert_eq!(name.path_type(), PathType::Property);
        assert!(Arc::ptr_eq(name.parent().unwrap(), &cat));
        assert!(cat.parent().is_none());
        assert_eq!(name.metadata().name(), Some("name"));
    }

    #[test]
    fn test_size_path() {
        let kittens = Path::property(
            &cat(),
            "kittens",
            ElementKind::Collection(CollectionKind::List),
        );
        let size = Path::size(&kittens);
        assert_eq!(size.path_type(), PathType::Size);
        assert_eq!(size.metadata().element(), &PathElement::None);
        assert!(Arc::ptr_eq(size.parent().unwrap(), &kittens));
        assert_eq!(size.depth(), 2);
        assert_eq!(size.root().metadata().name(), Some("cat"));
    }

    #[test]
    fn test_deserialize_rejects_orphan_property() {
        let json = r#"{
            "metadata": {"path_type": "property", "parent": null, "element": {"name": "x"}},
            "kind": {"scalar": "text"}
        }"#;
        let err = serde_json::from_str::<Path>(json).unwrap_err();
        assert!(err.to_string().contains("a parent is required"));
    }

    #[test]
    fn test_deserialize_rejects_parented_variable() {
        let parent = serde_json::to_value(cat()).unwrap();
        let json = serde_json::json!({
            "metadata": {"path_type": "variable", "parent": parent, "element": {"name": "x"}},
            "kind": {"scalar": "text"}
        });
        assert!(serde_json::from_value::<Path>(json).is_err());
    }
}
