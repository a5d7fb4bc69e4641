//! Alias-based path capture.
//!
//! An [`AliasSession`] owns a set of aliases. Each alias stands in for a
//! domain object and is bound to the [`Path`] it represents. Navigating a
//! property, a collection size, a list element or a map value on an alias
//! builds the matching child path, returns a representative value (or a child
//! alias for composite types) and records the path as the session's last
//! captured one.
//!
//! Navigations are memoized per alias: repeating one returns the very same
//! `Arc<Path>`, so trees built from repeated navigation share their nodes.
//!
//! A session is confined to the thread that created it. It is neither `Send`
//! nor `Sync`.
//!
//! ```
//! use oxide_query_core::alias::AliasSession;
//! use oxide_query_core::domain::{Domain, EntityDescriptor, PropertyDescriptor, TypeInfo};
//! use oxide_query_core::Dialect;
//!
//! struct Cat;
//!
//! static CAT: EntityDescriptor = EntityDescriptor {
//!     name: "Cat",
//!     properties: &[PropertyDescriptor { name: "name", ty: <String as Domain>::type_info }],
//! };
//!
//! impl Domain for Cat {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::Entity(&CAT)
//!     }
//! }
//!
//! let mut session = AliasSession::new();
//! let cat = session.create_alias::<Cat>("cat");
//! session.navigate(cat, "name").unwrap();
//! let condition = session.capture().unwrap().eq("Tom");
//!
//! let jpql = Dialect::jpql().unwrap();
//! assert_eq!(jpql.render(&condition).unwrap(), "cat.name = 'Tom'");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, trace};

use crate::domain::{CollectionKind, Domain, ScalarKind, TypeInfo};
use crate::error::AliasError;
use crate::expr::{Constant, ElementKind, Expression, Path, PathMetadata};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Handle to an alias within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AliasId {
    session: u64,
    index: usize,
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.session)
    }
}

/// A map key used for value navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// A string key.
    Text(String),
    /// An integer key.
    Integer(i64),
    /// A character key.
    Char(char),
    /// A boolean key.
    Boolean(bool),
}

impl MapKey {
    /// Returns the key as a constant.
    #[must_use]
    pub fn to_constant(&self) -> Constant {
        match self {
            Self::Text(s) => Constant::Text(s.clone()),
            Self::Integer(n) => Constant::Integer(*n),
            Self::Char(c) => Constant::Char(*c),
            Self::Boolean(b) => Constant::Boolean(*b),
        }
    }
}

impl From<&str> for MapKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MapKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MapKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MapKey {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<char> for MapKey {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<bool> for MapKey {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// The result of a navigation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// A scalar or enum value, represented by a placeholder constant.
    Value {
        /// The representative value.
        value: Constant,
        /// The captured path.
        path: Arc<Path>,
    },
    /// A composite value, represented by a child alias.
    Alias {
        /// The child alias, bound to `path`.
        alias: AliasId,
        /// The captured path.
        path: Arc<Path>,
    },
}

impl Navigation {
    /// Returns the captured path.
    #[must_use]
    pub const fn path(&self) -> &Arc<Path> {
        match self {
            Self::Value { path, .. } | Self::Alias { path, .. } => path,
        }
    }

    /// Returns the child alias, if the navigation produced one.
    #[must_use]
    pub const fn alias(&self) -> Option<AliasId> {
        match self {
            Self::Alias { alias, .. } => Some(*alias),
            Self::Value { .. } => None,
        }
    }

    /// Returns the representative value, if the navigation produced one.
    #[must_use]
    pub const fn value(&self) -> Option<&Constant> {
        match self {
            Self::Value { value, .. } => Some(value),
            Self::Alias { .. } => None,
        }
    }

    /// Returns the captured path as an expression.
    #[must_use]
    pub fn to_expression(&self) -> Expression {
        Expression::Path(Arc::clone(self.path()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NavKey {
    Property(&'static str),
    Size,
    Index(usize),
    Key(MapKey),
}

#[derive(Debug)]
struct Slot {
    ty: TypeInfo,
    path: Option<Arc<Path>>,
    cache: HashMap<NavKey, Navigation>,
}

/// A thread-confined arena of aliases.
#[derive(Debug)]
pub struct AliasSession {
    id: u64,
    slots: Vec<Slot>,
    last_captured: Option<Arc<Path>>,
    _not_send: PhantomData<Rc<()>>,
}

impl Default for AliasSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            last_captured: None,
            _not_send: PhantomData,
        }
    }

    /// Returns the number of aliases, child aliases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no alias has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Creates an alias for `T` bound to the variable `variable`.
    pub fn create_alias<T: Domain>(&mut self, variable: &str) -> AliasId {
        self.create_alias_for(T::type_info(), variable)
    }

    /// Creates an alias for the described type bound to the variable
    /// `variable`.
    pub fn create_alias_for(&mut self, ty: TypeInfo, variable: &str) -> AliasId {
        let path = Path::variable(variable, ElementKind::from(&ty));
        let alias = self.push(ty, Some(path));
        debug!(%alias, variable, ty = %ty.name(), "created alias");
        alias
    }

    /// Creates an alias for `T` bound to a root path named after the type.
    pub fn create_root_alias<T: Domain>(&mut self) -> AliasId {
        let ty = T::type_info();
        let path = Arc::new(Path::new(
            PathMetadata::for_root(ty.name()),
            ElementKind::from(&ty),
        ));
        let alias = self.push(ty, Some(path));
        debug!(%alias, ty = %ty.name(), "created root alias");
        alias
    }

    /// Creates an alias for `T` with no bound path. Navigating it fails until
    /// [`bind`](Self::bind) is called.
    pub fn declare_alias<T: Domain>(&mut self) -> AliasId {
        self.push(T::type_info(), None)
    }

    /// Binds a declared alias to the variable `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::AlreadyBound`] for an alias that has a path and
    /// [`AliasError::ForeignAlias`] for a handle from another session.
    pub fn bind(&mut self, alias: AliasId, variable: &str) -> Result<Arc<Path>, AliasError> {
        let slot = self.slot_mut(alias)?;
        if slot.path.is_some() {
            return Err(AliasError::AlreadyBound(alias.to_string()));
        }
        let path = Path::variable(variable, ElementKind::from(&slot.ty));
        slot.path = Some(Arc::clone(&path));
        debug!(%alias, variable, "bound alias");
        Ok(path)
    }

    /// Returns whether the alias has a path.
    #[must_use]
    pub fn is_bound(&self, alias: AliasId) -> bool {
        self.slot(alias).is_ok_and(|slot| slot.path.is_some())
    }

    /// Returns the path bound to `alias`, or `None` when the alias is unbound
    /// or not part of this session.
    #[must_use]
    pub fn path_of(&self, alias: AliasId) -> Option<Arc<Path>> {
        self.slot(alias).ok().and_then(|slot| slot.path.clone())
    }

    /// Returns the declared type of `alias`.
    #[must_use]
    pub fn type_of(&self, alias: AliasId) -> Option<TypeInfo> {
        self.slot(alias).ok().map(|slot| slot.ty)
    }

    /// Returns the most recently captured path.
    #[must_use]
    pub const fn last_captured(&self) -> Option<&Arc<Path>> {
        self.last_captured.as_ref()
    }

    /// Returns and clears the most recently captured path.
    pub fn take_last_captured(&mut self) -> Option<Arc<Path>> {
        self.last_captured.take()
    }

    /// Takes the most recently captured path as an expression.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::NothingCaptured`] if nothing was navigated since
    /// the last take.
    pub fn capture(&mut self) -> Result<Expression, AliasError> {
        self.take_last_captured()
            .map(Expression::Path)
            .ok_or(AliasError::NothingCaptured)
    }

    /// Navigates the property `property` of `alias`.
    ///
    /// # Errors
    ///
    /// Fails when the alias is unbound or foreign, when its type is not an
    /// entity, or when the entity has no such property.
    pub fn navigate(&mut self, alias: AliasId, property: &str) -> Result<Navigation, AliasError> {
        let (ty, parent) = self.bound(alias, property)?;
        let entity = ty.as_entity().ok_or_else(|| AliasError::NotAnEntity {
            alias: alias.to_string(),
            type_name: ty.name(),
        })?;
        let descriptor = entity
            .property(property)
            .ok_or_else(|| AliasError::UnknownProperty {
                type_name: entity.name.to_string(),
                property: property.to_string(),
            })?;

        let key = NavKey::Property(descriptor.name);
        if let Some(hit) = self.cached(alias, &key) {
            return Ok(hit);
        }
        let metadata = PathMetadata::for_property(parent, descriptor.name);
        self.record(alias, key, (descriptor.ty)(), metadata)
    }

    /// Navigates the size of the collection or map `alias`.
    ///
    /// # Errors
    ///
    /// Fails when the alias is unbound or foreign, or not a collection or map.
    pub fn size(&mut self, alias: AliasId) -> Result<Navigation, AliasError> {
        let (ty, parent) = self.bound(alias, "size")?;
        if !matches!(ty, TypeInfo::Collection { .. } | TypeInfo::Map { .. }) {
            return Err(AliasError::NotACollection {
                alias: alias.to_string(),
                type_name: ty.name(),
            });
        }
        if let Some(hit) = self.cached(alias, &NavKey::Size) {
            return Ok(hit);
        }
        self.record(
            alias,
            NavKey::Size,
            TypeInfo::Scalar(ScalarKind::Integer),
            PathMetadata::for_size(parent),
        )
    }

    /// Navigates element `index` of the list `alias`.
    ///
    /// # Errors
    ///
    /// Fails when the alias is unbound or foreign, or not a list.
    pub fn element(&mut self, alias: AliasId, index: usize) -> Result<Navigation, AliasError> {
        let (ty, parent) = self.bound(alias, &format!("[{index}]"))?;
        let TypeInfo::Collection {
            kind: CollectionKind::List,
            element,
        } = ty
        else {
            return Err(AliasError::NotAList {
                alias: alias.to_string(),
                type_name: ty.name(),
            });
        };
        let key = NavKey::Index(index);
        if let Some(hit) = self.cached(alias, &key) {
            return Ok(hit);
        }
        self.record(
            alias,
            key,
            element(),
            PathMetadata::for_list_value(parent, index),
        )
    }

    /// Navigates the value stored under `key` in the map `alias`.
    ///
    /// # Errors
    ///
    /// Fails when the alias is unbound or foreign, or not a map.
    pub fn value(
        &mut self,
        alias: AliasId,
        key: impl Into<MapKey>,
    ) -> Result<Navigation, AliasError> {
        let key = key.into();
        let (ty, parent) = self.bound(alias, &format!("[{key:?}]"))?;
        let TypeInfo::Map { value, .. } = ty else {
            return Err(AliasError::NotAMap {
                alias: alias.to_string(),
                type_name: ty.name(),
            });
        };
        let constant = key.to_constant();
        let key = NavKey::Key(key);
        if let Some(hit) = self.cached(alias, &key) {
            return Ok(hit);
        }
        self.record(
            alias,
            key,
            value(),
            PathMetadata::for_map_value(parent, constant),
        )
    }

    fn push(&mut self, ty: TypeInfo, path: Option<Arc<Path>>) -> AliasId {
        let alias = AliasId {
            session: self.id,
            index: self.slots.len(),
        };
        self.slots.push(Slot {
            ty,
            path,
            cache: HashMap::new(),
        });
        alias
    }

    fn slot(&self, alias: AliasId) -> Result<&Slot, AliasError> {
        if alias.session != self.id {
            return Err(AliasError::ForeignAlias(alias.to_string()));
        }
        self.slots
            .get(alias.index)
            .ok_or_else(|| AliasError::ForeignAlias(alias.to_string()))
    }

    fn slot_mut(&mut self, alias: AliasId) -> Result<&mut Slot, AliasError> {
        if alias.session != self.id {
            return Err(AliasError::ForeignAlias(alias.to_string()));
        }
        self.slots
            .get_mut(alias.index)
            .ok_or_else(|| AliasError::ForeignAlias(alias.to_string()))
    }

    /// Returns the type and path of a bound alias.
    fn bound(&self, alias: AliasId, step: &str) -> Result<(TypeInfo, Arc<Path>), AliasError> {
        let slot = self.slot(alias)?;
        let path = slot.path.clone().ok_or_else(|| AliasError::Unbound {
            alias: format!("{alias} ({})", slot.ty.name()),
            property: step.to_string(),
        })?;
        Ok((slot.ty, path))
    }

    fn cached(&mut self, alias: AliasId, key: &NavKey) -> Option<Navigation> {
        let hit = self.slots.get(alias.index)?.cache.get(key)?.clone();
        trace!(%alias, ?key, "navigation cache hit");
        self.last_captured = Some(Arc::clone(hit.path()));
        Some(hit)
    }

    fn record(
        &mut self,
        alias: AliasId,
        key: NavKey,
        ty: TypeInfo,
        metadata: PathMetadata,
    ) -> Result<Navigation, AliasError> {
        let path = Arc::new(Path::new(metadata, ElementKind::from(&ty)));
        let navigation = match ty {
            TypeInfo::Scalar(kind) => Navigation::Value {
                value: representative(kind),
                path,
            },
            TypeInfo::Enum(descriptor) => {
                let member = descriptor
                    .members
                    .first()
                    .ok_or(AliasError::EmptyEnum(descriptor.name))?;
                Navigation::Value {
                    value: Constant::Enum {
                        type_name: descriptor.name.to_string(),
                        member: (*member).to_string(),
                    },
                    path,
                }
            }
            TypeInfo::Entity(_) | TypeInfo::Collection { .. } | TypeInfo::Map { .. } => {
                let child = self.push(ty, Some(Arc::clone(&path)));
                Navigation::Alias { alias: child, path }
            }
        };
        trace!(%alias, ?key, path_type = %navigation.path().path_type(), "navigated");

        let slot = self.slot_mut(alias)?;
        slot.cache.insert(key, navigation.clone());
        self.last_captured = Some(Arc::clone(navigation.path()));
        Ok(navigation)
    }
}

/// The placeholder value returned for a scalar navigation.
fn representative(kind: ScalarKind) -> Constant {
    match kind {
        ScalarKind::Text => Constant::Text(String::new()),
        ScalarKind::Char => Constant::Char('a'),
        ScalarKind::Boolean => Constant::Boolean(true),
        ScalarKind::Integer => Constant::Integer(42),
        ScalarKind::Float => Constant::Float(42.0),
        ScalarKind::Date => Constant::Date(NaiveDate::default()),
        ScalarKind::DateTime => Constant::DateTime(NaiveDateTime::default()),
        ScalarKind::Time => Constant::Time(NaiveTime::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityDescriptor, EnumDescriptor, PropertyDescriptor};
    use crate::expr::PathType;

    struct Person;
    struct Address;
    struct Color;

    static PERSON: EntityDescriptor = EntityDescriptor {
        name: "Person",
        properties: &[
            PropertyDescriptor {
                name: "name",
                ty: <String as Domain>::type_info,
            },
            PropertyDescriptor {
                name: "address",
                ty: <Address as Domain>::type_info,
            },
            PropertyDescriptor {
                name: "friends",
                ty: <Vec<Person> as Domain>::type_info,
            },
            PropertyDescriptor {
                name: "favorite",
                ty: <Color as Domain>::type_info,
            },
        ],
    };

    static ADDRESS: EntityDescriptor = EntityDescriptor {
        name: "Address",
        properties: &[PropertyDescriptor {
            name: "city",
            ty: <String as Domain>::type_info,
        }],
    };

    static COLOR: EnumDescriptor = EnumDescriptor {
        name: "Color",
        members: &["Red", "Green"],
    };

    impl Domain for Person {
        fn type_info() -> TypeInfo {
            TypeInfo::Entity(&PERSON)
        }
    }

    impl Domain for Address {
        fn type_info() -> TypeInfo {
            TypeInfo::Entity(&ADDRESS)
        }
    }

    impl Domain for Color {
        fn type_info() -> TypeInfo {
            TypeInfo::Enum(&COLOR)
        }
    }

    #[test]
    fn test_navigation_is_memoized() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        let first = session.navigate(person, "name").unwrap();
        let second = session.navigate(person, "name").unwrap();
        assert!(Arc::ptr_eq(first.path(), second.path()));
        assert_eq!(first.value(), Some(&Constant::Text(String::new())));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_nested_navigation() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        let address = session.navigate(person, "address").unwrap().alias().unwrap();
        let city = session.navigate(address, "city").unwrap();
        let path = city.path();
        assert_eq!(path.path_type(), PathType::Property);
        assert_eq!(path.depth(), 2);
        assert_eq!(path.root().metadata().name(), Some("p"));
        assert!(Arc::ptr_eq(
            path.parent().unwrap(),
            &session.path_of(address).unwrap()
        ));
    }

    #[test]
    fn test_enum_and_size() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        let favorite = session.navigate(person, "favorite").unwrap();
        assert_eq!(
            favorite.value(),
            Some(&Constant::Enum {
                type_name: "Color".into(),
                member: "Red".into(),
            })
        );

        let friends = session.navigate(person, "friends").unwrap();
        let size = session.size(friends.alias().unwrap()).unwrap();
        assert_eq!(size.value(), Some(&Constant::Integer(42)));
        let metadata = size.path().metadata();
        assert_eq!(metadata.path_type(), PathType::Size);
        assert!(Arc::ptr_eq(metadata.parent().unwrap(), friends.path()));
    }

    #[test]
    fn test_list_element() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        let friends = session.navigate(person, "friends").unwrap().alias().unwrap();
        let first = session.element(friends, 0).unwrap();
        assert_eq!(first.path().path_type(), PathType::ListValue);
        let name = session.navigate(first.alias().unwrap(), "name").unwrap();
        assert_eq!(name.path().depth(), 3);
        assert!(matches!(
            session.value(friends, "x"),
            Err(AliasError::NotAMap { .. })
        ));
    }

    #[test]
    fn test_last_captured() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        assert!(session.last_captured().is_none());
        let name = session.navigate(person, "name").unwrap();
        assert!(Arc::ptr_eq(session.last_captured().unwrap(), name.path()));
        assert!(session.capture().is_ok());
        assert_eq!(session.capture(), Err(AliasError::NothingCaptured));
        // a cache hit captures again
        session.navigate(person, "name").unwrap();
        assert!(session.take_last_captured().is_some());
    }

    #[test]
    fn test_unbound_alias() {
        let mut session = AliasSession::new();
        let person = session.declare_alias::<Person>();
        assert!(!session.is_bound(person));
        assert!(matches!(
            session.navigate(person, "name"),
            Err(AliasError::Unbound { property, .. }) if property == "name"
        ));
        assert!(matches!(
            session.size(person),
            Err(AliasError::Unbound { .. })
        ));
        session.bind(person, "p").unwrap();
        assert!(session.navigate(person, "name").is_ok());
        assert!(matches!(
            session.bind(person, "q"),
            Err(AliasError::AlreadyBound(_))
        ));
    }

    #[test]
    fn test_type_errors() {
        let mut session = AliasSession::new();
        let person = session.create_alias::<Person>("p");
        assert_eq!(
            session.navigate(person, "age"),
            Err(AliasError::UnknownProperty {
                type_name: "Person".into(),
                property: "age".into(),
            })
        );
        assert!(matches!(
            session.size(person),
            Err(AliasError::NotACollection { .. })
        ));
        assert!(matches!(
            session.element(person, 0),
            Err(AliasError::NotAList { .. })
        ));
    }

    #[test]
    fn test_foreign_alias() {
        let mut first = AliasSession::new();
        let mut second = AliasSession::new();
        let person = first.create_alias::<Person>("p");
        second.create_alias::<Person>("p");
        assert!(matches!(
            second.navigate(person, "name"),
            Err(AliasError::ForeignAlias(_))
        ));
        assert!(second.path_of(person).is_none());
    }

    #[test]
    fn test_root_alias() {
        let mut session = AliasSession::new();
        let person = session.create_root_alias::<Person>();
        let path = session.path_of(person).unwrap();
        assert_eq!(path.path_type(), PathType::Root);
        assert_eq!(path.metadata().name(), Some("Person"));
        assert_eq!(session.type_of(person).unwrap().name(), "Person");
    }
}
