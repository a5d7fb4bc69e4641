//! Tests for the `#[derive(Domain)]` macro output.

mod common;

use common::{Cat, Color, Toy};
use oxide_query_core::domain::{CollectionKind, Domain, ScalarKind, TypeInfo};
use oxide_query_derive::Domain;

fn property_names(info: TypeInfo) -> Vec<&'static str> {
    info.as_entity()
        .unwrap()
        .properties
        .iter()
        .map(|p| p.name)
        .collect()
}

#[test]
fn test_entity_properties_in_field_order() {
    assert_eq!(
        property_names(Cat::type_info()),
        ["name", "bodyWeight", "birthdate", "color", "kittens", "mate", "toys"]
    );
    assert_eq!(property_names(Toy::type_info()), ["label", "squeaks"]);
}

#[test]
fn test_property_types() {
    let info = Cat::type_info();
    let entity = info.as_entity().unwrap();
    let ty = |name: &str| (entity.property(name).unwrap().ty)();

    assert!(matches!(ty("name"), TypeInfo::Scalar(ScalarKind::Text)));
    assert!(matches!(ty("bodyWeight"), TypeInfo::Scalar(ScalarKind::Float)));
    assert!(matches!(ty("birthdate"), TypeInfo::Scalar(ScalarKind::Date)));
    assert!(matches!(ty("color"), TypeInfo::Enum(d) if d.name == "Color"));
    assert!(matches!(
        ty("kittens"),
        TypeInfo::Collection { kind: CollectionKind::List, .. }
    ));
    assert!(matches!(ty("mate"), TypeInfo::Entity(d) if d.name == "Cat"));
    assert_eq!(ty("toys").name(), "map<text, Toy>");
}

#[test]
fn test_enum_members_in_declaration_order() {
    let TypeInfo::Enum(descriptor) = Color::type_info() else {
        panic!("expected enum metadata");
    };
    assert_eq!(descriptor.name, "Color");
    assert_eq!(descriptor.members, ["Tabby", "Black", "Ginger"]);
}

#[allow(dead_code)]
#[derive(Domain)]
#[domain(name = "Shipment")]
struct ShipmentRow {
    #[domain(rename = "trackingCode")]
    tracking_code: String,
    r#type: Kind,
    legs: std::collections::BTreeSet<i64>,
}

#[allow(dead_code)]
#[derive(Domain)]
enum Kind {
    #[domain(rename = "EXPRESS")]
    Express,
    Standard,
    #[domain(skip)]
    Legacy,
}

#[test]
fn test_renames_and_raw_identifiers() {
    let info = ShipmentRow::type_info();
    assert_eq!(info.name(), "Shipment");
    assert_eq!(property_names(info), ["trackingCode", "type", "legs"]);

    let legs = (info.as_entity().unwrap().property("legs").unwrap().ty)();
    assert!(matches!(
        legs,
        TypeInfo::Collection { kind: CollectionKind::Set, .. }
    ));

    let TypeInfo::Enum(kind) = Kind::type_info() else {
        panic!("expected enum metadata");
    };
    assert_eq!(kind.members, ["EXPRESS", "Standard"]);
}

#[test]
fn test_metadata_is_static() {
    let (Some(a), Some(b)) = (Cat::type_info().as_entity(), Cat::type_info().as_entity()) else {
        panic!("expected entity metadata");
    };
    assert!(std::ptr::eq(a, b));
}
