use super::*;

#[test]
fn test_object_type_parse_is_lenient() {
    assert_eq!("table".parse::<ObjectType>().unwrap(), ObjectType::Table);
    assert_eq!(
        "PACKAGE BODY".parse::<ObjectType>().unwrap(),
        ObjectType::PackageBody
    );
    assert_eq!(
        "package_body".parse::<ObjectType>().unwrap(),
        ObjectType::PackageBody
    );
    assert_eq!(
        " Procedure ".parse::<ObjectType>().unwrap(),
        ObjectType::Procedure
    );
}

#[test]
fn test_object_type_parse_unknown() {
    let err = "SYNONYM".parse::<ObjectType>().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("SYNONYM"));
    assert!(msg.contains("PACKAGE_BODY"));
}

#[test]
fn test_object_type_keyword() {
    assert_eq!(ObjectType::PackageBody.keyword(), "PACKAGE BODY");
    assert_eq!(ObjectType::Trigger.keyword(), "TRIGGER");
}

#[test]
fn test_categories() {
    assert_eq!(ObjectType::Sequence.category(), ObjectCategory::Tables);
    assert_eq!(ObjectType::View.category(), ObjectCategory::Tables);
    assert_eq!(ObjectType::Type.category(), ObjectCategory::Types);
    assert_eq!(ObjectType::PackageBody.category(), ObjectCategory::Packages);
    assert_eq!(ObjectType::Function.category(), ObjectCategory::Routines);
    assert_eq!(ObjectType::Procedure.category(), ObjectCategory::Routines);
    assert_eq!(ObjectType::Trigger.category(), ObjectCategory::Triggers);
}

#[test]
fn test_category_order_is_creation_order() {
    let mut shuffled = vec![
        ObjectCategory::Triggers,
        ObjectCategory::Tables,
        ObjectCategory::Routines,
        ObjectCategory::Packages,
        ObjectCategory::Types,
    ];
    shuffled.sort();
    assert_eq!(shuffled, ObjectCategory::ALL.to_vec());
}

#[test]
fn test_object_ref_identity_is_case_insensitive() {
    let a = ObjectRef::new("app", "orders", ObjectType::Table);
    let b = ObjectRef::new("APP", "\"ORDERS\"", ObjectType::Table);
    assert_eq!(a, b);
    assert_eq!(a.qualified_name(), "APP.ORDERS");
    assert_eq!(a.to_string(), "TABLE APP.ORDERS");
}

#[test]
fn test_object_ref_type_is_part_of_identity() {
    let view = ObjectRef::new("APP", "REPORT", ObjectType::View);
    let pkg = view.with_type(ObjectType::Package);
    assert_ne!(view, pkg);
}

#[test]
fn test_object_ref_try_new_rejects_empty() {
    assert!(matches!(
        ObjectRef::try_new("", "ORDERS", ObjectType::Table),
        Err(CoreError::EmptyIdentifier { .. })
    ));
    assert!(ObjectRef::try_new("APP", " ", ObjectType::Table).is_err());
}

#[test]
fn test_object_ref_ordering_is_schema_then_name() {
    let mut refs = vec![
        ObjectRef::new("B", "A", ObjectType::Table),
        ObjectRef::new("A", "Z", ObjectType::Table),
        ObjectRef::new("A", "M", ObjectType::Table),
    ];
    refs.sort();
    let names: Vec<String> = refs.iter().map(|r| r.qualified_name()).collect();
    assert_eq!(names, vec!["A.M", "A.Z", "B.A"]);
}

#[test]
fn test_object_ref_serde_shape() {
    let r = ObjectRef::new("app", "audit_pkg", ObjectType::PackageBody);
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(
        json,
        r#"{"schema":"APP","name":"AUDIT_PKG","type":"PACKAGE_BODY"}"#
    );
    let back: ObjectRef =
        serde_json::from_str(r#"{"schema":"app","name":"audit_pkg","type":"package body"}"#)
            .unwrap();
    assert_eq!(back, r);
}
