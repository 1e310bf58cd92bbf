use super::*;
use async_trait::async_trait;
use dig_core::identifier::ObjectName;
use dig_db::{CatalogSnapshot, DbError, ForeignKeyRef};
use pretty_assertions::assert_eq;

const CATALOG: &str = include_str!("../tests/fixtures/orders_catalog.yml");

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::from_yaml_str(CATALOG, "orders_catalog.yml").unwrap()
}

fn seed(name: &str) -> SeedSpec {
    SeedSpec::new(SchemaName::new("APP"), ObjectName::new(name), None)
}

fn app(name: &str, object_type: ObjectType) -> ObjectRef {
    ObjectRef::new("APP", name, object_type)
}

fn sorted_objects(graph: &DependencyGraph) -> Vec<ObjectRef> {
    let mut objects: Vec<ObjectRef> = graph.objects().cloned().collect();
    objects.sort();
    objects
}

#[tokio::test]
async fn test_order_closure() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("order")])
        .await
        .unwrap();

    let order = app("ORDER", ObjectType::Table);
    let customer = app("CUSTOMER", ObjectType::Table);
    let trigger = app("ORDER_AUDIT_TRG", ObjectType::Trigger);

    assert_eq!(graph.seeds(), &[order.clone()]);
    assert_eq!(
        sorted_objects(&graph),
        vec![
            app("AUDIT_PKG", ObjectType::Package),
            customer.clone(),
            order.clone(),
            trigger.clone(),
            app("REGION", ObjectType::Table),
        ]
    );

    // FK parent reported again as a generic dependency is not duplicated
    let order_edges: Vec<EdgeKind> = graph.outgoing(&order).iter().map(|(_, e)| e.kind).collect();
    assert_eq!(order_edges, vec![EdgeKind::ForeignKey, EdgeKind::Trigger]);

    // the trigger's owning table is not a dependency of the trigger
    let trigger_deps: Vec<&ObjectRef> =
        graph.outgoing(&trigger).into_iter().map(|(to, _)| to).collect();
    assert_eq!(trigger_deps, vec![&app("AUDIT_PKG", ObjectType::Package)]);
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.resolution_errors().is_empty());
}

#[tokio::test]
async fn test_foreign_key_columns_recorded() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("CUSTOMER")])
        .await
        .unwrap();
    let edges = graph.outgoing(&app("CUSTOMER", ObjectType::Table));
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].1.columns, vec!["REGION_ID"]);
    assert_eq!(edges[0].1.referenced_columns, vec!["ID"]);
}

#[tokio::test]
async fn test_mutual_foreign_keys_terminate() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog).build(&[seed("A")]).await.unwrap();

    let a = app("A", ObjectType::Table);
    let b = app("B", ObjectType::Table);
    assert_eq!(sorted_objects(&graph), vec![a.clone(), b.clone()]);
    let a_edges = graph.outgoing(&a);
    let b_edges = graph.outgoing(&b);
    assert_eq!(a_edges.len(), 1);
    assert_eq!((a_edges[0].0, a_edges[0].1.kind), (&b, EdgeKind::ForeignKey));
    assert_eq!(b_edges.len(), 1);
    assert_eq!((b_edges[0].0, b_edges[0].1.kind), (&a, EdgeKind::ForeignKey));
}

#[tokio::test]
async fn test_self_reference_kept_as_edge() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("EMPLOYEE")])
        .await
        .unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_ambiguous_seed_is_not_a_node() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("REPORT")])
        .await
        .unwrap();

    assert_eq!(graph.node_count(), 0);
    assert_eq!(
        graph.resolution_errors(),
        &[ResolutionError::Ambiguous {
            schema: SchemaName::new("APP"),
            name: ObjectName::new("REPORT"),
            candidates: vec![ObjectType::View, ObjectType::Package],
        }]
    );
}

#[tokio::test]
async fn test_explicit_type_and_system_leaf() {
    let catalog = catalog();
    let typed = SeedSpec::new(
        SchemaName::new("APP"),
        ObjectName::new("REPORT"),
        Some(ObjectType::View),
    );
    let graph = GraphBuilder::new(&catalog).build(&[typed]).await.unwrap();

    let dual = ObjectRef::new("SYS", "DUAL", ObjectType::Table);
    assert_eq!(graph.status(&dual), Some(&NodeStatus::External));
    assert_eq!(
        graph.status(&app("REGION", ObjectType::Table)),
        Some(&NodeStatus::Resolved)
    );
    assert_eq!(graph.summary().external, 1);
}

#[tokio::test]
async fn test_system_schemas_can_be_overridden() {
    let catalog = catalog();
    let typed = SeedSpec::new(
        SchemaName::new("APP"),
        ObjectName::new("REPORT"),
        Some(ObjectType::View),
    );
    let graph = GraphBuilder::new(&catalog)
        .with_system_schemas(Vec::new())
        .build(&[typed])
        .await
        .unwrap();

    // DUAL is not in the snapshot, so expanding it finds nothing
    let dual = ObjectRef::new("SYS", "DUAL", ObjectType::Table);
    assert_eq!(graph.status(&dual), Some(&NodeStatus::Unresolved));
}

#[tokio::test]
async fn test_missing_reference_becomes_unresolved_leaf() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("ORPHAN_VIEW"), seed("REGION")])
        .await
        .unwrap();

    let ghost = app("GHOST", ObjectType::Table);
    assert_eq!(graph.status(&ghost), Some(&NodeStatus::Unresolved));
    assert_eq!(graph.resolution_errors(), &[ResolutionError::not_found(&ghost)]);
    // the other seed still expanded
    assert!(graph.contains(&app("REGION", ObjectType::Table)));
    assert_eq!(graph.seeds().len(), 2);
}

#[tokio::test]
async fn test_unknown_seed_recorded() {
    let catalog = catalog();
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("NOPE")])
        .await
        .unwrap();
    assert_eq!(graph.node_count(), 0);
    assert!(matches!(
        graph.resolution_errors(),
        [ResolutionError::NotFound {
            object_type: None,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_disabled_triggers_followed_on_request() {
    let catalog = catalog().with_include_disabled_triggers(true);
    let graph = GraphBuilder::new(&catalog)
        .build(&[seed("ORDER")])
        .await
        .unwrap();
    assert!(graph.contains(&app("ORDER_LEGACY_TRG", ObjectType::Trigger)));
}

/// Provider whose catalog connection is gone.
struct Unreachable;

#[async_trait]
impl MetadataProvider for Unreachable {
    async fn resolve_type(&self, _: &SchemaName, _: &ObjectName) -> DbResult<TypeResolution> {
        Ok(TypeResolution::Found(ObjectType::Table))
    }

    async fn foreign_key_parents(
        &self,
        _: &SchemaName,
        _: &ObjectName,
    ) -> DbResult<Vec<ForeignKeyRef>> {
        Err(DbError::ConnectionError("listener refused".to_string()))
    }

    async fn triggers_on(&self, _: &SchemaName, _: &ObjectName) -> DbResult<Vec<ObjectRef>> {
        Ok(Vec::new())
    }

    async fn dependencies_of(&self, _: &ObjectRef) -> DbResult<Vec<ObjectRef>> {
        Ok(Vec::new())
    }

    async fn ddl_text(&self, object: &ObjectRef) -> DbResult<String> {
        Err(DbError::ObjectNotFound(object.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn test_connection_failure_aborts() {
    let provider = Unreachable;
    let err = GraphBuilder::new(&provider)
        .build(&[seed("ORDER")])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
}
