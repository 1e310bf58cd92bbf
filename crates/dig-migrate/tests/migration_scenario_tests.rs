//! End-to-end scenarios: catalog -> graph -> plan -> migration files

use dig_core::graph::NodeStatus;
use dig_core::identifier::{ObjectName, SchemaName};
use dig_core::object::{ObjectCategory, ObjectRef, ObjectType};
use dig_core::resolution::SeedSpec;
use dig_core::DependencyGraph;
use dig_db::CatalogSnapshot;
use dig_graph::GraphBuilder;
use dig_migrate::{plan, MigrationFileIndex, MigrationWriter};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use tempfile::TempDir;

const CATALOG: &str = include_str!("fixtures/orders_catalog.yml");

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::from_yaml_str(CATALOG, "orders_catalog.yml").unwrap()
}

fn app() -> SchemaName {
    SchemaName::new("APP")
}

fn seed(name: &str, object_type: Option<ObjectType>) -> SeedSpec {
    SeedSpec::new(app(), ObjectName::new(name), object_type)
}

async fn graph(catalog: &CatalogSnapshot, seeds: &[SeedSpec]) -> DependencyGraph {
    GraphBuilder::new(catalog).build(seeds).await.unwrap()
}

fn names(objects: &[ObjectRef]) -> Vec<&str> {
    objects.iter().map(|o| o.name.as_str()).collect()
}

// ── Order schema ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_order_scenario_plan() {
    let catalog = catalog();
    let graph = graph(&catalog, &[seed("ORDER", None)]).await;

    let mut nodes: Vec<&str> = graph.objects().map(|o| o.name.as_str()).collect();
    nodes.sort();
    assert_eq!(
        nodes,
        ["AUDIT_PKG", "CUSTOMER", "ORDER", "ORDER_AUDIT_TRG", "REGION"]
    );

    let plan = plan(&graph);
    let groups: Vec<(ObjectCategory, Vec<&str>)> = plan
        .groups
        .iter()
        .map(|g| (g.category, names(&g.objects)))
        .collect();
    assert_eq!(
        groups,
        vec![
            (ObjectCategory::Tables, vec!["REGION", "CUSTOMER", "ORDER"]),
            (ObjectCategory::Packages, vec!["AUDIT_PKG"]),
            (ObjectCategory::Triggers, vec!["ORDER_AUDIT_TRG"]),
        ]
    );
    assert!(plan.warnings.is_empty());
}

#[tokio::test]
async fn test_mutual_foreign_keys_plan_both_once() {
    let catalog = catalog();
    let graph = graph(&catalog, &[seed("A", None)]).await;
    let plan = plan(&graph);

    assert_eq!(plan.object_count(), 2);
    assert_eq!(
        names(&plan.group(ObjectCategory::Tables).unwrap().objects),
        vec!["A", "B"]
    );
    assert_eq!(plan.warnings.len(), 1);
    let message = plan.warnings[0].to_string();
    assert!(message.contains("APP.A"));
    assert!(message.contains("APP.B"));
}

// ── Round trip and idempotence ──────────────────────────────────────────

#[tokio::test]
async fn test_written_files_define_exactly_the_planned_objects() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog();
    let graph = graph(
        &catalog,
        &[
            seed("ORDER", None),
            seed("REPORT", Some(ObjectType::View)),
            seed("EMPLOYEE", None),
        ],
    )
    .await;
    let plan = plan(&graph);

    // Every resolved node lands in exactly one group
    let resolved: HashSet<ObjectRef> = graph
        .nodes()
        .filter(|n| n.status == NodeStatus::Resolved)
        .map(|n| n.object.clone())
        .collect();
    let planned: Vec<ObjectRef> = plan.objects().cloned().collect();
    assert_eq!(planned.len(), resolved.len());
    assert_eq!(planned.iter().cloned().collect::<HashSet<_>>(), resolved);
    assert!(!resolved.contains(&ObjectRef::new("SYS", "DUAL", ObjectType::Table)));

    let outcome = MigrationWriter::new(&catalog)
        .write(&plan, dir.path(), "orders", &MigrationFileIndex::default())
        .await
        .unwrap();
    assert_eq!(outcome.written.len(), plan.groups.len());

    let index = MigrationFileIndex::scan(dir.path(), &app()).unwrap();
    for object in &resolved {
        assert!(index.contains(object), "{} missing from output", object);
    }
    assert_eq!(index.object_count(), resolved.len());
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog();
    let graph = graph(&catalog, &[seed("ORDER", None)]).await;
    let plan = plan(&graph);
    let writer = MigrationWriter::new(&catalog);

    let first = writer
        .write(
            &plan,
            dir.path(),
            "orders",
            &MigrationFileIndex::scan(dir.path(), &app()).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.written.len(), 3);

    let second = writer
        .write(
            &plan,
            dir.path(),
            "orders",
            &MigrationFileIndex::scan(dir.path(), &app()).unwrap(),
        )
        .await
        .unwrap();
    assert!(second.nothing_written());
    assert_eq!(second.skipped.len(), plan.object_count());
}

#[tokio::test]
async fn test_growing_the_seed_set_adds_only_new_objects() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog();
    let writer = MigrationWriter::new(&catalog);

    let customer = plan(&graph(&catalog, &[seed("CUSTOMER", None)]).await);
    writer
        .write(&customer, dir.path(), "customers", &MigrationFileIndex::default())
        .await
        .unwrap();

    let order = plan(&graph(&catalog, &[seed("ORDER", None)]).await);
    let index = MigrationFileIndex::scan(dir.path(), &app()).unwrap();
    let outcome = writer
        .write(&order, dir.path(), "orders", &index)
        .await
        .unwrap();

    let file_names: Vec<String> = outcome
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        file_names,
        vec![
            "V1.1.0__orders_tables.sql",
            "V1.1.1__orders_packages.sql",
            "V1.1.2__orders_triggers.sql"
        ]
    );
    assert_eq!(names(&outcome.skipped), vec!["REGION", "CUSTOMER"]);
}
