//! Integration tests for the schemadig binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled schemadig binary
fn schemadig_bin() -> String {
    env!("CARGO_BIN_EXE_schemadig").to_string()
}

fn catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/orders_catalog.yml")
}

/// Run `schemadig` against the fixture catalog and return (stdout, stderr, success).
fn run_schemadig(args: &[&str]) -> (String, String, bool) {
    let catalog = catalog_path();
    let output = Command::new(schemadig_bin())
        .arg("--catalog")
        .arg(&catalog)
        .args(args)
        .env_remove("SCHEMADIG_DATABASE")
        .env_remove("SCHEMADIG_SCHEMA")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute schemadig with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

// ── show-deps ───────────────────────────────────────────────────────────

#[test]
fn test_show_deps_text_tree() {
    let (stdout, stderr, success) =
        run_schemadig(&["show-deps", "--seed-object", "ORDER", "--schema", "app"]);
    assert!(success, "show-deps failed: {}", stderr);
    assert_eq!(
        stdout,
        "\
TABLE APP.ORDER
├── TABLE APP.CUSTOMER [fk: CUSTOMER_ID]
│   └── TABLE APP.REGION [fk: REGION_ID]
└── TRIGGER APP.ORDER_AUDIT_TRG [trigger]
    └── PACKAGE APP.AUDIT_PKG [dep]
"
    );
}

#[test]
fn test_show_deps_json() {
    let (stdout, stderr, success) = run_schemadig(&[
        "sd",
        "-o",
        "APP.CUSTOMER",
        "--out-format",
        "json",
    ]);
    assert!(success, "show-deps failed: {}", stderr);
    assert!(stdout.contains("\"object_name\": \"CUSTOMER\""));
    assert!(stdout.contains("\"dependency_list\""));
}

#[test]
fn test_show_deps_ambiguous_seed_fails() {
    let (stdout, _stderr, success) =
        run_schemadig(&["show-deps", "--seed-object", "REPORT", "--schema", "APP"]);
    assert!(!success);
    assert!(stdout.contains("APP.REPORT is ambiguous"));
    assert!(stdout.contains("VIEW and PACKAGE"));
}

#[test]
fn test_show_deps_explicit_type_resolves_ambiguity() {
    let (stdout, stderr, success) = run_schemadig(&[
        "show-deps",
        "--seed-object",
        "REPORT",
        "--schema",
        "APP",
        "--object-type",
        "view",
    ]);
    assert!(success, "show-deps failed: {}", stderr);
    assert!(stdout.contains("TABLE SYS.DUAL [dep] (system)"));
}

#[test]
fn test_show_deps_requires_schema() {
    let (_stdout, stderr, success) = run_schemadig(&["show-deps", "--seed-object", "ORDER"]);
    assert!(!success);
    assert!(stderr.contains("No schema given"));
}

#[test]
fn test_missing_catalog_fails() {
    let output = Command::new(schemadig_bin())
        .args([
            "--catalog",
            "/nonexistent/catalog.yml",
            "show-deps",
            "-o",
            "ORDER",
            "-s",
            "APP",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load catalog"));
}

// ── create-migrations ───────────────────────────────────────────────────

#[test]
fn test_create_migrations_then_nothing_new() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("migrations");
    let folder_arg = folder.to_string_lossy().to_string();
    let args = [
        "create-migrations",
        "--seed-object",
        "ORDER",
        "--schema",
        "APP",
        "--migration-folder",
        folder_arg.as_str(),
        "--migration-name",
        "orders",
    ];

    let (stdout, stderr, success) = run_schemadig(&args);
    assert!(success, "create-migrations failed: {}", stderr);
    assert!(stdout.contains("V1.0.0__orders_tables.sql"));
    assert!(stdout.contains("V1.0.1__orders_packages.sql"));
    assert!(stdout.contains("V1.0.2__orders_triggers.sql"));
    assert_eq!(fs::read_dir(&folder).unwrap().count(), 3);

    let (stdout, stderr, success) = run_schemadig(&args);
    assert!(success, "second run failed: {}", stderr);
    assert!(stdout.contains("No new objects to migrate"));
    assert_eq!(fs::read_dir(&folder).unwrap().count(), 3);
}

#[test]
fn test_create_migrations_reports_cycle() {
    let dir = TempDir::new().unwrap();
    let folder_arg = dir.path().to_string_lossy().to_string();

    let (_stdout, stderr, success) = run_schemadig(&[
        "cm",
        "-o",
        "A",
        "-s",
        "APP",
        "-d",
        folder_arg.as_str(),
        "-n",
        "cycle",
    ]);
    assert!(success, "create-migrations failed: {}", stderr);
    assert!(stderr.contains("dependency cycle in tables between APP.A, APP.B"));
}

#[test]
fn test_create_migrations_unresolved_seed_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let folder_arg = dir.path().to_string_lossy().to_string();

    let (_stdout, stderr, success) = run_schemadig(&[
        "cm",
        "-o",
        "NOPE",
        "-s",
        "APP",
        "-d",
        folder_arg.as_str(),
        "-n",
        "nope",
    ]);
    assert!(!success);
    assert!(stderr.contains("object APP.NOPE not found"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_create_migrations_defaults_to_data_migrations() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(schemadig_bin())
        .current_dir(dir.path())
        .arg("--catalog")
        .arg(catalog_path())
        .args(["cm", "-o", "REGION", "-s", "APP", "-n", "base"])
        .env_remove("SCHEMADIG_DATABASE")
        .env_remove("SCHEMADIG_SCHEMA")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "create-migrations failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir
        .path()
        .join("data/migrations/V1.0.0__base_tables.sql")
        .is_file());
}

#[test]
fn test_create_migrations_repeat_with_explicit_version() {
    let dir = TempDir::new().unwrap();
    let folder_arg = dir.path().to_string_lossy().to_string();
    let args = [
        "cm",
        "-o",
        "REGION",
        "-s",
        "APP",
        "-d",
        folder_arg.as_str(),
        "-n",
        "base",
        "--migration-version",
        "2.0.0",
    ];

    let (stdout, stderr, success) = run_schemadig(&args);
    assert!(success, "create-migrations failed: {}", stderr);
    assert!(stdout.contains("V2.0.0__base_tables.sql"));

    let (stdout, stderr, success) = run_schemadig(&args);
    assert!(success, "second run failed: {}", stderr);
    assert!(stdout.contains("No new objects to migrate"));
}
