use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_show_deps_alias_and_repeated_seeds() {
    let cli = Cli::try_parse_from([
        "schemadig",
        "sd",
        "--seed-object",
        "ORDER",
        "-o",
        "app.report",
        "--schema",
        "app",
        "--object-type",
        "package body",
        "--out-format",
        "json",
    ])
    .unwrap();

    let Commands::ShowDeps(args) = cli.command else {
        panic!("expected show-deps");
    };
    assert_eq!(args.seeds.seed_objects, vec!["ORDER", "app.report"]);
    assert_eq!(args.seeds.schema.as_deref(), Some("app"));
    assert_eq!(args.seeds.object_type, Some(ObjectType::PackageBody));
    assert_eq!(args.out_format, OutFormat::Json);
}

#[test]
fn test_create_migrations_args() {
    let cli = Cli::try_parse_from([
        "schemadig",
        "--catalog",
        "catalog.yml",
        "create-migrations",
        "-o",
        "ORDER",
        "--migration-folder",
        "data/migrations",
        "--migration-name",
        "orders",
        "--migration-version",
        "2.0.0",
        "-v",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.catalog.as_deref(), Some("catalog.yml"));
    let Commands::CreateMigrations(args) = cli.command else {
        panic!("expected create-migrations");
    };
    assert_eq!(args.migration_folder.as_deref(), Some("data/migrations"));
    assert_eq!(args.migration_name, "orders");
    assert_eq!(args.migration_version.as_deref(), Some("2.0.0"));
}

#[test]
fn test_seed_object_is_required() {
    assert!(Cli::try_parse_from(["schemadig", "show-deps", "--schema", "APP"]).is_err());
}

#[test]
fn test_unknown_object_type_is_rejected() {
    let result = Cli::try_parse_from([
        "schemadig",
        "show-deps",
        "-o",
        "X",
        "--object-type",
        "synonym",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_catalog_and_database_conflict() {
    let result = Cli::try_parse_from([
        "schemadig",
        "--catalog",
        "a.yml",
        "--database",
        "b.duckdb",
        "show-deps",
        "-o",
        "X",
    ]);
    assert!(result.is_err());
}
