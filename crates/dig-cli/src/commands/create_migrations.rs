//! Create-migrations command implementation

use anyhow::{Context, Result};
use dig_migrate::{plan, MigrationFileIndex, MigrationWriter};
use std::path::PathBuf;

use crate::cli::{CreateMigrationsArgs, GlobalArgs};
use crate::commands::common::{seed_failures, seed_schema, seed_specs, ExitCode};
use crate::context::RuntimeContext;

/// Execute the create-migrations command
pub(crate) async fn execute(args: &CreateMigrationsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let schema = seed_schema(&args.seeds, &ctx)?;
    let seeds = seed_specs(&args.seeds, &schema)?;

    let folder = match &args.migration_folder {
        Some(folder) => PathBuf::from(folder),
        None => ctx.config.migrations_folder_absolute(&ctx.root),
    };

    let graph = ctx
        .builder()
        .build(&seeds)
        .await
        .context("Failed to build dependency graph")?;

    let failures = seed_failures(&graph, &seeds);
    if !failures.is_empty() {
        for error in failures {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode(1).into());
    }
    for error in graph.resolution_errors() {
        eprintln!("Warning: {} (left out of the migrations)", error);
    }

    let plan = plan(&graph);
    let index = MigrationFileIndex::scan(&folder, &schema)
        .context("Failed to index existing migrations")?;
    let writer = MigrationWriter::new(ctx.provider())
        .with_initial_version(ctx.config.migrations.initial_version.clone())
        .with_version(args.migration_version.clone());

    let outcome = writer
        .write(&plan, &folder, &args.migration_name, &index)
        .await
        .context("Failed to write migrations")?;

    for warning in &plan.warnings {
        eprintln!("Warning: {}", warning);
    }

    if outcome.nothing_written() {
        println!(
            "No new objects to migrate: all {} object(s) already exist in {}",
            outcome.skipped.len(),
            folder.display()
        );
        return Ok(());
    }

    for path in &outcome.written {
        println!("Created {}", path.display());
    }
    if !outcome.skipped.is_empty() {
        println!(
            "{} object(s) already migrated, skipped",
            outcome.skipped.len()
        );
    }
    Ok(())
}
