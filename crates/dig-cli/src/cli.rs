//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use dig_core::object::ObjectType;
use dig_graph::OutputFormat;

/// schemadig - dependency reports and migrations for existing schemas
#[derive(Parser, Debug)]
#[command(name = "schemadig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: schemadig.yml in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Catalog snapshot file (YAML or JSON) to read metadata from
    #[arg(long, global = true, env = "SCHEMADIG_CATALOG", conflicts_with = "database")]
    pub catalog: Option<String>,

    /// DuckDB database file to read metadata from
    #[arg(long, global = true, env = "SCHEMADIG_DATABASE")]
    pub database: Option<String>,

    /// Follow triggers that are disabled in the catalog
    #[arg(long, global = true)]
    pub include_disabled_triggers: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show everything the seed objects need
    #[command(visible_alias = "sd")]
    ShowDeps(ShowDepsArgs),

    /// Write migration files creating the seed objects and their dependencies
    #[command(visible_alias = "cm")]
    CreateMigrations(CreateMigrationsArgs),
}

/// Seed selection shared by both commands
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Object to start from; repeat for several. `SCHEMA.NAME` overrides --schema
    #[arg(short = 'o', long = "seed-object", required = true)]
    pub seed_objects: Vec<String>,

    /// Schema of the seed objects (default: config default_schema)
    #[arg(short, long, env = "SCHEMADIG_SCHEMA")]
    pub schema: Option<String>,

    /// Object type of the seeds, when the name alone is ambiguous
    #[arg(short = 't', long, value_parser = parse_object_type)]
    pub object_type: Option<ObjectType>,
}

/// Arguments for the show-deps command
#[derive(Args, Debug)]
pub struct ShowDepsArgs {
    #[command(flatten)]
    pub seeds: SeedArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub out_format: OutFormat,
}

/// Arguments for the create-migrations command
#[derive(Args, Debug)]
pub struct CreateMigrationsArgs {
    #[command(flatten)]
    pub seeds: SeedArgs,

    /// Folder holding the migration files (default: config migrations.folder, data/migrations)
    #[arg(short = 'd', long)]
    pub migration_folder: Option<String>,

    /// Short name used in the generated file names
    #[arg(short = 'n', long)]
    pub migration_name: String,

    /// Version of the first generated file, e.g. 2.0.0
    #[arg(long)]
    pub migration_version: Option<String>,
}

/// show-deps output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutFormat {
    /// Indented dependency tree
    Text,
    /// Nested JSON document
    Json,
}

impl From<OutFormat> for OutputFormat {
    fn from(format: OutFormat) -> Self {
        match format {
            OutFormat::Text => OutputFormat::Text,
            OutFormat::Json => OutputFormat::Json,
        }
    }
}

fn parse_object_type(raw: &str) -> Result<ObjectType, String> {
    raw.parse::<ObjectType>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
