//! Shared utilities for CLI commands

use anyhow::{bail, Result};
use dig_core::graph::{DependencyGraph, NodeStatus};
use dig_core::identifier::{ObjectName, SchemaName};
use dig_core::resolution::{ResolutionError, SeedSpec};
use std::fmt;

use crate::cli::SeedArgs;
use crate::context::RuntimeContext;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing to show the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Schema used for unqualified seeds and DDL: `--schema`, else the config default.
pub(crate) fn seed_schema(args: &SeedArgs, ctx: &RuntimeContext) -> Result<SchemaName> {
    if let Some(schema) = args.schema.as_deref().and_then(SchemaName::try_new) {
        return Ok(schema);
    }
    match ctx.config.default_schema_name() {
        Some(schema) => Ok(schema),
        None => bail!("No schema given: pass --schema or set default_schema in the config"),
    }
}

/// Turn `--seed-object` values into seeds. `SCHEMA.NAME` overrides the default schema.
pub(crate) fn seed_specs(args: &SeedArgs, default_schema: &SchemaName) -> Result<Vec<SeedSpec>> {
    args.seed_objects
        .iter()
        .map(|raw| {
            let (schema, name) = match raw.split_once('.') {
                Some((schema, name)) => (SchemaName::try_new(schema), ObjectName::try_new(name)),
                None => (Some(default_schema.clone()), ObjectName::try_new(raw)),
            };
            match (schema, name) {
                (Some(schema), Some(name)) => Ok(SeedSpec::new(schema, name, args.object_type)),
                _ => bail!("Invalid seed object '{}'", raw),
            }
        })
        .collect()
}

/// Resolution errors for seeds that did not make it into the graph as a
/// resolved object.
pub(crate) fn seed_failures<'g>(
    graph: &'g DependencyGraph,
    seeds: &[SeedSpec],
) -> Vec<&'g ResolutionError> {
    graph
        .resolution_errors()
        .iter()
        .filter(|error| {
            seeds.iter().any(|seed| {
                error.concerns(&seed.schema, &seed.name)
                    && graph
                        .seeds()
                        .iter()
                        .filter(|s| s.schema == seed.schema && s.name == seed.name)
                        .all(|s| graph.status(s) == Some(&NodeStatus::Unresolved))
            })
        })
        .collect()
}
