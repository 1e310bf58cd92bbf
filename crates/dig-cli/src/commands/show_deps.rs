//! Show-deps command implementation

use anyhow::{Context, Result};
use dig_graph::{render, OutputFormat};

use crate::cli::{GlobalArgs, ShowDepsArgs};
use crate::commands::common::{seed_failures, seed_schema, seed_specs, ExitCode};
use crate::context::RuntimeContext;

/// Execute the show-deps command
pub(crate) async fn execute(args: &ShowDepsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let schema = seed_schema(&args.seeds, &ctx)?;
    let seeds = seed_specs(&args.seeds, &schema)?;

    let graph = ctx
        .builder()
        .build(&seeds)
        .await
        .context("Failed to build dependency graph")?;

    let format: OutputFormat = args.out_format.into();
    let output =
        render(&graph, format, &ctx.render_options()).context("Failed to render dependencies")?;
    match format {
        OutputFormat::Text => print!("{}", output),
        OutputFormat::Json => {
            println!("{}", output);
            // text output lists these itself
            for error in graph.resolution_errors() {
                eprintln!("Unresolved: {}", error);
            }
        }
    }

    if !seed_failures(&graph, &seeds).is_empty() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
