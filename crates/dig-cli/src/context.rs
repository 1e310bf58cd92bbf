//! Runtime context for CLI commands

use anyhow::{bail, Context, Result};
use dig_core::config::SourceKind;
use dig_core::Config;
use dig_db::{CatalogSnapshot, DuckDbProvider, MetadataProvider};
use dig_graph::{GraphBuilder, RenderOptions};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Loaded configuration plus the metadata provider for this run
pub struct RuntimeContext {
    pub config: Config,

    /// Directory relative config paths are resolved against
    pub root: PathBuf,

    provider: Box<dyn MetadataProvider>,
}

impl RuntimeContext {
    /// Load config and open the metadata source named by flags or config
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let (config, root) = load_config(args)?;

        let include_disabled = args.include_disabled_triggers || config.include_disabled_triggers;
        let provider: Box<dyn MetadataProvider> = match (&args.catalog, &args.database) {
            (Some(catalog), _) => Box::new(open_catalog(Path::new(catalog), include_disabled)?),
            (None, Some(database)) => Box::new(open_duckdb(Path::new(database))?),
            (None, None) => {
                let Some(path) = config.source_path_absolute(&root) else {
                    bail!(
                        "No metadata source: pass --catalog or --database, or set source.path in the config"
                    );
                };
                match config.source.kind {
                    SourceKind::Catalog => Box::new(open_catalog(&path, include_disabled)?),
                    SourceKind::DuckDb => Box::new(open_duckdb(&path)?),
                }
            }
        };
        log::debug!("Using {} metadata provider", provider.provider_name());

        Ok(Self {
            config,
            root,
            provider,
        })
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }

    pub fn builder(&self) -> GraphBuilder<'_> {
        GraphBuilder::from_config(self.provider(), &self.config)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_depth: self.config.render.max_depth,
        }
    }
}

/// Explicit `--config`, else `schemadig.yml` in the working directory, else defaults
fn load_config(args: &GlobalArgs) -> Result<(Config, PathBuf)> {
    if let Some(config_path) = &args.config {
        let path = Path::new(config_path);
        let config = Config::load(path).context("Failed to load configuration file")?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok((config, root));
    }

    let root = PathBuf::from(".");
    let config = Config::load_from_dir(&root)
        .context("Failed to load configuration")?
        .unwrap_or_default();
    Ok((config, root))
}

fn open_catalog(path: &Path, include_disabled_triggers: bool) -> Result<CatalogSnapshot> {
    let catalog = CatalogSnapshot::from_path(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    Ok(catalog.with_include_disabled_triggers(include_disabled_triggers))
}

fn open_duckdb(path: &Path) -> Result<DuckDbProvider> {
    DuckDbProvider::from_path(path)
        .with_context(|| format!("Failed to open database {}", path.display()))
}
