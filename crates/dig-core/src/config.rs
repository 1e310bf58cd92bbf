//! Configuration types and parsing for schemadig.yml

use crate::error::{CoreError, CoreResult};
use crate::identifier::{normalize_identifier, SchemaName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names checked by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["schemadig.yml", "schemadig.yaml"];

/// Main configuration from schemadig.yml
///
/// Every field has a default, so an absent file and an empty file behave the
/// same.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema used when `--schema` is omitted and for unqualified names in DDL
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Engine-owned schemas. Objects in them are terminal leaves.
    #[serde(default = "default_system_schemas")]
    pub system_schemas: Vec<String>,

    /// Follow triggers whose status is disabled
    #[serde(default)]
    pub include_disabled_triggers: bool,

    /// Which metadata provider backs the run
    #[serde(default)]
    pub source: SourceConfig,

    /// Migration folder settings
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Presenter settings
    #[serde(default)]
    pub render: RenderConfig,
}

/// Metadata source selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// YAML or JSON catalog snapshot (default)
    #[default]
    Catalog,
    /// Live DuckDB database file
    DuckDb,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Catalog => write!(f, "catalog"),
            SourceKind::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Metadata source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Snapshot file or DuckDB database file
    #[serde(default)]
    pub path: Option<String>,
}

/// Migration folder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Default `--migration-folder`, relative to the config file
    #[serde(default = "default_migrations_folder")]
    pub folder: String,

    /// Version given to the first file written into an empty folder
    #[serde(default = "default_initial_version")]
    pub initial_version: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            folder: default_migrations_folder(),
            initial_version: default_initial_version(),
        }
    }
}

/// Tree rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Nesting depth past which the text tree stops descending
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_system_schemas() -> Vec<String> {
    [
        "SYS",
        "SYSTEM",
        "MDSYS",
        "PUBLIC",
        "CTXSYS",
        "XDB",
        "ORDSYS",
        "INFORMATION_SCHEMA",
        "PG_CATALOG",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_migrations_folder() -> String {
    "data/migrations".to_string()
}

fn default_initial_version() -> String {
    "1.0.0".to_string()
}

fn default_max_depth() -> usize {
    64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_schema: None,
            system_schemas: default_system_schemas(),
            include_disabled_triggers: false,
            source: SourceConfig::default(),
            migrations: MigrationsConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration text. `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &str) -> CoreResult<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults
        let mut config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory.
    /// Looks for schemadig.yml or schemadig.yaml; returns `None` when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Option<Self>> {
        for file_name in CONFIG_FILE_NAMES {
            let path = dir.join(file_name);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    fn normalize(&mut self) {
        self.default_schema = self
            .default_schema
            .as_deref()
            .map(normalize_identifier)
            .filter(|s| !s.is_empty());
        self.system_schemas = self
            .system_schemas
            .iter()
            .map(|s| normalize_identifier(s))
            .filter(|s| !s.is_empty())
            .collect();
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.render.max_depth == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "render.max_depth must be at least 1".to_string(),
            });
        }

        if self.migrations.folder.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations.folder must not be empty".to_string(),
            });
        }

        // Same shape the migration writer accepts: one separator throughout
        let version = self.migrations.initial_version.trim();
        let separator = if version.contains('_') { '_' } else { '.' };
        let well_formed = !version.is_empty()
            && !(version.contains('_') && version.contains('.'))
            && version
                .split(separator)
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations.initial_version '{}' must be numbers separated by '.' or '_' (not both), e.g. 1.0.0",
                    self.migrations.initial_version
                ),
            });
        }

        Ok(())
    }

    /// The configured default schema as an identifier
    pub fn default_schema_name(&self) -> Option<SchemaName> {
        self.default_schema.as_deref().and_then(SchemaName::try_new)
    }

    /// Source path resolved against a root directory
    pub fn source_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.source.path.as_ref().map(|p| root.join(p))
    }

    /// Migration folder resolved against a root directory
    pub fn migrations_folder_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations.folder)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
