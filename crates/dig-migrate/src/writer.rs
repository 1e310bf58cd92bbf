//! Migration file generation.
//!
//! Files are named `V<version>__<name>_<category>.sql`, one per non-empty
//! category group. Nothing lands in the folder unless every file rendered and
//! was written in full.

use crate::error::{MigrateError, MigrateResult};
use crate::index::MigrationFileIndex;
use crate::version::MigrationVersion;
use chrono::{DateTime, Utc};
use dig_core::object::{ObjectCategory, ObjectRef};
use dig_core::plan::MigrationPlan;
use dig_db::MetadataProvider;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Version given to the first file of an empty folder.
pub const DEFAULT_INITIAL_VERSION: &str = "1.0.0";

/// First line of every generated file.
pub(crate) const FILE_BANNER: &str = "-- schemadig migration";

/// Comment line opening each object's section, `-- TABLE APP.ORDERS`.
pub(crate) fn section_marker(object: &ObjectRef) -> String {
    format!("-- {} {}", object.object_type, object.qualified_name())
}

/// Result of one writer run.
#[derive(Debug, Clone, Default)]
pub struct WriteOutcome {
    /// Files created, in version order.
    pub written: Vec<PathBuf>,
    /// Planned objects an existing migration already creates.
    pub skipped: Vec<ObjectRef>,
}

impl WriteOutcome {
    /// True when every planned object already had a migration.
    pub fn nothing_written(&self) -> bool {
        self.written.is_empty()
    }
}

/// A rendered file waiting to be written.
#[derive(Debug)]
struct PendingFile {
    path: PathBuf,
    temp_path: PathBuf,
    content: String,
}

/// Writes the part of a [`MigrationPlan`] a folder does not define yet.
pub struct MigrationWriter<'a> {
    provider: &'a dyn MetadataProvider,
    initial_version: String,
    explicit_version: Option<String>,
    generated_at: Option<DateTime<Utc>>,
}

impl<'a> MigrationWriter<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            initial_version: DEFAULT_INITIAL_VERSION.to_string(),
            explicit_version: None,
            generated_at: None,
        }
    }

    /// Version used when the folder has no migrations yet
    pub fn with_initial_version(mut self, version: impl Into<String>) -> Self {
        self.initial_version = version.into();
        self
    }

    /// Force the version of the first file written
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.explicit_version = version;
        self
    }

    /// Fix the timestamp written into file headers
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Write one file per category for every planned object missing from
    /// `index`.
    ///
    /// The folder is created before any DDL is fetched. If every object is
    /// already covered nothing is written and `written` is empty.
    pub async fn write(
        &self,
        plan: &MigrationPlan,
        folder: &Path,
        migration_name: &str,
        index: &MigrationFileIndex,
    ) -> MigrateResult<WriteOutcome> {
        let name = sanitize_migration_name(migration_name)?;
        let explicit = self
            .explicit_version
            .as_deref()
            .map(MigrationVersion::parse)
            .transpose()?;
        prepare_folder(folder)?;

        let mut remaining = plan.clone();
        let skipped = remaining.retain(|o| !index.contains(o));
        for object in &skipped {
            log::debug!("{} already has a migration, skipping", object);
        }
        if remaining.is_empty() {
            log::info!("All {} planned object(s) already migrated", skipped.len());
            return Ok(WriteOutcome {
                written: Vec::new(),
                skipped,
            });
        }

        let mut version = self.first_version(explicit, index)?;
        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        let mut pending = Vec::with_capacity(remaining.groups.len());
        for group in &remaining.groups {
            let file_name = format!("V{}__{}_{}.sql", version, name, group.category.suffix());
            let path = folder.join(&file_name);
            if path.exists() {
                return Err(MigrateError::filesystem(
                    &path,
                    std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file already exists"),
                ));
            }

            let mut sections = Vec::with_capacity(group.objects.len());
            for object in &group.objects {
                let ddl = self.provider.ddl_text(object).await?;
                sections.push((object, ddl));
            }

            pending.push(PendingFile {
                temp_path: folder.join(format!(".{}.tmp", file_name)),
                path,
                content: render_file(&name, group.category, &generated_at, &sections),
            });
            version = version.successor();
        }

        let written = commit(&pending)?;
        for path in &written {
            log::info!("Wrote {}", path.display());
        }
        Ok(WriteOutcome { written, skipped })
    }

    /// Only consulted once there is something to write, so repeating a run
    /// with the same `--migration-version` is a no-op rather than an error.
    fn first_version(
        &self,
        explicit: Option<MigrationVersion>,
        index: &MigrationFileIndex,
    ) -> MigrateResult<MigrationVersion> {
        let existing = index.max_version();

        if let Some(version) = explicit {
            if let Some(existing) = existing {
                if &version <= existing {
                    return Err(MigrateError::InvalidVersion {
                        version: version.to_string(),
                        reason: format!("the folder already contains version {}", existing),
                    });
                }
            }
            return Ok(version);
        }

        match existing {
            Some(existing) => Ok(existing.next_run()),
            None => MigrationVersion::parse(&self.initial_version),
        }
    }
}

/// Lower-case the name and collapse anything outside `[a-z0-9_]` to `_`.
pub fn sanitize_migration_name(raw: &str) -> MigrateResult<String> {
    let mut name = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            name.push(c);
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    let name = name.trim_matches('_').to_string();
    if name.is_empty() {
        return Err(MigrateError::InvalidMigrationName(raw.to_string()));
    }
    Ok(name)
}

fn prepare_folder(folder: &Path) -> MigrateResult<()> {
    fs::create_dir_all(folder).map_err(|e| MigrateError::filesystem(folder, e))?;
    let metadata = fs::metadata(folder).map_err(|e| MigrateError::filesystem(folder, e))?;
    if !metadata.is_dir() {
        return Err(MigrateError::filesystem(
            folder,
            std::io::Error::other("not a directory"),
        ));
    }
    if metadata.permissions().readonly() {
        return Err(MigrateError::filesystem(
            folder,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "folder is read-only"),
        ));
    }
    Ok(())
}

fn render_file(
    name: &str,
    category: ObjectCategory,
    generated_at: &DateTime<Utc>,
    sections: &[(&ObjectRef, String)],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", FILE_BANNER);
    let _ = writeln!(out, "-- name: {}", name);
    let _ = writeln!(out, "-- category: {}", category.suffix());
    let _ = writeln!(
        out,
        "-- generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "-- objects: {}", sections.len());

    for (object, ddl) in sections {
        out.push('\n');
        let _ = writeln!(out, "{}", section_marker(object));
        out.push_str(ddl.trim_end());
        out.push('\n');
    }
    out
}

/// Write every file as a hidden temporary, then rename them into place.
/// On failure everything this call created is removed again.
fn commit(pending: &[PendingFile]) -> MigrateResult<Vec<PathBuf>> {
    for (i, file) in pending.iter().enumerate() {
        if let Err(e) = fs::write(&file.temp_path, &file.content) {
            remove_all(pending[..=i].iter().map(|f| f.temp_path.as_path()));
            return Err(MigrateError::filesystem(&file.temp_path, e));
        }
    }

    let mut renamed: Vec<PathBuf> = Vec::with_capacity(pending.len());
    for (i, file) in pending.iter().enumerate() {
        if let Err(e) = fs::rename(&file.temp_path, &file.path) {
            remove_all(pending[i..].iter().map(|f| f.temp_path.as_path()));
            remove_all(renamed.iter().map(PathBuf::as_path));
            return Err(MigrateError::filesystem(&file.path, e));
        }
        renamed.push(file.path.clone());
    }
    Ok(renamed)
}

fn remove_all<'p>(paths: impl Iterator<Item = &'p Path>) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod tests;
