//! Index of the objects an existing migration folder already creates.

use crate::error::{MigrateError, MigrateResult};
use crate::version::MigrationVersion;
use crate::writer::FILE_BANNER;
use dig_core::identifier::SchemaName;
use dig_core::object::{ObjectRef, ObjectType};
use dig_sql::scan_created_objects;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One `V<version>__<name>.sql` file found in the folder.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    pub path: PathBuf,
    pub version: MigrationVersion,
    pub objects: Vec<ObjectRef>,
}

/// What a migration folder already defines, and its highest version.
#[derive(Debug, Clone, Default)]
pub struct MigrationFileIndex {
    files: Vec<MigrationFile>,
    objects: HashSet<ObjectRef>,
}

impl MigrationFileIndex {
    /// Index every `V*__*.sql` file in `folder`. Other files are ignored and a
    /// missing folder gives an empty index.
    ///
    /// A matching file whose version does not parse, or that cannot be read,
    /// fails the whole scan.
    pub fn scan(folder: &Path, default_schema: &SchemaName) -> MigrateResult<Self> {
        if !folder.exists() {
            log::debug!("Migration folder {} does not exist yet", folder.display());
            return Ok(Self::default());
        }
        if !folder.is_dir() {
            return Err(MigrateError::filesystem(
                folder,
                std::io::Error::other("not a directory"),
            ));
        }

        let pattern = format!(
            "{}/V*__*.sql",
            glob::Pattern::escape(&folder.to_string_lossy())
        );
        let entries = glob::glob(&pattern).map_err(|e| MigrateError::UnparseableMigration {
            path: folder.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut index = Self::default();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                MigrateError::filesystem(path, e.into_error())
            })?;
            index.add_file(read_migration(&path, default_schema)?);
        }
        index.files.sort_by(|a, b| a.version.cmp(&b.version));

        log::debug!(
            "Indexed {} migration file(s) defining {} object(s) in {}",
            index.files.len(),
            index.objects.len(),
            folder.display()
        );
        Ok(index)
    }

    fn add_file(&mut self, file: MigrationFile) {
        self.objects.extend(file.objects.iter().cloned());
        self.files.push(file);
    }

    /// Whether some existing migration already creates `object`.
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.objects.contains(object)
    }

    /// Highest version in the folder.
    pub fn max_version(&self) -> Option<&MigrationVersion> {
        self.files.iter().map(|f| &f.version).max()
    }

    /// Indexed files, lowest version first.
    pub fn files(&self) -> &[MigrationFile] {
        &self.files
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Version part of a migration file name: `V1.0.3__orders.sql` -> `1.0.3`.
fn version_prefix(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    let rest = file_name.strip_prefix('V')?;
    let (version, _) = rest.split_once("__")?;
    Some(version)
}

/// Objects named by the section markers of a file this tool generated.
///
/// Stored DDL is often unqualified, so the marker is the only reliable record
/// of an object's schema. Hand-written files carry no banner and yield nothing.
fn section_objects(content: &str) -> Vec<ObjectRef> {
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some(FILE_BANNER) {
        return Vec::new();
    }

    lines
        .filter_map(|line| {
            let rest = line.trim_end().strip_prefix("-- ")?;
            let (object_type, qualified) = rest.split_once(' ')?;
            let (schema, name) = qualified.split_once('.')?;
            if name.contains(char::is_whitespace) {
                return None;
            }
            let object_type: ObjectType = object_type.parse().ok()?;
            ObjectRef::try_new(schema, name, object_type).ok()
        })
        .collect()
}

fn read_migration(path: &Path, default_schema: &SchemaName) -> MigrateResult<MigrationFile> {
    let raw_version = version_prefix(path).ok_or_else(|| MigrateError::UnparseableMigration {
        path: path.to_path_buf(),
        reason: "file name is not V<version>__<name>.sql".to_string(),
    })?;
    let version =
        MigrationVersion::parse(raw_version).map_err(|e| MigrateError::UnparseableMigration {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let content =
        std::fs::read_to_string(path).map_err(|e| MigrateError::filesystem(path, e))?;
    let mut objects = section_objects(&content);
    for object in scan_created_objects(&content, default_schema) {
        if !objects.contains(&object) {
            objects.push(object);
        }
    }
    log::debug!(
        "{}: version {}, {} object(s)",
        path.display(),
        version,
        objects.len()
    );

    Ok(MigrationFile {
        path: path.to_path_buf(),
        version,
        objects,
    })
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
