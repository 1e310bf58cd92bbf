//! File-backed catalog snapshot provider.
//!
//! A snapshot is a YAML or JSON export of the parts of a catalog schemadig
//! reads. It lets the tool run offline against an exported dictionary and is
//! the in-memory provider the test suites use.
//!
//! ```yaml
//! objects:
//!   - schema: APP
//!     name: ORDERS
//!     type: TABLE
//!     ddl: CREATE TABLE app.orders (...);
//!     foreign_keys:
//!       - name: ORDERS_CUSTOMER_FK
//!         columns: [CUSTOMER_ID]
//!         references: APP.CUSTOMER
//!         referenced_columns: [ID]
//!   - schema: APP
//!     name: ORDER_AUDIT_TRG
//!     type: TRIGGER
//!     table: ORDERS
//!     enabled: true
//!     dependencies:
//!       - { name: AUDIT_PKG, type: PACKAGE }
//! ```

use crate::error::{DbError, DbResult};
use crate::traits::{ForeignKeyRef, MetadataProvider};
use async_trait::async_trait;
use dig_core::identifier::{ObjectName, SchemaName};
use dig_core::object::{ObjectRef, ObjectType};
use dig_core::resolution::TypeResolution;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    objects: Vec<CatalogObject>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogObject {
    schema: String,
    name: String,
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default)]
    ddl: Option<String>,
    #[serde(default)]
    foreign_keys: Vec<CatalogForeignKey>,
    #[serde(default)]
    dependencies: Vec<CatalogDependency>,
    /// Owning table, triggers only. `TABLE` or `SCHEMA.TABLE`.
    #[serde(default)]
    table: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogForeignKey {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    /// `TABLE` or `SCHEMA.TABLE`
    references: String,
    #[serde(default)]
    referenced_columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDependency {
    #[serde(default)]
    schema: Option<String>,
    name: String,
    #[serde(rename = "type")]
    object_type: String,
}

fn default_enabled() -> bool {
    true
}

/// One object's recorded metadata.
#[derive(Debug, Clone)]
struct CatalogEntry {
    ddl: Option<String>,
    foreign_keys: Vec<ForeignKeyRef>,
    dependencies: Vec<ObjectRef>,
    trigger_table: Option<ObjectRef>,
    enabled: bool,
}

/// In-memory catalog loaded from a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    objects: BTreeMap<ObjectRef, CatalogEntry>,
    include_disabled_triggers: bool,
}

impl CatalogSnapshot {
    /// Load a snapshot, choosing JSON or YAML by file extension.
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let origin = path.display().to_string();
        if !path.exists() {
            return Err(DbError::ConnectionError(format!(
                "catalog file not found: {}",
                origin
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| DbError::CatalogError {
            path: origin.clone(),
            message: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            Self::from_json_str(&content, &origin)?
        } else {
            Self::from_yaml_str(&content, &origin)?
        };
        log::debug!("Loaded {} catalog objects from {}", snapshot.len(), origin);
        Ok(snapshot)
    }

    /// Parse YAML snapshot text. `origin` names the source in error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> DbResult<Self> {
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|e| DbError::CatalogError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        Self::from_file(file, origin)
    }

    /// Parse JSON snapshot text. `origin` names the source in error messages.
    pub fn from_json_str(content: &str, origin: &str) -> DbResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(content).map_err(|e| DbError::CatalogError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        Self::from_file(file, origin)
    }

    /// Follow disabled triggers too.
    pub fn with_include_disabled_triggers(mut self, include: bool) -> Self {
        self.include_disabled_triggers = include;
        self
    }

    /// Number of objects in the snapshot
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects, sorted
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.keys()
    }

    fn from_file(file: CatalogFile, origin: &str) -> DbResult<Self> {
        let invalid = |message: String| DbError::CatalogError {
            path: origin.to_string(),
            message,
        };

        let mut objects = BTreeMap::new();
        for raw in file.objects {
            let object_type: ObjectType = raw
                .object_type
                .parse()
                .map_err(|e: dig_core::CoreError| invalid(e.to_string()))?;
            let object = ObjectRef::try_new(&raw.schema, &raw.name, object_type)
                .map_err(|e| invalid(e.to_string()))?;

            let foreign_keys = raw
                .foreign_keys
                .into_iter()
                .map(|fk| {
                    let parent = qualified(&fk.references, &object.schema, ObjectType::Table)
                        .map_err(|e| {
                            invalid(format!("foreign key on {}: {}", object, e))
                        })?;
                    Ok(ForeignKeyRef {
                        parent,
                        columns: upper_all(fk.columns),
                        referenced_columns: upper_all(fk.referenced_columns),
                        constraint_name: fk.name.map(|n| n.to_uppercase()),
                    })
                })
                .collect::<DbResult<Vec<_>>>()?;

            let dependencies = raw
                .dependencies
                .into_iter()
                .map(|dep| {
                    let dep_type: ObjectType = dep
                        .object_type
                        .parse()
                        .map_err(|e: dig_core::CoreError| invalid(e.to_string()))?;
                    let schema = dep.schema.as_deref().unwrap_or(object.schema.as_str());
                    ObjectRef::try_new(schema, &dep.name, dep_type)
                        .map_err(|e| invalid(format!("dependency of {}: {}", object, e)))
                })
                .collect::<DbResult<Vec<_>>>()?;

            let trigger_table = match (&raw.table, object_type) {
                (Some(table), ObjectType::Trigger) => Some(
                    qualified(table, &object.schema, ObjectType::Table)
                        .map_err(|e| invalid(format!("table of {}: {}", object, e)))?,
                ),
                (None, ObjectType::Trigger) => {
                    return Err(invalid(format!("{} has no table", object)));
                }
                (Some(_), _) => {
                    return Err(invalid(format!(
                        "{} sets table, which only triggers may",
                        object
                    )));
                }
                (None, _) => None,
            };

            let entry = CatalogEntry {
                ddl: raw.ddl,
                foreign_keys,
                dependencies,
                trigger_table,
                enabled: raw.enabled,
            };
            if objects.insert(object.clone(), entry).is_some() {
                return Err(invalid(format!("{} is listed twice", object)));
            }
        }

        Ok(Self {
            objects,
            include_disabled_triggers: false,
        })
    }

    fn entry(&self, object: &ObjectRef) -> DbResult<&CatalogEntry> {
        self.objects
            .get(object)
            .ok_or_else(|| DbError::ObjectNotFound(object.to_string()))
    }

    fn table_entry(&self, schema: &SchemaName, table: &ObjectName) -> DbResult<&CatalogEntry> {
        self.entry(&ObjectRef {
            schema: schema.clone(),
            name: table.clone(),
            object_type: ObjectType::Table,
        })
    }
}

/// Parse `NAME` or `SCHEMA.NAME`, defaulting the schema.
fn qualified(
    raw: &str,
    default_schema: &SchemaName,
    object_type: ObjectType,
) -> dig_core::CoreResult<ObjectRef> {
    match raw.split_once('.') {
        Some((schema, name)) => ObjectRef::try_new(schema, name, object_type),
        None => ObjectRef::try_new(default_schema.as_str(), raw, object_type),
    }
}

fn upper_all(columns: Vec<String>) -> Vec<String> {
    columns
        .into_iter()
        .map(|c| dig_core::identifier::normalize_identifier(&c))
        .collect()
}

#[async_trait]
impl MetadataProvider for CatalogSnapshot {
    async fn resolve_type(
        &self,
        schema: &SchemaName,
        name: &ObjectName,
    ) -> DbResult<TypeResolution> {
        let candidates = self
            .objects
            .keys()
            .filter(|o| &o.schema == schema && &o.name == name)
            .map(|o| o.object_type);
        Ok(TypeResolution::from_candidates(candidates))
    }

    async fn foreign_key_parents(
        &self,
        schema: &SchemaName,
        table: &ObjectName,
    ) -> DbResult<Vec<ForeignKeyRef>> {
        Ok(self.table_entry(schema, table)?.foreign_keys.clone())
    }

    async fn triggers_on(
        &self,
        schema: &SchemaName,
        table: &ObjectName,
    ) -> DbResult<Vec<ObjectRef>> {
        self.table_entry(schema, table)?;
        let triggers = self
            .objects
            .iter()
            .filter(|(_, entry)| {
                entry
                    .trigger_table
                    .as_ref()
                    .is_some_and(|t| &t.schema == schema && &t.name == table)
            })
            .filter(|(trigger, entry)| {
                if !entry.enabled && !self.include_disabled_triggers {
                    log::debug!("Skipping disabled trigger {}", trigger);
                    return false;
                }
                true
            })
            .map(|(trigger, _)| trigger.clone())
            .collect();
        Ok(triggers)
    }

    async fn dependencies_of(&self, object: &ObjectRef) -> DbResult<Vec<ObjectRef>> {
        Ok(self.entry(object)?.dependencies.clone())
    }

    async fn ddl_text(&self, object: &ObjectRef) -> DbResult<String> {
        self.entry(object)?
            .ddl
            .clone()
            .ok_or_else(|| DbError::QueryError(format!("no DDL recorded for {}", object)))
    }

    fn provider_name(&self) -> &'static str {
        "catalog"
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
