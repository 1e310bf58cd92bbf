//! DuckDB metadata provider implementation

use crate::error::{DbError, DbResult};
use crate::traits::{ForeignKeyRef, MetadataProvider};
use async_trait::async_trait;
use dig_core::identifier::{normalize_identifier, ObjectName, SchemaName};
use dig_core::object::{ObjectRef, ObjectType};
use dig_core::resolution::TypeResolution;
use dig_sql::{extract_relations, extract_sequence_refs, RelationName, SqlParser};
use duckdb::{params, Connection};
use regex::Regex;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

const TYPE_CANDIDATES_SQL: &str = "\
SELECT 'TABLE' FROM duckdb_tables() WHERE upper(schema_name) = ? AND upper(table_name) = ? \
UNION ALL \
SELECT 'VIEW' FROM duckdb_views() WHERE NOT internal AND upper(schema_name) = ? AND upper(view_name) = ? \
UNION ALL \
SELECT 'SEQUENCE' FROM duckdb_sequences() WHERE upper(schema_name) = ? AND upper(sequence_name) = ?";

fn foreign_key_pattern() -> &'static Regex {
    static FK: OnceLock<Regex> = OnceLock::new();
    FK.get_or_init(|| {
        Regex::new(
            r#"(?is)FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+([^\s(]+)\s*(?:\(([^)]*)\))?"#,
        )
        .expect("valid regex literal")
    })
}

/// Live metadata provider over a DuckDB database.
///
/// DuckDB has tables, views and sequences but no triggers or packages, so
/// `triggers_on` is always empty and those types never resolve.
pub struct DuckDbProvider {
    conn: Mutex<Connection>,
    parser: SqlParser,
}

impl DuckDbProvider {
    /// Open an existing database file. A missing file is a connection error,
    /// never a fresh empty database.
    pub fn from_path(path: &Path) -> DbResult<Self> {
        if !path.exists() {
            return Err(DbError::ConnectionError(format!(
                "database file not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            parser: SqlParser::duckdb(),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Query a single-column list of strings with `(schema, name)` parameters.
    fn query_strings(&self, sql: &str, schema: &str, name: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![schema, name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn type_candidates_sync(&self, schema: &str, name: &str) -> DbResult<Vec<ObjectType>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(TYPE_CANDIDATES_SQL)?;
        let raw = stmt
            .query_map(params![schema, name, schema, name, schema, name], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        raw.iter()
            .map(|t| {
                t.parse::<ObjectType>()
                    .map_err(|e| DbError::QueryError(e.to_string()))
            })
            .collect()
    }

    fn require(&self, object: &ObjectRef) -> DbResult<()> {
        let types = self.type_candidates_sync(object.schema.as_str(), object.name.as_str())?;
        if types.contains(&object.object_type) {
            Ok(())
        } else {
            Err(DbError::ObjectNotFound(object.to_string()))
        }
    }

    /// Stored SQL of a table, view, or sequence.
    fn stored_sql(&self, object: &ObjectRef) -> DbResult<Option<String>> {
        let sql = match object.object_type {
            ObjectType::Table => {
                "SELECT sql FROM duckdb_tables() WHERE upper(schema_name) = ? AND upper(table_name) = ?"
            }
            ObjectType::View => {
                "SELECT sql FROM duckdb_views() WHERE NOT internal AND upper(schema_name) = ? AND upper(view_name) = ?"
            }
            ObjectType::Sequence => {
                "SELECT sql FROM duckdb_sequences() WHERE upper(schema_name) = ? AND upper(sequence_name) = ?"
            }
            _ => return Ok(None),
        };
        Ok(self
            .query_strings(sql, object.schema.as_str(), object.name.as_str())?
            .into_iter()
            .next())
    }

    /// Type a relation found in view SQL. Unknown names are assumed to be tables
    /// and surface as unresolved leaves.
    fn relation_to_ref(
        &self,
        relation: &RelationName,
        default_schema: &SchemaName,
    ) -> DbResult<Option<ObjectRef>> {
        let schema = relation
            .schema
            .clone()
            .unwrap_or_else(|| default_schema.to_string());
        let object_type = match TypeResolution::from_candidates(
            self.type_candidates_sync(&schema, &relation.name)?,
        ) {
            TypeResolution::Found(t) => t,
            TypeResolution::NotFound | TypeResolution::Ambiguous(_) => ObjectType::Table,
        };
        Ok(ObjectRef::try_new(&schema, &relation.name, object_type).ok())
    }

    fn view_dependencies(&self, view: &ObjectRef) -> DbResult<Vec<ObjectRef>> {
        let Some(sql) = self.stored_sql(view)? else {
            return Err(DbError::ObjectNotFound(view.to_string()));
        };
        let statements = match self.parser.parse(&sql) {
            Ok(statements) => statements,
            Err(e) => {
                log::warn!("Cannot parse definition of {}: {}", view, e);
                return Ok(Vec::new());
            }
        };
        let mut deps = Vec::new();
        for relation in extract_relations(&statements) {
            if let Some(dep) = self.relation_to_ref(&relation, &view.schema)? {
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
        }
        Ok(deps)
    }

    fn table_sequences(&self, table: &ObjectRef) -> DbResult<Vec<ObjectRef>> {
        let defaults = self.query_strings(
            "SELECT column_default FROM duckdb_columns() \
             WHERE upper(schema_name) = ? AND upper(table_name) = ? AND column_default IS NOT NULL \
             ORDER BY column_index",
            table.schema.as_str(),
            table.name.as_str(),
        )?;
        let mut deps = Vec::new();
        for default in &defaults {
            for seq in extract_sequence_refs(default) {
                let schema = seq.schema.unwrap_or_else(|| table.schema.to_string());
                if let Ok(dep) = ObjectRef::try_new(&schema, &seq.name, ObjectType::Sequence) {
                    if !deps.contains(&dep) {
                        deps.push(dep);
                    }
                }
            }
        }
        Ok(deps)
    }
}

/// Parse a `FOREIGN KEY (...) REFERENCES parent(...)` constraint text.
pub(crate) fn parse_foreign_key(text: &str, child_schema: &SchemaName) -> Option<ForeignKeyRef> {
    let caps = foreign_key_pattern().captures(text)?;
    let split_columns = |raw: Option<regex::Match<'_>>| -> Vec<String> {
        raw.map(|m| {
            m.as_str()
                .split(',')
                .map(normalize_identifier)
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
    };

    let target = caps.get(2)?.as_str();
    let parent = match target.rsplit_once('.') {
        Some((schema, name)) => {
            let schema = schema.rsplit('.').next().unwrap_or(schema);
            ObjectRef::try_new(schema, name, ObjectType::Table).ok()?
        }
        None => ObjectRef::try_new(child_schema.as_str(), target, ObjectType::Table).ok()?,
    };

    Some(ForeignKeyRef {
        parent,
        columns: split_columns(caps.get(1)),
        referenced_columns: split_columns(caps.get(3)),
        constraint_name: None,
    })
}

#[async_trait]
impl MetadataProvider for DuckDbProvider {
    async fn resolve_type(
        &self,
        schema: &SchemaName,
        name: &ObjectName,
    ) -> DbResult<TypeResolution> {
        let candidates = self.type_candidates_sync(schema.as_str(), name.as_str())?;
        Ok(TypeResolution::from_candidates(candidates))
    }

    async fn foreign_key_parents(
        &self,
        schema: &SchemaName,
        table: &ObjectName,
    ) -> DbResult<Vec<ForeignKeyRef>> {
        let table_ref = ObjectRef {
            schema: schema.clone(),
            name: table.clone(),
            object_type: ObjectType::Table,
        };
        self.require(&table_ref)?;
        let texts = self.query_strings(
            "SELECT constraint_text FROM duckdb_constraints() \
             WHERE constraint_type = 'FOREIGN KEY' AND upper(schema_name) = ? AND upper(table_name) = ? \
             ORDER BY constraint_index",
            schema.as_str(),
            table.as_str(),
        )?;
        let mut parents = Vec::new();
        for text in &texts {
            match parse_foreign_key(text, schema) {
                Some(fk) => parents.push(fk),
                None => log::warn!("Unrecognised constraint on {}: {}", table_ref, text),
            }
        }
        Ok(parents)
    }

    async fn triggers_on(
        &self,
        schema: &SchemaName,
        table: &ObjectName,
    ) -> DbResult<Vec<ObjectRef>> {
        self.require(&ObjectRef {
            schema: schema.clone(),
            name: table.clone(),
            object_type: ObjectType::Table,
        })?;
        Ok(Vec::new())
    }

    async fn dependencies_of(&self, object: &ObjectRef) -> DbResult<Vec<ObjectRef>> {
        self.require(object)?;
        match object.object_type {
            ObjectType::Table => self.table_sequences(object),
            ObjectType::View => self.view_dependencies(object),
            _ => Ok(Vec::new()),
        }
    }

    async fn ddl_text(&self, object: &ObjectRef) -> DbResult<String> {
        self.stored_sql(object)?
            .ok_or_else(|| DbError::ObjectNotFound(object.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
