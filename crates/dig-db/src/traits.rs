//! Metadata provider trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use dig_core::identifier::{ObjectName, SchemaName};
use dig_core::object::ObjectRef;
use dig_core::resolution::TypeResolution;

/// A declared foreign key, seen from the child table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    /// The referenced (parent) table
    pub parent: ObjectRef,
    /// Constrained columns on the child
    pub columns: Vec<String>,
    /// Referenced columns on the parent
    pub referenced_columns: Vec<String>,
    pub constraint_name: Option<String>,
}

/// Catalog questions schemadig needs answered, independent of engine.
///
/// Implementations must be Send + Sync for async operation. Asking about an
/// object that does not exist yields `DbError::ObjectNotFound`; any other
/// error means the source itself failed and aborts the run.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Decide which type a bare `(schema, name)` refers to.
    async fn resolve_type(&self, schema: &SchemaName, name: &ObjectName)
        -> DbResult<TypeResolution>;

    /// Foreign keys declared on a table, in catalog order.
    async fn foreign_key_parents(
        &self,
        schema: &SchemaName,
        table: &ObjectName,
    ) -> DbResult<Vec<ForeignKeyRef>>;

    /// Triggers attached to a table.
    async fn triggers_on(&self, schema: &SchemaName, table: &ObjectName)
        -> DbResult<Vec<ObjectRef>>;

    /// Objects referenced by `object`. May include the object itself.
    async fn dependencies_of(&self, object: &ObjectRef) -> DbResult<Vec<ObjectRef>>;

    /// Full creation statement for an object.
    async fn ddl_text(&self, object: &ObjectRef) -> DbResult<String>;

    /// Provider identifier for logging
    fn provider_name(&self) -> &'static str;
}
