//! Database object identity: types, categories, and references.

use crate::error::{CoreError, CoreResult};
use crate::identifier::{ObjectName, SchemaName};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of schema object the tool knows how to discover and migrate.
///
/// The set is closed: catalog rows with any other type are reported as errors
/// by the providers rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Table,
    View,
    Sequence,
    Type,
    Package,
    PackageBody,
    Function,
    Procedure,
    Trigger,
}

impl ObjectType {
    /// Every object type, in declaration order.
    pub const ALL: [ObjectType; 9] = [
        ObjectType::Table,
        ObjectType::View,
        ObjectType::Sequence,
        ObjectType::Type,
        ObjectType::Package,
        ObjectType::PackageBody,
        ObjectType::Function,
        ObjectType::Procedure,
        ObjectType::Trigger,
    ];

    /// Canonical identifier form (`PACKAGE_BODY`), used in files and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Type => "TYPE",
            ObjectType::Package => "PACKAGE",
            ObjectType::PackageBody => "PACKAGE_BODY",
            ObjectType::Function => "FUNCTION",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Trigger => "TRIGGER",
        }
    }

    /// SQL keyword form (`PACKAGE BODY`), as it appears in DDL.
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectType::PackageBody => "PACKAGE BODY",
            other => other.as_str(),
        }
    }

    /// The migration category this type is created in.
    pub fn category(&self) -> ObjectCategory {
        match self {
            ObjectType::Sequence | ObjectType::Table | ObjectType::View => ObjectCategory::Tables,
            ObjectType::Type => ObjectCategory::Types,
            ObjectType::Package | ObjectType::PackageBody => ObjectCategory::Packages,
            ObjectType::Function | ObjectType::Procedure => ObjectCategory::Routines,
            ObjectType::Trigger => ObjectCategory::Triggers,
        }
    }

    /// Whether foreign keys and triggers can hang off this object.
    pub fn is_table(&self) -> bool {
        matches!(self, ObjectType::Table)
    }

    fn expected_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CoreError;

    /// Case-insensitive; spaces and dashes are treated as underscores, so
    /// `package body`, `PACKAGE_BODY` and `package-body` all parse.
    fn from_str(s: &str) -> CoreResult<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownObjectType {
                value: s.to_string(),
                expected: Self::expected_list(),
            })
    }
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Object-kind bucket used to group migration output.
///
/// Declaration order is creation order: sequences/tables/views, then types,
/// then packages, then standalone functions/procedures, then triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    Tables,
    Types,
    Packages,
    Routines,
    Triggers,
}

impl ObjectCategory {
    /// All categories in creation order.
    pub const ALL: [ObjectCategory; 5] = [
        ObjectCategory::Tables,
        ObjectCategory::Types,
        ObjectCategory::Packages,
        ObjectCategory::Routines,
        ObjectCategory::Triggers,
    ];

    /// Suffix used in migration file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            ObjectCategory::Tables => "tables",
            ObjectCategory::Types => "types",
            ObjectCategory::Packages => "packages",
            ObjectCategory::Routines => "functions_procedures",
            ObjectCategory::Triggers => "triggers",
        }
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Identity of one database object.
///
/// Identity is the `(schema, name, type)` triple with identifiers normalised to
/// upper case, so a table and a package sharing a name are distinct objects.
/// The derived ordering is `(schema, name, type)`, which is the alphabetical
/// tie-break used by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub schema: SchemaName,
    pub name: ObjectName,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
}

impl ObjectRef {
    /// Create a reference, panicking on empty identifiers.
    ///
    /// Prefer [`try_new`](Self::try_new) for catalog or user input.
    pub fn new(schema: impl AsRef<str>, name: impl AsRef<str>, object_type: ObjectType) -> Self {
        Self {
            schema: SchemaName::new(schema),
            name: ObjectName::new(name),
            object_type,
        }
    }

    /// Create a reference, rejecting empty identifiers.
    pub fn try_new(
        schema: impl AsRef<str>,
        name: impl AsRef<str>,
        object_type: ObjectType,
    ) -> CoreResult<Self> {
        let schema_raw = schema.as_ref();
        let name_raw = name.as_ref();
        let schema = SchemaName::try_new(schema_raw).ok_or_else(|| CoreError::EmptyIdentifier {
            context: format!("schema of {} '{}'", object_type, name_raw),
        })?;
        let name = ObjectName::try_new(name_raw).ok_or_else(|| CoreError::EmptyIdentifier {
            context: format!("name of {} in schema '{}'", object_type, schema_raw),
        })?;
        Ok(Self {
            schema,
            name,
            object_type,
        })
    }

    /// `SCHEMA.NAME`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Same schema and name, different type.
    pub fn with_type(&self, object_type: ObjectType) -> Self {
        Self {
            schema: self.schema.clone(),
            name: self.name.clone(),
            object_type,
        }
    }

    /// Shorthand for `self.object_type.category()`.
    pub fn category(&self) -> ObjectCategory {
        self.object_type.category()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.object_type, self.schema, self.name)
    }
}

#[cfg(test)]
#[path = "object_test.rs"]
mod tests;
