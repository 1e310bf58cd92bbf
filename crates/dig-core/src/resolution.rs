//! Turning a bare object name into a typed reference.

use crate::identifier::{ObjectName, SchemaName};
use crate::object::{ObjectRef, ObjectType};
use serde::Serialize;
use std::fmt;

/// Outcome of asking the catalog what type a named object has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    Found(ObjectType),
    NotFound,
    /// Two or more non-table types share the name; candidates are sorted.
    Ambiguous(Vec<ObjectType>),
}

impl TypeResolution {
    /// Apply the resolution policy to the raw candidate types a catalog
    /// reported for one `(schema, name)`.
    ///
    /// `TABLE` always wins. A `PACKAGE_BODY` never stands on its own when its
    /// `PACKAGE` is present. Triggers live in their own namespace and only win
    /// when nothing else matches, which leaves a `VIEW` preferred over a
    /// same-named trigger. Any other overlap is ambiguous.
    pub fn from_candidates(candidates: impl IntoIterator<Item = ObjectType>) -> Self {
        let mut types: Vec<ObjectType> = candidates.into_iter().collect();
        types.sort();
        types.dedup();

        if types.contains(&ObjectType::Package) {
            types.retain(|t| *t != ObjectType::PackageBody);
        }

        match types.as_slice() {
            [] => return TypeResolution::NotFound,
            [only] => return TypeResolution::Found(*only),
            _ => {}
        }

        if types.contains(&ObjectType::Table) {
            return TypeResolution::Found(ObjectType::Table);
        }

        let shared_namespace: Vec<ObjectType> = types
            .iter()
            .copied()
            .filter(|t| *t != ObjectType::Trigger)
            .collect();

        match shared_namespace.as_slice() {
            [] => TypeResolution::Found(ObjectType::Trigger),
            [only] => TypeResolution::Found(*only),
            _ => TypeResolution::Ambiguous(shared_namespace),
        }
    }
}

/// A named object the tool could not turn into a usable node.
///
/// These are recorded on the graph rather than propagated: the branch stops,
/// siblings carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    NotFound {
        schema: SchemaName,
        name: ObjectName,
        object_type: Option<ObjectType>,
    },
    Ambiguous {
        schema: SchemaName,
        name: ObjectName,
        candidates: Vec<ObjectType>,
    },
}

impl ResolutionError {
    /// Not-found error for a reference whose type was already known.
    pub fn not_found(object: &ObjectRef) -> Self {
        ResolutionError::NotFound {
            schema: object.schema.clone(),
            name: object.name.clone(),
            object_type: Some(object.object_type),
        }
    }

    /// `SCHEMA.NAME` of the offending object.
    pub fn qualified_name(&self) -> String {
        match self {
            ResolutionError::NotFound { schema, name, .. }
            | ResolutionError::Ambiguous { schema, name, .. } => format!("{}.{}", schema, name),
        }
    }

    /// Whether this error is about the given schema and name.
    pub fn concerns(&self, schema: &SchemaName, name: &ObjectName) -> bool {
        match self {
            ResolutionError::NotFound {
                schema: s, name: n, ..
            }
            | ResolutionError::Ambiguous {
                schema: s, name: n, ..
            } => s == schema && n == name,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::NotFound {
                object_type: Some(t),
                ..
            } => write!(f, "{} {} not found", t, self.qualified_name()),
            ResolutionError::NotFound {
                object_type: None, ..
            } => write!(f, "object {} not found", self.qualified_name()),
            ResolutionError::Ambiguous { candidates, .. } => {
                let types: Vec<&str> = candidates.iter().map(|t| t.as_str()).collect();
                write!(
                    f,
                    "object {} is ambiguous: it exists as {}. Pass an explicit object type",
                    self.qualified_name(),
                    types.join(" and ")
                )
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// A seed as the user names it: the type may be left for the catalog to decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSpec {
    pub schema: SchemaName,
    pub name: ObjectName,
    pub object_type: Option<ObjectType>,
}

impl SeedSpec {
    pub fn new(schema: SchemaName, name: ObjectName, object_type: Option<ObjectType>) -> Self {
        Self {
            schema,
            name,
            object_type,
        }
    }

    /// The typed reference, when the type was given up front.
    pub fn as_ref_if_typed(&self) -> Option<ObjectRef> {
        self.object_type.map(|t| ObjectRef {
            schema: self.schema.clone(),
            name: self.name.clone(),
            object_type: t,
        })
    }
}

impl From<ObjectRef> for SeedSpec {
    fn from(object: ObjectRef) -> Self {
        Self {
            schema: object.schema,
            name: object.name,
            object_type: Some(object.object_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ObjectType::*;

    #[test]
    fn test_no_candidates_is_not_found() {
        assert_eq!(TypeResolution::from_candidates(Vec::new()), TypeResolution::NotFound);
    }

    #[test]
    fn test_single_candidate() {
        assert_eq!(
            TypeResolution::from_candidates([Procedure]),
            TypeResolution::Found(Procedure)
        );
    }

    #[test]
    fn test_table_wins() {
        assert_eq!(
            TypeResolution::from_candidates([Package, Table, Trigger]),
            TypeResolution::Found(Table)
        );
    }

    #[test]
    fn test_package_body_folds_into_package() {
        assert_eq!(
            TypeResolution::from_candidates([PackageBody, Package]),
            TypeResolution::Found(Package)
        );
    }

    #[test]
    fn test_view_preferred_over_trigger() {
        assert_eq!(
            TypeResolution::from_candidates([Trigger, View]),
            TypeResolution::Found(View)
        );
    }

    #[test]
    fn test_view_and_package_are_ambiguous() {
        assert_eq!(
            TypeResolution::from_candidates([Package, View, PackageBody]),
            TypeResolution::Ambiguous(vec![View, Package])
        );
    }

    #[test]
    fn test_ambiguous_message_names_both_types() {
        let err = ResolutionError::Ambiguous {
            schema: SchemaName::new("app"),
            name: ObjectName::new("report"),
            candidates: vec![View, Package],
        };
        let msg = err.to_string();
        assert!(msg.contains("APP.REPORT"));
        assert!(msg.contains("VIEW and PACKAGE"));
    }
}
