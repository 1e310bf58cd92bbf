//! Creation-ordered migration plan.

use crate::object::{ObjectCategory, ObjectRef};
use serde::Serialize;
use std::fmt;

/// Objects of one category in creation-safe order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectGroup {
    pub category: ObjectCategory,
    pub objects: Vec<ObjectRef>,
}

/// Emitted when the planner had to pick an arbitrary starting point inside an
/// intra-category dependency cycle. Informational only.
///
/// The planner does not split constraints out of the generated DDL, so a
/// cycle between tables usually needs one foreign key added by hand after both
/// tables exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleWarning {
    pub category: ObjectCategory,
    /// The object emitted first.
    pub anchor: ObjectRef,
    /// Every member of the cycle, sorted.
    pub members: Vec<ObjectRef>,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.members.iter().map(|m| m.qualified_name()).collect();
        write!(
            f,
            "dependency cycle in {} between {}; created {} first, a deferred constraint may be needed",
            self.category,
            names.join(", "),
            self.anchor.qualified_name()
        )
    }
}

/// Category groups in fixed creation order, plus any cycle warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub groups: Vec<ObjectGroup>,
    pub warnings: Vec<CycleWarning>,
}

impl MigrationPlan {
    /// Total number of objects across all groups.
    pub fn object_count(&self) -> usize {
        self.groups.iter().map(|g| g.objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.object_count() == 0
    }

    /// The group for a category, if the plan has one.
    pub fn group(&self, category: ObjectCategory) -> Option<&ObjectGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    /// Every planned object, group by group.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.groups.iter().flat_map(|g| g.objects.iter())
    }

    /// Drop objects for which `keep` is false; groups left empty are removed.
    /// Returns the objects that were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&ObjectRef) -> bool) -> Vec<ObjectRef> {
        let mut dropped = Vec::new();
        for group in &mut self.groups {
            group.objects.retain(|o| {
                let kept = keep(o);
                if !kept {
                    dropped.push(o.clone());
                }
                kept
            });
        }
        self.groups.retain(|g| !g.objects.is_empty());
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    fn plan() -> MigrationPlan {
        MigrationPlan {
            groups: vec![
                ObjectGroup {
                    category: ObjectCategory::Tables,
                    objects: vec![
                        ObjectRef::new("APP", "REGION", ObjectType::Table),
                        ObjectRef::new("APP", "CUSTOMER", ObjectType::Table),
                    ],
                },
                ObjectGroup {
                    category: ObjectCategory::Triggers,
                    objects: vec![ObjectRef::new("APP", "CUST_TRG", ObjectType::Trigger)],
                },
            ],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_object_count_and_lookup() {
        let plan = plan();
        assert_eq!(plan.object_count(), 3);
        assert!(plan.group(ObjectCategory::Types).is_none());
        assert_eq!(plan.group(ObjectCategory::Triggers).unwrap().objects.len(), 1);
    }

    #[test]
    fn test_retain_drops_empty_groups() {
        let mut plan = plan();
        let dropped = plan.retain(|o| o.object_type == ObjectType::Table);
        assert_eq!(dropped.len(), 1);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.object_count(), 2);
    }

    #[test]
    fn test_cycle_warning_names_members() {
        let a = ObjectRef::new("APP", "A", ObjectType::Table);
        let b = ObjectRef::new("APP", "B", ObjectType::Table);
        let warning = CycleWarning {
            category: ObjectCategory::Tables,
            anchor: a.clone(),
            members: vec![a, b],
        };
        let msg = warning.to_string();
        assert!(msg.contains("APP.A, APP.B"));
        assert!(msg.contains("tables"));
    }
}
