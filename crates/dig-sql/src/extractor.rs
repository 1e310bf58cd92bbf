//! Relation extraction from SQL AST

use dig_core::identifier::normalize_identifier;
use regex::Regex;
use sqlparser::ast::{ObjectName, Query, Statement, Visit, Visitor};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::OnceLock;

/// A relation named in SQL, with identifiers normalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationName {
    /// Schema qualifier, when the SQL gave one
    pub schema: Option<String>,
    pub name: String,
}

impl RelationName {
    /// Split a dotted name; catalog qualifiers beyond `schema.name` are dropped.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (name, rest) = parts.split_last()?;
        let name = normalize_identifier(name);
        if name.is_empty() {
            return None;
        }
        let schema = rest
            .last()
            .map(|s| normalize_identifier(s))
            .filter(|s| !s.is_empty());
        Some(Self { schema, name })
    }
}

/// Collects relations and the CTE names that shadow them.
#[derive(Default)]
struct RelationCollector {
    relations: Vec<RelationName>,
    seen: HashSet<RelationName>,
    cte_names: HashSet<String>,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.cte_names
                    .insert(normalize_identifier(&cte.alias.name.value));
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        let parts: Vec<String> = relation
            .0
            .iter()
            .filter_map(|p| p.as_ident().map(|ident| ident.value.clone()))
            .collect();
        if let Some(name) = RelationName::from_parts(&parts) {
            if self.seen.insert(name.clone()) {
                self.relations.push(name);
            }
        }
        ControlFlow::Continue(())
    }
}

/// Extract the relations referenced by SQL statements, in first-seen order.
///
/// Unqualified references to a CTE defined in the same statements are not
/// relations and are dropped. For a `CREATE VIEW` the view's own name may be
/// reported; callers drop self references.
pub fn extract_relations(statements: &[Statement]) -> Vec<RelationName> {
    let mut collector = RelationCollector::default();
    for stmt in statements {
        let _ = stmt.visit(&mut collector);
    }

    let RelationCollector {
        relations,
        cte_names,
        ..
    } = collector;
    relations
        .into_iter()
        .filter(|r| !(r.schema.is_none() && cte_names.contains(&r.name)))
        .collect()
}

fn nextval_pattern() -> &'static Regex {
    static NEXTVAL: OnceLock<Regex> = OnceLock::new();
    NEXTVAL.get_or_init(|| {
        Regex::new(r#"(?i)\bnextval\s*\(\s*'([^']+)'"#).expect("valid regex literal")
    })
}

/// Sequence names referenced through `nextval('...')` in a column default.
pub fn extract_sequence_refs(expression: &str) -> Vec<RelationName> {
    let mut found = Vec::new();
    for caps in nextval_pattern().captures_iter(expression) {
        let parts: Vec<String> = caps[1].split('.').map(|s| s.to_string()).collect();
        if let Some(name) = RelationName::from_parts(&parts) {
            if !found.contains(&name) {
                found.push(name);
            }
        }
    }
    found
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
