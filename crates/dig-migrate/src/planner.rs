//! Creation ordering of a dependency graph.

use dig_core::graph::{DependencyGraph, NodeStatus};
use dig_core::object::{ObjectCategory, ObjectRef, ObjectType};
use dig_core::plan::{CycleWarning, MigrationPlan, ObjectGroup};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

/// Order the resolved objects of `graph` for creation.
///
/// Categories come out in their fixed order. Inside a category, an object
/// follows every object of the same category it depends on; ties are broken
/// by `(schema, name, type)`. Objects that are unresolved or system-owned are
/// not planned.
pub fn plan(graph: &DependencyGraph) -> MigrationPlan {
    let mut plan = MigrationPlan::default();

    for category in ObjectCategory::ALL {
        let members: Vec<&ObjectRef> = graph
            .nodes()
            .filter(|n| n.status == NodeStatus::Resolved && n.object.category() == category)
            .map(|n| &n.object)
            .collect();
        if members.is_empty() {
            continue;
        }

        let (objects, warnings) = order_category(graph, category, &members);
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        log::debug!("Planned {} {} object(s)", objects.len(), category);
        plan.groups.push(ObjectGroup { category, objects });
        plan.warnings.extend(warnings);
    }

    plan
}

/// Topologically order one category. `members` must be in discovery order.
fn order_category(
    graph: &DependencyGraph,
    category: ObjectCategory,
    members: &[&ObjectRef],
) -> (Vec<ObjectRef>, Vec<CycleWarning>) {
    // Edges run from prerequisite to dependent. Node indices follow discovery
    // order because members are inserted in that order.
    let mut local: DiGraph<ObjectRef, ()> = DiGraph::new();
    let mut index: HashMap<&ObjectRef, NodeIndex> = HashMap::new();
    for member in members {
        index.insert(*member, local.add_node((*member).clone()));
    }

    for member in members {
        let dependent = index[member];
        for (target, _) in graph.outgoing(member) {
            if target == *member {
                continue;
            }
            if let Some(&prerequisite) = index.get(target) {
                local.update_edge(prerequisite, dependent, ());
            }
        }

        if member.object_type == ObjectType::PackageBody {
            let spec = member.with_type(ObjectType::Package);
            if let Some(&prerequisite) = index.get(&spec) {
                local.update_edge(prerequisite, dependent, ());
            }
        }
    }

    let components = tarjan_scc(&local);
    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (c, component) in components.iter().enumerate() {
        for &node in component {
            component_of.insert(node, c);
        }
    }

    // Anchor first, then the other members in discovery order
    let ordered: Vec<Vec<NodeIndex>> = components
        .iter()
        .map(|component| {
            let mut nodes = component.clone();
            nodes.sort();
            if let Some(anchor_pos) = nodes
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| local[**a].cmp(&local[**b]))
                .map(|(pos, _)| pos)
            {
                let anchor = nodes.remove(anchor_pos);
                nodes.insert(0, anchor);
            }
            nodes
        })
        .collect();

    let mut in_degree = vec![0usize; components.len()];
    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
    for edge in local.edge_references() {
        let from = component_of[&edge.source()];
        let to = component_of[&edge.target()];
        if from != to && successors[from].insert(to) {
            in_degree[to] += 1;
        }
    }

    let anchor_of = |c: usize| &local[ordered[c][0]];
    let mut ready: BTreeSet<(&ObjectRef, usize)> = (0..components.len())
        .filter(|&c| in_degree[c] == 0)
        .map(|c| (anchor_of(c), c))
        .collect();

    let mut objects = Vec::with_capacity(members.len());
    let mut warnings = Vec::new();
    while let Some((_, c)) = ready.pop_first() {
        let nodes = &ordered[c];
        objects.extend(nodes.iter().map(|&n| local[n].clone()));

        if nodes.len() > 1 {
            let mut cycle_members: Vec<ObjectRef> =
                nodes.iter().map(|&n| local[n].clone()).collect();
            cycle_members.sort();
            warnings.push(CycleWarning {
                category,
                anchor: local[nodes[0]].clone(),
                members: cycle_members,
            });
        }

        for &next in &successors[c] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert((anchor_of(next), next));
            }
        }
    }

    (objects, warnings)
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
