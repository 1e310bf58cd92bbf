//! Dependency tree rendering.
//!
//! Both formats nest each object's dependencies under it, starting at every
//! seed. A node reachable along two paths is printed under each parent. A node
//! already on the current root-to-node path is printed once more, marked as a
//! cycle, and not descended into.

use dig_core::graph::{DependencyEdge, DependencyGraph, EdgeKind, NodeStatus};
use dig_core::object::{ObjectRef, ObjectType};
use serde::Serialize;
use std::fmt::Write as _;

/// Output format for [`render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Box-drawing tree
    #[default]
    Text,
    /// Nested JSON document
    Json,
}

/// Rendering limits
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Depth past which dependencies are elided
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// One occurrence of an object in the rendered tree.
#[derive(Debug, Clone)]
struct TreeNode {
    object: ObjectRef,
    /// Edges from the parent occurrence; empty for a seed.
    edges: Vec<DependencyEdge>,
    status: NodeStatus,
    cycle: bool,
    truncated: bool,
    children: Vec<TreeNode>,
}

/// Dependencies of `object` grouped per target, sorted by
/// (edge kind, type, schema, name).
fn grouped_children(
    graph: &DependencyGraph,
    object: &ObjectRef,
) -> Vec<(ObjectRef, Vec<DependencyEdge>)> {
    let mut groups: Vec<(ObjectRef, Vec<DependencyEdge>)> = Vec::new();
    for (target, edge) in graph.outgoing(object) {
        match groups.iter_mut().find(|(t, _)| t == target) {
            Some((_, edges)) => edges.push(edge.clone()),
            None => groups.push((target.clone(), vec![edge.clone()])),
        }
    }
    groups.sort_by(|(a, a_edges), (b, b_edges)| {
        let a_kind = a_edges.iter().map(|e| e.kind).min();
        let b_kind = b_edges.iter().map(|e| e.kind).min();
        sort_key(a_kind, a).cmp(&sort_key(b_kind, b))
    });
    groups
}

fn sort_key(
    kind: Option<EdgeKind>,
    object: &ObjectRef,
) -> (Option<EdgeKind>, ObjectType, &str, &str) {
    (
        kind,
        object.object_type,
        object.schema.as_str(),
        object.name.as_str(),
    )
}

/// Expand one occurrence. Recursion depth is bounded by `max_depth` and
/// by the path check, which stops at the first repeated object.
fn build_tree(
    graph: &DependencyGraph,
    object: &ObjectRef,
    edges: Vec<DependencyEdge>,
    path: &mut Vec<ObjectRef>,
    options: &RenderOptions,
) -> TreeNode {
    let status = graph
        .status(object)
        .cloned()
        .unwrap_or(NodeStatus::Unresolved);
    let mut node = TreeNode {
        object: object.clone(),
        edges,
        status,
        cycle: path.contains(object),
        truncated: false,
        children: Vec::new(),
    };
    if node.cycle {
        return node;
    }

    let children = grouped_children(graph, object);
    if children.is_empty() {
        return node;
    }
    if path.len() >= options.max_depth {
        node.truncated = true;
        return node;
    }

    path.push(object.clone());
    node.children = children
        .into_iter()
        .map(|(child, child_edges)| build_tree(graph, &child, child_edges, path, options))
        .collect();
    path.pop();
    node
}

fn trees(graph: &DependencyGraph, options: &RenderOptions) -> Vec<TreeNode> {
    graph
        .seeds()
        .iter()
        .map(|seed| build_tree(graph, seed, Vec::new(), &mut Vec::new(), options))
        .collect()
}

/// Render the graph in the requested format
pub fn render(
    graph: &DependencyGraph,
    format: OutputFormat,
    options: &RenderOptions,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(graph, options)),
        OutputFormat::Json => render_json(graph, options),
    }
}

// ── text ────────────────────────────────────────────────────────────────

fn edge_annotation(edge: &DependencyEdge) -> String {
    match edge.kind {
        EdgeKind::ForeignKey if !edge.columns.is_empty() => {
            format!("[fk: {}]", edge.columns.join(", "))
        }
        kind => format!("[{}]", kind),
    }
}

fn node_label(node: &TreeNode) -> String {
    let mut label = format!(
        "{} {}",
        node.object.object_type,
        node.object.qualified_name()
    );
    for edge in &node.edges {
        let _ = write!(label, " {}", edge_annotation(edge));
    }
    if node.cycle {
        label.push_str(" (cycle)");
    }
    match node.status {
        NodeStatus::Unresolved => label.push_str(" (unresolved)"),
        NodeStatus::External => label.push_str(" (system)"),
        NodeStatus::Resolved => {}
    }
    if node.truncated {
        label.push_str(" (depth limit)");
    }
    label
}

/// Render seeds as box-drawing trees, followed by any resolution errors.
pub fn render_text(graph: &DependencyGraph, options: &RenderOptions) -> String {
    let mut out = String::new();

    for (i, root) in trees(graph, options).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", node_label(root));

        // (node, prefix, is_last), walked depth-first in display order
        let mut stack: Vec<(&TreeNode, String, bool)> = root
            .children
            .iter()
            .enumerate()
            .rev()
            .map(|(j, child)| (child, String::new(), j == root.children.len() - 1))
            .collect();

        while let Some((node, prefix, is_last)) = stack.pop() {
            let connector = if is_last { "└── " } else { "├── " };
            let _ = writeln!(out, "{}{}{}", prefix, connector, node_label(node));

            let child_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });
            let count = node.children.len();
            for (j, child) in node.children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), j == count - 1));
            }
        }
    }

    let errors = graph.resolution_errors();
    if !errors.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Unresolved:\n");
        for error in errors {
            let _ = writeln!(out, "  - {}", error);
        }
    }

    out
}

// ── json ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct JsonNode<'a> {
    object_type: ObjectType,
    object_name: &'a str,
    object_schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    edge_kind: Option<EdgeKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    columns: Vec<&'a str>,
    status: &'a NodeStatus,
    cycle: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    truncated: bool,
    dependency_list: Vec<JsonNode<'a>>,
}

impl<'a> From<&'a TreeNode> for JsonNode<'a> {
    fn from(node: &'a TreeNode) -> Self {
        JsonNode {
            object_type: node.object.object_type,
            object_name: node.object.name.as_str(),
            object_schema: node.object.schema.as_str(),
            edge_kind: node.edges.iter().map(|e| e.kind).min(),
            columns: node
                .edges
                .iter()
                .flat_map(|e| e.columns.iter().map(|c| c.as_str()))
                .collect(),
            status: &node.status,
            cycle: node.cycle,
            truncated: node.truncated,
            dependency_list: node.children.iter().map(JsonNode::from).collect(),
        }
    }
}

/// Render seeds as nested JSON. One seed gives an object, several give an array.
pub fn render_json(
    graph: &DependencyGraph,
    options: &RenderOptions,
) -> serde_json::Result<String> {
    let roots = trees(graph, options);
    let nodes: Vec<JsonNode<'_>> = roots.iter().map(JsonNode::from).collect();
    match nodes.as_slice() {
        [single] => serde_json::to_string_pretty(single),
        _ => serde_json::to_string_pretty(&nodes),
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
