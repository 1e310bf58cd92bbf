//! Dependency graph over database objects.
//!
//! Unlike a model DAG, a schema's dependency graph is allowed to contain
//! cycles: mutually referencing tables and self-referencing foreign keys are
//! legal. Edges point from the dependent object to the object it needs.

use crate::object::ObjectRef;
use crate::resolution::ResolutionError;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Provenance of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Declared foreign key from a child table to its parent.
    ForeignKey,
    /// Trigger attached to a table.
    Trigger,
    /// Anything else the catalog's dependency metadata reports.
    Generic,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::ForeignKey => write!(f, "fk"),
            EdgeKind::Trigger => write!(f, "trigger"),
            EdgeKind::Generic => write!(f, "dep"),
        }
    }
}

/// A directed `from -> to` edge label. `from` requires `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    pub kind: EdgeKind,
    /// Constrained columns on the `from` side (foreign keys only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Referenced columns on the `to` side (foreign keys only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub referenced_columns: Vec<String>,
}

impl DependencyEdge {
    pub fn foreign_key(columns: Vec<String>, referenced_columns: Vec<String>) -> Self {
        Self {
            kind: EdgeKind::ForeignKey,
            columns,
            referenced_columns,
        }
    }

    pub fn trigger() -> Self {
        Self::plain(EdgeKind::Trigger)
    }

    pub fn generic() -> Self {
        Self::plain(EdgeKind::Generic)
    }

    fn plain(kind: EdgeKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            referenced_columns: Vec::new(),
        }
    }
}

/// What the builder learned about a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Exists and was expanded.
    Resolved,
    /// Referenced but missing from the catalog.
    Unresolved,
    /// Owned by the engine itself; kept as a terminal leaf.
    External,
}

/// Node weight: the object plus its status.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub object: ObjectRef,
    pub status: NodeStatus,
}

/// Counters describing a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub unresolved: usize,
    pub external: usize,
}

/// Closure of objects reachable from a set of seeds.
///
/// Invariant: every edge's endpoints are nodes of the graph; [`add_edge`]
/// inserts missing endpoints before linking them.
///
/// [`add_edge`]: DependencyGraph::add_edge
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, DependencyEdge>,
    node_map: HashMap<ObjectRef, NodeIndex>,
    seeds: Vec<ObjectRef>,
    resolution_errors: Vec<ResolutionError>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if absent, returning its index. New nodes start `Resolved`.
    pub fn add_node(&mut self, object: &ObjectRef) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(object) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            object: object.clone(),
            status: NodeStatus::Resolved,
        });
        self.node_map.insert(object.clone(), idx);
        idx
    }

    /// Add `from -> to`. Identical edges (same kind and columns) are stored
    /// once; different kinds between the same pair are kept apart.
    ///
    /// Returns `true` when a new edge was inserted.
    pub fn add_edge(&mut self, from: &ObjectRef, to: &ObjectRef, edge: DependencyEdge) -> bool {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        let duplicate = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|e| *e.weight() == edge);
        if duplicate {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, edge);
        true
    }

    /// Register a seed. The seed node is added if missing.
    pub fn add_seed(&mut self, object: &ObjectRef) {
        self.add_node(object);
        if !self.seeds.contains(object) {
            self.seeds.push(object.clone());
        }
    }

    /// Seeds in the order they were registered.
    pub fn seeds(&self) -> &[ObjectRef] {
        &self.seeds
    }

    /// Update a node's status. Unknown objects are ignored.
    pub fn set_status(&mut self, object: &ObjectRef, status: NodeStatus) {
        if let Some(&idx) = self.node_map.get(object) {
            self.graph[idx].status = status;
        }
    }

    /// Status of a node, if present.
    pub fn status(&self, object: &ObjectRef) -> Option<&NodeStatus> {
        self.node_map
            .get(object)
            .map(|&idx| &self.graph[idx].status)
    }

    /// Record a resolution problem found while building.
    pub fn record_resolution_error(&mut self, error: ResolutionError) {
        if !self.resolution_errors.contains(&error) {
            self.resolution_errors.push(error);
        }
    }

    /// Resolution problems in the order they were found.
    pub fn resolution_errors(&self) -> &[ResolutionError] {
        &self.resolution_errors
    }

    /// Check if an object is a node
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.node_map.contains_key(object)
    }

    /// All nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All objects in discovery order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.nodes().map(|n| &n.object)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outbound edges of a node in insertion order.
    pub fn outgoing(&self, object: &ObjectRef) -> Vec<(&ObjectRef, &DependencyEdge)> {
        self.edges_of(object, Direction::Outgoing)
    }

    /// Inbound edges of a node in insertion order; the object is the dependent.
    pub fn incoming(&self, object: &ObjectRef) -> Vec<(&ObjectRef, &DependencyEdge)> {
        self.edges_of(object, Direction::Incoming)
    }

    fn edges_of(
        &self,
        object: &ObjectRef,
        direction: Direction,
    ) -> Vec<(&ObjectRef, &DependencyEdge)> {
        let Some(&idx) = self.node_map.get(object) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges
            .into_iter()
            .map(|(id, other)| (&self.graph[other].object, &self.graph[id]))
            .collect()
    }

    /// Node, edge, and status counts.
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            ..GraphSummary::default()
        };
        for node in self.nodes() {
            match node.status {
                NodeStatus::Unresolved => summary.unresolved += 1,
                NodeStatus::External => summary.external += 1,
                NodeStatus::Resolved => {}
            }
        }
        summary
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
