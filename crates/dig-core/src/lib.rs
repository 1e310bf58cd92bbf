//! dig-core - Core library for schemadig
//!
//! This crate provides the object model, identifier normalisation, the
//! dependency graph, type-resolution policy, migration plan types, and
//! configuration parsing shared by every schemadig component.

pub mod config;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod object;
pub mod plan;
pub mod resolution;

pub use config::{Config, SourceKind};
pub use error::{CoreError, CoreResult};
pub use graph::{DependencyEdge, DependencyGraph, EdgeKind, GraphNode, GraphSummary, NodeStatus};
pub use identifier::{ObjectName, SchemaName};
pub use object::{ObjectCategory, ObjectRef, ObjectType};
pub use plan::{CycleWarning, MigrationPlan, ObjectGroup};
pub use resolution::{ResolutionError, SeedSpec, TypeResolution};
