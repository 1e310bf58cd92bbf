//! Transitive dependency closure over a metadata provider.

use dig_core::config::Config;
use dig_core::graph::{DependencyEdge, DependencyGraph, EdgeKind, NodeStatus};
use dig_core::identifier::SchemaName;
use dig_core::object::{ObjectRef, ObjectType};
use dig_core::resolution::{ResolutionError, SeedSpec, TypeResolution};
use dig_db::{DbResult, MetadataProvider};
use std::collections::{HashSet, VecDeque};

/// Builds a [`DependencyGraph`] from seeds by breadth-first expansion.
///
/// Each object is expanded at most once. Edges into already visited objects
/// are still recorded, so cycles show up as edges and the walk terminates.
/// Objects in system schemas become `External` leaves and are never expanded.
pub struct GraphBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    system_schemas: HashSet<String>,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder using the default system schema list
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self::from_config(provider, &Config::default())
    }

    /// Create a builder honouring the configured system schemas
    pub fn from_config(provider: &'a dyn MetadataProvider, config: &Config) -> Self {
        Self {
            provider,
            system_schemas: config.system_schemas.iter().cloned().collect(),
        }
    }

    /// Replace the system schema list
    pub fn with_system_schemas(mut self, schemas: impl IntoIterator<Item = SchemaName>) -> Self {
        self.system_schemas = schemas.into_iter().map(|s| s.into_inner()).collect();
        self
    }

    fn is_system(&self, schema: &SchemaName) -> bool {
        self.system_schemas.contains(schema.as_str())
    }

    /// Compute the closure of `seeds`.
    ///
    /// Seeds that cannot be typed, and objects that turn out not to exist, are
    /// recorded on the graph as resolution errors. Any other provider failure
    /// aborts the build.
    pub async fn build(&self, seeds: &[SeedSpec]) -> DbResult<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        let mut visited: HashSet<ObjectRef> = HashSet::new();
        let mut queue: VecDeque<ObjectRef> = VecDeque::new();

        for seed in seeds {
            match self.resolve_seed(seed).await? {
                Ok(object) => {
                    log::debug!("Seed {}", object);
                    graph.add_seed(&object);
                    if visited.insert(object.clone()) {
                        queue.push_back(object);
                    }
                }
                Err(error) => {
                    log::warn!("{}", error);
                    graph.record_resolution_error(error);
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            if self.is_system(&current.schema) {
                log::debug!("{} is system-owned, not expanding", current);
                graph.set_status(&current, NodeStatus::External);
                continue;
            }

            let edges = match self.expand(&graph, &current).await {
                Ok(edges) => edges,
                Err(e) if e.is_not_found() => {
                    log::warn!("{} not found; keeping it as an unresolved leaf", current);
                    graph.set_status(&current, NodeStatus::Unresolved);
                    graph.record_resolution_error(ResolutionError::not_found(&current));
                    continue;
                }
                Err(e) => return Err(e),
            };

            for (target, edge) in edges {
                log::debug!("{} -[{}]-> {}", current, edge.kind, target);
                graph.add_edge(&current, &target, edge);
                if visited.insert(target.clone()) {
                    queue.push_back(target);
                }
            }
        }

        let summary = graph.summary();
        log::info!(
            "Built dependency graph via {}: {} objects, {} edges, {} unresolved, {} external",
            self.provider.provider_name(),
            summary.nodes,
            summary.edges,
            summary.unresolved,
            summary.external
        );
        Ok(graph)
    }

    /// Type a seed. The outer result carries provider failures; the inner one
    /// carries resolution problems that only concern this seed.
    async fn resolve_seed(
        &self,
        seed: &SeedSpec,
    ) -> DbResult<Result<ObjectRef, ResolutionError>> {
        if let Some(object) = seed.as_ref_if_typed() {
            return Ok(Ok(object));
        }

        let resolved = match self.provider.resolve_type(&seed.schema, &seed.name).await? {
            TypeResolution::Found(object_type) => Ok(ObjectRef {
                schema: seed.schema.clone(),
                name: seed.name.clone(),
                object_type,
            }),
            TypeResolution::NotFound => Err(ResolutionError::NotFound {
                schema: seed.schema.clone(),
                name: seed.name.clone(),
                object_type: None,
            }),
            TypeResolution::Ambiguous(candidates) => Err(ResolutionError::Ambiguous {
                schema: seed.schema.clone(),
                name: seed.name.clone(),
                candidates,
            }),
        };
        Ok(resolved)
    }

    /// Collect the outbound edges of one object without touching the graph,
    /// so a missing object leaves no half-recorded edges behind.
    async fn expand(
        &self,
        graph: &DependencyGraph,
        current: &ObjectRef,
    ) -> DbResult<Vec<(ObjectRef, DependencyEdge)>> {
        let mut edges: Vec<(ObjectRef, DependencyEdge)> = Vec::new();

        if current.object_type == ObjectType::Table {
            for fk in self
                .provider
                .foreign_key_parents(&current.schema, &current.name)
                .await?
            {
                if let Some(constraint) = &fk.constraint_name {
                    log::debug!("{} references {} through {}", current, fk.parent, constraint);
                }
                edges.push((
                    fk.parent,
                    DependencyEdge::foreign_key(fk.columns, fk.referenced_columns),
                ));
            }

            for trigger in self
                .provider
                .triggers_on(&current.schema, &current.name)
                .await?
            {
                edges.push((trigger, DependencyEdge::trigger()));
            }
        }

        // Targets already reached through a declared FK or trigger
        let mut covered: HashSet<ObjectRef> = edges.iter().map(|(t, _)| t.clone()).collect();
        covered.insert(current.clone());
        if current.object_type == ObjectType::Trigger {
            for (owner, edge) in graph.incoming(current) {
                if edge.kind == EdgeKind::Trigger {
                    covered.insert(owner.clone());
                }
            }
        }

        for dependency in self.provider.dependencies_of(current).await? {
            if covered.insert(dependency.clone()) {
                edges.push((dependency, DependencyEdge::generic()));
            }
        }

        Ok(edges)
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
