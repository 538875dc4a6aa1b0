//! Dependency graph construction and conflict detection

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::DependencyGraph;
use super::layers::layer_rank;
use crate::{
    error::Result,
    identifier::Identifier,
    model::Revision,
    providers::CodeModelProvider,
    types::{ConflictKind, DependencyConflict},
};

/// Which cycle check the analyzer runs for each dependency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDetection {
    /// Report any cycle reachable from the dependency
    #[default]
    AnyReachable,
    /// Only report cycles that lead back to the namespace being moved
    ThroughSource,
}

/// Result of validating a proposed move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// No conflicts, safe to proceed
    Clear,
    /// Every conflict that was found
    Conflicts(Vec<DependencyConflict>),
}

impl Validation {
    /// Whether the move may proceed
    pub fn is_clear(&self) -> bool {
        matches!(self, Validation::Clear)
    }
}

/// Builds dependency graphs and evaluates moves against them
pub struct DependencyAnalyzer {
    provider: Arc<dyn CodeModelProvider>,
    cycle_detection: CycleDetection,
}

impl DependencyAnalyzer {
    /// Create an analyzer backed by `provider`
    pub fn new(provider: Arc<dyn CodeModelProvider>) -> Self {
        Self {
            provider,
            cycle_detection: CycleDetection::default(),
        }
    }

    /// Use a different cycle check
    pub fn with_cycle_detection(mut self, cycle_detection: CycleDetection) -> Self {
        self.cycle_detection = cycle_detection;
        self
    }

    /// Cycle check in use
    pub fn cycle_detection(&self) -> CycleDetection {
        self.cycle_detection
    }

    /// Build one graph per document from the provider's reference edges and merge them
    pub fn build_dependency_graph(&self, revision: &Revision) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        for document in revision.documents() {
            let mut unit = DependencyGraph::new();
            for edge in self.provider.references(revision, document)? {
                if edge.enclosing != edge.referenced {
                    unit.add_dependency(edge.enclosing, edge.referenced);
                }
            }
            graph.merge(&unit);
        }

        debug!(
            revision = revision.sequence(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );
        Ok(graph)
    }

    /// Conflicts that moving `source` to `target` would introduce
    pub fn find_dependency_conflicts(
        &self,
        source: &Identifier,
        target: &Identifier,
        graph: &DependencyGraph,
    ) -> Vec<DependencyConflict> {
        let target_rank = layer_rank(target);
        let mut conflicts = Vec::new();

        for dependency in graph.dependencies(source) {
            if layer_rank(dependency) > target_rank {
                conflicts.push(DependencyConflict {
                    source: source.clone(),
                    conflicting_dependency: dependency.clone(),
                    kind: ConflictKind::LayerViolation,
                });
            }

            let mut visited = HashSet::new();
            let cyclic = match self.cycle_detection {
                CycleDetection::AnyReachable => graph.has_cycle(source, dependency, &mut visited),
                CycleDetection::ThroughSource => {
                    graph.has_cycle_through(source, dependency, &mut visited)
                }
            };
            if cyclic {
                conflicts.push(DependencyConflict {
                    source: source.clone(),
                    conflicting_dependency: dependency.clone(),
                    kind: ConflictKind::CyclicDependency,
                });
            }
        }

        conflicts
    }

    /// Evaluate a move and report the outcome as a value
    pub fn validate(
        &self,
        source: &Identifier,
        target: &Identifier,
        graph: &DependencyGraph,
    ) -> Validation {
        let conflicts = self.find_dependency_conflicts(source, target, graph);
        if conflicts.is_empty() {
            Validation::Clear
        } else {
            Validation::Conflicts(conflicts)
        }
    }
}
