//! Namespace dependency graph

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::identifier::Identifier;

/// Directed graph of namespace -> namespaces it references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Adjacency sets keyed by the depending namespace
    adjacency: BTreeMap<Identifier, BTreeSet<Identifier>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge `from -> to`; returns false when the edge was already present
    pub fn add_dependency(&mut self, from: Identifier, to: Identifier) -> bool {
        self.adjacency.entry(from).or_default().insert(to)
    }

    /// Direct dependencies of `node`, empty when the node is unknown
    pub fn get_dependencies(&self, node: &Identifier) -> Vec<Identifier> {
        self.dependencies(node).cloned().collect()
    }

    /// Borrowing iterator over the direct dependencies of `node`
    pub fn dependencies<'a>(&'a self, node: &Identifier) -> impl Iterator<Item = &'a Identifier> + 'a {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Depth-first search from `current` that reports any cycle it runs into
    ///
    /// `start` is carried for symmetry with [`has_cycle_through`](Self::has_cycle_through)
    /// but never compared, so a cycle that does not pass through `start` is
    /// still reported. `visited` holds the current traversal path and is
    /// restored on the way out; callers pass a fresh set for every query.
    pub fn has_cycle(
        &self,
        start: &Identifier,
        current: &Identifier,
        visited: &mut HashSet<Identifier>,
    ) -> bool {
        if !visited.insert(current.clone()) {
            return true;
        }

        for dependency in self.dependencies(current) {
            if self.has_cycle(start, dependency, visited) {
                return true;
            }
        }

        visited.remove(current);
        false
    }

    /// Whether following edges from `current` leads back to `start`
    ///
    /// `visited` collects explored nodes so each node is expanded once.
    pub fn has_cycle_through(
        &self,
        start: &Identifier,
        current: &Identifier,
        visited: &mut HashSet<Identifier>,
    ) -> bool {
        if current == start {
            return true;
        }
        if !visited.insert(current.clone()) {
            return false;
        }

        self.dependencies(current)
            .any(|dependency| self.has_cycle_through(start, dependency, visited))
    }

    /// Union every edge of `other` into `self`
    pub fn merge(&mut self, other: &DependencyGraph) {
        for (from, targets) in &other.adjacency {
            let entry = self.adjacency.entry(from.clone()).or_default();
            entry.extend(targets.iter().cloned());
        }
    }

    /// Namespaces that have at least one outgoing edge
    pub fn nodes(&self) -> impl Iterator<Item = &Identifier> {
        self.adjacency.keys()
    }

    /// All edges in `(from, to)` order
    pub fn edges(&self) -> impl Iterator<Item = (&Identifier, &Identifier)> {
        self.adjacency
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Whether the edge `from -> to` exists
    pub fn contains(&self, from: &Identifier, to: &Identifier) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum()
    }

    /// Whether the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_dependency(id(from), id(to));
        }
        graph
    }

    #[test]
    fn test_add_dependency_is_idempotent() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_dependency(id("A"), id("B")));
        assert!(!graph.add_dependency(id("A"), id("B")));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_dependencies(&id("A")), vec![id("B")]);
    }

    #[test]
    fn test_unknown_node_has_no_dependencies() {
        let graph = graph(&[("A", "B")]);
        assert!(graph.get_dependencies(&id("Missing")).is_empty());
        assert!(graph.get_dependencies(&id("B")).is_empty());
    }

    #[test]
    fn test_has_cycle_detects_simple_cycle() {
        let graph = graph(&[("A", "B"), ("B", "A")]);
        assert!(graph.has_cycle(&id("A"), &id("B"), &mut HashSet::new()));
    }

    #[test]
    fn test_has_cycle_ignores_diamonds() {
        // A -> B -> D, A -> C -> D
        let graph = graph(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        assert!(!graph.has_cycle(&id("A"), &id("A"), &mut HashSet::new()));
    }

    #[test]
    fn test_has_cycle_reports_unrelated_cycles() {
        // A -> B, and a separate loop B -> C -> B that never returns to A
        let graph = graph(&[("A", "B"), ("B", "C"), ("C", "B")]);

        assert!(graph.has_cycle(&id("A"), &id("B"), &mut HashSet::new()));
        assert!(!graph.has_cycle_through(&id("A"), &id("B"), &mut HashSet::new()));
    }

    #[test]
    fn test_has_cycle_through_finds_return_path() {
        let graph = graph(&[("A", "B"), ("B", "C"), ("C", "A")]);
        assert!(graph.has_cycle_through(&id("A"), &id("B"), &mut HashSet::new()));
    }

    #[test]
    fn test_merge_unions_edges() {
        let mut left = graph(&[("A", "B")]);
        let right = graph(&[("A", "C"), ("B", "C"), ("A", "B")]);
        left.merge(&right);

        assert_eq!(left.edge_count(), 3);
        assert!(left.contains(&id("A"), &id("C")));
        assert!(left.contains(&id("B"), &id("C")));
    }

    #[test]
    fn test_edges_are_listed_in_order() {
        let graph = graph(&[("B", "C"), ("A", "C"), ("A", "B")]);
        let edges: Vec<_> = graph
            .edges()
            .map(|(from, to)| format!("{}->{}", from, to))
            .collect();
        assert_eq!(edges, vec!["A->B", "A->C", "B->C"]);
    }
}
