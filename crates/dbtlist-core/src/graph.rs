//! Reverse-adjacency index over a snapshot, backed by petgraph
//!
//! Edge `A → B` means "A depends on B", so the direct dependents of a node
//! are its incoming neighbours.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::snapshot::GraphSnapshot;

/// Dependency edges of one snapshot, built once and only read afterwards.
///
/// Ids referenced by `dependency_ids` but absent from the snapshot get a
/// placeholder vertex so their dependents are still reachable.
pub struct DependencyIndex<'a> {
    inner: DiGraph<&'a str, ()>,
    index_of: HashMap<&'a str, NodeIndex>,
}

impl std::fmt::Debug for DependencyIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyIndex")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<'a> DependencyIndex<'a> {
    pub fn build(snapshot: &'a GraphSnapshot) -> Self {
        let mut inner = DiGraph::with_capacity(snapshot.node_count(), snapshot.edge_count());
        let mut index_of = HashMap::with_capacity(snapshot.node_count());

        for id in snapshot.ids() {
            index_of.insert(id, inner.add_node(id));
        }

        for node in snapshot.nodes() {
            let Some(&from) = index_of.get(node.id.as_str()) else {
                continue;
            };
            for dep in &node.dependency_ids {
                let to = *index_of
                    .entry(dep.as_str())
                    .or_insert_with(|| inner.add_node(dep.as_str()));
                inner.add_edge(from, to, ());
            }
        }

        tracing::debug!(
            "Built dependency index: {} vertices, {} edges",
            inner.node_count(),
            inner.edge_count()
        );
        DependencyIndex { inner, index_of }
    }

    /// Ids that list `id` directly in their `dependency_ids`.
    pub fn dependents(&self, id: &str) -> Vec<&'a str> {
        let Some(&idx) = self.index_of.get(id) else {
            return Vec::new();
        };
        self.inner
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.inner[n])
            .collect()
    }

    /// Every node that depends on a seed, directly or transitively.
    ///
    /// Seeds are only part of the result when one of them is reachable from
    /// another (or from itself through a cycle). Unknown seeds are ignored.
    pub fn downstream_closure<I, S>(&self, seeds: I) -> HashSet<&'a str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut frontier: VecDeque<NodeIndex> = VecDeque::new();

        for seed in seeds {
            if let Some(&idx) = self.index_of.get(seed.as_ref()) {
                self.push_dependents(idx, &mut visited, &mut frontier);
            }
        }

        while let Some(current) = frontier.pop_front() {
            self.push_dependents(current, &mut visited, &mut frontier);
        }

        visited.into_iter().map(|idx| self.inner[idx]).collect()
    }

    fn push_dependents(
        &self,
        idx: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        frontier: &mut VecDeque<NodeIndex>,
    ) {
        for dependent in self.inner.neighbors_directed(idx, Direction::Incoming) {
            if visited.insert(dependent) {
                frontier.push_back(dependent);
            }
        }
    }

    /// Number of vertices, placeholders included.
    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }
}
