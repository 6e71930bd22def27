//! Immutable id → node map captured at one point in time

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::LoadError;
use crate::model::Node;

/// All nodes of one manifest, keyed by id. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    nodes: BTreeMap<String, Node>,
}

impl GraphSnapshot {
    /// Build a snapshot keyed by each node's own id.
    ///
    /// Two nodes sharing an id is a load error.
    pub fn from_nodes<I>(nodes: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut map = BTreeMap::new();
        for node in nodes {
            match map.entry(node.id.clone()) {
                Entry::Occupied(entry) => {
                    return Err(LoadError::DuplicateNode(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(node);
                }
            }
        }
        Ok(GraphSnapshot { nodes: map })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate over all ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Total number of declared dependency edges, including edges to ids
    /// outside the snapshot.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.dependency_ids.len()).sum()
    }

    /// Distinct package names, sorted.
    pub fn package_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.values().map(|n| n.package_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }
}
