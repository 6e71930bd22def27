//! Core data structures for the dependency graph

use std::collections::BTreeSet;

/// Resource types a manifest commonly carries. The set is open: any other
/// string is a valid `resource_type` and is matched by exact equality.
pub const KNOWN_RESOURCE_TYPES: &[&str] = &[
    "model",
    "test",
    "seed",
    "snapshot",
    "source",
    "analysis",
    "operation",
];

/// One unit in the dependency graph (model, test, seed, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Globally unique identifier, e.g. `model.jaffle_shop.customers`.
    pub id: String,
    /// Human-readable name. Not used for selection.
    pub name: String,
    pub package_name: String,
    pub resource_type: String,
    pub tags: BTreeSet<String>,
    /// Opaque content hash.
    pub content_fingerprint: String,
    pub raw_source: String,
    /// Ids this node directly depends on. May name nodes outside the snapshot.
    pub dependency_ids: BTreeSet<String>,
    /// Fully qualified name path, used for display only.
    pub fqn: Vec<String>,
}

impl Node {
    /// Create a node with empty content and no dependencies.
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let name = local_name_of(&id).to_string();
        Node {
            id,
            name,
            package_name: package_name.into(),
            resource_type: resource_type.into(),
            tags: BTreeSet::new(),
            content_fingerprint: String::new(),
            raw_source: String::new(),
            dependency_ids: BTreeSet::new(),
            fqn: Vec::new(),
        }
    }

    /// Last `.`-separated segment of the id.
    pub fn local_name(&self) -> &str {
        local_name_of(&self.id)
    }

    /// True iff fingerprint and raw source both match.
    pub fn content_eq(&self, other: &Node) -> bool {
        self.content_fingerprint == other.content_fingerprint
            && self.raw_source == other.raw_source
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Name in the `dbt list` style: the fqn joined by `.`.
    ///
    /// Without an fqn, falls back to the id minus its resource-type prefix
    /// when the id has at least three segments.
    pub fn display_name(&self) -> String {
        if !self.fqn.is_empty() {
            return self.fqn.join(".");
        }
        let parts: Vec<&str> = self.id.split('.').collect();
        if parts.len() >= 3 {
            parts[1..].join(".")
        } else {
            self.id.clone()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_ids = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, fingerprint: impl Into<String>, raw_source: impl Into<String>) -> Self {
        self.content_fingerprint = fingerprint.into();
        self.raw_source = raw_source.into();
        self
    }

    pub fn with_fqn<I, S>(mut self, fqn: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fqn = fqn.into_iter().map(Into::into).collect();
        self
    }
}

fn local_name_of(id: &str) -> &str {
    id.rsplit('.').next().unwrap_or(id)
}
