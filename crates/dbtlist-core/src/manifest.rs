//! Loader for dbt `manifest.json` files
//!
//! Only the `nodes` object is read, and only the fields selection and
//! display need. Everything else in the manifest is ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::model::Node;
use crate::snapshot::GraphSnapshot;

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    nodes: BTreeMap<String, RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    unique_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    resource_type: String,
    #[serde(default)]
    package_name: String,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    checksum: Option<RawChecksum>,
    #[serde(default)]
    raw_code: Option<String>,
    /// Pre-1.3 manifests call it `raw_sql`.
    #[serde(default)]
    raw_sql: Option<String>,
    #[serde(default)]
    depends_on: Option<RawDependsOn>,
    #[serde(default)]
    fqn: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawChecksum {
    #[serde(default)]
    checksum: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependsOn {
    #[serde(default)]
    nodes: Vec<String>,
}

impl RawNode {
    fn into_node(self, key: String) -> Result<Node, LoadError> {
        let id = match self.unique_id {
            Some(unique_id) if unique_id != key => {
                return Err(LoadError::IdMismatch { key, unique_id });
            }
            _ => key,
        };

        let mut node = Node::new(id, self.resource_type, self.package_name);
        if let Some(name) = self.name {
            node.name = name;
        }
        node.tags = self.tags;
        node.content_fingerprint = self.checksum.map(|c| c.checksum).unwrap_or_default();
        node.raw_source = self.raw_code.or(self.raw_sql).unwrap_or_default();
        node.dependency_ids = self
            .depends_on
            .unwrap_or_default()
            .nodes
            .into_iter()
            .collect();
        node.fqn = self.fqn;
        Ok(node)
    }
}

/// Parse a manifest from a JSON string.
pub fn parse_manifest(json: &str) -> Result<GraphSnapshot, LoadError> {
    let raw: RawManifest = serde_json::from_str(json)?;
    let nodes = raw
        .nodes
        .into_iter()
        .map(|(key, node)| node.into_node(key))
        .collect::<Result<Vec<_>, _>>()?;
    GraphSnapshot::from_nodes(nodes)
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<GraphSnapshot, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_manifest(&json)?;
    tracing::info!(
        "Loaded {} nodes, {} edges from {}",
        snapshot.node_count(),
        snapshot.edge_count(),
        path.display()
    );
    Ok(snapshot)
}
