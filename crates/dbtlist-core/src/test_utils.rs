//! Test utilities for dbtlist-core

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::model::Node;
use crate::snapshot::GraphSnapshot;

/// A model node in package `jaffle_shop` with the given fingerprint and deps.
pub fn model(id: &str, fingerprint: &str, deps: &[&str]) -> Node {
    Node::new(id, "model", "jaffle_shop")
        .with_content(fingerprint, format!("-- {id}"))
        .with_dependencies(deps.iter().copied())
}

pub fn snapshot(nodes: Vec<Node>) -> GraphSnapshot {
    GraphSnapshot::from_nodes(nodes).unwrap()
}

/// A versioned chain `A ← B ← C` where only A's fingerprint depends on `version`.
pub fn abc_chain(version: &str) -> GraphSnapshot {
    snapshot(vec![
        model("model.jaffle_shop.a", version, &[]),
        model("model.jaffle_shop.b", "hb", &["model.jaffle_shop.a"]),
        model("model.jaffle_shop.c", "hc", &["model.jaffle_shop.b"]),
    ])
}

/// A small jaffle-shop style project: seeds, staging models, marts, tests
/// and one node from a second package.
pub fn jaffle_shop() -> GraphSnapshot {
    snapshot(vec![
        Node::new("seed.jaffle_shop.raw_orders", "seed", "jaffle_shop").with_content("s1", "csv"),
        Node::new("seed.jaffle_shop.raw_customers", "seed", "jaffle_shop").with_content("s2", "csv"),
        model("model.jaffle_shop.stg_orders", "m1", &["seed.jaffle_shop.raw_orders"])
            .with_tags(["staging"]),
        model("model.jaffle_shop.stg_customers", "m2", &["seed.jaffle_shop.raw_customers"])
            .with_tags(["staging", "pii"]),
        model(
            "model.jaffle_shop.customers",
            "m3",
            &["model.jaffle_shop.stg_orders", "model.jaffle_shop.stg_customers"],
        )
        .with_tags(["marts"]),
        model("model.jaffle_shop.orders", "m4", &["model.jaffle_shop.stg_orders"]).with_tags(["marts"]),
        Node::new("test.jaffle_shop.unique_customers_customer_id.c5af1ff4b1", "test", "jaffle_shop")
            .with_content("t1", "select 1")
            .with_dependencies(["model.jaffle_shop.customers"]),
        Node::new("test.jaffle_shop.not_null_orders_order_id.a1b2c3d4e5", "test", "jaffle_shop")
            .with_content("t2", "select 1")
            .with_dependencies(["model.jaffle_shop.orders"]),
        Node::new("model.dbt_utils.date_spine", "model", "dbt_utils").with_content("u1", "select 1"),
    ])
}

/// Render nodes as a minimal dbt manifest document.
pub fn manifest_json(nodes: &[Node]) -> Value {
    let entries: serde_json::Map<String, Value> = nodes
        .iter()
        .map(|node| {
            let entry = json!({
                "unique_id": node.id,
                "name": node.name,
                "resource_type": node.resource_type,
                "package_name": node.package_name,
                "tags": node.tags,
                "checksum": { "name": "sha256", "checksum": node.content_fingerprint },
                "raw_code": node.raw_source,
                "depends_on": { "macros": [], "nodes": node.dependency_ids },
                "fqn": node.fqn,
            });
            (node.id.clone(), entry)
        })
        .collect();
    json!({ "metadata": { "dbt_version": "1.5.0" }, "nodes": entries })
}

/// Write a manifest into a fresh temporary directory.
pub fn write_manifest(nodes: &[Node]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(&path, manifest_json(nodes).to_string()).unwrap();
    (dir, path)
}
