//! Integration tests for dbtlist
//!
//! These drive the compiled binary against manifests written to a temp dir.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn node(resource_type: &str, checksum: &str, deps: &[&str], tags: &[&str], fqn: &[&str]) -> Value {
    json!({
        "resource_type": resource_type,
        "package_name": fqn.first().copied().unwrap_or("jaffle_shop"),
        "checksum": { "name": "sha256", "checksum": checksum },
        "raw_code": "select 1",
        "depends_on": { "macros": [], "nodes": deps },
        "tags": tags,
        "fqn": fqn,
    })
}

fn jaffle_shop(orders_checksum: &str) -> Value {
    json!({
        "metadata": { "dbt_version": "1.5.0", "project_name": "jaffle_shop" },
        "nodes": {
            "seed.jaffle_shop.raw_orders": node("seed", "s1", &[], &[], &["jaffle_shop", "raw_orders"]),
            "model.jaffle_shop.stg_orders": node("model", orders_checksum, &["seed.jaffle_shop.raw_orders"], &["staging"], &["jaffle_shop", "staging", "stg_orders"]),
            "model.jaffle_shop.stg_customers": node("model", "c1", &[], &["staging"], &["jaffle_shop", "staging", "stg_customers"]),
            "model.jaffle_shop.orders": node("model", "o1", &["model.jaffle_shop.stg_orders"], &["marts"], &["jaffle_shop", "orders"]),
            "model.jaffle_shop.customers": node("model", "cu1", &["model.jaffle_shop.stg_orders", "model.jaffle_shop.stg_customers"], &["marts"], &["jaffle_shop", "customers"]),
            "test.jaffle_shop.unique_orders_order_id.fed123": node("test", "t1", &["model.jaffle_shop.orders"], &[], &["jaffle_shop", "unique_orders_order_id"]),
            "model.dbt_utils.date_spine": node("model", "u1", &[], &[], &["dbt_utils", "date_spine"])
        },
        "sources": {},
        "macros": {}
    })
}

struct Project {
    dir: TempDir,
    old: PathBuf,
    new: PathBuf,
}

fn project() -> Project {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("old.json");
    let new = dir.path().join("new.json");
    std::fs::write(&old, jaffle_shop("m1").to_string()).unwrap();
    std::fs::write(&new, jaffle_shop("m2").to_string()).unwrap();
    Project { dir, old, new }
}

fn dbtlist(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dbtlist"))
        .args(args)
        .current_dir(cwd)
        .env_remove("DBTLIST_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dbtlist")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "dbtlist failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_help_mentions_subcommands() {
    let p = project();
    let out = stdout(&dbtlist(p.dir.path(), &["--help"]));
    assert!(out.contains("list"));
    assert!(out.contains("diff"));
}

#[test]
fn test_state_modified_plus() {
    let p = project();
    let out = stdout(&dbtlist(
        p.dir.path(),
        &["list", "-s", "state:modified+", "--state", p.old.to_str().unwrap(), p.new.to_str().unwrap()],
    ));
    assert_eq!(
        out,
        "jaffle_shop.customers\njaffle_shop.orders\njaffle_shop.staging.stg_orders\njaffle_shop.unique_orders_order_id\n"
    );
}

#[test]
fn test_tag_with_exclude_and_unique_ids() {
    let p = project();
    let out = stdout(&dbtlist(
        p.dir.path(),
        &[
            "list",
            "--select",
            "stg_orders+",
            "--exclude",
            "resource_type:test",
            "--output",
            "unique_id",
            p.new.to_str().unwrap(),
        ],
    ));
    assert_eq!(
        out,
        "model.jaffle_shop.customers\nmodel.jaffle_shop.orders\nmodel.jaffle_shop.stg_orders\n"
    );
}

#[test]
fn test_packages_filter() {
    let p = project();
    let out = stdout(&dbtlist(
        p.dir.path(),
        &["list", "--packages", "dbt_utils, ", "-o", "unique_id", p.new.to_str().unwrap()],
    ));
    assert_eq!(out, "model.dbt_utils.date_spine\n");

    // An empty list is no filter at all.
    let all = stdout(&dbtlist(p.dir.path(), &["list", "--packages", " ,", p.new.to_str().unwrap()]));
    assert_eq!(all.lines().count(), 7);
}

#[test]
fn test_state_selector_without_baseline_exits_nonzero() {
    let p = project();
    let output = dbtlist(p.dir.path(), &["list", "-s", "state:modified", p.new.to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("requires a baseline manifest"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_file_defaults() {
    let p = project();
    std::fs::write(
        p.dir.path().join("dbtlist.toml"),
        "[defaults]\nselect = \"tag:staging\"\noutput = \"unique_id\"\n",
    )
    .unwrap();

    let out = stdout(&dbtlist(p.dir.path(), &["list", p.new.to_str().unwrap()]));
    assert_eq!(out, "model.jaffle_shop.stg_customers\nmodel.jaffle_shop.stg_orders\n");

    // Flags override file values.
    let out = stdout(&dbtlist(
        p.dir.path(),
        &["list", "-s", "resource_type:seed", p.new.to_str().unwrap()],
    ));
    assert_eq!(out, "seed.jaffle_shop.raw_orders\n");
}

#[test]
fn test_diff_command() {
    let p = project();
    let out = stdout(&dbtlist(
        p.dir.path(),
        &["diff", p.old.to_str().unwrap(), p.new.to_str().unwrap()],
    ));
    assert_eq!(out, "~ model.jaffle_shop.stg_orders\n");

    let same = stdout(&dbtlist(
        p.dir.path(),
        &["diff", "--json", p.new.to_str().unwrap(), p.new.to_str().unwrap()],
    ));
    let value: Value = serde_json::from_str(&same).unwrap();
    assert_eq!(value, json!({ "added": [], "removed": [], "modified": [] }));
}

#[test]
fn test_missing_manifest_reports_path() {
    let p = project();
    let output = dbtlist(p.dir.path(), &["list", "does-not-exist.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.json"));
}
