//! Rendering of selected nodes for stdout

use clap::ValueEnum;
use dbtlist_core::{GraphSnapshot, Selection, StateDiff};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `dbt list` style dotted name
    #[default]
    Selector,
    /// The node's unique id
    #[value(name = "unique_id")]
    UniqueId,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    unique_id: &'a str,
    name: &'a str,
    resource_type: &'a str,
    package_name: &'a str,
    tags: Vec<&'a str>,
}

/// Write one line per selected node, in unique-id order.
pub fn write_selection<W: Write>(
    out: &mut W,
    snapshot: &GraphSnapshot,
    selection: &Selection,
    format: OutputFormat,
) -> anyhow::Result<()> {
    for id in selection {
        let Some(node) = snapshot.node(id) else {
            tracing::warn!("Selected id {} missing from manifest", id);
            continue;
        };
        match format {
            OutputFormat::Selector => writeln!(out, "{}", node.display_name())?,
            OutputFormat::UniqueId => writeln!(out, "{}", node.id)?,
            OutputFormat::Json => {
                let record = JsonNode {
                    unique_id: &node.id,
                    name: &node.name,
                    resource_type: &node.resource_type,
                    package_name: &node.package_name,
                    tags: node.tags.iter().map(String::as_str).collect(),
                };
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
        }
    }
    Ok(())
}

/// Write a diff either as pretty JSON or as `+`/`-`/`~` prefixed lines.
pub fn write_diff<W: Write>(out: &mut W, diff: &StateDiff, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(diff)?)?;
        return Ok(());
    }
    for id in &diff.added {
        writeln!(out, "+ {id}")?;
    }
    for id in &diff.removed {
        writeln!(out, "- {id}")?;
    }
    for id in diff.modified.difference(&diff.added) {
        writeln!(out, "~ {id}")?;
    }
    Ok(())
}
