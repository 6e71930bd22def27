//! CLI command implementations

use anyhow::Context;
use dbtlist_core::{ChangeDetector, PackageFilter, SelectorEngine, load_manifest};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::{self, OutputFormat};

/// Resolved arguments for `list`, after config defaults are applied.
#[derive(Debug, Clone)]
pub struct ListArgs {
    pub select: Option<String>,
    pub exclude: Option<String>,
    pub packages: Vec<String>,
    pub state: Option<PathBuf>,
    pub output: OutputFormat,
    pub manifest: PathBuf,
}

pub fn list<W: Write>(args: ListArgs, out: &mut W) -> anyhow::Result<()> {
    let select = trimmed(args.select.as_deref());
    let exclude = trimmed(args.exclude.as_deref());
    let current = load(&args.manifest)?;
    let baseline = args.state.as_deref().map(load).transpose()?;

    let detector = baseline.as_ref().map(|old| ChangeDetector::new(old, &current));
    let engine = SelectorEngine::new(&current, detector);
    let packages = PackageFilter::new(args.packages);

    tracing::debug!(
        "Selecting with select={:?} exclude={:?} packages={:?}",
        select,
        exclude,
        packages
    );
    let selection = engine.select(select, exclude, packages.as_ref())?;

    output::write_selection(out, &current, &selection, args.output)
}

pub fn diff<W: Write>(old: &Path, new: &Path, json: bool, out: &mut W) -> anyhow::Result<()> {
    let old_snapshot = load(old)?;
    let new_snapshot = load(new)?;

    let diff = ChangeDetector::new(&old_snapshot, &new_snapshot).summary();
    tracing::info!(
        "{} added, {} removed, {} modified",
        diff.added.len(),
        diff.removed.len(),
        diff.modified.len()
    );
    output::write_diff(out, &diff, json)
}

/// Shell input may carry stray whitespace; a blank expression means no selector.
fn trimmed(expr: Option<&str>) -> Option<&str> {
    expr.map(str::trim).filter(|e| !e.is_empty())
}

fn load(path: &Path) -> anyhow::Result<dbtlist_core::GraphSnapshot> {
    load_manifest(path).with_context(|| format!("could not load manifest {}", path.display()))
}
