//! Selector expressions and their evaluation against a snapshot
//!
//! Supported forms, tried in this order:
//!
//! 1. anything containing `state:modified` (`state:modified+` adds downstream)
//! 2. `resource_type:<value>`
//! 3. `tag:<value>`
//! 4. anything else containing `+`: strip every `+`, evaluate the rest with
//!    rules 2–5, then add its downstream closure
//! 5. plain substring match on the node's local name
//!
//! Routing for rule 1 is a substring test, so `state:modified_at_path`
//! is a state selector too.

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashSet};

use crate::diff::ChangeDetector;
use crate::error::SelectError;
use crate::graph::DependencyIndex;
use crate::model::{KNOWN_RESOURCE_TYPES, Node};
use crate::snapshot::GraphSnapshot;

pub const STATE_MODIFIED: &str = "state:modified";
pub const STATE_MODIFIED_PLUS: &str = "state:modified+";
pub const RESOURCE_TYPE_PREFIX: &str = "resource_type:";
pub const TAG_PREFIX: &str = "tag:";
pub const DOWNSTREAM_MARKER: char = '+';

/// The engine's output: selected node ids, sorted.
pub type Selection = BTreeSet<String>;

/// Parsed form of one selector expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorExpr {
    /// Nodes changed relative to the baseline, optionally with everything downstream.
    StateModified { downstream: bool },
    ResourceType(String),
    Tag(String),
    /// The base expression's result plus its downstream closure.
    Downstream(Box<SelectorExpr>),
    /// Substring of the node's local name.
    Name(String),
}

impl SelectorExpr {
    /// Parse an expression. Never fails: unrecognized text is a name match.
    pub fn parse(expr: &str) -> Self {
        if expr.contains(STATE_MODIFIED) {
            return SelectorExpr::StateModified {
                downstream: expr.contains(STATE_MODIFIED_PLUS),
            };
        }
        Self::parse_typed(expr)
    }

    fn parse_typed(expr: &str) -> Self {
        if let Some(value) = expr.strip_prefix(RESOURCE_TYPE_PREFIX) {
            SelectorExpr::ResourceType(value.to_string())
        } else if let Some(value) = expr.strip_prefix(TAG_PREFIX) {
            SelectorExpr::Tag(value.to_string())
        } else if expr.contains(DOWNSTREAM_MARKER) {
            let base = expr.replace(DOWNSTREAM_MARKER, "");
            SelectorExpr::Downstream(Box::new(Self::parse_typed(&base)))
        } else {
            SelectorExpr::Name(expr.to_string())
        }
    }

    /// True if evaluating this expression needs a baseline snapshot.
    pub fn requires_baseline(&self) -> bool {
        match self {
            SelectorExpr::StateModified { .. } => true,
            SelectorExpr::Downstream(base) => base.requires_baseline(),
            _ => false,
        }
    }
}

/// Package names a selection is restricted to. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFilter {
    packages: BTreeSet<String>,
}

impl PackageFilter {
    /// Returns `None` for an empty list: an empty filter means "no filter",
    /// not "select nothing".
    pub fn new<I, S>(packages: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let packages: BTreeSet<String> = packages.into_iter().map(Into::into).collect();
        if packages.is_empty() {
            None
        } else {
            Some(PackageFilter { packages })
        }
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }
}

/// Evaluates selector, exclude and package constraints over one snapshot.
///
/// The dependency index is built on first use of a downstream selector and
/// reused by later calls.
pub struct SelectorEngine<'a> {
    snapshot: &'a GraphSnapshot,
    detector: Option<ChangeDetector<'a>>,
    index: OnceCell<DependencyIndex<'a>>,
}

impl std::fmt::Debug for SelectorEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorEngine")
            .field("node_count", &self.snapshot.node_count())
            .field("has_baseline", &self.detector.is_some())
            .field("index_built", &self.index.get().is_some())
            .finish()
    }
}

impl<'a> SelectorEngine<'a> {
    /// A detector whose current side is not `snapshot` is rebound to it.
    pub fn new(snapshot: &'a GraphSnapshot, detector: Option<ChangeDetector<'a>>) -> Self {
        let detector = detector.map(|d| {
            if std::ptr::eq(d.current(), snapshot) {
                d
            } else {
                tracing::debug!("Rebinding change detector to the target snapshot");
                ChangeDetector::new(d.baseline(), snapshot)
            }
        });
        SelectorEngine {
            snapshot,
            detector,
            index: OnceCell::new(),
        }
    }

    /// Engine over the detector's current snapshot, with state selectors enabled.
    pub fn with_baseline(detector: ChangeDetector<'a>) -> Self {
        Self::new(detector.current(), Some(detector))
    }

    pub fn snapshot(&self) -> &'a GraphSnapshot {
        self.snapshot
    }

    /// Evaluate a selection.
    ///
    /// Base selection is every node when `select_expr` is absent or empty.
    /// The exclude result is then subtracted and the package filter, if any,
    /// intersected. Expressions are used exactly as given.
    pub fn select(
        &self,
        select_expr: Option<&str>,
        exclude_expr: Option<&str>,
        packages: Option<&PackageFilter>,
    ) -> Result<Selection, SelectError> {
        let select = non_empty(select_expr).map(|raw| (raw, SelectorExpr::parse(raw)));
        let exclude = non_empty(exclude_expr).map(|raw| (raw, SelectorExpr::parse(raw)));
        for (raw, parsed) in select.iter().chain(exclude.iter()) {
            self.check_baseline(parsed, raw)?;
        }

        let mut selected: HashSet<&'a str> = match &select {
            Some((raw, parsed)) => self.evaluate(parsed, raw)?,
            None => self.snapshot.ids().collect(),
        };

        if let Some((raw, parsed)) = &exclude {
            let excluded = self.evaluate(parsed, raw)?;
            selected.retain(|id| !excluded.contains(id));
        }

        if let Some(filter) = packages {
            self.warn_unknown_packages(filter);
            let snapshot = self.snapshot;
            selected.retain(|id| {
                snapshot
                    .node(id)
                    .is_some_and(|node| filter.contains(&node.package_name))
            });
        }

        tracing::info!("Selected {} of {} nodes", selected.len(), self.snapshot.node_count());
        Ok(selected.into_iter().map(str::to_owned).collect())
    }

    /// Evaluate a single expression string.
    pub fn evaluate_str(&self, expr: &str) -> Result<HashSet<&'a str>, SelectError> {
        let parsed = SelectorExpr::parse(expr);
        tracing::debug!("Selector `{}` parsed as {:?}", expr, parsed);
        self.evaluate(&parsed, expr)
    }

    /// Evaluate a parsed expression. `source` is only used in error messages.
    pub fn evaluate(&self, expr: &SelectorExpr, source: &str) -> Result<HashSet<&'a str>, SelectError> {
        let ids = match expr {
            SelectorExpr::StateModified { downstream } => {
                let detector = self.detector.as_ref().ok_or_else(|| SelectError::MissingBaseline {
                    expression: source.to_string(),
                })?;
                let modified = detector.modified();
                let mut ids: HashSet<&'a str> = modified.iter().copied().collect();
                if *downstream {
                    ids.extend(self.index().downstream_closure(&modified));
                }
                ids
            }
            SelectorExpr::ResourceType(resource_type) => {
                let ids = self.matching(|node| node.resource_type == *resource_type);
                if ids.is_empty() && !KNOWN_RESOURCE_TYPES.contains(&resource_type.as_str()) {
                    tracing::warn!("No nodes have resource type `{}`", resource_type);
                }
                ids
            }
            SelectorExpr::Tag(tag) => self.matching(|node| node.has_tag(tag)),
            SelectorExpr::Downstream(base) => {
                let mut ids = self.evaluate(base, source)?;
                let downstream = self.index().downstream_closure(&ids);
                ids.extend(downstream);
                ids
            }
            SelectorExpr::Name(fragment) => {
                self.matching(|node| node.local_name().contains(fragment.as_str()))
            }
        };
        tracing::debug!("{:?} matched {} nodes", expr, ids.len());
        Ok(ids)
    }

    fn check_baseline(&self, expr: &SelectorExpr, source: &str) -> Result<(), SelectError> {
        if expr.requires_baseline() && self.detector.is_none() {
            return Err(SelectError::MissingBaseline {
                expression: source.to_string(),
            });
        }
        Ok(())
    }

    fn matching<F>(&self, predicate: F) -> HashSet<&'a str>
    where
        F: Fn(&Node) -> bool,
    {
        self.snapshot
            .nodes()
            .filter(|node| predicate(*node))
            .map(|node| node.id.as_str())
            .collect()
    }

    fn index(&self) -> &DependencyIndex<'a> {
        self.index.get_or_init(|| DependencyIndex::build(self.snapshot))
    }

    fn warn_unknown_packages(&self, filter: &PackageFilter) {
        let known = self.snapshot.package_names();
        for package in filter.iter() {
            if !known.contains(&package) {
                tracing::warn!("Package `{}` does not appear in the manifest", package);
            }
        }
    }
}

fn non_empty(expr: Option<&str>) -> Option<&str> {
    expr.filter(|e| !e.is_empty())
}
