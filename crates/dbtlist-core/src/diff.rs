//! Change detection between a baseline and a current snapshot

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::snapshot::GraphSnapshot;

/// Summary of the changes between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateDiff {
    /// Ids present only in the new snapshot.
    pub added: BTreeSet<String>,
    /// Ids present only in the old snapshot.
    pub removed: BTreeSet<String>,
    /// Ids in the new snapshot that differ from the baseline, added ones included.
    pub modified: BTreeSet<String>,
}

impl StateDiff {
    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compares a baseline (`old`) snapshot with the current (`new`) one.
///
/// Every method is a pure function of the two snapshots.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector<'a> {
    old: &'a GraphSnapshot,
    new: &'a GraphSnapshot,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(old: &'a GraphSnapshot, new: &'a GraphSnapshot) -> Self {
        ChangeDetector { old, new }
    }

    /// The snapshot this detector treats as current.
    pub fn current(&self) -> &'a GraphSnapshot {
        self.new
    }

    pub fn baseline(&self) -> &'a GraphSnapshot {
        self.old
    }

    /// Ids in `new` that are absent from `old`, or whose fingerprint or raw
    /// source differs from the baseline node.
    pub fn modified(&self) -> BTreeSet<&'a str> {
        let old = self.old;
        let modified: BTreeSet<&'a str> = self
            .new
            .as_map()
            .par_iter()
            .filter(|(id, node)| match old.node(id) {
                None => true,
                Some(before) => !before.content_eq(node),
            })
            .map(|(id, _)| id.as_str())
            .collect();
        tracing::debug!("{} modified nodes", modified.len());
        modified
    }

    /// Ids in `new` absent from `old`.
    pub fn added(&self) -> BTreeSet<&'a str> {
        let old = self.old;
        self.new.ids().filter(|id| !old.contains(id)).collect()
    }

    /// Ids in `old` absent from `new`.
    pub fn removed(&self) -> BTreeSet<&'a str> {
        let new = self.new;
        self.old.ids().filter(|id| !new.contains(id)).collect()
    }

    /// Compute all three change sets at once.
    pub fn summary(&self) -> StateDiff {
        let (modified, (added, removed)) =
            rayon::join(|| self.modified(), || (self.added(), self.removed()));
        StateDiff {
            added: to_owned_set(added),
            removed: to_owned_set(removed),
            modified: to_owned_set(modified),
        }
    }
}

fn to_owned_set(set: BTreeSet<&str>) -> BTreeSet<String> {
    set.into_iter().map(str::to_owned).collect()
}
