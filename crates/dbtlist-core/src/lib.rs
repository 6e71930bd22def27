//! dbtlist core: manifest snapshots, change detection and node selection

pub mod diff;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod model;
pub mod selector;
pub mod snapshot;


#[cfg(test)]
mod test_utils;

pub use diff::{ChangeDetector, StateDiff};
pub use error::{LoadError, SelectError};
pub use graph::DependencyIndex;
pub use manifest::{load_manifest, parse_manifest};
pub use model::Node;
pub use selector::{PackageFilter, Selection, SelectorEngine, SelectorExpr};
pub use snapshot::GraphSnapshot;
