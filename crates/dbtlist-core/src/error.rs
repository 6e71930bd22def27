//! Error types for loading snapshots and evaluating selectors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while evaluating a selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// A `state:` selector was used but no baseline snapshot was supplied.
    #[error("selector `{expression}` requires a baseline manifest to compare against")]
    MissingBaseline { expression: String },
}

/// Errors raised while loading a manifest into a snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest key `{key}` does not match node unique_id `{unique_id}`")]
    IdMismatch { key: String, unique_id: String },
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
}
