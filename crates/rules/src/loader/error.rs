//! Error types and per-file load results for the SVDS loader.

use std::path::PathBuf;

use crate::repository::RuleError;

/// Errors that abort a load operation.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The path does not carry the `.json` extension.
    #[error("{} is not a JSON file", .0.display())]
    Format(PathBuf),

    /// The path is neither a file nor a directory.
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem I/O error.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error.
    #[error("JSON parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A rule document is missing or malformed.
    #[error(transparent)]
    Rules(#[from] RuleError),

    /// A software export does not have a single root key.
    #[error("{} is not a software export: {reason}", .path.display())]
    Export { path: PathBuf, reason: String },
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Outcome of loading a single file from an SVDS directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Path to the file that was read.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// File was validated and merged under `family.class`.
    Loaded { family: String, class: String },
    /// File failed validation and was left out of the tree.
    Rejected { reasons: Vec<String> },
    /// File could not be read or parsed.
    Unreadable { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}
