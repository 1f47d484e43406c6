//! # Error Module
//!
//! A single error type for every stage of an install.
//!
//! Resolution errors (`CycleDetected`, `ProfileNotFound`) are raised before
//! any filesystem mutation. `CopyFailed` aborts a merge midway and may leave
//! a partially merged tree behind. `IndexWriteFailed` happens after the merge,
//! so the assets are in place while the index is stale.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from resolving, merging or indexing profiles.
#[derive(Debug, Error)]
pub enum StrataError {
    /// The `inherits_from` relation loops back on itself.
    ///
    /// `path` starts and ends with the same profile name.
    #[error("circular dependency in profile inheritance: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// A requested or referenced profile has no directory.
    #[error("profile not found: {name}")]
    ProfileNotFound { name: String },

    /// The profile root directory itself is missing.
    #[error("profile directory not found: {}", .path.display())]
    ProfileRootMissing { path: PathBuf },

    /// Copying a single asset failed; the merge stops here.
    #[error("failed to copy {}: {source}", .path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking a profile's asset tree failed.
    #[error("failed to scan {}: {source}", .path.display())]
    AssetScan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Writing the index document failed.
    #[error("failed to write index: {source}")]
    IndexWriteFailed {
        #[source]
        source: std::io::Error,
    },

    /// The previous index document could not be parsed.
    #[error("invalid index document: {source}")]
    IndexParse {
        #[source]
        source: serde_yaml::Error,
    },

    /// A config document or index could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config document is not valid YAML.
    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StrataError {
    /// True for the two errors the resolver can return.
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. } | Self::ProfileNotFound { .. }
        )
    }
}

/// Result type for strata-core operations.
pub type Result<T> = std::result::Result<T, StrataError>;
