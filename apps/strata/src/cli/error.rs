//! CLI error types

use std::path::PathBuf;
use strata_core::StrataError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Resolution, merge or index failure
    #[error(transparent)]
    Core(#[from] StrataError),

    /// No base directory given and no home directory to default to
    #[error("Configuration error: {0}")]
    Config(String),

    /// Copying a command asset failed
    #[error("failed to copy command {}: {source}", .path.display())]
    CommandCopy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Message shown to the user. Resolver failures get their own wording
    /// so a cycle is never mistaken for a missing profile.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(StrataError::CycleDetected { path }) => format!(
                "Circular dependency detected in profile inheritance: {}",
                path.join(" -> ")
            ),
            Self::Core(StrataError::ProfileNotFound { name }) => {
                format!("Profile not found: {name}")
            }
            other => format!("Error: {other}"),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
