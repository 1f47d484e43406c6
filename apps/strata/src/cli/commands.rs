//! Command asset copy.
//!
//! Commands are not layered: the base directory ships one set, copied as is
//! into the project. This is the only step `--commands-only` runs.

use super::error::{CliError, CliResult};
use std::path::Path;
use strata_core::StrataError;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Copy every regular file under `source` to the same relative path under
/// `destination`, overwriting. Returns the number of files copied.
///
/// A missing `source` copies nothing.
pub fn install_commands(source: &Path, destination: &Path) -> CliResult<usize> {
    if !source.is_dir() {
        info!(source = %source.display(), "no command assets to install");
        return Ok(0);
    }

    let mut copied = 0usize;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| StrataError::AssetScan {
            path: source.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };

        let target = destination.join(relative);
        let copy = || -> std::io::Result<()> {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            Ok(())
        };
        copy().map_err(|source| CliError::CommandCopy {
            path: relative.to_path_buf(),
            source,
        })?;

        debug!(path = %relative.display(), "copied command");
        copied = copied.saturating_add(1);
    }

    info!(count = copied, "installed commands");
    Ok(copied)
}
