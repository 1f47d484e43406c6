//! # Merger Module
//!
//! Layered copy of each profile's asset tree into one destination.
//!
//! Profiles are applied base first, so for any relative path the most
//! derived profile that ships it is copied last and wins. Each copy is
//! recorded in the [`ProvenanceRecord`] by direct assignment, which gives
//! last-writer-wins without any bookkeeping file.
//!
//! The merge is additive: destination files no profile targets are left
//! alone. A copy failure aborts immediately and nothing is rolled back.

use crate::error::{Result, StrataError};
use crate::resolver::InheritanceChain;
use crate::{BACKUP_DIR, STANDARDS_DIR};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

// =============================================================================
// PROVENANCE
// =============================================================================

/// Destination-relative path (`/`-separated) -> profile that last wrote it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProvenanceRecord {
    entries: BTreeMap<String, String>,
}

impl ProvenanceRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provenance of `path`, replacing any earlier writer.
    pub fn record(&mut self, path: impl Into<String>, profile: impl Into<String>) {
        self.entries.insert(path.into(), profile.into());
    }

    /// The profile that supplied `path`.
    #[must_use]
    pub fn source_of(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Files each profile ended up supplying, in profile name order.
    #[must_use]
    pub fn contributors(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for profile in self.entries.values() {
            *counts.entry(profile.as_str()).or_insert(0usize) += 1;
        }
        counts
    }

    /// Number of distinct paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Distinct relative paths written.
    pub file_count: usize,
    /// Profiles that contributed at least one file (overridden or not).
    pub profiles_contributing: usize,
    /// Final writer of every path.
    pub provenance: ProvenanceRecord,
}

// =============================================================================
// MERGER
// =============================================================================

/// Copies the asset trees of an inheritance chain into a destination root.
#[derive(Debug, Clone)]
pub struct Merger {
    profile_root: PathBuf,
    destination_root: PathBuf,
    asset_dir: String,
    excluded_dir: String,
}

impl Merger {
    /// Merge `<profile_root>/<name>/standards` into `destination_root`.
    #[must_use]
    pub fn new(profile_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            profile_root: profile_root.into(),
            destination_root: destination_root.into(),
            asset_dir: STANDARDS_DIR.to_string(),
            excluded_dir: BACKUP_DIR.to_string(),
        }
    }

    /// Use a different asset subdirectory inside each profile.
    #[must_use]
    pub fn with_asset_dir(mut self, asset_dir: impl Into<String>) -> Self {
        self.asset_dir = asset_dir.into();
        self
    }

    /// Use a different reserved backup segment.
    #[must_use]
    pub fn with_excluded_dir(mut self, excluded_dir: impl Into<String>) -> Self {
        self.excluded_dir = excluded_dir.into();
        self
    }

    /// The directory assets are merged into.
    #[must_use]
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Asset source directory for a profile.
    #[must_use]
    pub fn source_dir(&self, profile: &str) -> PathBuf {
        self.profile_root.join(profile).join(&self.asset_dir)
    }

    /// Merge every profile in `chain`, base first.
    pub fn merge(&self, chain: &InheritanceChain) -> Result<MergeSummary> {
        let mut provenance = ProvenanceRecord::new();
        let mut profiles_contributing = 0usize;

        for profile in chain.iter() {
            let source = self.source_dir(profile);
            if !source.is_dir() {
                warn!(profile = %profile, "profile has no assets, skipping");
                continue;
            }

            let files = self.collect_files(&source)?;
            if files.is_empty() {
                warn!(profile = %profile, "profile has no assets, skipping");
                continue;
            }

            for relative in &files {
                let from = source.join(relative);
                let to = self.destination_root.join(relative);
                copy_file(&from, &to).map_err(|source| StrataError::CopyFailed {
                    path: relative.clone(),
                    source,
                })?;

                let key = portable_path(relative);
                debug!(profile = %profile, path = %key, "copied asset");
                provenance.record(key, profile);
            }

            profiles_contributing = profiles_contributing.saturating_add(1);
            info!(profile = %profile, files = files.len(), "merged profile");
        }

        Ok(MergeSummary {
            file_count: provenance.len(),
            profiles_contributing,
            provenance,
        })
    }

    /// Regular files under `source`, relative to it, sorted, with every
    /// reserved backup directory pruned.
    fn collect_files(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != self.excluded_dir.as_str());

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source_err| StrataError::AssetScan {
                path: source.to_path_buf(),
                source: source_err,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(source) {
                files.push(relative.to_path_buf());
            }
        }
        Ok(files)
    }
}

/// Copy one file byte for byte, creating parent directories.
fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to)?;
    Ok(())
}

/// Relative path with `/` separators regardless of platform.
fn portable_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// =============================================================================
// TESTS
// =============================================================================
