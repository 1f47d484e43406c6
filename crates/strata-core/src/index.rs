//! # Index Module
//!
//! The standards index: one description per installed `.md` file, grouped
//! by folder.
//!
//! The index is rebuilt from the current destination tree on every install,
//! never patched. Descriptions someone wrote by hand are carried forward by
//! exact `(group, key)` match; everything else gets the placeholder. Only
//! entries missing from the previous index count as new, so re-running over
//! an unchanged tree reports zero new entries.
//!
//! ## Format
//!
//! ```yaml
//! root:
//!   coding-style:
//!     description: Our style guide
//! backend:
//!   api:
//!     description: Needs description - run /index-standards
//! ```
//!
//! `root` comes first, then the other groups by name; entries by key.

use crate::error::{Result, StrataError};
use crate::{BACKUP_DIR, PLACEHOLDER_DESCRIPTION, ROOT_GROUP};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extension of indexed asset files.
const INDEXED_EXTENSION: &str = "md";

const DESCRIPTION_KEY: &str = "description";

/// Group name -> file stems present in that group.
pub type Listing = BTreeMap<String, BTreeSet<String>>;

// =============================================================================
// ENTRY + DOCUMENT
// =============================================================================

/// One indexed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Folder name, or `root` for files directly in the destination root.
    pub group: String,
    /// File name without extension.
    pub key: String,
    pub description: String,
}

impl IndexEntry {
    /// Whether the description is still the placeholder.
    #[must_use]
    pub fn needs_description(&self) -> bool {
        self.description == PLACEHOLDER_DESCRIPTION
    }
}

/// The full index: group -> key -> description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDocument {
    groups: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    description: Option<String>,
}

type RawIndex = BTreeMap<String, Option<BTreeMap<String, Option<RawEntry>>>>;

impl IndexDocument {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an index document.
    ///
    /// Entries without a description are dropped, so they count as new on
    /// the next reconciliation.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: Option<RawIndex> =
            serde_yaml::from_str(text).map_err(|source| StrataError::IndexParse { source })?;

        let mut doc = Self::new();
        for (group, entries) in raw.unwrap_or_default() {
            for (key, entry) in entries.unwrap_or_default() {
                if let Some(description) = entry.and_then(|e| e.description) {
                    doc.insert(&group, &key, description);
                }
            }
        }
        Ok(doc)
    }

    /// Load the index at `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| StrataError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map(Some)
    }

    /// Set the description of `(group, key)`.
    pub fn insert(&mut self, group: &str, key: &str, description: impl Into<String>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), description.into());
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn description(&self, group: &str, key: &str) -> Option<&str> {
        self.groups.get(group)?.get(key).map(String::as_str)
    }

    /// Group names in document order: `root` first, then by name.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        let root = self.groups.get_key_value(ROOT_GROUP).map(|(k, _)| k.as_str());
        root.into_iter().chain(
            self.groups
                .keys()
                .map(String::as_str)
                .filter(|g| *g != ROOT_GROUP),
        )
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.group_names().flat_map(move |group| {
            self.groups
                .get(group)
                .into_iter()
                .flat_map(move |entries| {
                    entries.iter().map(move |(key, description)| IndexEntry {
                        group: group.to_string(),
                        key: key.clone(),
                        description: description.clone(),
                    })
                })
        })
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the stable YAML form.
    pub fn render(&self) -> std::result::Result<String, serde_yaml::Error> {
        let mut root = Mapping::new();
        for group in self.group_names() {
            let mut members = Mapping::new();
            if let Some(entries) = self.groups.get(group) {
                for (key, description) in entries {
                    let mut body = Mapping::new();
                    body.insert(
                        Value::from(DESCRIPTION_KEY),
                        Value::from(description.as_str()),
                    );
                    members.insert(Value::from(key.as_str()), Value::Mapping(body));
                }
            }
            root.insert(Value::from(group), Value::Mapping(members));
        }
        serde_yaml::to_string(&Value::Mapping(root))
    }

    /// Write the index to `path` atomically.
    ///
    /// The text goes to a temp file beside `path` which is then renamed over
    /// it. If anything fails first the temp file is dropped and removed.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let write_failed = |source: std::io::Error| StrataError::IndexWriteFailed { source };

        let text = self
            .render()
            .map_err(|e| write_failed(std::io::Error::other(e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_failed)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
        tmp.write_all(text.as_bytes()).map_err(write_failed)?;
        tmp.flush().map_err(write_failed)?;
        tmp.persist(path).map_err(|e| write_failed(e.error))?;

        debug!(path = %path.display(), entries = self.len(), "wrote index");
        Ok(())
    }
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Result of rebuilding the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub document: IndexDocument,
    /// Entries with no counterpart in the previous index.
    pub new_entries: usize,
    /// Entries left with the placeholder, new or not.
    pub pending: usize,
}

/// List the indexable files of a destination tree.
///
/// `.md` files directly in `destination_root` go to `root`; `.md` files in an
/// immediate subdirectory go to that subdirectory's group. Deeper files,
/// hidden entries and backup directories are ignored.
pub fn scan_destination(destination_root: &Path) -> Result<Listing> {
    let mut listing = Listing::new();
    if !destination_root.is_dir() {
        return Ok(listing);
    }

    let walker = WalkDir::new(destination_root)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && name != BACKUP_DIR
        });

    for entry in walker {
        let entry = entry.map_err(|source| StrataError::AssetScan {
            path: destination_root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(INDEXED_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let group = if entry.depth() == 1 {
            ROOT_GROUP.to_string()
        } else {
            let Some(folder) = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
            else {
                continue;
            };
            folder.to_string()
        };

        listing.entry(group).or_default().insert(stem.to_string());
    }

    Ok(listing)
}

/// Rebuild the index from a listing and the previous index.
///
/// Pure: the same listing and previous index always give the same result.
#[must_use]
pub fn reconcile_listing(listing: &Listing, previous: Option<&IndexDocument>) -> Reconciliation {
    let mut document = IndexDocument::new();
    let mut new_entries = 0usize;

    for (group, keys) in listing {
        for key in keys {
            let prior = previous.and_then(|prev| prev.description(group, key));
            if prior.is_none() {
                new_entries = new_entries.saturating_add(1);
            }
            let description = prior.unwrap_or(PLACEHOLDER_DESCRIPTION);
            document.insert(group, key, description);
        }
    }

    let pending = document
        .entries()
        .filter(IndexEntry::needs_description)
        .count();

    Reconciliation {
        document,
        new_entries,
        pending,
    }
}

/// Scan `destination_root` and rebuild its index.
pub fn reconcile(
    destination_root: &Path,
    previous: Option<&IndexDocument>,
) -> Result<Reconciliation> {
    let listing = scan_destination(destination_root)?;
    let result = reconcile_listing(&listing, previous);
    info!(
        entries = result.document.len(),
        new = result.new_entries,
        pending = result.pending,
        "reconciled index"
    );
    Ok(result)
}

// =============================================================================
// TESTS
// =============================================================================
