//! # Profile Module
//!
//! Profiles and the inheritance graph between them.
//!
//! The graph maps each name to its profile and parent reference. Each
//! profile has at most one parent, so the relation is a forest of simple
//! chains: cycles and dangling parents are possible, diamonds are not.

use crate::config::ConfigDocument;
use crate::error::{Result, StrataError};
use crate::{INHERITS_FROM_KEY, PROFILE_CONFIG_FILE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shared config section holding per-profile settings.
const PROFILES_KEY: &str = "profiles";

/// Where a profile's parent comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Known up front, from the shared config or an in-memory graph.
    Declared(Option<String>),
    /// `inherits_from` in this config file, read on demand.
    ProfileConfig(PathBuf),
}

/// A named collection of assets, possibly inheriting from a parent.
///
/// Profiles are read-only inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Unique within the profile root.
    pub name: String,
    /// The profile's directory.
    pub path: PathBuf,
    /// Parent declaration.
    pub parent: ParentRef,
}

impl Profile {
    /// Create a profile with a known parent. `None` marks a base profile.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        extends: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent: ParentRef::Declared(extends),
        }
    }

    /// Create a profile whose parent lives in its own `profile-config.yml`.
    #[must_use]
    pub fn from_dir(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = path.join(PROFILE_CONFIG_FILE);
        Self {
            name: name.into(),
            path,
            parent: ParentRef::ProfileConfig(config),
        }
    }

    /// The parent profile name, reading the profile config if needed.
    ///
    /// A missing profile config means a base profile; a malformed one is
    /// `ConfigParse`.
    pub fn extends(&self) -> Result<Option<String>> {
        match &self.parent {
            ParentRef::Declared(parent) => Ok(parent.clone()),
            ParentRef::ProfileConfig(config) => {
                let own = ConfigDocument::load(config)?;
                Ok(own.read_scalar(INHERITS_FROM_KEY))
            }
        }
    }
}

/// All profiles under a profile root, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ProfileGraph {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph in memory from `(name, parent)` pairs.
    ///
    /// Profile paths are left empty.
    #[must_use]
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut graph = Self::new();
        for (name, parent) in edges {
            graph.insert(Profile::new(name, PathBuf::new(), parent.map(str::to_string)));
        }
        graph
    }

    /// Discover every profile directory under `profile_root`.
    ///
    /// A profile's parent comes from `profiles.<name>.inherits_from` in the
    /// shared config, or failing that from `inherits_from` in the profile's
    /// own `profile-config.yml`. Profile configs are not opened here: they
    /// are read when [`ProfileGraph::parent_of`] asks for that profile, so a
    /// broken config only fails a walk that reaches it.
    pub fn discover(profile_root: &Path, shared: &ConfigDocument) -> Result<Self> {
        if !profile_root.is_dir() {
            return Err(StrataError::ProfileRootMissing {
                path: profile_root.to_path_buf(),
            });
        }

        let entries = std::fs::read_dir(profile_root).map_err(|source| StrataError::ConfigRead {
            path: profile_root.to_path_buf(),
            source,
        })?;

        let mut graph = Self::new();
        for entry in entries {
            let entry = entry.map_err(|source| StrataError::ConfigRead {
                path: profile_root.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let declared = shared.read_scalar_at(&[PROFILES_KEY, name.as_str(), INHERITS_FROM_KEY]);
            let profile = match declared {
                Some(parent) => Profile::new(name, path, Some(parent)),
                None => Profile::from_dir(name, path),
            };
            debug!(profile = %profile.name, parent = ?profile.parent, "discovered profile");
            graph.insert(profile);
        }

        Ok(graph)
    }

    /// Add or replace a profile.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Whether a profile with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Look up a profile.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// The declared parent of `name`. Unknown profiles have none.
    pub fn parent_of(&self, name: &str) -> Result<Option<String>> {
        match self.profiles.get(name) {
            Some(profile) => profile.extends(),
            None => Ok(None),
        }
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Profiles in name order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// Number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the graph has no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
