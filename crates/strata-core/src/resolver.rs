//! # Resolver Module
//!
//! Linearizes a profile's ancestry into a base-first inheritance chain.
//!
//! Resolution is an iterative parent walk. The names on the current walk are
//! kept both in order (for the error path) and in a set (for the repeat
//! check). Since every profile has at most one parent the walk is a single
//! line: the only failure modes are a repeat (cycle) or a dangling parent.

use crate::config::ConfigDocument;
use crate::error::{Result, StrataError};
use crate::profile::ProfileGraph;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Ordered, duplicate-free profile names from the final ancestor to the
/// requested profile.
///
/// Never empty: a base profile resolves to a chain of itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceChain {
    profiles: Vec<String>,
}

impl InheritanceChain {
    /// Profile names, base first.
    #[must_use]
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    /// The most-base profile.
    #[must_use]
    pub fn base(&self) -> &str {
        self.profiles.first().map_or("", String::as_str)
    }

    /// The originally requested profile.
    #[must_use]
    pub fn requested(&self) -> &str {
        self.profiles.last().map_or("", String::as_str)
    }

    /// Number of profiles in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate base first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(String::as_str)
    }
}

impl fmt::Display for InheritanceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.profiles.join(" -> "))
    }
}

/// Resolve `requested` against `graph`.
///
/// Errors:
/// - `ProfileNotFound` when `requested` or any ancestor has no profile.
/// - `CycleDetected` when the walk revisits a name; the carried path runs
///   from the repeated name back to itself (`a -> b -> a`, or `a -> a` for a
///   self-reference).
/// - `ConfigParse` when a profile on the walk has a malformed profile config.
///   Profiles off the walk are never read.
pub fn resolve(graph: &ProfileGraph, requested: &str) -> Result<InheritanceChain> {
    if !graph.contains(requested) {
        return Err(StrataError::ProfileNotFound {
            name: requested.to_string(),
        });
    }

    let mut walk: Vec<String> = Vec::new();
    let mut on_walk: BTreeSet<String> = BTreeSet::new();
    let mut current = requested.to_string();

    loop {
        if on_walk.contains(&current) {
            let start = walk.iter().position(|n| *n == current).unwrap_or(0);
            let mut path = walk.split_off(start);
            path.push(current);
            return Err(StrataError::CycleDetected { path });
        }

        on_walk.insert(current.clone());
        walk.push(current.clone());

        let Some(parent) = graph.parent_of(&current)? else {
            break;
        };
        if !graph.contains(&parent) {
            return Err(StrataError::ProfileNotFound { name: parent });
        }
        debug!(profile = %current, parent = %parent, "following inheritance");
        current = parent;
    }

    walk.reverse();
    Ok(InheritanceChain { profiles: walk })
}

/// Discover the profiles under `profile_root` and resolve `requested`.
pub fn resolve_from_disk(
    profile_root: &Path,
    shared: &ConfigDocument,
    requested: &str,
) -> Result<InheritanceChain> {
    let graph = ProfileGraph::discover(profile_root, shared)?;
    resolve(&graph, requested)
}

// =============================================================================
// TESTS
// =============================================================================
