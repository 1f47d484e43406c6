//! # Strata Core
//!
//! The profile engine behind `strata install`.
//!
//! An install runs three stages strictly in order:
//!
//! ```text
//! ┌──────────────┐  chain   ┌──────────────┐  tree + provenance  ┌──────────────┐
//! │   Resolver   │ ───────► │    Merger    │ ──────────────────► │    Index     │
//! │ (resolver.rs)│          │ (merger.rs)  │                     │  (index.rs)  │
//! └──────────────┘          └──────────────┘                     └──────────────┘
//! ```
//!
//! The resolver never touches the destination, so a broken profile graph
//! (cycle or dangling parent) is reported before a single file is written.
//!
//! All maps that reach output use `BTreeMap` so repeated runs over the same
//! inputs produce byte-identical results.

pub mod config;
pub mod error;
pub mod index;
pub mod merger;
pub mod profile;
pub mod resolver;

pub use config::ConfigDocument;
pub use error::{Result, StrataError};
pub use index::{
    IndexDocument, IndexEntry, Listing, Reconciliation, reconcile, reconcile_listing,
    scan_destination,
};
pub use merger::{MergeSummary, Merger, ProvenanceRecord};
pub use profile::{ParentRef, Profile, ProfileGraph};
pub use resolver::{InheritanceChain, resolve, resolve_from_disk};

// =============================================================================
// RESERVED NAMES
// =============================================================================

/// Directory holding one subdirectory per profile, under the base directory.
pub const PROFILES_DIR: &str = "profiles";

/// Shared configuration document, under the base directory.
pub const SHARED_CONFIG_FILE: &str = "config.yml";

/// Optional per-profile configuration document, inside a profile directory.
pub const PROFILE_CONFIG_FILE: &str = "profile-config.yml";

/// Key naming a profile's parent.
pub const INHERITS_FROM_KEY: &str = "inherits_from";

/// Asset subtree merged from each profile.
pub const STANDARDS_DIR: &str = "standards";

/// Backup/archive segment. Never installed, never indexed.
pub const BACKUP_DIR: &str = "_backup";

/// File name of the index document inside the destination root.
pub const INDEX_FILE: &str = "index.yml";

/// Group name for files sitting directly in the destination root.
pub const ROOT_GROUP: &str = "root";

/// Description given to index entries nobody has written yet.
pub const PLACEHOLDER_DESCRIPTION: &str = "Needs description - run /index-standards";
