//! # CLI Module
//!
//! The `strata` subcommands as plain functions, so they can be driven from
//! `main.rs` and from integration tests alike.
//!
//! Install order is fixed: resolve, load the previous index, merge,
//! reconcile, write the index, copy commands. Nothing under the project
//! directory is written until resolution has succeeded.

mod commands;
mod error;
mod report;

pub use commands::install_commands;
pub use error::{CliError, CliResult};
pub use report::InstallReport;

use serde::Serialize;
use std::path::{Path, PathBuf};
use strata_core::{
    ConfigDocument, INDEX_FILE, IndexDocument, InheritanceChain, Merger, PROFILES_DIR,
    ProfileGraph, SHARED_CONFIG_FILE, STANDARDS_DIR, reconcile, resolve,
};
use tracing::{info, warn};

/// Profile used when neither `--profile` nor `default_profile` names one.
pub const FALLBACK_PROFILE: &str = "default";

/// Namespace directory for installed files inside a project.
pub const PROJECT_NAMESPACE: &str = "strata";

/// Command assets inside the base directory.
pub const COMMANDS_DIR: &str = "commands";

/// Where commands land inside a project.
pub const PROJECT_COMMANDS_DIR: &str = ".claude/commands";

// =============================================================================
// INSTALL CONTEXT
// =============================================================================

/// Base and project directories for one run, and every path derived from them.
#[derive(Debug, Clone)]
pub struct InstallContext {
    base_dir: PathBuf,
    project_dir: PathBuf,
}

impl InstallContext {
    /// Create a context.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            project_dir: project_dir.into(),
        }
    }

    /// `<base>/profiles`
    #[must_use]
    pub fn profile_root(&self) -> PathBuf {
        self.base_dir.join(PROFILES_DIR)
    }

    /// `<base>/config.yml`
    #[must_use]
    pub fn shared_config_path(&self) -> PathBuf {
        self.base_dir.join(SHARED_CONFIG_FILE)
    }

    /// `<project>/strata/standards`
    #[must_use]
    pub fn standards_destination(&self) -> PathBuf {
        self.project_dir.join(PROJECT_NAMESPACE).join(STANDARDS_DIR)
    }

    /// `<project>/strata/standards/index.yml`
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.standards_destination().join(INDEX_FILE)
    }

    /// `<base>/commands/strata`
    #[must_use]
    pub fn commands_source(&self) -> PathBuf {
        self.base_dir.join(COMMANDS_DIR).join(PROJECT_NAMESPACE)
    }

    /// `<project>/.claude/commands/strata`
    #[must_use]
    pub fn commands_destination(&self) -> PathBuf {
        self.project_dir
            .join(PROJECT_COMMANDS_DIR)
            .join(PROJECT_NAMESPACE)
    }

    /// Parse the shared config. A missing file is an empty config.
    pub fn load_shared_config(&self) -> CliResult<ConfigDocument> {
        Ok(ConfigDocument::load(&self.shared_config_path())?)
    }

    /// `requested`, else `default_profile` from the shared config, else
    /// [`FALLBACK_PROFILE`].
    #[must_use]
    pub fn select_profile(&self, requested: Option<&str>, config: &ConfigDocument) -> String {
        requested
            .map(str::to_string)
            .or_else(|| config.read_scalar("default_profile"))
            .unwrap_or_else(|| FALLBACK_PROFILE.to_string())
    }
}

/// Resolve the base directory: explicit flag/env value, else `$HOME/strata`.
pub fn default_base_dir(explicit: Option<&Path>) -> CliResult<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(PROJECT_NAMESPACE))
        .ok_or_else(|| CliError::Config("no --base-dir given and HOME is not set".to_string()))
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// INSTALL COMMAND
// =============================================================================

/// Install `profile` (or the configured default) into the project.
pub fn cmd_install(
    ctx: &InstallContext,
    profile: Option<&str>,
    commands_only: bool,
    json: bool,
) -> CliResult<InstallReport> {
    let config = ctx.load_shared_config()?;
    let profile = ctx.select_profile(profile, &config);
    let mut report = InstallReport::new(&profile, commands_only);

    if commands_only {
        info!("commands-only mode, skipping standards");
    } else {
        let graph = ProfileGraph::discover(&ctx.profile_root(), &config)?;
        let chain = resolve(&graph, &profile)?;
        info!(profile = %profile, chain = %chain, "resolved inheritance chain");

        let destination = ctx.standards_destination();
        let index_path = ctx.index_path();
        let previous = IndexDocument::load(&index_path)?;
        if destination.is_dir() {
            info!(path = %destination.display(), "updating existing installation");
        }

        let merge = Merger::new(ctx.profile_root(), &destination).merge(&chain)?;
        let reconciliation = reconcile(&destination, previous.as_ref())?;
        reconciliation.document.persist(&index_path)?;

        report.record_standards(&chain, merge, &reconciliation);
    }

    report.commands_installed =
        install_commands(&ctx.commands_source(), &ctx.commands_destination())?;

    if json {
        print_json(&report)?;
    } else {
        print!("{}", report.to_text());
    }
    Ok(report)
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

#[derive(Serialize)]
struct ChainOutput<'a> {
    profile: &'a str,
    chain: &'a [String],
}

/// Print the inheritance chain of `profile` without installing anything.
pub fn cmd_resolve(
    ctx: &InstallContext,
    profile: Option<&str>,
    json: bool,
) -> CliResult<InheritanceChain> {
    let config = ctx.load_shared_config()?;
    let profile = ctx.select_profile(profile, &config);
    let graph = ProfileGraph::discover(&ctx.profile_root(), &config)?;
    let chain = resolve(&graph, &profile)?;

    if json {
        print_json(&ChainOutput {
            profile: &profile,
            chain: chain.profiles(),
        })?;
    } else {
        println!("{chain}");
    }
    Ok(chain)
}

// =============================================================================
// PROFILES COMMAND
// =============================================================================

/// One row of `strata profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileListing {
    pub name: String,
    pub inherits_from: Option<String>,
    pub has_standards: bool,
    /// Set when the profile's own config could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
}

/// List every profile with its parent.
///
/// A profile with an unreadable config is still listed, flagged with the
/// error, so one broken profile does not hide the rest.
pub fn cmd_profiles(ctx: &InstallContext, json: bool) -> CliResult<Vec<ProfileListing>> {
    let config = ctx.load_shared_config()?;
    let graph = ProfileGraph::discover(&ctx.profile_root(), &config)?;

    let listings: Vec<ProfileListing> = graph
        .profiles()
        .map(|p| {
            let (inherits_from, config_error) = match p.extends() {
                Ok(parent) => (parent, None),
                Err(err) => {
                    warn!(profile = %p.name, error = %err, "unreadable profile config");
                    (None, Some(err.to_string()))
                }
            };
            ProfileListing {
                name: p.name.clone(),
                inherits_from,
                has_standards: p.path.join(STANDARDS_DIR).is_dir(),
                config_error,
            }
        })
        .collect();

    if json {
        print_json(&listings)?;
    } else if listings.is_empty() {
        println!("No profiles found in {}", ctx.profile_root().display());
    } else {
        for listing in &listings {
            match (&listing.inherits_from, &listing.config_error) {
                (_, Some(err)) => println!("{} (invalid config: {err})", listing.name),
                (Some(parent), None) => println!("{} (inherits from {parent})", listing.name),
                (None, None) => println!("{}", listing.name),
            }
        }
    }
    Ok(listings)
}
