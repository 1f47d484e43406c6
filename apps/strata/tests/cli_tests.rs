//! Integration tests for Strata CLI commands.
//!
//! Uses tempfile for base and project directories.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::fs;
use std::path::Path;
use strata::cli::{CliError, InstallContext, cmd_install, cmd_profiles, cmd_resolve};
use strata_core::{IndexDocument, PLACEHOLDER_DESCRIPTION, StrataError};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Base and project directories for one test.
struct Fixture {
    base: TempDir,
    project: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            base: tempfile::tempdir().expect("Failed to create temp dir"),
            project: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn ctx(&self) -> InstallContext {
        InstallContext::new(self.base.path(), self.project.path())
    }

    fn config(&self, content: &str) {
        fs::write(self.base.path().join("config.yml"), content).unwrap();
    }

    fn profile(&self, name: &str) {
        fs::create_dir_all(self.base.path().join("profiles").join(name)).unwrap();
    }

    fn standard(&self, profile: &str, relative: &str, content: &str) {
        let path = self
            .base
            .path()
            .join("profiles")
            .join(profile)
            .join("standards")
            .join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn command(&self, relative: &str, content: &str) {
        let path = self.base.path().join("commands/strata").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn installed(&self, relative: &str) -> String {
        fs::read_to_string(self.standards().join(relative)).unwrap()
    }

    fn standards(&self) -> std::path::PathBuf {
        self.project.path().join("strata/standards")
    }

    fn index(&self) -> IndexDocument {
        IndexDocument::load(&self.standards().join("index.yml"))
            .unwrap()
            .unwrap()
    }
}

/// default <- rails <- rails-api, each shipping a few standards.
fn layered_fixture() -> Fixture {
    let fx = Fixture::new();
    fx.config(
        "default_profile: rails-api\nprofiles:\n  rails:\n    inherits_from: default\n  rails-api:\n    inherits_from: rails\n",
    );
    fx.standard("default", "coding-style.md", "default style");
    fx.standard("default", "backend/api.md", "default api");
    fx.standard("default", "_backup/old.md", "stale");
    fx.standard("rails", "backend/api.md", "rails api");
    fx.standard("rails", "backend/models.md", "rails models");
    fx.standard("rails-api", "backend/api.md", "rails-api api");
    fx.command("index-standards.md", "index");
    fx
}

fn project_is_empty(project: &Path) -> bool {
    fs::read_dir(project).unwrap().next().is_none()
}

// =============================================================================
// INSTALL COMMAND TESTS
// =============================================================================

#[test]
fn test_install_layers_profiles() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();

    assert_eq!(report.profile, "rails-api");
    assert_eq!(report.chain, vec!["default", "rails", "rails-api"]);
    assert_eq!(fx.installed("backend/api.md"), "rails-api api");
    assert_eq!(fx.installed("backend/models.md"), "rails models");
    assert_eq!(fx.installed("coding-style.md"), "default style");
    assert_eq!(report.files_installed, 3);
    assert_eq!(report.profiles_contributing, 3);
    assert_eq!(report.provenance.source_of("backend/api.md"), Some("rails-api"));
    assert_eq!(report.provenance.source_of("coding-style.md"), Some("default"));
}

#[test]
fn test_install_skips_backup_dirs() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();

    assert!(!fx.standards().join("_backup").exists());
    assert_eq!(report.provenance.source_of("_backup/old.md"), None);
}

#[test]
fn test_install_writes_index_with_placeholders() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();
    let index = fx.index();

    assert_eq!(report.index_entries, 3);
    assert_eq!(report.new_index_entries, 3);
    assert_eq!(
        index.description("root", "coding-style"),
        Some(PLACEHOLDER_DESCRIPTION)
    );
    assert_eq!(
        index.description("backend", "models"),
        Some(PLACEHOLDER_DESCRIPTION)
    );
}

#[test]
fn test_reinstall_preserves_authored_descriptions() {
    let fx = layered_fixture();
    cmd_install(&fx.ctx(), None, false, false).unwrap();

    let index_path = fx.standards().join("index.yml");
    let mut index = fx.index();
    index.insert("root", "coding-style", "Our style guide");
    index.persist(&index_path).unwrap();

    fx.standard("rails", "testing/unit.md", "unit tests");
    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();
    let index = fx.index();

    assert_eq!(
        index.description("root", "coding-style"),
        Some("Our style guide")
    );
    assert_eq!(
        index.description("testing", "unit"),
        Some(PLACEHOLDER_DESCRIPTION)
    );
    assert_eq!(report.new_index_entries, 1);
    assert_eq!(report.pending_descriptions, 3);
}

#[test]
fn test_reinstall_is_idempotent() {
    let fx = layered_fixture();
    let index_path = fx.standards().join("index.yml");

    cmd_install(&fx.ctx(), None, false, false).unwrap();
    let first_index = fs::read(&index_path).unwrap();
    let first_api = fx.installed("backend/api.md");

    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();

    assert_eq!(fs::read(&index_path).unwrap(), first_index);
    assert_eq!(fx.installed("backend/api.md"), first_api);
    assert_eq!(report.new_index_entries, 0);
}

#[test]
fn test_install_keeps_unrelated_project_files() {
    let fx = layered_fixture();
    fs::create_dir_all(fx.standards()).unwrap();
    fs::write(fx.standards().join("team-notes.md"), "ours").unwrap();

    cmd_install(&fx.ctx(), None, false, false).unwrap();

    assert_eq!(fx.installed("team-notes.md"), "ours");
    assert!(fx.index().description("root", "team-notes").is_some());
}

#[test]
fn test_install_explicit_profile_overrides_default() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), Some("rails"), false, false).unwrap();

    assert_eq!(report.chain, vec!["default", "rails"]);
    assert_eq!(fx.installed("backend/api.md"), "rails api");
}

#[test]
fn test_install_copies_commands() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), None, false, true).unwrap();

    assert_eq!(report.commands_installed, 1);
    let command = fx
        .project
        .path()
        .join(".claude/commands/strata/index-standards.md");
    assert_eq!(fs::read_to_string(command).unwrap(), "index");
}

#[test]
fn test_commands_only_leaves_standards_alone() {
    let fx = layered_fixture();

    let report = cmd_install(&fx.ctx(), None, true, false).unwrap();

    assert!(report.commands_only);
    assert_eq!(report.commands_installed, 1);
    assert!(report.chain.is_empty());
    assert!(!fx.standards().exists());
}

#[test]
fn test_install_cycle_touches_nothing() {
    let fx = Fixture::new();
    fx.config("profiles:\n  a:\n    inherits_from: b\n  b:\n    inherits_from: a\n");
    fx.standard("a", "style.md", "a");
    fx.standard("b", "style.md", "b");
    fx.command("index-standards.md", "index");

    let err = cmd_install(&fx.ctx(), Some("a"), false, false).unwrap_err();

    match &err {
        CliError::Core(StrataError::CycleDetected { path }) => {
            assert_eq!(path, &vec!["a", "b", "a"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(err.user_message().starts_with("Circular dependency"));
    assert!(project_is_empty(fx.project.path()));
}

#[test]
fn test_install_missing_parent_touches_nothing() {
    let fx = Fixture::new();
    fx.config("profiles:\n  rails:\n    inherits_from: X\n");
    fx.standard("rails", "style.md", "rails");

    let err = cmd_install(&fx.ctx(), Some("rails"), false, false).unwrap_err();

    assert!(matches!(
        &err,
        CliError::Core(StrataError::ProfileNotFound { name }) if name == "X"
    ));
    assert_eq!(err.user_message(), "Profile not found: X");
    assert!(project_is_empty(fx.project.path()));
}

#[test]
fn test_install_malformed_index_touches_nothing_new() {
    let fx = layered_fixture();
    fs::create_dir_all(fx.standards()).unwrap();
    fs::write(fx.standards().join("index.yml"), "root: [broken").unwrap();

    let result = cmd_install(&fx.ctx(), None, false, false);

    assert!(matches!(
        result,
        Err(CliError::Core(StrataError::IndexParse { .. }))
    ));
    assert!(!fx.standards().join("coding-style.md").exists());
}

#[test]
fn test_install_fallback_profile() {
    let fx = Fixture::new();
    fx.standard("default", "style.md", "base");

    let report = cmd_install(&fx.ctx(), None, false, false).unwrap();

    assert_eq!(report.profile, "default");
    assert_eq!(report.chain, vec!["default"]);
}

#[test]
fn test_install_ignores_broken_profile_off_the_chain() {
    let fx = layered_fixture();
    fx.profile("junk");
    fs::write(
        fx.base.path().join("profiles/junk/profile-config.yml"),
        "inherits_from: [oops",
    )
    .unwrap();

    let report = cmd_install(&fx.ctx(), Some("rails"), false, false).unwrap();

    assert_eq!(report.chain, vec!["default", "rails"]);
    assert_eq!(fx.installed("backend/api.md"), "rails api");
}

#[test]
fn test_install_broken_profile_on_the_chain_touches_nothing() {
    let fx = Fixture::new();
    fx.standard("default", "style.md", "base");
    fx.standard("junk", "style.md", "junk");
    fs::write(
        fx.base.path().join("profiles/junk/profile-config.yml"),
        "inherits_from: [oops",
    )
    .unwrap();

    let result = cmd_install(&fx.ctx(), Some("junk"), false, false);

    assert!(matches!(
        result,
        Err(CliError::Core(StrataError::ConfigParse { .. }))
    ));
    assert!(project_is_empty(fx.project.path()));
}

// =============================================================================
// RESOLVE COMMAND TESTS
// =============================================================================

#[test]
fn test_resolve_prints_chain() {
    let fx = layered_fixture();

    let chain = cmd_resolve(&fx.ctx(), Some("rails-api"), false).unwrap();

    assert_eq!(chain.to_string(), "default -> rails -> rails-api");
    assert!(project_is_empty(fx.project.path()));
}

#[test]
fn test_resolve_json_mode() {
    let fx = layered_fixture();
    let result = cmd_resolve(&fx.ctx(), None, true);
    assert!(result.is_ok());
}

#[test]
fn test_resolve_self_reference() {
    let fx = Fixture::new();
    fx.profile("loop");
    fx.config("profiles:\n  loop:\n    inherits_from: loop\n");

    let err = cmd_resolve(&fx.ctx(), Some("loop"), false).unwrap_err();
    assert!(matches!(
        err,
        CliError::Core(StrataError::CycleDetected { ref path }) if path == &vec!["loop", "loop"]
    ));
}

#[test]
fn test_resolve_reads_profile_config() {
    let fx = Fixture::new();
    fx.profile("default");
    fx.profile("django");
    fs::write(
        fx.base.path().join("profiles/django/profile-config.yml"),
        "inherits_from: default\n",
    )
    .unwrap();

    let chain = cmd_resolve(&fx.ctx(), Some("django"), false).unwrap();
    assert_eq!(chain.profiles(), ["default", "django"]);
}

#[test]
fn test_resolve_dotted_profile_name() {
    let fx = Fixture::new();
    fx.profile("default");
    fx.profile("rails-7.1");
    fx.config("profiles:\n  rails-7.1:\n    inherits_from: default\n");

    let chain = cmd_resolve(&fx.ctx(), Some("rails-7.1"), false).unwrap();
    assert_eq!(chain.profiles(), ["default", "rails-7.1"]);
}

// =============================================================================
// PROFILES COMMAND TESTS
// =============================================================================

#[test]
fn test_profiles_lists_parents() {
    let fx = layered_fixture();
    fx.profile("empty");

    let listings = cmd_profiles(&fx.ctx(), false).unwrap();
    let names: Vec<_> = listings.iter().map(|l| l.name.as_str()).collect();

    assert_eq!(names, vec!["default", "empty", "rails", "rails-api"]);
    assert_eq!(listings[2].inherits_from.as_deref(), Some("default"));
    assert!(listings[0].has_standards);
    assert!(!listings[1].has_standards);
}

#[test]
fn test_profiles_missing_root() {
    let fx = Fixture::new();
    let result = cmd_profiles(&fx.ctx(), true);
    assert!(matches!(
        result,
        Err(CliError::Core(StrataError::ProfileRootMissing { .. }))
    ));
}

#[test]
fn test_profiles_flags_broken_config() {
    let fx = layered_fixture();
    fx.profile("junk");
    fs::write(
        fx.base.path().join("profiles/junk/profile-config.yml"),
        "inherits_from: [oops",
    )
    .unwrap();

    let listings = cmd_profiles(&fx.ctx(), false).unwrap();
    let junk = listings.iter().find(|l| l.name == "junk").unwrap();

    assert_eq!(listings.len(), 4);
    assert!(junk.config_error.is_some());
    assert_eq!(junk.inherits_from, None);
    assert!(listings[0].config_error.is_none());
}
