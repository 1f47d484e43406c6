//! Install report rendering (text and JSON).

use serde::Serialize;
use strata_core::{InheritanceChain, MergeSummary, ProvenanceRecord, Reconciliation};

/// What an install did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub profile: String,
    pub commands_only: bool,
    /// Base first.
    pub chain: Vec<String>,
    pub files_installed: usize,
    pub profiles_contributing: usize,
    pub index_entries: usize,
    pub new_index_entries: usize,
    pub pending_descriptions: usize,
    pub commands_installed: usize,
    #[serde(skip_serializing_if = "ProvenanceRecord::is_empty")]
    pub provenance: ProvenanceRecord,
}

impl InstallReport {
    /// An empty report for `profile`.
    #[must_use]
    pub fn new(profile: impl Into<String>, commands_only: bool) -> Self {
        Self {
            profile: profile.into(),
            commands_only,
            ..Self::default()
        }
    }

    /// Fill in the standards half of the report.
    pub fn record_standards(
        &mut self,
        chain: &InheritanceChain,
        merge: MergeSummary,
        index: &Reconciliation,
    ) {
        self.chain = chain.profiles().to_vec();
        self.files_installed = merge.file_count;
        self.profiles_contributing = merge.profiles_contributing;
        self.provenance = merge.provenance;
        self.index_entries = index.document.len();
        self.new_index_entries = index.new_entries;
        self.pending_descriptions = index.pending;
    }

    /// Plain text summary.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        if self.commands_only {
            output.push_str("Installed commands only (standards left untouched)\n");
        } else {
            output.push_str(&format!("Installed profile: {}\n", self.profile));
            output.push_str(&format!("  Inheritance:   {}\n", self.chain.join(" -> ")));
            output.push_str(&format!(
                "  Standards:     {} files from {} profile(s)\n",
                self.files_installed, self.profiles_contributing
            ));
            for (profile, count) in self.provenance.contributors() {
                output.push_str(&format!("    - {profile}: {count}\n"));
            }
            output.push_str(&format!(
                "  Index:         {} entries ({} new)\n",
                self.index_entries, self.new_index_entries
            ));
        }
        output.push_str(&format!("  Commands:      {}\n", self.commands_installed));

        if self.pending_descriptions > 0 {
            output.push_str(&format!(
                "\n{} index entries need descriptions. Run /index-standards to fill them in.\n",
                self.pending_descriptions
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_only_text_skips_standards() {
        let mut report = InstallReport::new("default", true);
        report.commands_installed = 4;

        let text = report.to_text();
        assert!(text.contains("commands only"));
        assert!(!text.contains("Inheritance"));
        assert!(text.contains("Commands:      4"));
    }

    #[test]
    fn text_lists_contributors_and_pending() {
        let mut report = InstallReport::new("rails", false);
        report.chain = vec!["default".into(), "rails".into()];
        report.provenance.record("a.md", "default");
        report.provenance.record("b.md", "rails");
        report.pending_descriptions = 2;

        let text = report.to_text();
        assert!(text.contains("default -> rails"));
        assert!(text.contains("- default: 1"));
        assert!(text.contains("2 index entries need descriptions"));
    }

    #[test]
    fn json_omits_empty_provenance() {
        let report = InstallReport::new("default", true);
        let json = serde_json::to_string(&report).unwrap_or_default();
        assert!(json.contains("\"profile\":\"default\""));
        assert!(!json.contains("provenance"));
    }
}
