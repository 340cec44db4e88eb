//! Report assembly and rendering.
//!
//! Reports are assembled once from the collected references; every
//! renderer works from the same [`Report`] and never looks at raw
//! references again.

pub mod console;
pub mod generator;

pub use console::generate_text_report;
pub use generator::{generate_json_report, generate_markdown_report};

use crate::analysis::{build_inventory, build_org_inventory, ReferenceSet};
use crate::models::{Report, ReportMetadata, RepositoryReport, Scope};

/// Rendering switches, taken from the `[report]` config section.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// List the workflow files each action is used in.
    pub show_files: bool,
    /// Append a detail section per repository in organization mode.
    pub show_repository_details: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_files: true,
            show_repository_details: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for ReportOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            show_files: config.show_files,
            show_repository_details: config.show_repository_details,
        }
    }
}

/// Build the report for a single repository.
pub fn build_repository_report(metadata: ReportMetadata, references: &ReferenceSet) -> Report {
    Report {
        metadata,
        scope: Scope::Repository,
        inventory: build_inventory(references),
        org: None,
        repositories: Vec::new(),
    }
}

/// Build the report for an organization.
///
/// Repositories without any reference get no detail section.
pub fn build_organization_report(metadata: ReportMetadata, references: &ReferenceSet) -> Report {
    let repositories = references
        .repositories()
        .into_iter()
        .map(|repository| RepositoryReport {
            repository: repository.to_string(),
            inventory: build_inventory(references.for_repository(repository)),
        })
        .collect();

    Report {
        metadata,
        scope: Scope::Organization,
        inventory: build_inventory(references),
        org: Some(build_org_inventory(references)),
        repositories,
    }
}

/// Format a repository count: `1 repo`, `2 repos`.
pub(crate) fn repo_count_label(count: usize) -> String {
    if count == 1 {
        "1 repo".to_string()
    } else {
        format!("{} repos", count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::ActionReference;
    use chrono::Utc;

    pub(crate) fn metadata(target: &str) -> ReportMetadata {
        ReportMetadata {
            target: target.to_string(),
            generated_at: Utc::now(),
            repositories_scanned: 1,
            repositories_failed: 0,
            workflow_files: 2,
            total_references: 0,
            duration_seconds: 1.5,
        }
    }

    pub(crate) fn repository_report() -> Report {
        let mut refs = ReferenceSet::new();
        refs.push(ActionReference::new("actions/checkout@v4", "ci.yml"));
        refs.push(ActionReference::new("actions/checkout@v4", "release.yml"));
        refs.push(ActionReference::new("docker://alpine:3", "ci.yml"));
        refs.push(ActionReference::new("./build-action", "ci.yml"));
        refs.push(ActionReference::new("octo/lint@v1", "ci.yml"));
        refs.push(ActionReference::new("composite-thing", "ci.yml"));
        build_repository_report(metadata("acme/app"), &refs)
    }

    pub(crate) fn organization_report() -> Report {
        let mut refs = ReferenceSet::new();
        refs.push(ActionReference::new("actions/cache@v3", "ci.yml").in_repository("X"));
        refs.push(ActionReference::new("actions/checkout@v4", "ci.yml").in_repository("X"));
        refs.push(ActionReference::new("actions/cache@v3", "build.yml").in_repository("Y"));
        build_organization_report(metadata("acme"), &refs)
    }

    #[test]
    fn test_repository_report_has_no_org_sections() {
        let report = repository_report();
        assert_eq!(report.scope, Scope::Repository);
        assert!(report.org.is_none());
        assert!(report.repositories.is_empty());
        assert_eq!(report.inventory.totals.total, 5);
    }

    #[test]
    fn test_organization_report_sections() {
        let report = organization_report();
        let org = report.org.as_ref().unwrap();

        assert_eq!(org.action_usage[0].identifier, "actions/cache@v3");
        assert_eq!(org.action_usage[0].repositories, vec!["X", "Y"]);
        assert_eq!(report.repositories.len(), 2);
        assert_eq!(report.repositories[0].repository, "X");
        assert_eq!(report.repositories[0].inventory.totals.total, 2);
        assert_eq!(report.repositories[1].inventory.totals.total, 1);
    }

    #[test]
    fn test_repo_count_label() {
        assert_eq!(repo_count_label(1), "1 repo");
        assert_eq!(repo_count_label(2), "2 repos");
    }
}
