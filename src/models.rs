//! Data models for the actions inventory.
//!
//! This module contains the core data structures used throughout
//! the application for representing action references, their
//! aggregated summaries, and the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a referenced action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Published under `actions/` or `github/`
    #[serde(rename = "github_official")]
    GitHubOfficial,
    /// Container image referenced with `docker://`
    DockerImage,
    /// Path inside the repository (`./` or `../`)
    LocalRepository,
    /// Any other `owner/repo@ref` reference
    ThirdParty,
    /// Anything that matches none of the rules above
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::GitHubOfficial => write!(f, "GitHub Official"),
            Category::DockerImage => write!(f, "Docker Image"),
            Category::LocalRepository => write!(f, "Local Repository"),
            Category::ThirdParty => write!(f, "Third Party"),
            Category::Other => write!(f, "Other/Composite"),
        }
    }
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 5] = [
        Category::GitHubOfficial,
        Category::DockerImage,
        Category::LocalRepository,
        Category::ThirdParty,
        Category::Other,
    ];

    /// Returns an emoji representation of the category.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::GitHubOfficial => "🐙",
            Category::DockerImage => "🐳",
            Category::LocalRepository => "📁",
            Category::ThirdParty => "📦",
            Category::Other => "🧩",
        }
    }
}

/// A single `uses:` value found in a workflow file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReference {
    /// Raw reference, e.g. `actions/checkout@v4` or `./build-action`.
    pub identifier: String,
    /// Path of the workflow file the reference was found in.
    pub source_file: String,
    /// Owning repository (`owner/name`), set in organization mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl ActionReference {
    /// Creates a reference without an owning repository.
    pub fn new(identifier: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_file: source_file.into(),
            repository: None,
        }
    }

    /// Sets the owning repository.
    pub fn in_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }
}

/// Number of references one repository makes to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCount {
    pub repository: String,
    pub count: usize,
}

/// Aggregated usage of one distinct action identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    /// The action identifier.
    pub identifier: String,
    /// Category derived from the identifier.
    pub category: Category,
    /// Total number of references with this identifier.
    pub occurrence_count: usize,
    /// Distinct workflow files, in order of first appearance.
    pub files: Vec<String>,
    /// Distinct repositories with their reference counts (organization mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryCount>,
}

impl ActionSummary {
    /// Returns whether a given file references this action.
    pub fn used_in_file(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file)
    }

    /// Returns the repository names, in order of first appearance.
    pub fn repository_names(&self) -> Vec<&str> {
        self.repositories
            .iter()
            .map(|r| r.repository.as_str())
            .collect()
    }
}

/// Number of distinct actions per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub official: usize,
    pub docker: usize,
    pub local: usize,
    pub third_party: usize,
    pub other: usize,
    /// Number of distinct identifiers.
    pub total: usize,
}

impl CategoryTotals {
    /// Counts distinct identifiers per category.
    pub fn from_summaries(summaries: &[ActionSummary]) -> Self {
        let mut totals = Self {
            total: summaries.len(),
            ..Self::default()
        };

        for summary in summaries {
            *totals.slot_mut(summary.category) += 1;
        }

        totals
    }

    /// Returns the count for one category.
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::GitHubOfficial => self.official,
            Category::DockerImage => self.docker,
            Category::LocalRepository => self.local,
            Category::ThirdParty => self.third_party,
            Category::Other => self.other,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut usize {
        match category {
            Category::GitHubOfficial => &mut self.official,
            Category::DockerImage => &mut self.docker,
            Category::LocalRepository => &mut self.local,
            Category::ThirdParty => &mut self.third_party,
            Category::Other => &mut self.other,
        }
    }
}

/// Distinct actions used by one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryUsage {
    pub repository: String,
    /// Number of distinct action identifiers.
    pub distinct_actions: usize,
    /// Number of references, duplicates included.
    pub references: usize,
}

/// Repositories using one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRepositories {
    pub identifier: String,
    pub repositories: Vec<String>,
}

/// Aggregated view of one scope (a repository or a whole organization).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Per-action summaries, most used first.
    pub actions: Vec<ActionSummary>,
    /// Distinct actions per category.
    pub totals: CategoryTotals,
}

impl Inventory {
    /// Returns true when the scope contains no references.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Organization-wide projections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgInventory {
    /// Which repositories use each action.
    pub action_usage: Vec<ActionRepositories>,
    /// How many actions each repository uses.
    pub repository_usage: Vec<RepositoryUsage>,
}

/// Detail section for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub repository: String,
    pub inventory: Inventory,
}

/// Whether the report covers one repository or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Repository,
    Organization,
}

/// Metadata about the inventory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Repository (`owner/name`), organization, or local path scanned.
    pub target: String,
    /// Date and time of the run.
    pub generated_at: DateTime<Utc>,
    /// Number of repositories whose workflows were listed.
    pub repositories_scanned: usize,
    /// Number of repositories that could not be listed.
    pub repositories_failed: usize,
    /// Number of workflow files read.
    pub workflow_files: usize,
    /// Number of `uses:` references found.
    pub total_references: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete inventory report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub scope: Scope,
    /// Inventory over the whole scope.
    pub inventory: Inventory,
    /// Organization tables, present in organization mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<OrgInventory>,
    /// Per-repository detail sections (organization mode).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(identifier: &str, category: Category) -> ActionSummary {
        ActionSummary {
            identifier: identifier.to_string(),
            category,
            occurrence_count: 1,
            files: vec!["ci.yml".to_string()],
            repositories: Vec::new(),
        }
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::GitHubOfficial.to_string(), "GitHub Official");
        assert_eq!(Category::Other.to_string(), "Other/Composite");
    }

    #[test]
    fn test_reference_builder() {
        let reference = ActionReference::new("actions/cache@v3", "ci.yml").in_repository("acme/x");
        assert_eq!(reference.repository.as_deref(), Some("acme/x"));
        assert_eq!(reference.identifier, "actions/cache@v3");
    }

    #[test]
    fn test_category_totals() {
        let summaries = vec![
            summary("actions/checkout@v4", Category::GitHubOfficial),
            summary("github/codeql-action/init@v3", Category::GitHubOfficial),
            summary("docker://alpine:3", Category::DockerImage),
            summary("weird", Category::Other),
        ];

        let totals = CategoryTotals::from_summaries(&summaries);
        assert_eq!(totals.official, 2);
        assert_eq!(totals.docker, 1);
        assert_eq!(totals.local, 0);
        assert_eq!(totals.other, 1);
        assert_eq!(totals.total, 4);

        let sum: usize = Category::ALL.iter().map(|c| totals.get(*c)).sum();
        assert_eq!(sum, totals.total);
    }

    #[test]
    fn test_summary_serialization_skips_empty_repositories() {
        let json = serde_json::to_string(&summary("actions/checkout@v4", Category::GitHubOfficial))
            .unwrap();
        assert!(json.contains("\"github_official\""));
        assert!(!json.contains("repositories"));
    }
}
