//! GitHub source backed by the `gh` CLI.
//!
//! Authentication, transport and rate limiting are left to `gh`; this
//! module only builds the API calls and decodes their output.

use super::{SourceError, WorkflowSource};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Options for the `gh` backed source.
#[derive(Debug, Clone)]
pub struct GhOptions {
    /// Name or path of the `gh` executable.
    pub binary: String,
    /// Directory holding workflow definitions.
    pub workflows_dir: String,
    /// Maximum repositories listed for an organization.
    pub repo_limit: usize,
    /// Include archived repositories in organization mode.
    pub include_archived: bool,
    /// Include forks in organization mode.
    pub include_forks: bool,
}

impl Default for GhOptions {
    fn default() -> Self {
        Self {
            binary: "gh".to_string(),
            workflows_dir: ".github/workflows".to_string(),
            repo_limit: 1000,
            include_archived: false,
            include_forks: false,
        }
    }
}

impl From<&crate::config::Config> for GhOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            binary: config.github.gh_binary.clone(),
            workflows_dir: config.github.workflows_dir.clone(),
            repo_limit: config.github.repo_limit,
            include_archived: config.github.include_archived,
            include_forks: config.github.include_forks,
        }
    }
}

/// Entry of a `repos/{repo}/contents/{dir}` listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Entry of `gh repo list --json nameWithOwner,isArchived,isFork`.
#[derive(Debug, Deserialize)]
struct RepoEntry {
    #[serde(rename = "nameWithOwner")]
    name_with_owner: String,
    #[serde(rename = "isArchived", default)]
    is_archived: bool,
    #[serde(rename = "isFork", default)]
    is_fork: bool,
}

/// Workflow source that shells out to `gh api` and `gh repo list`.
pub struct GhCliSource {
    options: GhOptions,
}

impl GhCliSource {
    pub fn new(options: GhOptions) -> Self {
        Self { options }
    }

    /// Check if the GitHub CLI is installed and authenticated.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.options.binary)
            .args(["auth", "status"])
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn contents_endpoint(&self, repository: &str, path: &str) -> String {
        format!(
            "repos/{}/contents/{}",
            repository,
            path.trim_matches('/')
        )
    }

    fn list_args(&self, repository: &str) -> Vec<String> {
        vec![
            "api".to_string(),
            self.contents_endpoint(repository, &self.options.workflows_dir),
        ]
    }

    fn fetch_args(&self, repository: &str, path: &str) -> Vec<String> {
        vec![
            "api".to_string(),
            "-H".to_string(),
            "Accept: application/vnd.github.raw".to_string(),
            self.contents_endpoint(repository, path),
        ]
    }

    fn repo_list_args(&self, owner: &str) -> Vec<String> {
        vec![
            "repo".to_string(),
            "list".to_string(),
            owner.to_string(),
            "--limit".to_string(),
            self.options.repo_limit.to_string(),
            "--json".to_string(),
            "nameWithOwner,isArchived,isFork".to_string(),
        ]
    }

    /// Run `gh` and return its stdout.
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, SourceError> {
        let command = format!("{} {}", self.options.binary, args.join(" "));
        debug!("Running: {}", command);

        let output = Command::new(&self.options.binary)
            .args(args)
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if is_not_found(&stderr) {
                return Err(SourceError::NotFound(command));
            }
            return Err(SourceError::CommandFailed { command, stderr });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl WorkflowSource for GhCliSource {
    async fn list_workflow_files(&self, repository: &str) -> Result<Vec<String>, SourceError> {
        let args = self.list_args(repository);
        let stdout = self.run(&args).await?;
        parse_contents_listing(&stdout).map_err(|source| SourceError::Parse {
            command: args.join(" "),
            source,
        })
    }

    async fn get_file_text(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<String>, SourceError> {
        match self.run(&self.fetch_args(repository, path)).await {
            Ok(stdout) => Ok(Some(String::from_utf8_lossy(&stdout).into_owned())),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<String>, SourceError> {
        let args = self.repo_list_args(owner);
        let stdout = self.run(&args).await?;
        parse_repo_list(
            &stdout,
            self.options.include_archived,
            self.options.include_forks,
        )
        .map_err(|source| SourceError::Parse {
            command: args.join(" "),
            source,
        })
    }
}

/// `gh api` reports missing resources as `Not Found (HTTP 404)`.
fn is_not_found(stderr: &str) -> bool {
    stderr.contains("HTTP 404") || stderr.contains("Not Found")
}

/// Decode a contents listing into the paths of its files.
fn parse_contents_listing(stdout: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<ContentEntry> = serde_json::from_slice(stdout)?;
    Ok(entries
        .into_iter()
        .filter(|e| e.kind == "file")
        .map(|e| e.path)
        .collect())
}

/// Decode `gh repo list` output, dropping archived repositories and forks
/// unless asked to keep them.
fn parse_repo_list(
    stdout: &[u8],
    include_archived: bool,
    include_forks: bool,
) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<RepoEntry> = serde_json::from_slice(stdout)?;
    Ok(entries
        .into_iter()
        .filter(|r| include_archived || !r.is_archived)
        .filter(|r| include_forks || !r.is_fork)
        .map(|r| r.name_with_owner)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_listing() {
        let json = br#"[
            {"name": "ci.yml", "path": ".github/workflows/ci.yml", "type": "file", "sha": "abc"},
            {"name": "shared", "path": ".github/workflows/shared", "type": "dir", "sha": "def"},
            {"name": "notes.md", "path": ".github/workflows/notes.md", "type": "file", "sha": "123"}
        ]"#;

        let paths = parse_contents_listing(json).unwrap();
        assert_eq!(
            paths,
            vec![".github/workflows/ci.yml", ".github/workflows/notes.md"]
        );
    }

    #[test]
    fn test_contents_listing_rejects_single_file_object() {
        let json = br#"{"name": "workflows", "path": ".github/workflows", "type": "file"}"#;
        assert!(parse_contents_listing(json).is_err());
    }

    #[test]
    fn test_repo_list_filters() {
        let json = br#"[
            {"nameWithOwner": "acme/app", "isArchived": false, "isFork": false},
            {"nameWithOwner": "acme/old", "isArchived": true, "isFork": false},
            {"nameWithOwner": "acme/fork", "isArchived": false, "isFork": true}
        ]"#;

        assert_eq!(parse_repo_list(json, false, false).unwrap(), vec!["acme/app"]);
        assert_eq!(
            parse_repo_list(json, true, true).unwrap(),
            vec!["acme/app", "acme/old", "acme/fork"]
        );
        assert_eq!(
            parse_repo_list(json, false, true).unwrap(),
            vec!["acme/app", "acme/fork"]
        );
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found("gh: Not Found (HTTP 404)"));
        assert!(!is_not_found("gh: Bad credentials (HTTP 401)"));
    }

    #[test]
    fn test_command_arguments() {
        let source = GhCliSource::new(GhOptions {
            repo_limit: 25,
            ..GhOptions::default()
        });

        assert_eq!(
            source.list_args("acme/app"),
            vec!["api", "repos/acme/app/contents/.github/workflows"]
        );
        assert_eq!(
            source.fetch_args("acme/app", ".github/workflows/ci.yml")[3],
            "repos/acme/app/contents/.github/workflows/ci.yml"
        );
        assert!(source.repo_list_args("acme").contains(&"25".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let source = GhCliSource::new(GhOptions {
            binary: "gh-inventory-test-missing-binary".to_string(),
            ..GhOptions::default()
        });

        assert!(!source.is_available().await);
        let err = source.list_workflow_files("acme/app").await.unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }
}
