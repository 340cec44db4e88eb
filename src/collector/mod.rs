//! Workflow collection.
//!
//! A [`WorkflowSource`] lists and fetches workflow files; the functions
//! here drive it for one repository or a whole organization and append
//! the extracted references to a shared [`ReferenceSet`].

pub mod gh;
pub mod local;

pub use gh::{GhCliSource, GhOptions};
pub use local::LocalSource;

use crate::analysis::{extract_references, ReferenceSet};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by a workflow source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The repository, directory or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The command ran but reported a failure
    #[error("Command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The command could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Reading a local file or directory failed
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The command output was not the expected JSON
    #[error("Unexpected output from '{command}': {source}")]
    Parse {
        command: String,
        source: serde_json::Error,
    },

    /// The operation is not available for this source
    #[error("{0}")]
    Unsupported(String),
}

/// Access to workflow definitions of a repository host.
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    /// List the files of the workflows directory of a repository.
    async fn list_workflow_files(&self, repository: &str) -> Result<Vec<String>, SourceError>;

    /// Fetch a file's text. `Ok(None)` when the file has no content to offer.
    async fn get_file_text(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<String>, SourceError>;

    /// List the repositories (`owner/name`) owned by an account.
    async fn list_repositories(&self, owner: &str) -> Result<Vec<String>, SourceError>;
}

/// Outcome of collecting one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryScan {
    pub repository: String,
    /// Workflow files that were read.
    pub workflow_files: usize,
    /// Workflow files that could not be fetched.
    pub failed_files: usize,
    /// References appended to the set.
    pub references: usize,
}

/// Outcome of collecting every repository of an organization.
#[derive(Debug, Clone, Default)]
pub struct OrgScan {
    pub scanned: Vec<RepositoryScan>,
    /// Repositories whose workflows could not be listed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl OrgScan {
    pub fn workflow_files(&self) -> usize {
        self.scanned.iter().map(|s| s.workflow_files).sum()
    }
}

/// Returns true for paths the extractor should read.
pub fn is_workflow_file(path: &str) -> bool {
    path.ends_with(".yml") || path.ends_with(".yaml")
}

/// Collect the references of one repository into `references`.
///
/// A missing workflows directory yields zero references. A file that
/// cannot be fetched is logged and skipped. Only a listing failure is
/// returned as an error.
pub async fn collect_repository<S>(
    source: &S,
    repository: &str,
    owner_tag: Option<&str>,
    references: &mut ReferenceSet,
) -> Result<RepositoryScan, SourceError>
where
    S: WorkflowSource + ?Sized,
{
    let mut scan = RepositoryScan {
        repository: repository.to_string(),
        ..RepositoryScan::default()
    };

    let files = match source.list_workflow_files(repository).await {
        Ok(files) => files,
        Err(SourceError::NotFound(what)) => {
            info!("No workflows in {} ({})", repository, what);
            return Ok(scan);
        }
        Err(e) => return Err(e),
    };

    for path in files {
        if !is_workflow_file(&path) {
            debug!("Skipping non-workflow file {}", path);
            continue;
        }

        match source.get_file_text(repository, &path).await {
            Ok(Some(text)) => {
                let mut found = 0;
                for reference in extract_references(&text, &path, owner_tag) {
                    references.push(reference);
                    found += 1;
                }
                debug!("{}: {} references in {}", repository, found, path);
                scan.references += found;
                scan.workflow_files += 1;
            }
            Ok(None) => {
                debug!("{}: {} has no content", repository, path);
                scan.workflow_files += 1;
            }
            Err(e) => {
                warn!("Failed to fetch {} from {}: {}", path, repository, e);
                scan.failed_files += 1;
            }
        }
    }

    info!(
        "{}: {} references in {} workflow files ({} failed)",
        scan.repository, scan.references, scan.workflow_files, scan.failed_files
    );
    Ok(scan)
}

/// Collect every repository of `owner` into `references`.
///
/// Each reference is tagged with its repository. A repository that
/// cannot be listed is logged and recorded in [`OrgScan::failed`];
/// processing continues with the next one.
pub async fn collect_organization<S>(
    source: &S,
    owner: &str,
    references: &mut ReferenceSet,
    show_progress: bool,
) -> Result<OrgScan, SourceError>
where
    S: WorkflowSource + ?Sized,
{
    let repositories = source.list_repositories(owner).await?;
    info!("Found {} repositories for {}", repositories.len(), owner);

    let progress = if show_progress {
        let pb = ProgressBar::new(repositories.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut org_scan = OrgScan::default();

    for repository in &repositories {
        progress.set_message(repository.clone());

        match collect_repository(source, repository, Some(repository), references).await {
            Ok(scan) => org_scan.scanned.push(scan),
            Err(e) => {
                warn!("Skipping {}: {}", repository, e);
                org_scan.failed.push((repository.clone(), e.to_string()));
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(org_scan)
}
