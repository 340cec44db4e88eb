//! Workflow source for a local checkout.
//!
//! Reads the workflows directory of a repository already on disk, so an
//! inventory can be produced without network access.

use super::{SourceError, WorkflowSource};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Source reading `<root>/<workflows_dir>`.
pub struct LocalSource {
    root: PathBuf,
    workflows_dir: String,
}

impl LocalSource {
    /// Create a new local source.
    pub fn new(root: PathBuf, workflows_dir: impl Into<String>) -> Self {
        Self {
            root,
            workflows_dir: workflows_dir.into(),
        }
    }

    /// Display name used in reports.
    pub fn name(&self) -> String {
        let canonical = std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());
        canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Check if a path relative to the root stays within it.
    ///
    /// Existing paths are compared after resolving `..` and symlinks. A
    /// path that does not resolve must not climb out lexically.
    fn is_within_root(&self, relative: &str) -> bool {
        let path = self.root.join(relative);

        match (std::fs::canonicalize(&self.root), std::fs::canonicalize(&path)) {
            (Ok(root), Ok(path)) => path.starts_with(root),
            _ => !Path::new(relative)
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir)),
        }
    }
}

#[async_trait]
impl WorkflowSource for LocalSource {
    async fn list_workflow_files(&self, _repository: &str) -> Result<Vec<String>, SourceError> {
        if !self.is_within_root(&self.workflows_dir) {
            return Err(SourceError::Unsupported(format!(
                "Workflows directory {} is outside the repository",
                self.workflows_dir
            )));
        }

        let dir = self.root.join(&self.workflows_dir);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(dir.display().to_string()));
            }
            Err(source) => {
                return Err(SourceError::Io {
                    path: dir.display().to_string(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(SourceError::Io {
                        path: dir.display().to_string(),
                        source,
                    })
                }
            };

            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            files.push(format!(
                "{}/{}",
                self.workflows_dir.trim_end_matches('/'),
                name
            ));
        }

        // read_dir order is platform dependent
        files.sort();
        debug!("Found {} files in {}", files.len(), dir.display());
        Ok(files)
    }

    async fn get_file_text(
        &self,
        _repository: &str,
        path: &str,
    ) -> Result<Option<String>, SourceError> {
        if !self.is_within_root(path) {
            return Err(SourceError::Unsupported(format!(
                "Access denied: {} is outside the repository",
                path
            )));
        }

        match tokio::fs::read_to_string(self.root.join(path)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    async fn list_repositories(&self, _owner: &str) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Unsupported(
            "A local checkout holds a single repository".to_string(),
        ))
    }
}
