//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gha-inventory.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".gha-inventory.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// GitHub access settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Empty prints the report to stdout.
    #[serde(default)]
    pub output: String,

    /// Default report format (text, markdown, json).
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: String::new(),
            format: default_format(),
            verbose: false,
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

/// GitHub access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Name or path of the `gh` executable.
    #[serde(default = "default_gh_binary")]
    pub gh_binary: String,

    /// Directory holding workflow definitions.
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: String,

    /// Maximum repositories listed in organization mode.
    #[serde(default = "default_repo_limit")]
    pub repo_limit: usize,

    /// Include archived repositories in organization mode.
    #[serde(default)]
    pub include_archived: bool,

    /// Include forks in organization mode.
    #[serde(default)]
    pub include_forks: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            gh_binary: default_gh_binary(),
            workflows_dir: default_workflows_dir(),
            repo_limit: default_repo_limit(),
            include_archived: false,
            include_forks: false,
        }
    }
}

fn default_gh_binary() -> String {
    "gh".to_string()
}

fn default_workflows_dir() -> String {
    ".github/workflows".to_string()
}

fn default_repo_limit() -> usize {
    1000
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// List the workflow files each action appears in.
    #[serde(default = "default_true")]
    pub show_files: bool,

    /// Add a detail section per repository in organization mode.
    #[serde(default = "default_true")]
    pub show_repository_details: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_files: true,
            show_repository_details: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format.as_str().to_string();
        }

        if let Some(ref dir) = args.workflows_dir {
            self.github.workflows_dir = dir.clone();
        }
        if let Some(limit) = args.limit {
            self.github.repo_limit = limit;
        }

        // Flags always override
        if args.include_archived {
            self.github.include_archived = true;
        }
        if args.include_forks {
            self.github.include_forks = true;
        }
        if args.no_files {
            self.report.show_files = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.format, "text");
        assert_eq!(config.github.gh_binary, "gh");
        assert_eq!(config.github.workflows_dir, ".github/workflows");
        assert_eq!(config.github.repo_limit, 1000);
        assert!(config.report.show_files);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "actions.md"
format = "markdown"

[github]
repo_limit = 50
include_forks = true

[report]
show_repository_details = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "actions.md");
        assert_eq!(config.general.format, "markdown");
        assert_eq!(config.github.repo_limit, 50);
        assert!(config.github.include_forks);
        assert!(!config.github.include_archived);
        assert_eq!(config.github.workflows_dir, ".github/workflows");
        assert!(!config.report.show_repository_details);
        assert!(config.report.show_files);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[github]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.github.repo_limit, 1000);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[github]\ngh_binary = \"/opt/gh\"\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.github.gh_binary, "/opt/gh");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[github\nbroken").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }
}
