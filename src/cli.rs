//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// gha-inventory - list the GitHub Actions your workflows depend on
///
/// Reads the workflow files of a repository, or of every repository
/// owned by an organization, through the authenticated `gh` CLI and
/// reports which actions are used, where, and how often.
///
/// Examples:
///   gha-inventory --repo octo-org/app
///   gha-inventory --org octo-org --format markdown --output actions.md
///   gha-inventory --local ./my-project --format json
///   gha-inventory --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Repository to inventory (OWNER/NAME or a github.com URL)
    #[arg(
        short,
        long,
        value_name = "OWNER/NAME",
        conflicts_with = "org",
        required_unless_present_any = ["org", "local", "init_config"]
    )]
    pub repo: Option<String>,

    /// Organization or user whose repositories are all inventoried
    #[arg(long, value_name = "OWNER")]
    pub org: Option<String>,

    /// Local checkout to inventory instead of querying GitHub
    #[arg(long, value_name = "DIR", conflicts_with = "org")]
    pub local: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of repositories listed in organization mode
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Include archived repositories in organization mode
    #[arg(long)]
    pub include_archived: bool,

    /// Include forks in organization mode
    #[arg(long)]
    pub include_forks: bool,

    /// Directory holding workflow files, relative to the repository root
    #[arg(long, value_name = "PATH")]
    pub workflows_dir: Option<String>,

    /// Leave the file lists out of the per-action blocks
    #[arg(long)]
    pub no_files: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gha-inventory.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .gha-inventory.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Parse a format name from the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as clap::ValueEnum>::from_str(name, true).ok()
    }
}

/// What the run inventories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One repository on GitHub (`owner/name`).
    Repository(String),
    /// Every repository of an owner on GitHub.
    Organization(String),
    /// A checkout on disk, optionally labelled with its repository name.
    Local { path: PathBuf, name: Option<String> },
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the scan target. Call after [`Args::validate`].
    pub fn target(&self) -> Option<Target> {
        let repo = self.repo.as_deref().and_then(normalize_repository);

        if let Some(ref path) = self.local {
            return Some(Target::Local {
                path: path.clone(),
                name: repo,
            });
        }
        if let Some(ref org) = self.org {
            return Some(Target::Organization(org.trim().to_string()));
        }
        repo.map(Target::Repository)
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref repo) = self.repo {
            if normalize_repository(repo).is_none() {
                return Err(format!(
                    "Repository must be OWNER/NAME or a github.com URL, got '{}'",
                    repo
                ));
            }
        }

        if let Some(ref org) = self.org {
            let org = org.trim();
            if org.is_empty() || org.contains('/') || org.contains(char::is_whitespace) {
                return Err(format!("Invalid organization name: '{}'", org));
            }
        }

        if self.repo.is_none() && self.org.is_none() && self.local.is_none() {
            return Err("One of --repo, --org or --local is required".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate local directory if provided
        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local directory does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_dir() {
                return Err(format!(
                    "Local path is not a directory: {}",
                    local_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins
    /// over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Normalize a repository argument to `owner/name`.
///
/// Accepts `owner/name`, `https://github.com/owner/name(.git)` and
/// `git@github.com:owner/name(.git)`.
pub fn normalize_repository(input: &str) -> Option<String> {
    let input = input.trim().trim_end_matches('/').trim_end_matches(".git");

    let rest = input
        .strip_prefix("https://github.com/")
        .or_else(|| input.strip_prefix("git@github.com:"))
        .unwrap_or(input);

    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        [owner, name]
            if !owner.is_empty()
                && !name.is_empty()
                && !rest.contains(char::is_whitespace)
                && !rest.contains(':') =>
        {
            Some(format!("{}/{}", owner, name))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            repo: Some("octo-org/app".to_string()),
            org: None,
            local: None,
            format: None,
            output: None,
            limit: None,
            include_archived: false,
            include_forks: false,
            workflows_dir: None,
            no_files: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_normalize_repository() {
        assert_eq!(normalize_repository("octo/app"), Some("octo/app".to_string()));
        assert_eq!(
            normalize_repository("https://github.com/rust-lang/rust.git"),
            Some("rust-lang/rust".to_string())
        );
        assert_eq!(
            normalize_repository("git@github.com:rust-lang/rust"),
            Some("rust-lang/rust".to_string())
        );
        assert_eq!(normalize_repository("https://gitlab.com/user/repo"), None);
        assert_eq!(normalize_repository("just-a-name"), None);
        assert_eq!(normalize_repository("a/b/c"), None);
        assert_eq!(normalize_repository("/b"), None);
    }

    #[test]
    fn test_target_resolution() {
        let args = make_args();
        assert_eq!(
            args.target(),
            Some(Target::Repository("octo-org/app".to_string()))
        );

        let mut org_args = make_args();
        org_args.repo = None;
        org_args.org = Some("octo-org".to_string());
        assert_eq!(
            org_args.target(),
            Some(Target::Organization("octo-org".to_string()))
        );

        let mut local_args = make_args();
        local_args.local = Some(PathBuf::from("."));
        assert_eq!(
            local_args.target(),
            Some(Target::Local {
                path: PathBuf::from("."),
                name: Some("octo-org/app".to_string()),
            })
        );
    }

    #[test]
    fn test_validation_invalid_repo() {
        let mut args = make_args();
        args.repo = Some("invalid".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_org() {
        let mut args = make_args();
        args.repo = None;
        args.org = Some("octo/app".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_requires_target() {
        let mut args = make_args();
        args.repo = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_limit() {
        let mut args = make_args();
        args.limit = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_local_dir() {
        let mut args = make_args();
        args.local = Some(PathBuf::from("/definitely/not/here/gha-inventory"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("Markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("yaml"), None);
        assert_eq!(OutputFormat::Text.as_str(), "text");
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_clap_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
