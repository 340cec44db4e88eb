//! gha-inventory - GitHub Actions usage inventory
//!
//! A CLI tool that reads the workflow files of a repository, or of every
//! repository owned by an organization, through the `gh` CLI and reports
//! which actions they reference.
//!
//! Exit codes:
//!   0 - Success (including scopes where no actions were found)
//!   1 - Invalid arguments, unusable config, or `gh` unavailable

mod analysis;
mod cli;
mod collector;
mod config;
mod models;
mod report;

use analysis::ReferenceSet;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, Target};
use collector::{GhCliSource, GhOptions, LocalSource, RepositoryScan};
use config::{Config, CONFIG_FILE};
use models::{Report, ReportMetadata};
use report::ReportOptions;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts so `verbose` can raise the level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("gha-inventory v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run_inventory(args, config).await {
        error!("Inventory failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .gha-inventory.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the gh binary, workflow directory, and report layout.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr; stdout is reserved for the report.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Print a progress line on stderr unless running quietly.
fn status(args: &Args, message: impl AsRef<str>) {
    if !args.quiet {
        eprintln!("{}", message.as_ref());
    }
}

/// Run the complete inventory workflow.
async fn run_inventory(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    let format = OutputFormat::from_name(&config.general.format).unwrap_or_else(|| {
        warn!(
            "Unknown report format '{}' in config, using text",
            config.general.format
        );
        OutputFormat::Text
    });
    let options = ReportOptions::from(&config.report);

    let target = args.target().context("No repository or organization given")?;
    let mut references = ReferenceSet::new();

    let report = match target {
        Target::Local { path, name } => {
            let source = LocalSource::new(path.clone(), config.github.workflows_dir.clone());
            let label = name.unwrap_or_else(|| source.name());

            status(&args, format!("📂 Reading workflows from {}", path.display()));
            let scan = collect_single(&source, &label, &mut references).await;
            repository_report(&label, scan, &references, start_time)
        }
        Target::Repository(repository) => {
            let source = github_source(&config).await?;

            status(&args, format!("📥 Fetching workflows of {}", repository));
            let scan = collect_single(&source, &repository, &mut references).await;
            repository_report(&repository, scan, &references, start_time)
        }
        Target::Organization(owner) => {
            let source = github_source(&config).await?;

            status(&args, format!("🏢 Listing repositories of {}", owner));
            let org_scan =
                collector::collect_organization(&source, &owner, &mut references, !args.quiet)
                    .await
                    .with_context(|| format!("Failed to list repositories of {}", owner))?;

            let metadata = ReportMetadata {
                target: owner.clone(),
                generated_at: Utc::now(),
                repositories_scanned: org_scan.scanned.len(),
                repositories_failed: org_scan.failed.len(),
                workflow_files: org_scan.workflow_files(),
                total_references: references.len(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            };
            report::build_organization_report(metadata, &references)
        }
    };

    if references.is_empty() {
        info!("No actions found in {}", report.metadata.target);
    }

    let output = match format {
        OutputFormat::Text => report::generate_text_report(&report, &options),
        OutputFormat::Markdown => report::generate_markdown_report(&report, &options),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    if config.general.output.is_empty() {
        print!("{}", output);
    } else {
        std::fs::write(&config.general.output, &output)
            .with_context(|| format!("Failed to write report to {}", config.general.output))?;
    }

    print_summary(&args, &report, &config.general.output);
    Ok(())
}

/// Collect one repository, downgrading a listing failure to a warning.
async fn collect_single<S>(
    source: &S,
    repository: &str,
    references: &mut ReferenceSet,
) -> Option<RepositoryScan>
where
    S: collector::WorkflowSource,
{
    match collector::collect_repository(source, repository, None, references).await {
        Ok(scan) => Some(scan),
        Err(e) => {
            warn!("Could not list workflows of {}: {}", repository, e);
            None
        }
    }
}

/// Build a single-repository report from a scan outcome.
fn repository_report(
    repository: &str,
    scan: Option<RepositoryScan>,
    references: &ReferenceSet,
    start_time: Instant,
) -> Report {
    let metadata = ReportMetadata {
        target: repository.to_string(),
        generated_at: Utc::now(),
        repositories_scanned: usize::from(scan.is_some()),
        repositories_failed: usize::from(scan.is_none()),
        workflow_files: scan.map(|s| s.workflow_files).unwrap_or(0),
        total_references: references.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    report::build_repository_report(metadata, references)
}

/// Create the `gh` backed source after checking it can be used.
async fn github_source(config: &Config) -> Result<GhCliSource> {
    let source = GhCliSource::new(GhOptions::from(config));

    if !source.is_available().await {
        anyhow::bail!(
            "GitHub CLI '{}' is not installed or not authenticated. Run `gh auth login` first.",
            config.github.gh_binary
        );
    }

    Ok(source)
}

/// Print a short summary on stderr.
fn print_summary(args: &Args, report: &Report, output: &str) {
    if args.quiet {
        return;
    }

    let totals = &report.inventory.totals;
    eprintln!("\n📊 Inventory Summary:");
    eprintln!("   Workflow files: {}", report.metadata.workflow_files);
    eprintln!("   References: {}", report.metadata.total_references);
    eprintln!(
        "   Distinct actions: {} (official {} | docker {} | local {} | third-party {} | other {})",
        totals.total, totals.official, totals.docker, totals.local, totals.third_party, totals.other
    );
    if report.metadata.repositories_failed > 0 {
        eprintln!(
            "   ⚠️  Repositories skipped: {}",
            report.metadata.repositories_failed
        );
    }
    eprintln!("   Duration: {:.1}s", report.metadata.duration_seconds);
    if !output.is_empty() {
        eprintln!("\n✅ Report saved to: {}", output);
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
