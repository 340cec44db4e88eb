//! Markdown and JSON report generation.
//!
//! This module generates Markdown inventory reports and the JSON
//! serialization of the same data.

use super::{repo_count_label, ReportOptions};
use crate::analysis::human_join;
use crate::models::{
    ActionSummary, Category, Inventory, OrgInventory, Report, ReportMetadata, Scope,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# GitHub Actions Inventory\n\n");

    output.push_str(&generate_metadata_section(&report.metadata, report.scope));

    if report.inventory.is_empty() {
        output.push_str("No actions found.\n\n");
        output.push_str(&generate_footer());
        return output;
    }

    match (&report.org, report.scope) {
        (Some(org), Scope::Organization) => {
            output.push_str("## Summary\n\n");
            output.push_str(&generate_summary_table(&report.inventory));
            output.push_str(&generate_org_section(org));

            if options.show_repository_details {
                output.push_str("## Repository Details\n\n");
                for detail in &report.repositories {
                    output.push_str(&format!("### {}\n\n", detail.repository));
                    output.push_str(&generate_inventory_section(&detail.inventory, 4, options));
                }
            }
        }
        _ => {
            output.push_str(&generate_inventory_section(&report.inventory, 2, options));
        }
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, scope: Scope) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    match scope {
        Scope::Repository => {
            section.push_str(&format!("- **Repository:** {}\n", metadata.target));
        }
        Scope::Organization => {
            section.push_str(&format!("- **Organization:** {}\n", metadata.target));
            section.push_str(&format!(
                "- **Repositories Scanned:** {}\n",
                metadata.repositories_scanned
            ));
            if metadata.repositories_failed > 0 {
                section.push_str(&format!(
                    "- **Repositories Failed:** {}\n",
                    metadata.repositories_failed
                ));
            }
        }
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Workflow Files:** {}\n",
        metadata.workflow_files
    ));
    section.push_str(&format!(
        "- **Action References:** {}\n",
        metadata.total_references
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary table and action blocks of one scope.
///
/// `level` is the heading depth of the section titles, so the same shape
/// can be nested under a repository heading.
fn generate_inventory_section(inventory: &Inventory, level: usize, options: &ReportOptions) -> String {
    let heading = "#".repeat(level);
    let mut section = String::new();

    if inventory.is_empty() {
        section.push_str("No actions found.\n\n");
        return section;
    }

    section.push_str(&format!("{} Summary\n\n", heading));
    section.push_str(&generate_summary_table(inventory));

    section.push_str(&format!("{} Actions\n\n", heading));
    for action in &inventory.actions {
        section.push_str(&generate_action_block(action, level + 1, options));
    }

    section
}

/// Generate the per-category table with a total row.
fn generate_summary_table(inventory: &Inventory) -> String {
    let mut table = String::new();

    table.push_str("| Category | Actions |\n");
    table.push_str("|:---|:---:|\n");
    for category in Category::ALL {
        table.push_str(&format!(
            "| {} {} | {} |\n",
            category.emoji(),
            category,
            inventory.totals.get(category)
        ));
    }
    table.push_str(&format!("| **Total** | **{}** |\n\n", inventory.totals.total));

    table
}

/// Generate a single action block.
fn generate_action_block(action: &ActionSummary, level: usize, options: &ReportOptions) -> String {
    let mut block = String::new();

    block.push_str(&format!("{} `{}`\n\n", "#".repeat(level), action.identifier));
    block.push_str(&format!(
        "- **Category:** {} {}\n",
        action.category.emoji(),
        action.category
    ));
    block.push_str(&format!("- **Occurrences:** {}\n", action.occurrence_count));

    if options.show_files && !action.files.is_empty() {
        let files: Vec<String> = action.files.iter().map(|f| format!("`{}`", f)).collect();
        block.push_str(&format!("- **Files:** {}\n", human_join(&files)));
    }

    if !action.repositories.is_empty() {
        block.push_str(&format!(
            "- **Repositories:** {}\n",
            human_join(&action.repository_names())
        ));
    }

    block.push('\n');
    block
}

/// Generate the organization-wide tables.
fn generate_org_section(org: &OrgInventory) -> String {
    let mut section = String::new();

    section.push_str("## Action Usage Across Repositories\n\n");
    section.push_str("| Action | Repositories | Used In |\n");
    section.push_str("|:---|:---:|:---|\n");
    for usage in &org.action_usage {
        section.push_str(&format!(
            "| `{}` | {} | {} |\n",
            escape_cell(&usage.identifier),
            repo_count_label(usage.repositories.len()),
            escape_cell(&usage.repositories.join(", "))
        ));
    }
    section.push('\n');

    section.push_str("## Actions per Repository\n\n");
    section.push_str("| Repository | Distinct Actions | References |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for usage in &org.repository_usage {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&usage.repository),
            usage.distinct_actions,
            usage.references
        ));
    }
    section.push('\n');

    section
}

/// Escape the column separator inside a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by gha-inventory*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
