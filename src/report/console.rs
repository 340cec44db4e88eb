//! Plain text report for terminal output.

use super::{repo_count_label, ReportOptions};
use crate::analysis::human_join;
use crate::models::{ActionSummary, Category, Inventory, OrgInventory, Report, Scope};

const RULE: &str = "============================================================";

/// Generate the plain text report.
pub fn generate_text_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();
    let metadata = &report.metadata;

    let scope_label = match report.scope {
        Scope::Repository => "repository",
        Scope::Organization => "organization",
    };
    output.push_str(&format!(
        "GitHub Actions inventory for {} {}\n",
        scope_label, metadata.target
    ));
    output.push_str(&format!(
        "Generated {} | {} workflow files | {} references\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        metadata.workflow_files,
        metadata.total_references
    ));
    if metadata.repositories_failed > 0 {
        output.push_str(&format!(
            "Warning: {} repositories could not be scanned\n",
            metadata.repositories_failed
        ));
    }
    output.push('\n');

    if report.inventory.is_empty() {
        output.push_str("No actions found.\n");
        return output;
    }

    match &report.org {
        Some(org) => {
            output.push_str(&summary_lines(&report.inventory));
            output.push_str(&org_lines(org));

            if options.show_repository_details {
                for detail in &report.repositories {
                    output.push_str(&format!("{}\n{}\n{}\n\n", RULE, detail.repository, RULE));
                    output.push_str(&inventory_lines(&detail.inventory, options));
                }
            }
        }
        None => output.push_str(&inventory_lines(&report.inventory, options)),
    }

    output
}

fn inventory_lines(inventory: &Inventory, options: &ReportOptions) -> String {
    if inventory.is_empty() {
        return "No actions found.\n\n".to_string();
    }

    let mut lines = String::new();
    for action in &inventory.actions {
        lines.push_str(&action_lines(action, options));
    }
    lines.push_str(&summary_lines(inventory));
    lines
}

fn action_lines(action: &ActionSummary, options: &ReportOptions) -> String {
    let mut lines = String::new();

    lines.push_str(&format!("{}\n", action.identifier));
    lines.push_str(&format!("  Category:     {}\n", action.category));
    lines.push_str(&format!("  Occurrences:  {}\n", action.occurrence_count));
    if options.show_files && !action.files.is_empty() {
        lines.push_str(&format!("  Files:        {}\n", human_join(&action.files)));
    }
    if !action.repositories.is_empty() {
        lines.push_str(&format!(
            "  Repositories: {}\n",
            human_join(&action.repository_names())
        ));
    }
    lines.push('\n');

    lines
}

fn summary_lines(inventory: &Inventory) -> String {
    let mut lines = String::from("Summary\n");

    for category in Category::ALL {
        lines.push_str(&format!(
            "  {:<18} {:>5}\n",
            category.to_string(),
            inventory.totals.get(category)
        ));
    }
    lines.push_str(&format!("  {:<18} {:>5}\n\n", "Total", inventory.totals.total));

    lines
}

fn org_lines(org: &OrgInventory) -> String {
    let mut lines = String::from("Action usage across repositories\n");

    for usage in &org.action_usage {
        lines.push_str(&format!(
            "  {} | {} | {}\n",
            usage.identifier,
            repo_count_label(usage.repositories.len()),
            usage.repositories.join(", ")
        ));
    }
    lines.push('\n');

    lines.push_str("Actions per repository\n");
    for usage in &org.repository_usage {
        lines.push_str(&format!(
            "  {} | {} actions | {} references\n",
            usage.repository, usage.distinct_actions, usage.references
        ));
    }
    lines.push('\n');

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ReferenceSet;
    use crate::report::generate_markdown_report;
    use crate::report::tests::{metadata, organization_report, repository_report};
    use crate::report::build_repository_report;

    #[test]
    fn test_action_block() {
        let report = repository_report();
        let text = generate_text_report(&report, &ReportOptions::default());

        assert!(text.contains("GitHub Actions inventory for repository acme/app"));
        assert!(text.contains("actions/checkout@v4\n  Category:     GitHub Official\n  Occurrences:  2\n  Files:        ci.yml and release.yml\n"));
        assert!(text.contains("./build-action\n  Category:     Local Repository\n"));
        assert!(text.contains("composite-thing\n  Category:     Other/Composite\n"));
    }

    #[test]
    fn test_summary_totals() {
        let report = repository_report();
        let text = generate_text_report(&report, &ReportOptions::default());

        assert!(text.contains("  GitHub Official        1\n"));
        assert!(text.contains("  Total                  5\n"));
    }

    #[test]
    fn test_empty_scope() {
        let report = build_repository_report(metadata("acme/empty"), &ReferenceSet::new());
        let text = generate_text_report(&report, &ReportOptions::default());
        assert!(text.ends_with("No actions found.\n"));
    }

    #[test]
    fn test_org_tables() {
        let report = organization_report();
        let text = generate_text_report(&report, &ReportOptions::default());

        assert!(text.contains("  actions/cache@v3 | 2 repos | X, Y\n"));
        assert!(text.contains("  X | 2 actions | 2 references\n"));
        assert!(text.contains(&format!("{}\nY\n{}", RULE, RULE)));
    }

    #[test]
    fn test_renderings_agree() {
        let report = repository_report();
        let options = ReportOptions::default();
        let text = generate_text_report(&report, &options);
        let markdown = generate_markdown_report(&report, &options);

        for action in &report.inventory.actions {
            assert!(text.contains(&action.identifier));
            assert!(markdown.contains(&format!("`{}`", action.identifier)));
        }
    }
}
