//! Reference aggregation and statistics.
//!
//! This module groups extracted references by identifier and by
//! repository, and computes the per-category totals shown in reports.

use crate::models::{
    ActionReference, ActionRepositories, ActionSummary, Category, CategoryTotals, Inventory,
    OrgInventory, RepositoryCount, RepositoryUsage,
};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Append-only collection of references gathered across repositories.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    references: Vec<ActionReference>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reference: ActionReference) {
        self.references.push(reference);
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionReference> {
        self.references.iter()
    }

    /// References owned by one repository.
    pub fn for_repository<'a>(
        &'a self,
        repository: &'a str,
    ) -> impl Iterator<Item = &'a ActionReference> + 'a {
        self.references
            .iter()
            .filter(move |r| r.repository.as_deref() == Some(repository))
    }

    /// Distinct repositories, in order of first appearance.
    pub fn repositories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for repository in self.references.iter().filter_map(|r| r.repository.as_deref()) {
            if !seen.contains(&repository) {
                seen.push(repository);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ActionReference;
    type IntoIter = std::slice::Iter<'a, ActionReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Group references into one summary per distinct identifier.
///
/// The result is sorted by occurrence count, highest first. Ties keep the
/// order in which identifiers were first seen.
pub fn aggregate<'a, I>(references: I) -> Vec<ActionSummary>
where
    I: IntoIterator<Item = &'a ActionReference>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<ActionSummary> = Vec::new();

    for reference in references {
        let slot = *index
            .entry(reference.identifier.as_str())
            .or_insert_with(|| {
                summaries.push(ActionSummary {
                    identifier: reference.identifier.clone(),
                    category: Category::of(&reference.identifier),
                    occurrence_count: 0,
                    files: Vec::new(),
                    repositories: Vec::new(),
                });
                summaries.len() - 1
            });

        let summary = &mut summaries[slot];
        summary.occurrence_count += 1;

        if !summary.used_in_file(&reference.source_file) {
            summary.files.push(reference.source_file.clone());
        }

        if let Some(ref repository) = reference.repository {
            match summary
                .repositories
                .iter_mut()
                .find(|r| &r.repository == repository)
            {
                Some(entry) => entry.count += 1,
                None => summary.repositories.push(RepositoryCount {
                    repository: repository.clone(),
                    count: 1,
                }),
            }
        }
    }

    // sort_by_key is stable, which keeps first-seen order on ties
    summaries.sort_by_key(|s| Reverse(s.occurrence_count));
    summaries
}

/// Aggregate a scope and compute its category totals.
pub fn build_inventory<'a, I>(references: I) -> Inventory
where
    I: IntoIterator<Item = &'a ActionReference>,
{
    let actions = aggregate(references);
    let totals = CategoryTotals::from_summaries(&actions);
    Inventory { actions, totals }
}

/// Distinct actions used per repository, most actions first.
pub fn repository_usage<'a, I>(references: I) -> Vec<RepositoryUsage>
where
    I: IntoIterator<Item = &'a ActionReference>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, (Vec<&str>, usize)> = HashMap::new();

    for reference in references {
        let Some(repository) = reference.repository.as_deref() else {
            continue;
        };

        let (identifiers, count) = grouped.entry(repository).or_insert_with(|| {
            order.push(repository);
            (Vec::new(), 0)
        });

        *count += 1;
        if !identifiers.contains(&reference.identifier.as_str()) {
            identifiers.push(reference.identifier.as_str());
        }
    }

    let mut usage: Vec<RepositoryUsage> = order
        .into_iter()
        .map(|repository| {
            let (identifiers, references) = &grouped[repository];
            RepositoryUsage {
                repository: repository.to_string(),
                distinct_actions: identifiers.len(),
                references: *references,
            }
        })
        .collect();

    usage.sort_by_key(|u| Reverse(u.distinct_actions));
    usage
}

/// Repositories using each action, most widely used first.
pub fn action_repositories<'a, I>(references: I) -> Vec<ActionRepositories>
where
    I: IntoIterator<Item = &'a ActionReference>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut usage: Vec<ActionRepositories> = Vec::new();

    for reference in references {
        let Some(ref repository) = reference.repository else {
            continue;
        };

        let slot = *index
            .entry(reference.identifier.as_str())
            .or_insert_with(|| {
                usage.push(ActionRepositories {
                    identifier: reference.identifier.clone(),
                    repositories: Vec::new(),
                });
                usage.len() - 1
            });

        let entry = &mut usage[slot];
        if !entry.repositories.contains(repository) {
            entry.repositories.push(repository.clone());
        }
    }

    usage.sort_by_key(|u| Reverse(u.repositories.len()));
    usage
}

/// Build both organization projections from the shared reference set.
pub fn build_org_inventory(references: &ReferenceSet) -> OrgInventory {
    OrgInventory {
        action_usage: action_repositories(references),
        repository_usage: repository_usage(references),
    }
}

/// Join names for display: `a`, `a and b`, `a, b and c`.
pub fn human_join<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
