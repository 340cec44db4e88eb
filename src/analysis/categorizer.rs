//! Action categorization.
//!
//! Rules are evaluated in order and the first match wins. The order
//! matters: `actions/checkout@v4` also contains `@`.

use crate::models::Category;

type Rule = (fn(&str) -> bool, Category);

const RULES: [Rule; 4] = [
    (is_official, Category::GitHubOfficial),
    (is_docker, Category::DockerImage),
    (is_local, Category::LocalRepository),
    (is_pinned_ref, Category::ThirdParty),
];

fn is_official(id: &str) -> bool {
    id.starts_with("actions/") || id.starts_with("github/")
}

fn is_docker(id: &str) -> bool {
    id.starts_with("docker://")
}

fn is_local(id: &str) -> bool {
    id.starts_with("./") || id.starts_with("../")
}

fn is_pinned_ref(id: &str) -> bool {
    id.contains('@')
}

impl Category {
    /// Categorize an action identifier.
    pub fn of(identifier: &str) -> Category {
        RULES
            .iter()
            .find(|(matches, _)| matches(identifier))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Other)
    }
}
