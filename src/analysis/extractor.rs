//! Extraction of `uses:` references from workflow text.
//!
//! Matching is line oriented: a line whose first key (after indentation
//! and an optional `- ` list marker) is `uses:` yields one reference.
//! Values are passed through without validating their syntax.

use crate::models::ActionReference;
use once_cell::sync::Lazy;
use regex::Regex;

static USES_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:-\s+)?uses:(.*)$").expect("uses: pattern is valid"));

/// Lazily extract every action reference from a workflow file.
///
/// Empty text produces no references. Lines whose value is empty after
/// trimming are skipped.
pub fn extract_references<'a>(
    text: &'a str,
    source_file: &'a str,
    repository: Option<&'a str>,
) -> impl Iterator<Item = ActionReference> + 'a {
    text.lines().filter_map(move |line| {
        let captures = USES_LINE.captures(line)?;
        let identifier = parse_value(captures.get(1)?.as_str())?;

        let reference = ActionReference::new(identifier, source_file);
        Some(match repository {
            Some(repository) => reference.in_repository(repository),
            None => reference,
        })
    })
}

/// Parse the raw text after `uses:` into an identifier.
fn parse_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    let value = match unquote(trimmed) {
        Some(inner) => inner.trim(),
        None => strip_comment(trimmed).trim(),
    };

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Returns the content of a single matching pair of enclosing quotes.
///
/// The closing quote is the last character of the value, or the last one
/// before a trailing comment.
fn unquote(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;

    std::iter::once(value)
        .chain(comment_starts(value).map(|i| value[..i].trim_end()))
        .find(|candidate| candidate.len() >= 2 && candidate.ends_with(quote))
        .map(|quoted| &quoted[1..quoted.len() - 1])
}

/// Cut a YAML comment: a `#` at the start or preceded by whitespace.
fn strip_comment(value: &str) -> &str {
    comment_starts(value).next().map_or(value, |i| &value[..i])
}

/// Byte offsets where a comment may start.
fn comment_starts(value: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = value.as_bytes();
    (0..bytes.len())
        .filter(move |&i| bytes[i] == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifiers(text: &str) -> Vec<String> {
        extract_references(text, "ci.yml", None)
            .map(|r| r.identifier)
            .collect()
    }

    #[test]
    fn test_indented_uses_line() {
        let refs: Vec<_> = extract_references("    uses: actions/checkout@v4", "ci.yml", None).collect();
        assert_eq!(refs, vec![ActionReference::new("actions/checkout@v4", "ci.yml")]);
    }

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(identifiers("uses: './build-action'"), vec!["./build-action"]);
        assert_eq!(identifiers("uses: \"docker://alpine:3\""), vec!["docker://alpine:3"]);
    }

    #[test]
    fn test_only_one_quote_pair_is_stripped() {
        assert_eq!(identifiers("uses: \"'nested'\""), vec!["'nested'"]);
    }

    #[test]
    fn test_inner_quote_is_kept() {
        assert_eq!(identifiers("uses: \"a\"b\""), vec!["a\"b"]);
        assert_eq!(identifiers("uses: 'it's/here@v1' # note"), vec!["it's/here@v1"]);
    }

    #[test]
    fn test_unbalanced_quote_passes_through() {
        assert_eq!(identifiers("uses: 'broken"), vec!["'broken"]);
    }

    #[test]
    fn test_step_list_marker() {
        let text = "\
steps:
  - uses: actions/checkout@v4
  - name: Setup
    uses: actions/setup-node@v3
    with:
      node-version: 20
";
        assert_eq!(
            identifiers(text),
            vec!["actions/checkout@v4", "actions/setup-node@v3"]
        );
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let text = "uses:\nuses:   \nuses: ''\nuses: \"  \"\nuses: # later";
        assert!(identifiers(text).is_empty());
    }

    #[test]
    fn test_trailing_comment_is_removed() {
        assert_eq!(
            identifiers("- uses: actions/checkout@8e5e7e5ab8b370d6c329ec480221332ada57f0ab # v3.5.2"),
            vec!["actions/checkout@8e5e7e5ab8b370d6c329ec480221332ada57f0ab"]
        );
        assert_eq!(
            identifiers("uses: 'octo/act@v1' # pinned"),
            vec!["octo/act@v1"]
        );
    }

    #[test]
    fn test_malformed_values_pass_through() {
        assert_eq!(identifiers("uses: not a real action"), vec!["not a real action"]);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let text = "name: uses: nothing\n# uses: commented/out@v1\nrun: echo uses: x";
        assert!(identifiers(text).is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_references("", "ci.yml", None).count(), 0);
    }

    #[test]
    fn test_repository_is_attached() {
        let refs: Vec<_> =
            extract_references("uses: actions/cache@v3", "ci.yml", Some("acme/x")).collect();
        assert_eq!(refs[0].repository.as_deref(), Some("acme/x"));
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            identifiers("uses: actions/checkout@v4\r\nuses: actions/cache@v3\r\n"),
            vec!["actions/checkout@v4", "actions/cache@v3"]
        );
    }
}
