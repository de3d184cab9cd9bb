//! Search term derivation.
//!
//! The inverted index stores `(term, path)` postings derived from a fixed
//! per-note term set. The same tokenizer runs at index time and query time,
//! which is what makes prefix matching behave predictably.

use std::collections::BTreeSet;

use crate::models::{ExtractedLink, NoteMetadata};

/// Minimum token length; shorter tokens are never indexed or matched.
const MIN_TOKEN_CHARS: usize = 3;

/// Splits text into lowercase alphanumeric tokens, dropping tokens shorter
/// than three characters.
///
/// # Examples
///
/// ```rust
/// use cairn::index::tokenize;
///
/// assert_eq!(tokenize("Project Kick-off!"), vec!["project", "kick", "off"]);
/// assert_eq!(tokenize("a an of"), Vec::<String>::new());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(ToString::to_string)
        .collect()
}

/// Derives the full posting term set for one note: tokenized title, tags,
/// aliases, path segments, and link-context text.
#[must_use]
pub fn derive_terms(
    path: &str,
    metadata: &NoteMetadata,
    links: &[ExtractedLink],
) -> BTreeSet<String> {
    let mut terms: BTreeSet<String> = BTreeSet::new();

    terms.extend(tokenize(&metadata.title));
    for tag in &metadata.tags {
        terms.extend(tokenize(tag));
    }
    for alias in &metadata.aliases {
        terms.extend(tokenize(alias));
    }
    for segment in path.split('/') {
        terms.extend(tokenize(segment));
    }
    for link in links {
        terms.extend(tokenize(&link.context));
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Hello World", &["hello", "world"]; "basic split")]
    #[test_case("machine-learning", &["machine", "learning"]; "hyphen splits")]
    #[test_case("v2.1.0 notes", &["notes"]; "short tokens dropped")]
    #[test_case("UPPER lower MiXeD", &["upper", "lower", "mixed"]; "lowercased")]
    #[test_case("", &[]; "empty input")]
    #[test_case("ab cd ef", &[]; "all below minimum length")]
    fn test_tokenize(input: &str, expected: &[&str]) {
        assert_eq!(tokenize(input), expected);
    }

    #[test]
    fn test_derive_terms_covers_all_sources() {
        let metadata = NoteMetadata {
            title: "Project Alpha".to_string(),
            note_type: "blueprint".to_string(),
            tags: vec!["engineering".to_string()],
            aliases: vec!["skunkworks".to_string()],
            created: String::new(),
            modified: String::new(),
        };
        let links = vec![ExtractedLink {
            raw_text: "[[beta]]".to_string(),
            target: "beta".to_string(),
            display_text: "beta".to_string(),
            context: "compare with [[beta]] baseline".to_string(),
        }];

        let terms = derive_terms("entities/project/alpha", &metadata, &links);

        for expected in [
            "project",
            "alpha",
            "engineering",
            "skunkworks",
            "entities",
            "compare",
            "with",
            "beta",
            "baseline",
        ] {
            assert!(terms.contains(expected), "missing term: {expected}");
        }
        // The note type is not part of the fixed term set.
        assert!(!terms.contains("blueprint"));
    }

    #[test]
    fn test_derive_terms_deduplicates() {
        let metadata = NoteMetadata {
            title: "daily daily".to_string(),
            note_type: String::new(),
            tags: vec!["daily".to_string()],
            aliases: Vec::new(),
            created: String::new(),
            modified: String::new(),
        };

        let terms = derive_terms("daily/2026-02-24", &metadata, &[]);
        assert_eq!(terms.iter().filter(|t| t.as_str() == "daily").count(), 1);
        assert!(terms.contains("2026"));
    }
}
