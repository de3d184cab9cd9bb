//! WikiLink extraction.
//!
//! Scans document bodies for `[[target]]` / `[[target|display]]`
//! references, normalizes targets to slugs, and captures context snippets.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ExtractedLink;

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("static regex: wikilink"));

/// Characters of surrounding text captured on each side of a link.
const CONTEXT_CHARS: usize = 50;

/// Normalizes a link target to a slug.
///
/// Targets containing `/` are treated as paths: each segment is slugified
/// independently and the structure is preserved. Everything else is
/// slugified whole (lowercase, non `[a-z0-9-]` replaced with `-`, runs
/// collapsed, edges trimmed).
///
/// # Examples
///
/// ```rust
/// use cairn::markdown::normalize_target;
///
/// assert_eq!(normalize_target("Jamie Wilson"), "jamie-wilson");
/// assert_eq!(
///     normalize_target("Entities/Person/Jamie Wilson"),
///     "entities/person/jamie-wilson"
/// );
/// ```
#[must_use]
pub fn normalize_target(target: &str) -> String {
    if target.contains('/') {
        target
            .split('/')
            .map(slugify)
            .collect::<Vec<_>>()
            .join("/")
    } else {
        slugify(target)
    }
}

fn slugify(segment: &str) -> String {
    let lowered = segment.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_dash = false;
    for c in lowered.trim().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' {
            if !prev_dash {
                out.push('-');
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out.trim_matches('-').to_string()
}

/// Extracts every WikiLink from a body, in document order.
///
/// Duplicate targets are all reported; deduplication is an index concern.
/// Each link carries a context snippet of up to 50 characters on each side
/// of the match, with newlines collapsed to spaces.
#[must_use]
pub fn extract_wikilinks(body: &str) -> Vec<ExtractedLink> {
    let mut links = Vec::new();

    for cap in WIKILINK_RE.captures_iter(body) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        // Aliased links: [[target|display]], split at the first pipe.
        let (target_text, display) = match inner.as_str().split_once('|') {
            Some((target, display)) => (target.trim(), display.trim()),
            None => {
                let trimmed = inner.as_str().trim();
                (trimmed, trimmed)
            }
        };

        links.push(ExtractedLink {
            raw_text: whole.as_str().to_string(),
            target: normalize_target(target_text),
            display_text: display.to_string(),
            context: context_snippet(body, whole.start(), whole.end()),
        });
    }

    links
}

/// Returns up to `CONTEXT_CHARS` characters either side of the byte range
/// `start..end`, staying on character boundaries.
fn context_snippet(body: &str, start: usize, end: usize) -> String {
    let from = body[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = body[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(body.len(), |(i, _)| end + i);

    body[from..to].replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Jamie Wilson", "jamie-wilson"; "spaces to hyphens")]
    #[test_case("Acme Corp!", "acme-corp"; "special chars stripped")]
    #[test_case("ALREADY-SLUG", "already-slug"; "lowercased")]
    #[test_case("a  --  b", "a-b"; "runs collapsed")]
    #[test_case("  padded  ", "padded"; "edges trimmed")]
    #[test_case("Café", "caf"; "non-ascii replaced then trimmed")]
    #[test_case("entities/person/Jamie Wilson", "entities/person/jamie-wilson"; "path segments slugified independently")]
    #[test_case("Daily/2026-02-24", "daily/2026-02-24"; "dates survive")]
    fn test_normalize_target(input: &str, expected: &str) {
        assert_eq!(normalize_target(input), expected);
    }

    #[test]
    fn test_extract_simple_link() {
        let links = extract_wikilinks("See [[Jamie Wilson]] for details.");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].raw_text, "[[Jamie Wilson]]");
        assert_eq!(links[0].target, "jamie-wilson");
        assert_eq!(links[0].display_text, "Jamie Wilson");
    }

    #[test]
    fn test_extract_aliased_link() {
        let links = extract_wikilinks("Works at [[entities/company/acme|Acme]].");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "entities/company/acme");
        assert_eq!(links[0].display_text, "Acme");
    }

    #[test]
    fn test_extract_multiple_in_order() {
        let links = extract_wikilinks("[[b]] then [[a]] then [[b]]");
        let targets: Vec<_> = links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_unclosed_brackets_ignored() {
        assert!(extract_wikilinks("nothing [[here").is_empty());
        assert!(extract_wikilinks("no links at all").is_empty());
    }

    #[test]
    fn test_first_pipe_wins() {
        let links = extract_wikilinks("[[a|b|c]]");
        assert_eq!(links[0].target, "a");
        assert_eq!(links[0].display_text, "b|c");
    }

    #[test]
    fn test_context_collapses_newlines() {
        let links = extract_wikilinks("line one\nsee [[target]]\nline three");
        assert_eq!(links[0].context, "line one see [[target]] line three");
    }

    #[test]
    fn test_context_bounded_at_fifty_chars() {
        let prefix = "x".repeat(80);
        let suffix = "y".repeat(80);
        let body = format!("{prefix}[[t]]{suffix}");
        let links = extract_wikilinks(&body);

        let expected = format!("{}[[t]]{}", "x".repeat(50), "y".repeat(50));
        assert_eq!(links[0].context, expected);
    }

    #[test]
    fn test_context_handles_multibyte_neighbors() {
        let prefix = "é".repeat(60);
        let body = format!("{prefix}[[t]] fin");
        let links = extract_wikilinks(&body);

        let expected = format!("{}[[t]] fin", "é".repeat(50));
        assert_eq!(links[0].context, expected);
    }
}
