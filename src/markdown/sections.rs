//! Section-aware markdown editing.
//!
//! Section parameters use heading text without the `#` prefix. The first
//! heading whose text matches case-insensitively is targeted; duplicate
//! headings further down are never considered. A section's content runs
//! from the line after its heading to the next heading of equal or higher
//! rank, or end of document.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("static regex: heading"));

/// Line range of a located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SectionRange {
    /// First content line (the line after the heading).
    content_start: usize,
    /// End of content, exclusive.
    content_end: usize,
}

fn find_section(lines: &[&str], heading_text: &str) -> Option<SectionRange> {
    let target = heading_text.trim().to_lowercase();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };
        let (Some(hashes), Some(text)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if text.as_str().trim().to_lowercase() != target {
            continue;
        }

        let level = hashes.len();
        let content_start = i + 1;
        let content_end = lines[content_start..]
            .iter()
            .position(|l| {
                HEADING_RE
                    .captures(l)
                    .and_then(|c| c.get(1))
                    .is_some_and(|h| h.len() <= level)
            })
            .map_or(lines.len(), |p| content_start + p);

        return Some(SectionRange {
            content_start,
            content_end,
        });
    }

    None
}

/// Returns a section's content as text, or `None` when no heading matches.
///
/// # Examples
///
/// ```rust
/// use cairn::markdown::extract_section;
///
/// let body = "# Notes\nintro\n## Open\n- item\n# Done\nclosed";
/// assert_eq!(extract_section(body, "Open"), Some("- item".to_string()));
/// assert_eq!(extract_section(body, "Missing"), None);
/// ```
#[must_use]
pub fn extract_section(body: &str, heading_text: &str) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    let section = find_section(&lines, heading_text)?;

    Some(lines[section.content_start..section.content_end].join("\n"))
}

/// Inserts content at the end of a section.
///
/// A blank separator line is added before the content when the section ends
/// with a non-blank line, and after it when more document follows. Returns
/// `None` when no heading matches.
#[must_use]
pub fn append_to_section(body: &str, heading_text: &str, content: &str) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    let section = find_section(&lines, heading_text)?;

    let section_content = &lines[section.content_start..section.content_end];
    let needs_blank_line = section_content
        .last()
        .is_some_and(|last| !last.trim().is_empty());

    let mut parts: Vec<&str> = lines[..section.content_end].to_vec();
    if needs_blank_line {
        parts.push("");
    }
    parts.push(content);
    if section.content_end < lines.len() {
        parts.push("");
    }
    parts.extend_from_slice(&lines[section.content_end..]);

    Some(parts.join("\n"))
}

/// Inserts content as the first line(s) of a section, directly after the
/// heading line. Returns `None` when no heading matches.
#[must_use]
pub fn prepend_to_section(body: &str, heading_text: &str, content: &str) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    let section = find_section(&lines, heading_text)?;

    let mut parts: Vec<&str> = lines[..section.content_start].to_vec();
    parts.push(content);
    parts.extend_from_slice(&lines[section.content_start..]);

    Some(parts.join("\n"))
}
