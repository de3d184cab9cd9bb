//! Note types: frontmatter, parsed documents, and index rows.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::link::ExtractedLink;

/// Structured metadata header of a markdown document.
///
/// Reserved keys are modeled as fields; anything else lands in `extra` and
/// round-trips untouched. `tags` and `aliases` written as a single scalar
/// are coerced to one-element arrays on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Display title. Derived from the last path segment when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form note type (e.g. `person`, `project`, `daily`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,
    /// Tag set.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "scalar_or_seq"
    )]
    pub tags: Vec<String>,
    /// Alternate names this note can be linked by.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "scalar_or_seq"
    )]
    pub aliases: Vec<String>,
    /// Creation timestamp (RFC 3339, UTC). Set once, never overwritten.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last-modification timestamp (RFC 3339, UTC). Refreshed on every mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// All non-reserved keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

/// Accepts either a bare scalar or a sequence, producing a vector either way.
fn scalar_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScalarOrSeq {
        Scalar(String),
        Seq(Vec<String>),
    }

    Ok(match ScalarOrSeq::deserialize(deserializer)? {
        ScalarOrSeq::Scalar(s) => vec![s],
        ScalarOrSeq::Seq(v) => v,
    })
}

impl Frontmatter {
    /// Creates an empty frontmatter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the note type.
    #[must_use]
    pub fn with_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    /// Sets the tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the alias set.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Merges additional tags and aliases as a set union, preserving the
    /// order of existing entries and appending new ones in argument order.
    pub fn merge_overrides(&mut self, tags: &[String], aliases: &[String]) {
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
        for alias in aliases {
            if !self.aliases.contains(alias) {
                self.aliases.push(alias.clone());
            }
        }
    }
}

/// A parsed document: its path, metadata header, body, and the WikiLinks
/// extracted from that body.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    /// Document path within the workspace (no extension).
    pub path: String,
    /// Parsed metadata header.
    pub frontmatter: Frontmatter,
    /// Raw body text after the frontmatter block.
    pub body: String,
    /// WikiLinks found in the body, in document order.
    pub links: Vec<ExtractedLink>,
}

/// Normalized metadata the document engine hands to the index after a
/// mutation. All fields are resolved; `title` falls back to the path.
#[derive(Debug, Clone, Serialize)]
pub struct NoteMetadata {
    /// Resolved display title.
    pub title: String,
    /// Note type, empty string when unset.
    pub note_type: String,
    /// Tag set.
    pub tags: Vec<String>,
    /// Alias set.
    pub aliases: Vec<String>,
    /// Creation timestamp (RFC 3339, UTC).
    pub created: String,
    /// Last-modification timestamp (RFC 3339, UTC).
    pub modified: String,
}

impl NoteMetadata {
    /// Builds index metadata from merged frontmatter, filling defaults the
    /// same way the write path persists them.
    #[must_use]
    pub fn from_frontmatter(path: &str, frontmatter: &Frontmatter, now: &str) -> Self {
        Self {
            title: frontmatter
                .title
                .clone()
                .unwrap_or_else(|| path.to_string()),
            note_type: frontmatter.note_type.clone().unwrap_or_default(),
            tags: frontmatter.tags.clone(),
            aliases: frontmatter.aliases.clone(),
            created: frontmatter.created.clone().unwrap_or_else(|| now.to_string()),
            modified: frontmatter.modified.clone().unwrap_or_else(|| now.to_string()),
        }
    }
}

/// One row of the per-workspace `notes` relation.
///
/// Exists if and only if the corresponding document exists; regenerated
/// wholesale by an index rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedNote {
    /// Document path (unique key).
    pub path: String,
    /// Display title.
    pub title: String,
    /// Note type, empty string when unset.
    #[serde(rename = "type")]
    pub note_type: String,
    /// Tag set.
    pub tags: Vec<String>,
    /// Alias set.
    pub aliases: Vec<String>,
    /// Creation timestamp (RFC 3339, UTC).
    pub created: String,
    /// Last-modification timestamp (RFC 3339, UTC).
    pub modified: String,
}
