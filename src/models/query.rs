//! Query types and pagination for index reads.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::note::IndexedNote;

/// Default page size for search and list queries.
pub const DEFAULT_LIMIT: usize = 20;

/// Filter criteria for a workspace search.
///
/// At least one of `query`, `tags`, `path_prefix`, `backlinks_to`, or
/// `modified_since` must be set; a fully unfiltered search is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query, prefix-matched against indexed terms.
    pub query: Option<String>,
    /// Tags that must all literally appear in a note's tag set.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Restrict to paths starting with this prefix.
    pub path_prefix: Option<String>,
    /// Restrict to notes linking to this path.
    pub backlinks_to: Option<String>,
    /// Restrict to notes modified at or after this RFC 3339 timestamp.
    pub modified_since: Option<String>,
    /// Maximum number of results per page.
    pub limit: usize,
    /// Opaque resumption cursor from a previous page.
    pub cursor: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: None,
            tags: Vec::new(),
            path_prefix: None,
            backlinks_to: None,
            modified_since: None,
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

impl SearchQuery {
    /// Creates an empty query with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds a required tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the path prefix filter.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Sets the backlink filter.
    #[must_use]
    pub fn with_backlinks_to(mut self, path: impl Into<String>) -> Self {
        self.backlinks_to = Some(path.into());
        self
    }

    /// Sets the modified-since filter.
    #[must_use]
    pub fn with_modified_since(mut self, since: impl Into<String>) -> Self {
        self.modified_since = Some(since.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Returns true if no filter at all is set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_none()
            && self.tags.is_empty()
            && self.path_prefix.is_none()
            && self.backlinks_to.is_none()
            && self.modified_since.is_none()
    }
}

/// Sort order for note listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently modified first.
    #[default]
    Modified,
    /// Most recently created first.
    Created,
    /// Lexicographic path order.
    Path,
}

impl SortOrder {
    /// Returns the sort order as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Created => "created",
            Self::Path => "path",
        }
    }

    /// Parses a sort order from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "modified" => Some(Self::Modified),
            "created" => Some(Self::Created),
            "path" => Some(Self::Path),
            _ => None,
        }
    }
}

/// Parameters for a prefix listing of notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    /// Restrict to paths starting with this prefix.
    pub path_prefix: Option<String>,
    /// When false, only direct children of the prefix are returned
    /// (no additional `/` past the prefix).
    pub recursive: bool,
    /// Sort order.
    pub sort: SortOrder,
    /// Maximum number of results per page.
    pub limit: usize,
    /// Opaque resumption cursor from a previous page.
    pub cursor: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            path_prefix: None,
            recursive: false,
            sort: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

impl ListQuery {
    /// Creates a listing query with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path prefix.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Enables recursive listing.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One page of query results.
///
/// `cursor` is present only when further pages exist; feeding it back into
/// the same query resumes where this page ended. A cursor is only valid for
/// the query shape that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of matches across all pages.
    pub total_count: usize,
    /// Resumption cursor, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A single search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matching note's index row.
    #[serde(flatten)]
    pub note: IndexedNote,
    /// Edge context, populated for backlink queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Encodes a numeric offset as an opaque cursor.
#[must_use]
pub fn encode_cursor(offset: usize) -> String {
    base64::engine::general_purpose::STANDARD.encode(offset.to_string())
}

/// Decodes an opaque cursor back to a numeric offset.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the cursor is not valid base64 or does
/// not contain a number.
pub fn decode_cursor(cursor: &str) -> Result<usize> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cursor)
        .map_err(|_| Error::Validation(format!("invalid cursor: {cursor}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| Error::Validation(format!("invalid cursor: {cursor}")))?;
    text.parse::<usize>()
        .map_err(|_| Error::Validation(format!("invalid cursor: {cursor}")))
}
