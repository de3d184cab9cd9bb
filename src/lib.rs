//! # Cairn
//!
//! A markdown knowledge store for AI agents.
//!
//! Cairn stores plain markdown documents with YAML frontmatter, extracts
//! WikiLink cross-references, and maintains a per-workspace SQLite index
//! providing full-text search, a directed link graph with alias resolution,
//! and prefix listing.
//!
//! ## Features
//!
//! - Documents are the source of truth; the index is a rebuildable cache
//! - Section-aware patch operations on markdown bodies
//! - Workspace-isolated storage: one document set and one index per tenant
//! - Prefix-matched inverted-index search over titles, tags, aliases,
//!   path segments, and link context
//!
//! ## Example
//!
//! ```rust,ignore
//! use cairn::{CairnConfig, WorkspaceService, WriteRequest};
//!
//! let config = CairnConfig::load()?;
//! let service = WorkspaceService::open(&config, "team-a")?;
//! let result = service.write(&WriteRequest {
//!     path: "entities/person/jamie".to_string(),
//!     content: "# Jamie\nWorks with [[entities/company/acme|Acme]].".to_string(),
//!     ..Default::default()
//! })?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod engine;
pub mod index;
pub mod markdown;
pub mod models;
pub mod observability;
pub mod service;
pub mod storage;

// Re-exports for convenience
pub use config::CairnConfig;
pub use engine::{DocumentEngine, PatchOp, PatchRequest, WriteRequest};
pub use index::{WorkspaceIndex, WorkspaceRegistry};
pub use models::{
    ExtractedLink, Frontmatter, IndexedNote, LinkDirection, LinkNeighbor, ListQuery, Note,
    NoteMetadata, Page, SearchHit, SearchQuery, SortOrder,
};
pub use service::{DailyOp, DailyRequest, WorkspaceService};
pub use storage::{BlobStore, FilesystemBlobStore, MemoryBlobStore};

/// Error type for cairn operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
/// `Display` renders the stable boundary tag followed by the human message,
/// which is the exact shape the tool layer returns to callers.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | Missing required parameters (e.g. `find` for replace, `section` for section ops), undecodable cursors |
/// | `NotFound` | Target document, section, or find-substring absent |
/// | `Conflict` | Ambiguous replace (multiple matches), alias already claimed by a different path |
/// | `OperationFailed` | Filesystem I/O errors, database queries fail, YAML serialization fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required parameter was missing or malformed.
    ///
    /// Raised when:
    /// - `replace` is requested without a `find` parameter
    /// - A section operation is requested without a `section` parameter
    /// - A search call provides no filter at all
    /// - A pagination cursor cannot be decoded
    #[error("validation_error: {0}")]
    Validation(String),

    /// The target does not exist.
    ///
    /// Raised when:
    /// - A read/patch/links call addresses a document with no blob
    /// - A section operation names a heading absent from the body
    /// - A `replace` finds zero occurrences of its substring
    /// - An alias lookup has no mapping
    #[error("not_found: {0}")]
    NotFound(String),

    /// The operation is ambiguous or collides with existing index state.
    ///
    /// Raised when:
    /// - A `replace` substring occurs more than once
    /// - A write claims an alias already owned by a different canonical path
    #[error("conflict: {0}")]
    Conflict(String),

    /// An operation failed unexpectedly.
    ///
    /// Raised when:
    /// - `SQLite` statements fail
    /// - Filesystem I/O errors occur
    /// - Frontmatter serialization fails
    #[error("internal_error: operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns the stable boundary tag for this error.
    ///
    /// Tags are part of the external contract and never change:
    /// `validation_error`, `not_found`, `conflict`, `internal_error`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::OperationFailed { .. } => "internal_error",
        }
    }

    /// Returns the human-readable message without the kind tag.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) | Self::NotFound(message) | Self::Conflict(message) => {
                message.clone()
            },
            Self::OperationFailed { operation, cause } => {
                format!("operation '{operation}' failed: {cause}")
            },
        }
    }
}

/// Result type alias for cairn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current UTC time as an RFC 3339 string with millisecond
/// precision and a trailing `Z`.
///
/// This is the single timestamp format used for `created`/`modified`
/// frontmatter fields and index rows. Millisecond precision with a fixed
/// `Z` suffix keeps lexicographic ordering equal to chronological ordering,
/// which the `modified_since` search filter relies on.
///
/// # Examples
///
/// ```rust
/// let ts = cairn::current_timestamp();
/// assert!(ts.ends_with('Z'));
/// ```
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("find parameter is required".to_string());
        assert_eq!(
            err.to_string(),
            "validation_error: find parameter is required"
        );

        let err = Error::NotFound("note not found: daily/2026-01-01".to_string());
        assert_eq!(err.to_string(), "not_found: note not found: daily/2026-01-01");

        let err = Error::OperationFailed {
            operation: "search".to_string(),
            cause: "disk I/O error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "internal_error: operation 'search' failed: disk I/O error"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Validation(String::new()).kind(), "validation_error");
        assert_eq!(Error::NotFound(String::new()).kind(), "not_found");
        assert_eq!(Error::Conflict(String::new()).kind(), "conflict");
        assert_eq!(
            Error::OperationFailed {
                operation: String::new(),
                cause: String::new(),
            }
            .kind(),
            "internal_error"
        );
    }

    #[test]
    fn test_current_timestamp_format() {
        let ts = current_timestamp();
        assert!(ts.ends_with('Z'));
        // RFC 3339 with milliseconds: 2026-02-24T10:30:00.000Z
        assert_eq!(ts.len(), 24);
    }
}
