//! Blob store trait and shared types.

use crate::Result;

/// Custom metadata attached to every stored document.
///
/// Mirrors the document's resolved frontmatter for out-of-band introspection
/// by collaborators that can read object metadata without fetching bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    /// Resolved display title.
    pub title: String,
    /// Note type, empty string when unset.
    pub note_type: String,
    /// Comma-joined tag set.
    pub tags: String,
    /// Last-modification timestamp (RFC 3339, UTC).
    pub modified: String,
}

/// One page of a prefix listing.
#[derive(Debug, Clone)]
pub struct BlobPage {
    /// Document paths on this page, in lexicographic order.
    pub items: Vec<String>,
    /// Whether further pages exist.
    pub truncated: bool,
    /// Cursor resuming after this page; present only when `truncated`.
    pub cursor: Option<String>,
}

/// Durable document storage addressed by `(workspace, path)`.
///
/// Writes are last-write-wins: there is no optimistic concurrency token,
/// and concurrent writers to the same path race at this layer.
pub trait BlobStore: Send + Sync {
    /// Fetches a document's raw bytes.
    ///
    /// Returns `Ok(None)` when no document exists at the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage read fails.
    fn get(&self, workspace: &str, path: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a document, replacing any existing content at the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage write fails.
    fn put(
        &self,
        workspace: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &BlobMetadata,
    ) -> Result<()>;

    /// Returns whether a document exists at the path, without fetching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage check fails.
    fn head(&self, workspace: &str, path: &str) -> Result<bool>;

    /// Removes a document. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage delete fails.
    fn delete(&self, workspace: &str, path: &str) -> Result<bool>;

    /// Lists document paths in a workspace, one bounded page at a time.
    ///
    /// Pass the cursor from a truncated page to resume; callers must loop
    /// until `truncated` is false. No total-count upper bound is assumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage listing fails, or
    /// [`crate::Error::Validation`] for an undecodable cursor.
    fn list(&self, workspace: &str, cursor: Option<&str>) -> Result<BlobPage>;
}
