//! Workspace service: the operation surface over engine + index.
//!
//! A [`WorkspaceService`] binds one workspace to a document engine and that
//! workspace's index, and sequences the two according to the consistency
//! contract: writes check alias conflicts before committing anything, patches
//! re-check once after the document commit, deletes clean the index
//! unconditionally, and `rebuild_index` regenerates every derived row from
//! the stored documents.

mod daily;

pub use daily::{DailyOp, DailyRequest, DailyResult};

use std::sync::Arc;
use std::time::Instant;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::instrument;

use crate::config::CairnConfig;
use crate::engine::{DocumentEngine, PatchOutcome, PatchRequest, WriteRequest};
use crate::index::{AliasConflict, WorkspaceIndex, WorkspaceRegistry};
use crate::markdown::extract_section;
use crate::models::{
    ExtractedLink, Frontmatter, IndexedNote, LinkDirection, LinksResult, ListQuery, NoteMetadata,
    Page, SearchHit, SearchQuery,
};
use crate::storage::{BlobStore, FilesystemBlobStore};
use crate::{Error, Result, current_timestamp};

/// Result of a write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    /// Document path.
    pub path: String,
    /// Whether no document previously existed at this path.
    pub created: bool,
    /// Number of WikiLinks extracted from the body.
    pub links_extracted: usize,
}

/// Result of a delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    /// Document path.
    pub path: String,
    /// Whether a document existed to delete.
    pub deleted: bool,
}

/// Result of an index rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildResult {
    /// Number of documents successfully re-indexed.
    pub notes_indexed: usize,
}

/// A document read, optionally narrowed to a section or metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ReadResult {
    /// Document path.
    pub path: String,
    /// Parsed metadata header.
    pub frontmatter: Frontmatter,
    /// Body text; the named section's content when one was requested,
    /// absent entirely for metadata-only reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// WikiLinks extracted from the full body.
    pub links: Vec<ExtractedLink>,
    /// Paths of notes with an edge into this one.
    pub backlinks: Vec<String>,
}

/// One workspace's operation surface.
pub struct WorkspaceService {
    workspace: String,
    engine: DocumentEngine,
    index: Arc<WorkspaceIndex>,
    timezone: Tz,
}

impl WorkspaceService {
    /// Creates a service from pre-built parts.
    #[must_use]
    pub fn new(
        workspace: impl Into<String>,
        store: Arc<dyn BlobStore>,
        index: Arc<WorkspaceIndex>,
        timezone: Tz,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            engine: DocumentEngine::new(store),
            index,
            timezone,
        }
    }

    /// Opens a service for a workspace using the configured storage layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob root or index database cannot be
    /// opened, or the configured timezone is invalid.
    pub fn open(config: &CairnConfig, workspace: &str) -> Result<Self> {
        let store: Arc<dyn BlobStore> = Arc::new(FilesystemBlobStore::new(config.blob_root())?);
        let index = WorkspaceRegistry::shared(config.index_root()).get_or_open(workspace)?;
        Ok(Self::new(workspace, store, index, config.timezone()?))
    }

    /// Returns the workspace this service operates on.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Creates or replaces a document and updates the index.
    ///
    /// Sequencing: stage (parse, merge, stamp, serialize), check alias
    /// conflicts against the index, commit the blob, then apply the index
    /// update. A conflicted write changes nothing anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] when a requested alias is owned by a
    /// different path, plus any engine or index error.
    #[instrument(skip(self, request), fields(workspace = %self.workspace, path = %request.path))]
    pub fn write(&self, request: &WriteRequest) -> Result<WriteResult> {
        let start = Instant::now();
        let result = (|| {
            let staged = self.engine.stage_write(&self.workspace, request)?;

            let conflicts = self
                .index
                .check_alias_conflicts(&staged.path, &staged.metadata.aliases)?;
            if !conflicts.is_empty() {
                return Err(alias_conflict_error(&conflicts, false));
            }

            self.engine.commit_write(&self.workspace, &staged)?;
            self.index
                .note_updated(&staged.path, &staged.metadata, &staged.links)?;

            Ok(WriteResult {
                path: staged.path,
                created: staged.created_new,
                links_extracted: staged.links.len(),
            })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("write", start, status);
        result
    }

    /// Applies a body patch and updates the index.
    ///
    /// The alias check runs again after the document commit: the patch may
    /// have been staged against index state that changed underneath it. On
    /// a post-commit conflict the document stays saved, the index is left
    /// untouched, and the error says so.
    ///
    /// # Errors
    ///
    /// Returns the engine's validation/not-found/conflict errors,
    /// [`Error::Conflict`] on the post-commit alias check, plus any index
    /// error.
    #[instrument(skip(self, request), fields(workspace = %self.workspace, path = %request.path, op = request.op.as_str()))]
    pub fn patch(&self, request: &PatchRequest) -> Result<PatchOutcome> {
        let start = Instant::now();
        let result = (|| {
            let outcome = self.engine.patch(&self.workspace, request)?;

            let conflicts = self
                .index
                .check_alias_conflicts(&outcome.path, &outcome.metadata.aliases)?;
            if !conflicts.is_empty() {
                return Err(alias_conflict_error(&conflicts, true));
            }

            self.index
                .note_updated(&outcome.path, &outcome.metadata, &outcome.links)?;
            Ok(outcome)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("patch", start, status);
        result
    }

    /// Reads a document, with optional section or metadata-only narrowing.
    ///
    /// `metadata_only` wins over `section`. Backlinks come from the index
    /// and reflect its current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing document or section.
    #[instrument(skip(self), fields(workspace = %self.workspace, path = %path))]
    pub fn read(
        &self,
        path: &str,
        section: Option<&str>,
        metadata_only: bool,
    ) -> Result<ReadResult> {
        let note = self.engine.read(&self.workspace, path)?;
        let backlinks = self.index.backlinks(path)?;

        let body = if metadata_only {
            None
        } else {
            match section {
                Some(heading) => Some(extract_section(&note.body, heading).ok_or_else(|| {
                    Error::NotFound(format!("section not found: {heading}"))
                })?),
                None => Some(note.body),
            }
        };

        Ok(ReadResult {
            path: note.path,
            frontmatter: note.frontmatter,
            body,
            links: note.links,
            backlinks,
        })
    }

    /// Deletes a document and removes it from the index.
    ///
    /// The index cleanup runs even when no blob existed; a stray index row
    /// with no document behind it is exactly the drift this removes.
    ///
    /// # Errors
    ///
    /// Returns any engine or index error.
    #[instrument(skip(self), fields(workspace = %self.workspace, path = %path))]
    pub fn delete(&self, path: &str) -> Result<DeleteResult> {
        let start = Instant::now();
        let result = (|| {
            let deleted = self.engine.delete(&self.workspace, path)?;
            self.index.note_deleted(path)?;
            Ok(DeleteResult {
                path: path.to_string(),
                deleted,
            })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("delete", start, status);
        result
    }

    /// Searches the workspace index.
    ///
    /// # Errors
    ///
    /// See [`WorkspaceIndex::search`].
    pub fn search(&self, query: &SearchQuery) -> Result<Page<SearchHit>> {
        self.index.search(query)
    }

    /// Lists notes from the workspace index.
    ///
    /// # Errors
    ///
    /// See [`WorkspaceIndex::list_notes`].
    pub fn list(&self, query: &ListQuery) -> Result<Page<IndexedNote>> {
        self.index.list_notes(query)
    }

    /// Traverses the link graph from a note.
    ///
    /// # Errors
    ///
    /// See [`WorkspaceIndex::get_links`].
    pub fn links(&self, path: &str, depth: usize, direction: LinkDirection) -> Result<LinksResult> {
        self.index.get_links(path, depth, direction)
    }

    /// Rebuilds the index from the stored documents.
    ///
    /// Clears every derived row, then pages through the blob listing and
    /// replays the index update for each parseable document. Unreadable
    /// blobs are logged and skipped so one corrupt document cannot block
    /// recovery. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns any index or listing error.
    #[instrument(skip(self), fields(workspace = %self.workspace))]
    pub fn rebuild_index(&self) -> Result<RebuildResult> {
        let start = Instant::now();
        let result = (|| {
            self.index.clear()?;

            let mut notes_indexed = 0usize;
            let mut cursor: Option<String> = None;
            loop {
                let page = self.engine.list_paths(&self.workspace, cursor.as_deref())?;

                for path in &page.items {
                    match self.engine.read(&self.workspace, path) {
                        Ok(note) => {
                            let now = current_timestamp();
                            let metadata =
                                NoteMetadata::from_frontmatter(path, &note.frontmatter, &now);
                            self.index.note_updated(path, &metadata, &note.links)?;
                            notes_indexed += 1;
                        },
                        Err(err) => {
                            tracing::warn!(path = %path, error = %err, "skipping unreadable note during rebuild");
                        },
                    }
                }

                if !page.truncated {
                    break;
                }
                // A truncated page without a cursor cannot make progress.
                match page.cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }

            tracing::info!(workspace = %self.workspace, notes_indexed, "index rebuilt");
            Ok(RebuildResult { notes_indexed })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("rebuild_index", start, status);
        result
    }
}

fn alias_conflict_error(conflicts: &[AliasConflict], document_saved: bool) -> Error {
    let detail = conflicts
        .iter()
        .map(|c| format!("alias '{}' is already used by {}", c.alias, c.existing_path))
        .collect::<Vec<_>>()
        .join("; ");

    if document_saved {
        Error::Conflict(format!(
            "{detail}; note content was saved but the index was not updated"
        ))
    } else {
        Error::Conflict(detail)
    }
}

fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "cairn_service_operations_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "cairn_service_operation_duration_ms",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}
