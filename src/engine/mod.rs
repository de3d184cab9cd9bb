//! Document engine: the write, patch, and read paths over raw blobs.
//!
//! The engine owns everything between request payloads and stored bytes:
//! frontmatter parsing and merging, timestamp stamping, WikiLink extraction,
//! and the section-aware body edits. It talks to a [`BlobStore`] and knows
//! nothing about the index; callers sequence index updates around it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::markdown::{
    FrontmatterCodec, append_to_section, extract_wikilinks, prepend_to_section,
};
use crate::models::{ExtractedLink, Frontmatter, Note, NoteMetadata};
use crate::storage::{BlobMetadata, BlobPage, BlobStore, is_safe_segment_path};
use crate::{Error, Result, current_timestamp};

/// Content type stamped on every stored document.
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Payload for creating or replacing a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Document path within the workspace.
    pub path: String,
    /// Full markdown content, optionally starting with a frontmatter block.
    pub content: String,
    /// Tags merged into the content's frontmatter as a set union.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Aliases merged into the content's frontmatter as a set union.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A targeted edit applied to a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    /// Append content to the end of the body.
    Append,
    /// Prepend content before the body.
    Prepend,
    /// Replace one exact occurrence of `find` with the content.
    Replace,
    /// Append content at the end of a named section.
    AppendSection,
    /// Insert content directly under a section heading.
    PrependSection,
}

impl PatchOp {
    /// Returns the operation name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Replace => "replace",
            Self::AppendSection => "append_section",
            Self::PrependSection => "prepend_section",
        }
    }

    /// Parses an operation from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "append" => Some(Self::Append),
            "prepend" => Some(Self::Prepend),
            "replace" => Some(Self::Replace),
            "append_section" => Some(Self::AppendSection),
            "prepend_section" => Some(Self::PrependSection),
            _ => None,
        }
    }
}

/// Payload for a patch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRequest {
    /// Document path within the workspace.
    pub path: String,
    /// The edit to apply.
    pub op: PatchOp,
    /// Content inserted by the operation.
    pub content: String,
    /// Exact text to replace; required for [`PatchOp::Replace`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    /// Section heading to target; required for the section operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl PatchRequest {
    /// Builds an append patch.
    #[must_use]
    pub fn append(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            op: PatchOp::Append,
            content: content.into(),
            find: None,
            section: None,
        }
    }

    /// Builds a prepend patch.
    #[must_use]
    pub fn prepend(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Prepend,
            ..Self::append(path, content)
        }
    }

    /// Builds a replace patch.
    #[must_use]
    pub fn replace(
        path: impl Into<String>,
        find: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            op: PatchOp::Replace,
            find: Some(find.into()),
            ..Self::append(path, content)
        }
    }

    /// Builds an append-to-section patch.
    #[must_use]
    pub fn append_section(
        path: impl Into<String>,
        section: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            op: PatchOp::AppendSection,
            section: Some(section.into()),
            ..Self::append(path, content)
        }
    }

    /// Builds a prepend-to-section patch.
    #[must_use]
    pub fn prepend_section(
        path: impl Into<String>,
        section: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            op: PatchOp::PrependSection,
            section: Some(section.into()),
            ..Self::append(path, content)
        }
    }
}

/// A fully prepared write, serialized but not yet stored.
///
/// Splitting staging from committing lets the caller run pre-commit checks
/// (alias conflicts) against the exact state that will be persisted.
#[derive(Debug, Clone)]
pub struct StagedWrite {
    /// Document path.
    pub path: String,
    /// Serialized document, frontmatter block included.
    pub raw: String,
    /// Merged frontmatter after stamping.
    pub frontmatter: Frontmatter,
    /// Resolved metadata for the index.
    pub metadata: NoteMetadata,
    /// WikiLinks extracted from the body.
    pub links: Vec<ExtractedLink>,
    /// Whether no document existed at this path when staged.
    pub created_new: bool,
}

/// Result of a committed patch.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    /// Document path.
    pub path: String,
    /// The operation that was applied.
    pub op: PatchOp,
    /// Size delta of the serialized document in bytes; negative when the
    /// edit shrank it.
    pub bytes_added: i64,
    /// Frontmatter after the patch (modified refreshed, created untouched).
    #[serde(skip)]
    pub frontmatter: Frontmatter,
    /// Resolved metadata for the index.
    #[serde(skip)]
    pub metadata: NoteMetadata,
    /// WikiLinks extracted from the patched body.
    #[serde(skip)]
    pub links: Vec<ExtractedLink>,
}

/// Stateless document logic over a blob store.
pub struct DocumentEngine {
    store: Arc<dyn BlobStore>,
}

impl DocumentEngine {
    /// Creates an engine over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Reads and parses a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no document exists at the path and
    /// [`Error::Validation`] for an unsafe path.
    #[instrument(skip(self), fields(workspace = %workspace, path = %path))]
    pub fn read(&self, workspace: &str, path: &str) -> Result<Note> {
        validate_path(path)?;

        let bytes = self
            .store
            .get(workspace, path)?
            .ok_or_else(|| Error::NotFound(format!("note not found: {path}")))?;
        let raw = decode_document(path, bytes)?;

        let (frontmatter, body) = FrontmatterCodec::parse(&raw);
        let links = extract_wikilinks(&body);
        Ok(Note {
            path: path.to_string(),
            frontmatter,
            body,
            links,
        })
    }

    /// Prepares a write without storing it.
    ///
    /// Parses the incoming content, merges tag/alias overrides as a set
    /// union, derives the title from the last path segment when absent,
    /// stamps `created` (new documents only) and `modified`, and serializes
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unsafe path and an internal
    /// error if serialization or the existence probe fails.
    #[instrument(skip(self, request), fields(workspace = %workspace, path = %request.path))]
    pub fn stage_write(&self, workspace: &str, request: &WriteRequest) -> Result<StagedWrite> {
        validate_path(&request.path)?;

        let now = current_timestamp();
        let (mut frontmatter, body) = FrontmatterCodec::parse(&request.content);
        frontmatter.merge_overrides(&request.tags, &request.aliases);

        let existed = self.store.head(workspace, &request.path)?;
        if !existed && frontmatter.created.is_none() {
            frontmatter.created = Some(now.clone());
        }
        if frontmatter.title.is_none() {
            frontmatter.title = Some(title_from_path(&request.path));
        }
        frontmatter.modified = Some(now.clone());

        let raw = FrontmatterCodec::serialize(&frontmatter, &body)?;
        let links = extract_wikilinks(&body);
        let metadata = NoteMetadata::from_frontmatter(&request.path, &frontmatter, &now);

        Ok(StagedWrite {
            path: request.path.clone(),
            raw,
            frontmatter,
            metadata,
            links,
            created_new: !existed,
        })
    }

    /// Stores a previously staged write.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob write fails.
    #[instrument(skip(self, staged), fields(workspace = %workspace, path = %staged.path))]
    pub fn commit_write(&self, workspace: &str, staged: &StagedWrite) -> Result<()> {
        self.store.put(
            workspace,
            &staged.path,
            staged.raw.as_bytes(),
            MARKDOWN_CONTENT_TYPE,
            &blob_metadata(&staged.metadata),
        )
    }

    /// Applies a targeted edit to a stored document and commits it.
    ///
    /// The body is edited per the request, `modified` is refreshed,
    /// `created` and all other frontmatter keys are left untouched, and the
    /// re-serialized document replaces the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for missing `find`/`section`
    /// parameters, [`Error::NotFound`] when the document, section, or find
    /// text is absent, and [`Error::Conflict`] for an ambiguous replace.
    #[instrument(skip(self, request), fields(workspace = %workspace, path = %request.path, op = request.op.as_str()))]
    pub fn patch(&self, workspace: &str, request: &PatchRequest) -> Result<PatchOutcome> {
        validate_path(&request.path)?;

        let bytes = self
            .store
            .get(workspace, &request.path)?
            .ok_or_else(|| Error::NotFound(format!("note not found: {}", request.path)))?;
        let raw = decode_document(&request.path, bytes)?;

        let (mut frontmatter, body) = FrontmatterCodec::parse(&raw);
        let new_body = apply_patch(&body, request)?;

        let now = current_timestamp();
        frontmatter.modified = Some(now.clone());

        let new_raw = FrontmatterCodec::serialize(&frontmatter, &new_body)?;
        #[allow(clippy::cast_possible_wrap)]
        let bytes_added = new_raw.len() as i64 - raw.len() as i64;

        let links = extract_wikilinks(&new_body);
        let metadata = NoteMetadata::from_frontmatter(&request.path, &frontmatter, &now);

        self.store.put(
            workspace,
            &request.path,
            new_raw.as_bytes(),
            MARKDOWN_CONTENT_TYPE,
            &blob_metadata(&metadata),
        )?;

        Ok(PatchOutcome {
            path: request.path.clone(),
            op: request.op,
            bytes_added,
            frontmatter,
            metadata,
            links,
        })
    }

    /// Removes a document. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unsafe path and an error if the
    /// blob delete fails.
    #[instrument(skip(self), fields(workspace = %workspace, path = %path))]
    pub fn delete(&self, workspace: &str, path: &str) -> Result<bool> {
        validate_path(path)?;
        self.store.delete(workspace, path)
    }

    /// Reports whether a document exists, without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unsafe path and an error if the
    /// blob check fails.
    pub fn exists(&self, workspace: &str, path: &str) -> Result<bool> {
        validate_path(path)?;
        self.store.head(workspace, path)
    }

    /// Lists document paths in a workspace, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob listing fails.
    pub fn list_paths(&self, workspace: &str, cursor: Option<&str>) -> Result<BlobPage> {
        self.store.list(workspace, cursor)
    }
}

fn validate_path(path: &str) -> Result<()> {
    if is_safe_segment_path(path) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "path contains invalid segments: {path}"
        )))
    }
}

fn title_from_path(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn decode_document(path: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::OperationFailed {
        operation: format!("decode_document {path}"),
        cause: e.to_string(),
    })
}

fn blob_metadata(metadata: &NoteMetadata) -> BlobMetadata {
    BlobMetadata {
        title: metadata.title.clone(),
        note_type: metadata.note_type.clone(),
        tags: metadata.tags.join(","),
        modified: metadata.modified.clone(),
    }
}

/// Applies the requested edit to a body, without touching frontmatter.
fn apply_patch(body: &str, request: &PatchRequest) -> Result<String> {
    match request.op {
        PatchOp::Append => {
            if body.is_empty() {
                Ok(request.content.clone())
            } else if body.ends_with('\n') {
                Ok(format!("{body}{}", request.content))
            } else {
                Ok(format!("{body}\n{}", request.content))
            }
        },
        PatchOp::Prepend => {
            if body.is_empty() {
                Ok(request.content.clone())
            } else if request.content.ends_with('\n') {
                Ok(format!("{}{body}", request.content))
            } else {
                Ok(format!("{}\n{body}", request.content))
            }
        },
        PatchOp::Replace => {
            let Some(find) = request.find.as_deref() else {
                return Err(Error::Validation(
                    "find parameter is required for replace".to_string(),
                ));
            };
            if find.is_empty() {
                return Err(Error::Validation(
                    "find parameter must not be empty".to_string(),
                ));
            }
            match body.matches(find).count() {
                0 => Err(Error::NotFound(format!("find text not found: {find}"))),
                1 => Ok(body.replacen(find, &request.content, 1)),
                n => Err(Error::Conflict(format!(
                    "find text occurs {n} times, expected exactly one match"
                ))),
            }
        },
        PatchOp::AppendSection => {
            let section = required_section(request)?;
            append_to_section(body, section, &request.content)
                .ok_or_else(|| Error::NotFound(format!("section not found: {section}")))
        },
        PatchOp::PrependSection => {
            let section = required_section(request)?;
            prepend_to_section(body, section, &request.content)
                .ok_or_else(|| Error::NotFound(format!("section not found: {section}")))
        },
    }
}

fn required_section(request: &PatchRequest) -> Result<&str> {
    request.section.as_deref().ok_or_else(|| {
        Error::Validation(format!(
            "section parameter is required for {}",
            request.op.as_str()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn engine() -> DocumentEngine {
        DocumentEngine::new(Arc::new(MemoryBlobStore::new()))
    }

    fn write(engine: &DocumentEngine, path: &str, content: &str) -> StagedWrite {
        let staged = engine
            .stage_write(
                "test",
                &WriteRequest {
                    path: path.to_string(),
                    content: content.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        engine.commit_write("test", &staged).unwrap();
        staged
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let engine = engine();
        let staged = write(
            &engine,
            "notes/greeting",
            "Hello [[entities/person/jamie|Jamie]].",
        );

        assert!(staged.created_new);
        assert_eq!(staged.frontmatter.title.as_deref(), Some("greeting"));
        assert!(staged.frontmatter.created.is_some());
        assert_eq!(staged.links.len(), 1);
        assert_eq!(staged.links[0].target, "entities/person/jamie");

        let note = engine.read("test", "notes/greeting").unwrap();
        assert_eq!(note.body, "Hello [[entities/person/jamie|Jamie]].");
        assert_eq!(note.frontmatter.title.as_deref(), Some("greeting"));
        assert_eq!(note.links.len(), 1);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let engine = engine();
        let err = engine.read("test", "nope").unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_title_comes_from_last_segment() {
        let engine = engine();
        let staged = write(&engine, "entities/person/jamie", "Body.");
        assert_eq!(staged.frontmatter.title.as_deref(), Some("jamie"));

        // An explicit title wins.
        let staged = write(&engine, "entities/person/ada", "---\ntitle: Ada Lovelace\n---\nBody.");
        assert_eq!(staged.frontmatter.title.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_rewrite_is_not_created_new() {
        let engine = engine();
        let first = write(&engine, "a", "---\ntitle: One\n---\nv1");
        assert!(first.created_new);

        let second = write(&engine, "a", "---\ntitle: Two\n---\nv2");
        assert!(!second.created_new);
        // The document's created comes only from the incoming content on a
        // rewrite; the index is what preserves the original value.
        assert!(second.frontmatter.created.is_none());
    }

    #[test]
    fn test_explicit_created_is_kept() {
        let engine = engine();
        let staged = write(&engine, "a", "---\ncreated: \"2020-01-01T00:00:00.000Z\"\n---\nx");
        assert_eq!(
            staged.frontmatter.created.as_deref(),
            Some("2020-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_write_merges_tag_and_alias_overrides() {
        let engine = engine();
        let staged = engine
            .stage_write(
                "test",
                &WriteRequest {
                    path: "a".to_string(),
                    content: "---\ntags:\n- existing\n---\nBody.".to_string(),
                    tags: vec!["existing".to_string(), "added".to_string()],
                    aliases: vec!["nick".to_string()],
                },
            )
            .unwrap();

        assert_eq!(staged.frontmatter.tags, vec!["existing", "added"]);
        assert_eq!(staged.frontmatter.aliases, vec!["nick"]);
        assert_eq!(staged.metadata.tags, vec!["existing", "added"]);
    }

    #[test]
    fn test_unsafe_paths_rejected() {
        let engine = engine();
        for path in ["../escape", "a/../b", "/abs", ""] {
            let err = engine
                .stage_write(
                    "test",
                    &WriteRequest {
                        path: path.to_string(),
                        content: "x".to_string(),
                        ..Default::default()
                    },
                )
                .unwrap_err();
            assert_eq!(err.kind(), "validation_error", "path {path:?}");
        }
    }

    #[test]
    fn test_patch_append_newline_handling() {
        let engine = engine();
        write(&engine, "a", "line one");

        let outcome = engine
            .patch("test", &PatchRequest::append("a", "line two"))
            .unwrap();
        assert!(outcome.bytes_added > 0);
        let note = engine.read("test", "a").unwrap();
        assert_eq!(note.body, "line one\nline two");

        // Already newline-terminated: no extra separator.
        write(&engine, "b", "line one\n");
        engine
            .patch("test", &PatchRequest::append("b", "line two"))
            .unwrap();
        let note = engine.read("test", "b").unwrap();
        assert_eq!(note.body, "line one\nline two");

        // Empty body: no leading separator either.
        write(&engine, "c", "---\ntitle: c\n---\n");
        engine
            .patch("test", &PatchRequest::append("c", "line one"))
            .unwrap();
        let note = engine.read("test", "c").unwrap();
        assert_eq!(note.body, "line one");
    }

    #[test]
    fn test_patch_prepend() {
        let engine = engine();
        write(&engine, "a", "body");

        engine
            .patch("test", &PatchRequest::prepend("a", "intro"))
            .unwrap();
        let note = engine.read("test", "a").unwrap();
        assert_eq!(note.body, "intro\nbody");
    }

    #[test]
    fn test_patch_replace_requires_exactly_one_match() {
        let engine = engine();
        write(&engine, "a", "alpha beta alpha");

        let err = engine
            .patch("test", &PatchRequest::replace("a", "alpha", "x"))
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");

        let err = engine
            .patch("test", &PatchRequest::replace("a", "missing", "x"))
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        engine
            .patch("test", &PatchRequest::replace("a", "beta", "gamma"))
            .unwrap();
        let note = engine.read("test", "a").unwrap();
        assert_eq!(note.body, "alpha gamma alpha");
    }

    #[test]
    fn test_patch_replace_validates_find() {
        let engine = engine();
        write(&engine, "a", "body");

        let mut request = PatchRequest::replace("a", "", "x");
        let err = engine.patch("test", &request).unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        request.find = None;
        let err = engine.patch("test", &request).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_patch_shrinking_replace_is_negative() {
        let engine = engine();
        write(&engine, "a", "a very long sentence here");

        let outcome = engine
            .patch(
                "test",
                &PatchRequest::replace("a", "a very long sentence here", "x"),
            )
            .unwrap();
        assert!(outcome.bytes_added < 0);
    }

    #[test]
    fn test_patch_section_operations() {
        let engine = engine();
        write(&engine, "a", "# Log\nfirst\n# Other\nrest");

        engine
            .patch("test", &PatchRequest::append_section("a", "Log", "second"))
            .unwrap();
        let note = engine.read("test", "a").unwrap();
        assert_eq!(note.body, "# Log\nfirst\n\nsecond\n\n# Other\nrest");

        engine
            .patch("test", &PatchRequest::prepend_section("a", "Other", "zeroth"))
            .unwrap();
        let note = engine.read("test", "a").unwrap();
        assert!(note.body.contains("# Other\nzeroth\nrest"));
    }

    #[test]
    fn test_patch_section_errors() {
        let engine = engine();
        write(&engine, "a", "# Log\nentry");

        let err = engine
            .patch("test", &PatchRequest::append_section("a", "Absent", "x"))
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let mut request = PatchRequest::append_section("a", "Log", "x");
        request.section = None;
        let err = engine.patch("test", &request).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_patch_missing_note_is_not_found() {
        let engine = engine();
        let err = engine
            .patch("test", &PatchRequest::append("ghost", "x"))
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_patch_refreshes_modified_preserves_created() {
        let engine = engine();
        let staged = write(&engine, "a", "---\ncreated: \"2020-01-01T00:00:00.000Z\"\n---\nbody");
        assert_eq!(
            staged.frontmatter.created.as_deref(),
            Some("2020-01-01T00:00:00.000Z")
        );

        let outcome = engine
            .patch("test", &PatchRequest::append("a", "more"))
            .unwrap();
        assert_eq!(
            outcome.frontmatter.created.as_deref(),
            Some("2020-01-01T00:00:00.000Z")
        );
        assert!(outcome.frontmatter.modified.is_some());
        assert_ne!(
            outcome.frontmatter.modified.as_deref(),
            Some("2020-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_patch_preserves_unknown_frontmatter_keys() {
        let engine = engine();
        write(&engine, "a", "---\ncustom_key: kept\n---\nbody");

        engine
            .patch("test", &PatchRequest::append("a", "more"))
            .unwrap();
        let note = engine.read("test", "a").unwrap();
        assert_eq!(
            note.frontmatter.extra.get("custom_key"),
            Some(&serde_yaml_ng::Value::String("kept".to_string()))
        );
    }

    #[test]
    fn test_patch_links_reflect_new_body() {
        let engine = engine();
        write(&engine, "a", "no links yet");

        let outcome = engine
            .patch("test", &PatchRequest::append("a", "now see [[b]]"))
            .unwrap();
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links[0].target, "b");
    }

    #[test]
    fn test_delete() {
        let engine = engine();
        write(&engine, "a", "x");

        assert!(engine.delete("test", "a").unwrap());
        assert!(!engine.delete("test", "a").unwrap());
        assert_eq!(engine.read("test", "a").unwrap_err().kind(), "not_found");
    }

    #[test]
    fn test_patch_op_parse_round_trip() {
        for op in [
            PatchOp::Append,
            PatchOp::Prepend,
            PatchOp::Replace,
            PatchOp::AppendSection,
            PatchOp::PrependSection,
        ] {
            assert_eq!(PatchOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(PatchOp::parse("APPEND"), Some(PatchOp::Append));
        assert_eq!(PatchOp::parse("truncate"), None);
    }
}
