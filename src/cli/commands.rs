//! Command handlers mapping parsed arguments to service calls.

use serde::Serialize;
use serde_json::Value;

use crate::engine::{PatchOp, PatchRequest, WriteRequest};
use crate::models::{LinkDirection, ListQuery, SearchQuery, SortOrder};
use crate::service::{DailyOp, DailyRequest, WorkspaceService};
use crate::{Error, Result};

use super::split_csv;

/// Creates or replaces a note.
///
/// # Errors
///
/// Returns any service error.
pub fn cmd_write(
    service: &WorkspaceService,
    path: String,
    content: String,
    tags: Option<String>,
    aliases: Option<String>,
) -> Result<Value> {
    let request = WriteRequest {
        path,
        content,
        tags: split_csv(tags.as_deref()),
        aliases: split_csv(aliases.as_deref()),
    };
    to_json(&service.write(&request)?)
}

/// Reads a note, a single section, or metadata only.
///
/// # Errors
///
/// Returns any service error.
pub fn cmd_read(
    service: &WorkspaceService,
    path: &str,
    section: Option<&str>,
    metadata_only: bool,
) -> Result<Value> {
    to_json(&service.read(path, section, metadata_only)?)
}

/// Applies a targeted edit to a note body.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an unknown operation name and any
/// service error.
pub fn cmd_patch(
    service: &WorkspaceService,
    path: String,
    op: &str,
    content: String,
    find: Option<String>,
    section: Option<String>,
) -> Result<Value> {
    let op = PatchOp::parse(op).ok_or_else(|| {
        Error::Validation(format!(
            "unknown patch op '{op}', expected append, prepend, replace, append_section, or prepend_section"
        ))
    })?;
    let request = PatchRequest {
        path,
        op,
        content,
        find,
        section,
    };
    to_json(&service.patch(&request)?)
}

/// Deletes a note.
///
/// # Errors
///
/// Returns any service error.
pub fn cmd_delete(service: &WorkspaceService, path: &str) -> Result<Value> {
    to_json(&service.delete(path)?)
}

/// Lists notes by path prefix.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an unknown sort order and any service
/// error.
pub fn cmd_list(
    service: &WorkspaceService,
    prefix: Option<String>,
    recursive: bool,
    sort: &str,
    limit: usize,
    cursor: Option<String>,
) -> Result<Value> {
    let sort = SortOrder::parse(sort).ok_or_else(|| {
        Error::Validation(format!(
            "unknown sort order '{sort}', expected modified, created, or path"
        ))
    })?;
    let query = ListQuery {
        path_prefix: prefix,
        recursive,
        sort,
        limit,
        cursor,
    };
    to_json(&service.list(&query)?)
}

/// Searches the workspace index.
///
/// # Errors
///
/// Returns any service error.
#[allow(clippy::too_many_arguments)]
pub fn cmd_search(
    service: &WorkspaceService,
    query: Option<String>,
    tags: Option<String>,
    prefix: Option<String>,
    backlinks_to: Option<String>,
    modified_since: Option<String>,
    limit: usize,
    cursor: Option<String>,
) -> Result<Value> {
    let query = SearchQuery {
        query,
        tags: split_csv(tags.as_deref()),
        path_prefix: prefix,
        backlinks_to,
        modified_since,
        limit,
        cursor,
    };
    to_json(&service.search(&query)?)
}

/// Traverses the link graph from a note.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an unknown direction and any service
/// error.
pub fn cmd_links(
    service: &WorkspaceService,
    path: &str,
    depth: usize,
    direction: &str,
) -> Result<Value> {
    let direction = LinkDirection::parse(direction).ok_or_else(|| {
        Error::Validation(format!(
            "unknown direction '{direction}', expected in, out, or both"
        ))
    })?;
    to_json(&service.links(path, depth, direction)?)
}

/// Reads or appends to a date-keyed daily note.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an unknown operation name and any
/// service error.
pub fn cmd_daily(
    service: &WorkspaceService,
    date: Option<String>,
    op: &str,
    content: Option<String>,
    section: Option<String>,
) -> Result<Value> {
    let op = DailyOp::parse(op).ok_or_else(|| {
        Error::Validation(format!(
            "unknown daily op '{op}', expected read, append, append_section, or prepend_section"
        ))
    })?;
    let request = DailyRequest {
        date,
        op,
        content,
        section,
    };
    to_json(&service.daily(&request)?)
}

/// Rebuilds the workspace index from stored documents.
///
/// # Errors
///
/// Returns any service error.
pub fn cmd_reindex(service: &WorkspaceService) -> Result<Value> {
    to_json(&service.rebuild_index()?)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::OperationFailed {
        operation: "render_output".to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::WorkspaceIndex;
    use crate::storage::MemoryBlobStore;
    use std::sync::Arc;

    fn service() -> WorkspaceService {
        WorkspaceService::new(
            "test",
            Arc::new(MemoryBlobStore::new()),
            Arc::new(WorkspaceIndex::in_memory("test").unwrap()),
            chrono_tz::UTC,
        )
    }

    #[test]
    fn test_cmd_write_and_read_shapes() {
        let svc = service();
        let value = cmd_write(
            &svc,
            "people/jamie".to_string(),
            "Works at [[companies/acme|Acme]].".to_string(),
            Some("team,eng".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(value["path"], "people/jamie");
        assert_eq!(value["created"], true);
        assert_eq!(value["links_extracted"], 1);

        let value = cmd_read(&svc, "people/jamie", None, false).unwrap();
        assert_eq!(value["frontmatter"]["tags"][0], "team");
        assert!(value["body"].is_string());

        // Metadata-only reads omit the body key entirely.
        let value = cmd_read(&svc, "people/jamie", None, true).unwrap();
        assert!(value.get("body").is_none());
        assert!(value["backlinks"].is_array());
    }

    #[test]
    fn test_cmd_patch_rejects_unknown_op() {
        let svc = service();
        let err = cmd_patch(
            &svc,
            "a".to_string(),
            "overwrite",
            "x".to_string(),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_cmd_list_rejects_unknown_sort() {
        let svc = service();
        let err = cmd_list(&svc, None, false, "size", 20, None).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_cmd_links_rejects_unknown_direction() {
        let svc = service();
        let err = cmd_links(&svc, "a", 1, "sideways").unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_cmd_search_shape() {
        let svc = service();
        cmd_write(
            &svc,
            "projects/apollo".to_string(),
            "---\ntitle: Apollo\n---\nLaunch plan.".to_string(),
            None,
            None,
        )
        .unwrap();

        let value = cmd_search(
            &svc,
            Some("apollo".to_string()),
            None,
            None,
            None,
            None,
            20,
            None,
        )
        .unwrap();
        assert_eq!(value["total_count"], 1);
        assert_eq!(value["items"][0]["title"], "Apollo");
    }

    #[test]
    fn test_cmd_daily_rejects_unknown_op() {
        let svc = service();
        let err = cmd_daily(&svc, None, "rewrite", None, None).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_cmd_reindex_shape() {
        let svc = service();
        cmd_write(&svc, "a".to_string(), "body".to_string(), None, None).unwrap();
        let value = cmd_reindex(&svc).unwrap();
        assert_eq!(value["notes_indexed"], 1);
    }
}
