//! Filesystem-based blob store.
//!
//! Stores each document as a markdown file under
//! `<root>/<workspace>/notes/<path>.md`. Custom metadata is accepted but
//! not persisted: the frontmatter inside the document already carries the
//! same fields, and there is no out-of-band reader for local files.
//!
//! # Security
//!
//! Document paths are validated before touching the filesystem: empty
//! paths, absolute paths, and `.` / `..` segments are rejected to prevent
//! directory escape.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{decode_cursor, encode_cursor};
use crate::storage::{BlobMetadata, BlobPage, BlobStore};
use crate::{Error, Result};

/// Maximum number of paths returned per listing page.
const LIST_PAGE_SIZE: usize = 1000;

/// Filesystem-backed blob store.
pub struct FilesystemBlobStore {
    /// Base directory holding one subdirectory per workspace.
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Creates a blob store rooted at the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|e| Error::OperationFailed {
            operation: "create_blob_root".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self { root })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `(workspace, path)` to a file location, rejecting unsafe input.
    fn file_path(&self, workspace: &str, path: &str) -> Result<PathBuf> {
        if !is_safe_segment_path(workspace) {
            return Err(Error::Validation(format!(
                "workspace contains invalid segments: {workspace}"
            )));
        }
        if !is_safe_segment_path(path) {
            return Err(Error::Validation(format!(
                "path contains invalid segments: {path}"
            )));
        }

        let mut file = self.root.join(workspace).join("notes");
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                // Append rather than set_extension: segments may contain dots.
                file.push(format!("{segment}.md"));
            } else {
                file.push(segment);
            }
        }
        Ok(file)
    }

    fn notes_dir(&self, workspace: &str) -> PathBuf {
        self.root.join(workspace).join("notes")
    }
}

/// Rejects empty input, absolute paths, and `.` / `..` segments.
pub(crate) fn is_safe_segment_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Recursively collects document paths under `dir`, relative to `base`.
fn collect_documents(dir: &Path, base: &Path, out: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::OperationFailed {
        operation: "read_blob_dir".to_string(),
        cause: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::OperationFailed {
            operation: "read_blob_dir_entry".to_string(),
            cause: e.to_string(),
        })?;
        let entry_path = entry.path();

        if entry_path.is_dir() {
            collect_documents(&entry_path, base, out)?;
        } else if entry_path.extension().is_some_and(|ext| ext == "md") {
            if let Some(document) = document_path_from_file(&entry_path, base) {
                out.push(document);
            }
        }
    }

    Ok(())
}

/// Converts a file location back to a document path.
fn document_path_from_file(file: &Path, base: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?;
    let stem = relative.with_extension("");
    let mut segments = Vec::new();
    for component in stem.components() {
        segments.push(component.as_os_str().to_str()?.to_string());
    }
    Some(segments.join("/"))
}

impl BlobStore for FilesystemBlobStore {
    fn get(&self, workspace: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let file = match self.file_path(workspace, path) {
            Ok(f) => f,
            // Invalid path means no document
            Err(_) => return Ok(None),
        };

        if !file.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&file).map_err(|e| Error::OperationFailed {
            operation: "read_blob".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Some(bytes))
    }

    fn put(
        &self,
        workspace: &str,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
        _metadata: &BlobMetadata,
    ) -> Result<()> {
        let file = self.file_path(workspace, path)?;

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_blob_dir".to_string(),
                cause: e.to_string(),
            })?;
        }

        fs::write(&file, bytes).map_err(|e| Error::OperationFailed {
            operation: "write_blob".to_string(),
            cause: e.to_string(),
        })
    }

    fn head(&self, workspace: &str, path: &str) -> Result<bool> {
        let file = match self.file_path(workspace, path) {
            Ok(f) => f,
            Err(_) => return Ok(false),
        };
        Ok(file.exists())
    }

    fn delete(&self, workspace: &str, path: &str) -> Result<bool> {
        let file = match self.file_path(workspace, path) {
            Ok(f) => f,
            Err(_) => return Ok(false),
        };

        if !file.exists() {
            return Ok(false);
        }

        fs::remove_file(&file).map_err(|e| Error::OperationFailed {
            operation: "delete_blob".to_string(),
            cause: e.to_string(),
        })?;
        Ok(true)
    }

    fn list(&self, workspace: &str, cursor: Option<&str>) -> Result<BlobPage> {
        let dir = self.notes_dir(workspace);
        let mut paths = Vec::new();
        if dir.exists() {
            collect_documents(&dir, &dir, &mut paths)?;
        }
        paths.sort();

        let offset = match cursor {
            Some(c) => decode_cursor(c)?,
            None => 0,
        };

        let items: Vec<String> = paths.iter().skip(offset).take(LIST_PAGE_SIZE).cloned().collect();
        let next_offset = offset + items.len();
        let truncated = next_offset < paths.len();

        Ok(BlobPage {
            items,
            truncated,
            cursor: truncated.then(|| encode_cursor(next_offset)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FilesystemBlobStore) {
        let dir = TempDir::new().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_put_get_round_trip() {
        let (_dir, store) = store();
        store
            .put("ws", "entities/person/jamie", b"content", "text/markdown", &BlobMetadata::default())
            .unwrap();

        let bytes = store.get("ws", "entities/person/jamie").unwrap();
        assert_eq!(bytes.as_deref(), Some(b"content".as_slice()));
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.get("ws", "missing").unwrap().is_none());
    }

    #[test]
    fn test_head_and_delete() {
        let (_dir, store) = store();
        store
            .put("ws", "a", b"x", "text/markdown", &BlobMetadata::default())
            .unwrap();

        assert!(store.head("ws", "a").unwrap());
        assert!(store.delete("ws", "a").unwrap());
        assert!(!store.head("ws", "a").unwrap());
        assert!(!store.delete("ws", "a").unwrap());
    }

    #[test]
    fn test_workspaces_are_isolated() {
        let (_dir, store) = store();
        store
            .put("ws-a", "note", b"a", "text/markdown", &BlobMetadata::default())
            .unwrap();

        assert!(store.get("ws-b", "note").unwrap().is_none());
        assert!(store.list("ws-b", None).unwrap().items.is_empty());
    }

    #[test]
    fn test_list_returns_sorted_document_paths() {
        let (_dir, store) = store();
        for path in ["daily/2026-02-24", "entities/person/jamie", "alpha"] {
            store
                .put("ws", path, b"x", "text/markdown", &BlobMetadata::default())
                .unwrap();
        }

        let page = store.list("ws", None).unwrap();
        assert_eq!(
            page.items,
            vec!["alpha", "daily/2026-02-24", "entities/person/jamie"]
        );
        assert!(!page.truncated);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (_dir, store) = store();
        let err = store
            .put("ws", "../escape", b"x", "text/markdown", &BlobMetadata::default())
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        // Reads treat invalid paths as absent rather than failing.
        assert!(store.get("ws", "../escape").unwrap().is_none());
        assert!(!store.head("ws", "..").unwrap());
    }

    #[test]
    fn test_nested_paths_round_trip_through_list() {
        let (_dir, store) = store();
        store
            .put("ws", "a/b/c/deep", b"x", "text/markdown", &BlobMetadata::default())
            .unwrap();

        let page = store.list("ws", None).unwrap();
        assert_eq!(page.items, vec!["a/b/c/deep"]);
    }
}
