//! In-memory blob store.
//!
//! Backs tests and ephemeral workspaces. Unlike the filesystem store it
//! retains the custom metadata attached on write, so callers can assert on
//! what collaborators would see out-of-band.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::models::{decode_cursor, encode_cursor};
use crate::storage::{BlobMetadata, BlobPage, BlobStore};
use crate::Result;

/// Default page size for listings; tests shrink it to exercise paging.
const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
    metadata: BlobMetadata,
}

type WorkspaceBlobs = HashMap<String, BTreeMap<String, StoredBlob>>;

/// In-memory blob store, one sorted document map per workspace.
pub struct MemoryBlobStore {
    blobs: Mutex<WorkspaceBlobs>,
    page_size: usize,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates an empty store with a custom listing page size.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Acquires the store lock, recovering from poisoning.
    fn acquire_lock(&self) -> MutexGuard<'_, WorkspaceBlobs> {
        self.blobs.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("blob store mutex poisoned, recovering");
            metrics::counter!("cairn_lock_recovery_total", "store" => "blob").increment(1);
            poisoned.into_inner()
        })
    }

    /// Returns the metadata attached to a document, if it exists.
    #[must_use]
    pub fn metadata(&self, workspace: &str, path: &str) -> Option<BlobMetadata> {
        let blobs = self.acquire_lock();
        blobs
            .get(workspace)
            .and_then(|ws| ws.get(path))
            .map(|blob| blob.metadata.clone())
    }

    /// Returns the content type attached to a document, if it exists.
    #[must_use]
    pub fn content_type(&self, workspace: &str, path: &str) -> Option<String> {
        let blobs = self.acquire_lock();
        blobs
            .get(workspace)
            .and_then(|ws| ws.get(path))
            .map(|blob| blob.content_type.clone())
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, workspace: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self.acquire_lock();
        Ok(blobs
            .get(workspace)
            .and_then(|ws| ws.get(path))
            .map(|blob| blob.bytes.clone()))
    }

    fn put(
        &self,
        workspace: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        let mut blobs = self.acquire_lock();
        blobs.entry(workspace.to_string()).or_default().insert(
            path.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    fn head(&self, workspace: &str, path: &str) -> Result<bool> {
        let blobs = self.acquire_lock();
        Ok(blobs.get(workspace).is_some_and(|ws| ws.contains_key(path)))
    }

    fn delete(&self, workspace: &str, path: &str) -> Result<bool> {
        let mut blobs = self.acquire_lock();
        Ok(blobs
            .get_mut(workspace)
            .is_some_and(|ws| ws.remove(path).is_some()))
    }

    fn list(&self, workspace: &str, cursor: Option<&str>) -> Result<BlobPage> {
        let offset = match cursor {
            Some(c) => decode_cursor(c)?,
            None => 0,
        };

        let blobs = self.acquire_lock();
        let total = blobs.get(workspace).map_or(0, BTreeMap::len);
        let items: Vec<String> = blobs
            .get(workspace)
            .map(|ws| ws.keys().skip(offset).take(self.page_size).cloned().collect())
            .unwrap_or_default();

        let next_offset = offset + items.len();
        let truncated = next_offset < total;

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

    fn meta(title: &str) -> BlobMetadata {
        BlobMetadata {
            title: title.to_string(),
            note_type: "note".to_string(),
            tags: "a,b".to_string(),
            modified: "2026-02-24T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryBlobStore::new();
        store
            .put("ws", "a", b"one", "text/markdown", &meta("One"))
            .unwrap();
        store
            .put("ws", "a", b"two", "text/markdown", &meta("Two"))
            .unwrap();

        assert_eq!(store.get("ws", "a").unwrap().as_deref(), Some(b"two".as_slice()));
        assert_eq!(store.metadata("ws", "a").unwrap().title, "Two");
    }

    #[test]
    fn test_metadata_retained() {
        let store = MemoryBlobStore::new();
        store
            .put("ws", "a", b"x", "text/markdown", &meta("Title"))
            .unwrap();

        let m = store.metadata("ws", "a").unwrap();
        assert_eq!(m.tags, "a,b");
        assert_eq!(store.content_type("ws", "a").as_deref(), Some("text/markdown"));
    }

    #[test]
    fn test_list_pages_until_exhausted() {
        let store = MemoryBlobStore::with_page_size(2);
        for path in ["a", "b", "c", "d", "e"] {
            store
                .put("ws", path, b"x", "text/markdown", &meta(path))
                .unwrap();
        }

        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = store.list("ws", cursor.as_deref()).unwrap();
            collected.extend(page.items);
            pages += 1;
            if !page.truncated {
                break;
            }
            cursor = page.cursor;
        }

        assert_eq!(collected, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(pages, 3);
    }

    #[test]
    fn test_delete_then_list_excludes() {
        let store = MemoryBlobStore::new();
        store
            .put("ws", "a", b"x", "text/markdown", &meta("a"))
            .unwrap();
        store
            .put("ws", "b", b"x", "text/markdown", &meta("b"))
            .unwrap();

        assert!(store.delete("ws", "a").unwrap());
        assert_eq!(store.list("ws", None).unwrap().items, vec!["b"]);
    }
}
