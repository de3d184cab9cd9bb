//! Lazy per-workspace index handles.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

use crate::index::WorkspaceIndex;
use crate::storage::is_safe_segment_path;
use crate::{Error, Result};

static SHARED: Lazy<Mutex<HashMap<PathBuf, Arc<WorkspaceRegistry>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("registry mutex was poisoned, recovering");
            metrics::counter!("cairn_lock_recovery_total", "store" => "registry").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Opens workspace indexes on first use and caches the handles.
///
/// Databases live at `<root>/<workspace>/index.sqlite3`. Handles are shared
/// (`Arc`), so every caller funnels through the same connection mutex and
/// writes within a workspace stay serialized no matter how many services
/// hold the registry.
pub struct WorkspaceRegistry {
    root: PathBuf,
    indexes: Mutex<HashMap<String, Arc<WorkspaceIndex>>>,
}

impl WorkspaceRegistry {
    /// Creates a registry rooted at the given index directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            indexes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry for an index root.
    ///
    /// Services opened independently against the same root funnel through
    /// one registry, so a workspace never holds two connections to its
    /// database within a process.
    pub fn shared(root: impl Into<PathBuf>) -> Arc<Self> {
        let root = root.into();
        let mut shared = acquire_lock(&SHARED);
        Arc::clone(
            shared
                .entry(root.clone())
                .or_insert_with(|| Arc::new(Self::new(root))),
        )
    }

    /// Returns the index for a workspace, opening it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for unsafe workspace names and an
    /// internal error if the database cannot be opened.
    pub fn get_or_open(&self, workspace: &str) -> Result<Arc<WorkspaceIndex>> {
        if !is_safe_segment_path(workspace) {
            return Err(Error::Validation(format!(
                "workspace contains invalid segments: {workspace}"
            )));
        }

        let mut indexes = acquire_lock(&self.indexes);
        if let Some(index) = indexes.get(workspace) {
            return Ok(Arc::clone(index));
        }

        let dir = self.root.join(workspace);
        std::fs::create_dir_all(&dir).map_err(|e| Error::OperationFailed {
            operation: "create_index_dir".to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(workspace = %workspace, "opening workspace index");
        let index = Arc::new(WorkspaceIndex::open(workspace, dir.join("index.sqlite3"))?);
        indexes.insert(workspace.to_string(), Arc::clone(&index));
        Ok(index)
    }

    /// Returns the workspaces with an open index handle.
    #[must_use]
    pub fn open_workspaces(&self) -> Vec<String> {
        let indexes = acquire_lock(&self.indexes);
        let mut names: Vec<String> = indexes.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_handles_are_shared() {
        let dir = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(dir.path());

        let a1 = registry.get_or_open("team-a").unwrap();
        let a2 = registry.get_or_open("team-a").unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));

        let b = registry.get_or_open("team-b").unwrap();
        assert!(!Arc::ptr_eq(&a1, &b));
        assert_eq!(registry.open_workspaces(), vec!["team-a", "team-b"]);
    }

    #[test]
    fn test_workspaces_do_not_share_state() {
        let dir = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(dir.path());

        let a = registry.get_or_open("team-a").unwrap();
        let b = registry.get_or_open("team-b").unwrap();

        let meta = crate::models::NoteMetadata {
            title: "Only in A".to_string(),
            note_type: String::new(),
            tags: Vec::new(),
            aliases: vec!["shared-alias".to_string()],
            created: "2026-01-01T00:00:00.000Z".to_string(),
            modified: "2026-01-01T00:00:00.000Z".to_string(),
        };
        a.note_updated("secret", &meta, &[]).unwrap();

        assert!(a.note("secret").unwrap().is_some());
        assert!(b.note("secret").unwrap().is_none());

        // The same alias is free in the other workspace.
        assert!(b
            .check_alias_conflicts("other", &["shared-alias".to_string()])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_shared_registry_is_per_root() {
        let dir = TempDir::new().unwrap();
        let r1 = WorkspaceRegistry::shared(dir.path());
        let r2 = WorkspaceRegistry::shared(dir.path());
        assert!(Arc::ptr_eq(&r1, &r2));

        // Same root, same underlying index handle.
        let i1 = r1.get_or_open("team-a").unwrap();
        let i2 = r2.get_or_open("team-a").unwrap();
        assert!(Arc::ptr_eq(&i1, &i2));

        let other = TempDir::new().unwrap();
        let r3 = WorkspaceRegistry::shared(other.path());
        assert!(!Arc::ptr_eq(&r1, &r3));
    }

    #[test]
    fn test_unsafe_workspace_rejected() {
        let dir = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(dir.path());

        for bad in ["../escape", "", "/abs", "a/../b"] {
            let err = registry.get_or_open(bad).unwrap_err();
            assert_eq!(err.kind(), "validation_error", "workspace {bad:?}");
        }
    }

    #[test]
    fn test_database_file_created_on_disk() {
        let dir = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(dir.path());

        let index = registry.get_or_open("team-a").unwrap();
        index
            .note_updated(
                "a",
                &crate::models::NoteMetadata {
                    title: "A".to_string(),
                    note_type: String::new(),
                    tags: Vec::new(),
                    aliases: Vec::new(),
                    created: "2026-01-01T00:00:00.000Z".to_string(),
                    modified: "2026-01-01T00:00:00.000Z".to_string(),
                },
                &[],
            )
            .unwrap();

        assert!(dir.path().join("team-a").join("index.sqlite3").exists());
    }
}
