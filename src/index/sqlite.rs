//! Per-workspace `SQLite` index.
//!
//! The index is a derived cache over the document blobs: note metadata, the
//! directed link graph, alias mappings, and an inverted search index live in
//! four relations inside one database file per workspace. Every row is
//! reconstructible from the documents, so the database can be dropped and
//! rebuilt at any time without losing data.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::instrument;

use crate::index::terms::{derive_terms, tokenize};
use crate::models::{
    ExtractedLink, IndexedNote, LinkDirection, LinkNeighbor, LinksResult, ListQuery, NoteMetadata,
    Page, SearchHit, SearchQuery, SortOrder, decode_cursor, encode_cursor,
};
use crate::{Error, Result};

/// Helper to acquire the connection mutex with poison recovery.
///
/// If the mutex is poisoned by a panic in a previous critical section, the
/// inner connection is still in a usable state (any open transaction is
/// rolled back when its statements drop), so we recover rather than cascade
/// the failure.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("index mutex was poisoned, recovering");
            metrics::counter!("cairn_lock_recovery_total", "store" => "index").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Escapes SQL LIKE wildcards in a string.
///
/// LIKE patterns treat `%` as "any characters" and `_` as "single character".
/// User-supplied tokens, tags, and path prefixes must match literally, so
/// these characters are escaped with `\` (the clause must carry `ESCAPE '\'`).
fn escape_like_wildcards(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '_' | '\\' => {
                result.push('\\');
                result.push(c);
            },
            _ => result.push(c),
        }
    }
    result
}

/// One alias collision found during a pre-commit check.
#[derive(Debug, Clone, Serialize)]
pub struct AliasConflict {
    /// The alias being claimed.
    pub alias: String,
    /// The canonical path that already owns it.
    pub existing_path: String,
}

/// The per-workspace index over notes, links, aliases, and search terms.
///
/// All operations serialize on an internal mutex around the single `SQLite`
/// connection; writes additionally run inside an immediate transaction so a
/// note update is visible either completely or not at all.
#[derive(Debug)]
pub struct WorkspaceIndex {
    /// Connection to the workspace database.
    conn: Mutex<Connection>,
    /// Workspace this index belongs to.
    workspace: String,
    /// Path to the database file (None for in-memory).
    db_path: Option<PathBuf>,
}

impl WorkspaceIndex {
    /// Opens (creating if necessary) the index database for a workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(workspace: impl Into<String>, db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(|e| Error::OperationFailed {
            operation: "open_index".to_string(),
            cause: e.to_string(),
        })?;

        let index = Self {
            conn: Mutex::new(conn),
            workspace: workspace.into(),
            db_path: Some(db_path),
        };

        index.initialize()?;
        Ok(index)
    }

    /// Creates an in-memory index, used in tests and ephemeral workspaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(workspace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_index_memory".to_string(),
            cause: e.to_string(),
        })?;

        let index = Self {
            conn: Mutex::new(conn),
            workspace: workspace.into(),
            db_path: None,
        };

        index.initialize()?;
        Ok(index)
    }

    /// Returns the workspace this index serves.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        // WAL for concurrent readers. pragma_update returns the new mode as
        // a string, which we ignore.
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                path TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '',
                aliases TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_notes_table".to_string(),
            cause: e.to_string(),
        })?;

        // One edge per (source, target) pair; re-linking overwrites context.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS links (
                source_path TEXT NOT NULL,
                target_path TEXT NOT NULL,
                context TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (source_path, target_path)
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_links_table".to_string(),
            cause: e.to_string(),
        })?;

        // NOCASE collation enforces case-insensitive alias uniqueness at the
        // schema level, matching the lookup semantics.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS aliases (
                alias TEXT PRIMARY KEY COLLATE NOCASE,
                canonical_path TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_aliases_table".to_string(),
            cause: e.to_string(),
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS search_terms (
                term TEXT NOT NULL,
                path TEXT NOT NULL,
                PRIMARY KEY (term, path)
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_search_terms_table".to_string(),
            cause: e.to_string(),
        })?;

        Self::create_indexes(&conn);

        Ok(())
    }

    /// Creates indexes for the common query patterns.
    fn create_indexes(conn: &Connection) {
        // Default search/list ordering
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_modified ON notes(modified DESC)",
            [],
        );

        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created DESC)",
            [],
        );

        // Incoming-edge lookups (backlinks, inbound traversal)
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_path)",
            [],
        );

        // Alias teardown when a note is re-indexed or deleted
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_aliases_canonical ON aliases(canonical_path)",
            [],
        );

        // Posting teardown by path
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_search_terms_path ON search_terms(path)",
            [],
        );
    }

    /// Applies a note's current state to the index.
    ///
    /// Upserts the metadata row (preserving any prior `created`), then
    /// regenerates the note's postings, owned aliases, and outgoing edges in
    /// one transaction. Link targets are resolved through the alias table at
    /// index time, after this note's own aliases have been refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement in the transaction fails.
    #[instrument(
        skip(self, metadata, links),
        fields(workspace = %self.workspace, operation = "note_updated", path = %path, links = links.len())
    )]
    pub fn note_updated(
        &self,
        path: &str,
        metadata: &NoteMetadata,
        links: &[ExtractedLink],
    ) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            conn.execute("BEGIN IMMEDIATE", [])
                .map_err(|e| Error::OperationFailed {
                    operation: "begin_transaction".to_string(),
                    cause: e.to_string(),
                })?;

            let result = (|| {
                // created is deliberately absent from the update list: the
                // first indexed value wins for the life of the row.
                conn.execute(
                    "INSERT INTO notes (path, title, type, tags, aliases, created, modified)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(path) DO UPDATE SET
                         title = excluded.title,
                         type = excluded.type,
                         tags = excluded.tags,
                         aliases = excluded.aliases,
                         modified = excluded.modified",
                    params![
                        path,
                        metadata.title,
                        metadata.note_type,
                        metadata.tags.join(","),
                        metadata.aliases.join(","),
                        metadata.created,
                        metadata.modified
                    ],
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "upsert_note".to_string(),
                    cause: e.to_string(),
                })?;

                conn.execute("DELETE FROM search_terms WHERE path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_search_terms".to_string(),
                        cause: e.to_string(),
                    })?;

                {
                    let mut stmt = conn
                        .prepare("INSERT OR IGNORE INTO search_terms (term, path) VALUES (?1, ?2)")
                        .map_err(|e| Error::OperationFailed {
                            operation: "prepare_insert_term".to_string(),
                            cause: e.to_string(),
                        })?;
                    for term in derive_terms(path, metadata, links) {
                        stmt.execute(params![term, path])
                            .map_err(|e| Error::OperationFailed {
                                operation: "insert_term".to_string(),
                                cause: e.to_string(),
                            })?;
                    }
                }

                conn.execute("DELETE FROM aliases WHERE canonical_path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_aliases".to_string(),
                        cause: e.to_string(),
                    })?;

                {
                    // OR IGNORE: if a conflicting owner appears despite the
                    // pre-commit check, the first writer keeps the alias and
                    // a rebuild resolves the drift.
                    let mut stmt = conn
                        .prepare("INSERT OR IGNORE INTO aliases (alias, canonical_path) VALUES (?1, ?2)")
                        .map_err(|e| Error::OperationFailed {
                            operation: "prepare_insert_alias".to_string(),
                            cause: e.to_string(),
                        })?;
                    for alias in &metadata.aliases {
                        let alias = alias.trim();
                        if alias.is_empty() {
                            continue;
                        }
                        stmt.execute(params![alias, path])
                            .map_err(|e| Error::OperationFailed {
                                operation: "insert_alias".to_string(),
                                cause: e.to_string(),
                            })?;
                    }
                }

                conn.execute("DELETE FROM links WHERE source_path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_links".to_string(),
                        cause: e.to_string(),
                    })?;

                {
                    let mut resolve_stmt = conn
                        .prepare("SELECT canonical_path FROM aliases WHERE alias = ?1")
                        .map_err(|e| Error::OperationFailed {
                            operation: "prepare_resolve_target".to_string(),
                            cause: e.to_string(),
                        })?;
                    let mut insert_stmt = conn
                        .prepare(
                            "INSERT OR REPLACE INTO links (source_path, target_path, context)
                             VALUES (?1, ?2, ?3)",
                        )
                        .map_err(|e| Error::OperationFailed {
                            operation: "prepare_insert_link".to_string(),
                            cause: e.to_string(),
                        })?;
                    for link in links {
                        let resolved: Option<String> = resolve_stmt
                            .query_row(params![link.target], |row| row.get(0))
                            .optional()
                            .map_err(|e| Error::OperationFailed {
                                operation: "resolve_link_target".to_string(),
                                cause: e.to_string(),
                            })?;
                        // Unresolved targets stay as written: dangling edges
                        // are first-class and may resolve later.
                        let target = resolved.unwrap_or_else(|| link.target.clone());
                        insert_stmt
                            .execute(params![path, target, link.context])
                            .map_err(|e| Error::OperationFailed {
                                operation: "insert_link".to_string(),
                                cause: e.to_string(),
                            })?;
                    }
                }

                Ok(())
            })();

            if result.is_ok() {
                conn.execute("COMMIT", [])
                    .map_err(|e| Error::OperationFailed {
                        operation: "commit_transaction".to_string(),
                        cause: e.to_string(),
                    })?;
            } else {
                let _ = conn.execute("ROLLBACK", []);
            }

            result
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("note_updated", start, status);
        result
    }

    /// Removes a note and everything it owns from the index.
    ///
    /// Drops the metadata row, the note's postings, its aliases, and its
    /// outgoing edges. Incoming edges from other notes are kept and become
    /// dangling until their sources are re-indexed or the index is rebuilt.
    ///
    /// Returns `true` if a note row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement in the transaction fails.
    #[instrument(skip(self), fields(workspace = %self.workspace, operation = "note_deleted", path = %path))]
    pub fn note_deleted(&self, path: &str) -> Result<bool> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            conn.execute("BEGIN IMMEDIATE", [])
                .map_err(|e| Error::OperationFailed {
                    operation: "begin_transaction".to_string(),
                    cause: e.to_string(),
                })?;

            let result = (|| {
                conn.execute("DELETE FROM search_terms WHERE path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_search_terms".to_string(),
                        cause: e.to_string(),
                    })?;

                conn.execute("DELETE FROM aliases WHERE canonical_path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_aliases".to_string(),
                        cause: e.to_string(),
                    })?;

                conn.execute("DELETE FROM links WHERE source_path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_links".to_string(),
                        cause: e.to_string(),
                    })?;

                let deleted = conn
                    .execute("DELETE FROM notes WHERE path = ?1", params![path])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_note".to_string(),
                        cause: e.to_string(),
                    })?;

                Ok(deleted > 0)
            })();

            if result.is_ok() {
                conn.execute("COMMIT", [])
                    .map_err(|e| Error::OperationFailed {
                        operation: "commit_transaction".to_string(),
                        cause: e.to_string(),
                    })?;
            } else {
                let _ = conn.execute("ROLLBACK", []);
            }

            result
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("note_deleted", start, status);
        result
    }

    /// Reports aliases already owned by a different canonical path.
    ///
    /// Alias comparison is case-insensitive and ignores surrounding
    /// whitespace. An alias owned by `path` itself is not a conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    #[instrument(skip(self, aliases), fields(workspace = %self.workspace, operation = "check_alias_conflicts", path = %path))]
    pub fn check_alias_conflicts(
        &self,
        path: &str,
        aliases: &[String],
    ) -> Result<Vec<AliasConflict>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare("SELECT canonical_path FROM aliases WHERE alias = ?1")
                .map_err(|e| Error::OperationFailed {
                    operation: "prepare_check_alias".to_string(),
                    cause: e.to_string(),
                })?;

            let mut conflicts = Vec::new();
            for alias in aliases {
                let alias = alias.trim();
                if alias.is_empty() {
                    continue;
                }
                let existing: Option<String> = stmt
                    .query_row(params![alias], |row| row.get(0))
                    .optional()
                    .map_err(|e| Error::OperationFailed {
                        operation: "check_alias".to_string(),
                        cause: e.to_string(),
                    })?;
                if let Some(existing_path) = existing
                    && existing_path != path
                {
                    conflicts.push(AliasConflict {
                        alias: alias.to_string(),
                        existing_path,
                    });
                }
            }

            Ok(conflicts)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("check_alias_conflicts", start, status);
        result
    }

    /// Resolves an alias to its canonical path, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    #[instrument(skip(self), fields(workspace = %self.workspace, operation = "resolve_alias"))]
    pub fn resolve_alias(&self, alias: &str) -> Result<Option<String>> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(None);
        }

        let conn = acquire_lock(&self.conn);
        conn.query_row(
            "SELECT canonical_path FROM aliases WHERE alias = ?1",
            params![alias],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::OperationFailed {
            operation: "resolve_alias".to_string(),
            cause: e.to_string(),
        })
    }

    /// Fetches a single note's index row.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn note(&self, path: &str) -> Result<Option<IndexedNote>> {
        let conn = acquire_lock(&self.conn);
        conn.query_row(
            "SELECT path, title, type, tags, aliases, created, modified
             FROM notes WHERE path = ?1",
            params![path],
            note_from_row,
        )
        .optional()
        .map_err(|e| Error::OperationFailed {
            operation: "get_note".to_string(),
            cause: e.to_string(),
        })
    }

    /// Returns the paths of all notes with an edge into `path`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn backlinks(&self, path: &str) -> Result<Vec<String>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare("SELECT source_path FROM links WHERE target_path = ?1 ORDER BY source_path")
            .map_err(|e| Error::OperationFailed {
                operation: "prepare_backlinks".to_string(),
                cause: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![path], |row| row.get::<_, String>(0))
            .map_err(|e| Error::OperationFailed {
                operation: "query_backlinks".to_string(),
                cause: e.to_string(),
            })?;

        let mut sources = Vec::new();
        for row in rows {
            sources.push(row.map_err(|e| Error::OperationFailed {
                operation: "read_backlink_row".to_string(),
                cause: e.to_string(),
            })?);
        }
        Ok(sources)
    }

    /// Searches the workspace.
    ///
    /// Free-text tokens are prefix-matched against the inverted index and
    /// intersected; tag, path-prefix, backlink, and modified-since filters
    /// narrow the result further. Results are ordered by `modified`
    /// descending and paginated with an opaque cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no filter at all is supplied or
    /// the cursor cannot be decoded, and an internal error if a query fails.
    #[instrument(skip(self, query), fields(workspace = %self.workspace, operation = "search", limit = query.limit))]
    pub fn search(&self, query: &SearchQuery) -> Result<Page<SearchHit>> {
        let start = Instant::now();
        let result = (|| {
            if query.is_unfiltered() {
                return Err(Error::Validation(
                    "search requires at least one of: query, tags, path_prefix, backlinks_to, modified_since"
                        .to_string(),
                ));
            }

            let offset = match query.cursor.as_deref() {
                Some(cursor) => decode_cursor(cursor)?,
                None => 0,
            };

            let tokens = query.query.as_deref().map(tokenize).unwrap_or_default();
            if query.query.is_some() && tokens.is_empty() {
                // Tokens below the minimum length are never indexed, so a
                // query that reduces to nothing can match nothing.
                return Ok(Page {
                    items: Vec::new(),
                    total_count: 0,
                    cursor: None,
                });
            }

            let (conditions, filter_params, next_param, backlinks_param) =
                build_search_filter(query, &tokens, 1);
            let where_clause = conditions.join(" AND ");

            let conn = acquire_lock(&self.conn);

            let count_sql = format!("SELECT COUNT(*) FROM notes m WHERE {where_clause}");
            let total: i64 = conn
                .query_row(
                    &count_sql,
                    rusqlite::params_from_iter(filter_params.iter()),
                    |row| row.get(0),
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "count_search".to_string(),
                    cause: e.to_string(),
                })?;
            let total_count = usize::try_from(total).unwrap_or(0);

            // The snippet is the matched edge's context, only meaningful for
            // backlink queries; the subselect reuses the filter's parameter.
            let snippet_select = backlinks_param.map_or_else(
                || "NULL AS snippet".to_string(),
                |idx| {
                    format!(
                        "(SELECT l.context FROM links l
                          WHERE l.source_path = m.path AND l.target_path = ?{idx}) AS snippet"
                    )
                },
            );

            let limit_param = next_param;
            let offset_param = next_param + 1;
            let sql = format!(
                "SELECT m.path, m.title, m.type, m.tags, m.aliases, m.created, m.modified,
                        {snippet_select}
                 FROM notes m
                 WHERE {where_clause}
                 ORDER BY m.modified DESC, m.path ASC
                 LIMIT ?{limit_param} OFFSET ?{offset_param}"
            );

            let mut stmt = conn.prepare(&sql).map_err(|e| Error::OperationFailed {
                operation: "prepare_search".to_string(),
                cause: e.to_string(),
            })?;

            let rows = stmt
                .query_map(
                    rusqlite::params_from_iter(
                        filter_params
                            .into_iter()
                            .chain(std::iter::once(query.limit.to_string()))
                            .chain(std::iter::once(offset.to_string())),
                    ),
                    |row| {
                        let note = note_from_row(row)?;
                        let snippet: Option<String> = row.get(7)?;
                        Ok(SearchHit { note, snippet })
                    },
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "execute_search".to_string(),
                    cause: e.to_string(),
                })?;

            let mut items = Vec::new();
            for row in rows {
                items.push(row.map_err(|e| Error::OperationFailed {
                    operation: "read_search_row".to_string(),
                    cause: e.to_string(),
                })?);
            }

            let next_offset = offset + items.len();
            let cursor = (next_offset < total_count).then(|| encode_cursor(next_offset));

            Ok(Page {
                items,
                total_count,
                cursor,
            })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("search", start, status);
        result
    }

    /// Lists notes, optionally restricted to a path prefix.
    ///
    /// With `recursive` off, only direct children are returned: paths with
    /// no further `/` past the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an undecodable cursor, and an
    /// internal error if a query fails.
    #[instrument(skip(self, query), fields(workspace = %self.workspace, operation = "list_notes", limit = query.limit))]
    pub fn list_notes(&self, query: &ListQuery) -> Result<Page<IndexedNote>> {
        let start = Instant::now();
        let result = (|| {
            let offset = match query.cursor.as_deref() {
                Some(cursor) => decode_cursor(cursor)?,
                None => 0,
            };

            let mut conditions = Vec::new();
            let mut params_vec: Vec<String> = Vec::new();
            let mut param_idx = 1;

            let prefix = query.path_prefix.as_deref().unwrap_or("");
            if !prefix.is_empty() {
                conditions.push(format!("m.path LIKE ?{param_idx} ESCAPE '\\'"));
                params_vec.push(format!("{}%", escape_like_wildcards(prefix)));
                param_idx += 1;
            }
            if !query.recursive {
                // substr/instr count characters, so the remainder offset is
                // the prefix length in characters, one-based.
                conditions.push(format!("instr(substr(m.path, ?{param_idx}), '/') = 0"));
                params_vec.push((prefix.chars().count() + 1).to_string());
                param_idx += 1;
            }

            let where_clause = if conditions.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", conditions.join(" AND "))
            };

            let order_clause = match query.sort {
                SortOrder::Modified => "m.modified DESC, m.path ASC",
                SortOrder::Created => "m.created DESC, m.path ASC",
                SortOrder::Path => "m.path ASC",
            };

            let conn = acquire_lock(&self.conn);

            let count_sql = format!("SELECT COUNT(*) FROM notes m {where_clause}");
            let total: i64 = conn
                .query_row(
                    &count_sql,
                    rusqlite::params_from_iter(params_vec.iter()),
                    |row| row.get(0),
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "count_list".to_string(),
                    cause: e.to_string(),
                })?;
            let total_count = usize::try_from(total).unwrap_or(0);

            let limit_param = param_idx;
            let offset_param = param_idx + 1;
            let sql = format!(
                "SELECT m.path, m.title, m.type, m.tags, m.aliases, m.created, m.modified
                 FROM notes m
                 {where_clause}
                 ORDER BY {order_clause}
                 LIMIT ?{limit_param} OFFSET ?{offset_param}"
            );

            let mut stmt = conn.prepare(&sql).map_err(|e| Error::OperationFailed {
                operation: "prepare_list".to_string(),
                cause: e.to_string(),
            })?;

            let rows = stmt
                .query_map(
                    rusqlite::params_from_iter(
                        params_vec
                            .into_iter()
                            .chain(std::iter::once(query.limit.to_string()))
                            .chain(std::iter::once(offset.to_string())),
                    ),
                    note_from_row,
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "execute_list".to_string(),
                    cause: e.to_string(),
                })?;

            let mut items = Vec::new();
            for row in rows {
                items.push(row.map_err(|e| Error::OperationFailed {
                    operation: "read_list_row".to_string(),
                    cause: e.to_string(),
                })?);
            }

            let next_offset = offset + items.len();
            let cursor = (next_offset < total_count).then(|| encode_cursor(next_offset));

            Ok(Page {
                items,
                total_count,
                cursor,
            })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("list_notes", start, status);
        result
    }

    /// Traverses the link graph from a note, breadth-first.
    ///
    /// Each requested direction is walked independently up to `depth` hops
    /// with its own visited set, so a node is reported at most once per
    /// direction and cycles terminate. Neighbor titles reflect the current
    /// index state; dangling targets fall back to the raw path.
    ///
    /// # Errors
    ///
    /// Returns an error if a traversal query fails.
    #[instrument(skip(self), fields(workspace = %self.workspace, operation = "get_links", path = %path, depth = depth))]
    pub fn get_links(
        &self,
        path: &str,
        depth: usize,
        direction: LinkDirection,
    ) -> Result<LinksResult> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let outgoing = if direction.includes_outgoing() {
                traverse_links(&conn, path, depth, true)?
            } else {
                Vec::new()
            };
            let incoming = if direction.includes_incoming() {
                traverse_links(&conn, path, depth, false)?
            } else {
                Vec::new()
            };

            Ok(LinksResult {
                path: path.to_string(),
                outgoing,
                incoming,
            })
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("get_links", start, status);
        result
    }

    /// Empties every relation, leaving the schema in place.
    ///
    /// Used as the first step of an index rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails.
    #[instrument(skip(self), fields(workspace = %self.workspace, operation = "clear"))]
    pub fn clear(&self) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            conn.execute("BEGIN IMMEDIATE", [])
                .map_err(|e| Error::OperationFailed {
                    operation: "begin_transaction".to_string(),
                    cause: e.to_string(),
                })?;

            let result = (|| {
                for table in ["search_terms", "aliases", "links", "notes"] {
                    conn.execute(&format!("DELETE FROM {table}"), [])
                        .map_err(|e| Error::OperationFailed {
                            operation: "clear_table".to_string(),
                            cause: e.to_string(),
                        })?;
                }
                Ok(())
            })();

            if result.is_ok() {
                conn.execute("COMMIT", [])
                    .map_err(|e| Error::OperationFailed {
                        operation: "commit_transaction".to_string(),
                        cause: e.to_string(),
                    })?;
            } else {
                let _ = conn.execute("ROLLBACK", []);
            }

            result
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        self.record_operation_metrics("clear", start, status);
        result
    }

    fn record_operation_metrics(
        &self,
        operation: &'static str,
        start: Instant,
        status: &'static str,
    ) {
        metrics::counter!(
            "cairn_index_operations_total",
            "operation" => operation,
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            "cairn_index_operation_duration_ms",
            "operation" => operation,
            "status" => status
        )
        .record(start.elapsed().as_secs_f64() * 1000.0);
    }
}

/// Builds search WHERE conditions with numbered parameters.
///
/// Returns the conditions, their parameters, the next free parameter index,
/// and the parameter index bound to `backlinks_to` (for snippet reuse).
fn build_search_filter(
    query: &SearchQuery,
    tokens: &[String],
    start_param: usize,
) -> (Vec<String>, Vec<String>, usize, Option<usize>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();
    let mut param_idx = start_param;
    let mut backlinks_param = None;

    // Every token must prefix-match some indexed term for the note (AND of
    // per-token subqueries is the posting-set intersection).
    for token in tokens {
        conditions.push(format!(
            "m.path IN (SELECT path FROM search_terms WHERE term LIKE ?{param_idx} ESCAPE '\\')"
        ));
        params.push(format!("{}%", escape_like_wildcards(token)));
        param_idx += 1;
    }

    // Whole-tag matching against the comma-joined column.
    for tag in &query.tags {
        conditions.push(format!(
            "(',' || m.tags || ',') LIKE ?{param_idx} ESCAPE '\\'"
        ));
        params.push(format!("%,{},%", escape_like_wildcards(tag)));
        param_idx += 1;
    }

    if let Some(ref prefix) = query.path_prefix {
        conditions.push(format!("m.path LIKE ?{param_idx} ESCAPE '\\'"));
        params.push(format!("{}%", escape_like_wildcards(prefix)));
        param_idx += 1;
    }

    if let Some(ref target) = query.backlinks_to {
        conditions.push(format!(
            "m.path IN (SELECT source_path FROM links WHERE target_path = ?{param_idx})"
        ));
        params.push(target.clone());
        backlinks_param = Some(param_idx);
        param_idx += 1;
    }

    // Timestamps share one fixed-width UTC format, so lexicographic
    // comparison is chronological comparison.
    if let Some(ref since) = query.modified_since {
        conditions.push(format!("m.modified >= ?{param_idx}"));
        params.push(since.clone());
        param_idx += 1;
    }

    (conditions, params, param_idx, backlinks_param)
}

/// Walks edges breadth-first from `origin` in one direction.
fn traverse_links(
    conn: &Connection,
    origin: &str,
    depth: usize,
    outgoing: bool,
) -> Result<Vec<LinkNeighbor>> {
    let edge_sql = if outgoing {
        "SELECT target_path, context FROM links WHERE source_path = ?1 ORDER BY target_path"
    } else {
        "SELECT source_path, context FROM links WHERE target_path = ?1 ORDER BY source_path"
    };

    let mut edge_stmt = conn.prepare(edge_sql).map_err(|e| Error::OperationFailed {
        operation: "prepare_traverse".to_string(),
        cause: e.to_string(),
    })?;
    let mut title_stmt = conn
        .prepare("SELECT title FROM notes WHERE path = ?1")
        .map_err(|e| Error::OperationFailed {
            operation: "prepare_neighbor_title".to_string(),
            cause: e.to_string(),
        })?;

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(origin.to_string());
    let mut frontier = vec![origin.to_string()];
    let mut neighbors = Vec::new();

    for _ in 0..depth {
        let mut next_frontier = Vec::new();

        for node in &frontier {
            let rows = edge_stmt
                .query_map(params![node], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|e| Error::OperationFailed {
                    operation: "query_edges".to_string(),
                    cause: e.to_string(),
                })?;

            for row in rows {
                let (neighbor_path, context) = row.map_err(|e| Error::OperationFailed {
                    operation: "read_edge_row".to_string(),
                    cause: e.to_string(),
                })?;

                if !visited.insert(neighbor_path.clone()) {
                    continue;
                }

                let title: Option<String> = title_stmt
                    .query_row(params![neighbor_path], |row| row.get(0))
                    .optional()
                    .map_err(|e| Error::OperationFailed {
                        operation: "neighbor_title".to_string(),
                        cause: e.to_string(),
                    })?;

                neighbors.push(LinkNeighbor {
                    title: title.unwrap_or_else(|| neighbor_path.clone()),
                    path: neighbor_path.clone(),
                    context,
                });
                next_frontier.push(neighbor_path);
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    Ok(neighbors)
}

/// Maps a `notes` row (columns `path..modified`) to an [`IndexedNote`].
fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexedNote> {
    Ok(IndexedNote {
        path: row.get(0)?,
        title: row.get(1)?,
        note_type: row.get(2)?,
        tags: split_joined(&row.get::<_, String>(3)?),
        aliases: split_joined(&row.get::<_, String>(4)?),
        created: row.get(5)?,
        modified: row.get(6)?,
    })
}

fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
