//! CLI command implementations.
//!
//! Each command builds a request from its arguments, runs it against a
//! [`crate::WorkspaceService`], and returns the result as a JSON value for
//! the binary to print. Unknown enum-like arguments (patch ops, sort
//! orders, directions) are rejected as validation errors rather than
//! silently defaulted.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `write` | Create or replace a note |
//! | `read` | Read a note, one section of it, or metadata only |
//! | `patch` | Apply a targeted edit to a note body |
//! | `delete` | Delete a note |
//! | `list` | List notes by path prefix |
//! | `search` | Search the workspace index |
//! | `links` | Traverse the link graph from a note |
//! | `daily` | Read or append to a date-keyed daily note |
//! | `reindex` | Rebuild the index from stored documents |
//! | `completions` | Generate shell completions |
//!
//! # Example Usage
//!
//! ```bash
//! # Write a note with a WikiLink
//! cairn write entities/person/jamie "Works at [[entities/company/acme|Acme]]."
//!
//! # Search, then follow the link graph
//! cairn search acme
//! cairn links entities/person/jamie --direction out
//!
//! # Append to today's daily note
//! cairn daily --op append "Reviewed the index rebuild path."
//! ```

mod commands;

pub use commands::{
    cmd_daily, cmd_delete, cmd_links, cmd_list, cmd_patch, cmd_read, cmd_reindex, cmd_search,
    cmd_write,
};

/// Splits a comma-separated argument into trimmed, non-empty values.
#[must_use]
pub fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
