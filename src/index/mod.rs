//! Workspace indexing: search, links, aliases, and listings.
//!
//! One `SQLite` database per workspace, wrapped in [`WorkspaceIndex`] and
//! handed out through [`WorkspaceRegistry`]. The index never owns data:
//! documents in the blob store are the source of truth, and a rebuild
//! reproduces every row here from their parsed contents.

mod registry;
mod sqlite;
mod terms;

pub use registry::WorkspaceRegistry;
pub use sqlite::{AliasConflict, WorkspaceIndex};
pub use terms::{derive_terms, tokenize};
