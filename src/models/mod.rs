//! Data models for cairn.
//!
//! This module contains all the core data structures used throughout the system.

mod link;
mod note;
mod query;

pub use link::{ExtractedLink, LinkDirection, LinkEdge, LinkNeighbor, LinksResult};
pub use note::{Frontmatter, IndexedNote, Note, NoteMetadata};
pub use query::{
    DEFAULT_LIMIT, ListQuery, Page, SearchHit, SearchQuery, SortOrder, decode_cursor,
    encode_cursor,
};
