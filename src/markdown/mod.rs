//! Markdown document primitives.
//!
//! Frontmatter parsing/serialization, WikiLink extraction, and
//! section-aware editing. Everything here is pure: no I/O, no index state.

pub mod frontmatter;
pub mod sections;
pub mod wikilinks;

pub use frontmatter::FrontmatterCodec;
pub use sections::{append_to_section, extract_section, prepend_to_section};
pub use wikilinks::{extract_wikilinks, normalize_target};
