//! Link types: extracted WikiLinks, graph edges, and traversal results.

use serde::{Deserialize, Serialize};

/// A WikiLink occurrence extracted from a document body.
///
/// Ephemeral: computed on every parse, never persisted directly. Duplicate
/// targets are all reported; deduplication happens in the index layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    /// The full matched text, brackets included (e.g. `[[b|Beta]]`).
    pub raw_text: String,
    /// The normalized slug form of the link target.
    pub target: String,
    /// The display text: the part after `|`, or the raw target when absent.
    pub display_text: String,
    /// Surrounding body text with newlines collapsed to spaces.
    pub context: String,
}

/// A directed edge in the workspace link graph, unique per
/// `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    /// Path of the note containing the link.
    pub source_path: String,
    /// Alias-resolved canonical target path, or the raw slug when the
    /// target is unknown.
    pub target_path: String,
    /// Context snippet captured at extraction time.
    pub context: String,
}

/// One neighbor reported by a link-graph traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkNeighbor {
    /// Neighbor path.
    pub path: String,
    /// Neighbor title; falls back to the raw path for dangling targets.
    pub title: String,
    /// Edge context snippet.
    pub context: String,
}

/// Result of a link-graph traversal from a single note.
#[derive(Debug, Clone, Serialize)]
pub struct LinksResult {
    /// The note traversal started from.
    pub path: String,
    /// Neighbors reached by following outgoing edges.
    pub outgoing: Vec<LinkNeighbor>,
    /// Neighbors reached by following incoming edges.
    pub incoming: Vec<LinkNeighbor>,
}

/// Direction selector for link-graph traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// Incoming edges only (backlinks).
    In,
    /// Outgoing edges only.
    Out,
    /// Both directions.
    #[default]
    Both,
}

impl LinkDirection {
    /// Returns the direction as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Both => "both",
        }
    }

    /// Parses a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns true if incoming edges should be traversed.
    #[must_use]
    pub const fn includes_incoming(&self) -> bool {
        matches!(self, Self::In | Self::Both)
    }

    /// Returns true if outgoing edges should be traversed.
    #[must_use]
    pub const fn includes_outgoing(&self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }
}
