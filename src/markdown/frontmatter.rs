//! YAML frontmatter parsing and serialization.
//!
//! Document format:
//! ```text
//! ---
//! title: Jamie
//! type: person
//! tags: [team, melbourne]
//! ---
//! The markdown body here.
//! ```

use crate::models::Frontmatter;
use crate::{Error, Result};

/// Codec for the YAML frontmatter block at the top of a document.
pub struct FrontmatterCodec;

impl FrontmatterCodec {
    /// The frontmatter delimiter line.
    const DELIMITER: &'static str = "---";

    /// Splits a raw document into frontmatter and body.
    ///
    /// A document carries frontmatter only when its first line is exactly
    /// `---`; the block runs to the next line that is exactly `---`. With no
    /// opening or closing delimiter the whole input is body. A block that
    /// fails to parse as a YAML mapping yields an empty frontmatter map, not
    /// an error: a document with unparsable metadata is treated as having
    /// none.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cairn::markdown::FrontmatterCodec;
    ///
    /// let raw = "---\ntitle: Jamie\n---\nWorks at Acme.";
    /// let (fm, body) = FrontmatterCodec::parse(raw);
    /// assert_eq!(fm.title.as_deref(), Some("Jamie"));
    /// assert_eq!(body, "Works at Acme.");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> (Frontmatter, String) {
        let Some(rest) = raw
            .strip_prefix("---\r\n")
            .or_else(|| raw.strip_prefix("---\n"))
        else {
            return (Frontmatter::default(), raw.to_string());
        };

        let mut pos = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end_matches(['\r', '\n']) == Self::DELIMITER {
                let block = &rest[..pos];
                let body = &rest[pos + line.len()..];
                let frontmatter = serde_yaml_ng::from_str(block).unwrap_or_default();
                return (frontmatter, body.to_string());
            }
            pos += line.len();
        }

        // No closing delimiter: the whole input is body.
        (Frontmatter::default(), raw.to_string())
    }

    /// Serializes frontmatter and body back into a raw document.
    ///
    /// Always wraps the metadata with `---` delimiters, even when the map is
    /// empty, so every persisted document has a uniform shape.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cairn::markdown::FrontmatterCodec;
    /// use cairn::models::Frontmatter;
    ///
    /// let fm = Frontmatter::new().with_title("Jamie");
    /// let raw = FrontmatterCodec::serialize(&fm, "Works at Acme.").unwrap();
    /// assert!(raw.starts_with("---\n"));
    /// assert!(raw.contains("title: Jamie"));
    /// assert!(raw.ends_with("Works at Acme."));
    /// ```
    pub fn serialize(frontmatter: &Frontmatter, body: &str) -> Result<String> {
        let yaml = serde_yaml_ng::to_string(frontmatter).map_err(|e| Error::OperationFailed {
            operation: "serialize_frontmatter".to_string(),
            cause: e.to_string(),
        })?;

        Ok(format!(
            "{}\n{}\n{}\n{}",
            Self::DELIMITER,
            yaml.trim_end(),
            Self::DELIMITER,
            body
        ))
    }
}
