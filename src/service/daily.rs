//! Daily notes: date-keyed documents under `daily/`.
//!
//! A daily note lives at `daily/{YYYY-MM-DD}` and is created on first touch
//! with daily frontmatter, so reads and appends never have to care whether
//! today's note exists yet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::engine::{PatchOutcome, PatchRequest, WriteRequest};
use crate::markdown::FrontmatterCodec;
use crate::models::Frontmatter;
use crate::service::{ReadResult, WorkspaceService};
use crate::{Error, Result};

/// Operations supported against a daily note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyOp {
    /// Return the note's content.
    #[default]
    Read,
    /// Append content to the end of the note.
    Append,
    /// Append content to the end of a named section.
    AppendSection,
    /// Insert content directly after a named section's heading.
    PrependSection,
}

impl DailyOp {
    /// Returns the operation as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Append => "append",
            Self::AppendSection => "append_section",
            Self::PrependSection => "prepend_section",
        }
    }

    /// Parses an operation from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" => Some(Self::Read),
            "append" => Some(Self::Append),
            "append_section" => Some(Self::AppendSection),
            "prepend_section" => Some(Self::PrependSection),
            _ => None,
        }
    }
}

/// Parameters for a daily-note operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRequest {
    /// Date in `YYYY-MM-DD` form; today in the configured timezone when
    /// absent.
    pub date: Option<String>,
    /// Operation to perform.
    pub op: DailyOp,
    /// Content for the mutating operations.
    pub content: Option<String>,
    /// Section heading for the section operations.
    pub section: Option<String>,
}

/// Result of a daily-note operation.
#[derive(Debug, Clone, Serialize)]
pub struct DailyResult {
    /// Resolved date.
    pub date: String,
    /// Document path, always `daily/{date}`.
    pub path: String,
    /// Whether this call created the note.
    pub created: bool,
    /// The note content, for reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<ReadResult>,
    /// The applied patch, for mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<PatchOutcome>,
}

impl WorkspaceService {
    /// Reads or appends to a date-keyed note under `daily/`, creating it
    /// first when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed date, a mutation
    /// without content, or a section operation without a section, plus any
    /// underlying write/read/patch error.
    #[instrument(skip(self, request), fields(workspace = %self.workspace, op = request.op.as_str()))]
    pub fn daily(&self, request: &DailyRequest) -> Result<DailyResult> {
        let date = match request.date.as_deref() {
            Some(date) => canonical_date(date)?,
            None => self.today(),
        };
        let path = format!("daily/{date}");

        let created = if self.engine.exists(&self.workspace, &path)? {
            false
        } else {
            let frontmatter = Frontmatter::new()
                .with_title(date.clone())
                .with_type("daily")
                .with_tags(vec!["daily".to_string()]);
            let content = FrontmatterCodec::serialize(&frontmatter, "")?;
            self.write(&WriteRequest {
                path: path.clone(),
                content,
                ..Default::default()
            })?;
            tracing::debug!(path = %path, "created daily note");
            true
        };

        match request.op {
            DailyOp::Read => {
                let note = self.read(&path, None, false)?;
                Ok(DailyResult {
                    date,
                    path,
                    created,
                    note: Some(note),
                    patch: None,
                })
            },
            DailyOp::Append => {
                let content = required_content(request)?;
                let patch = self.patch(&PatchRequest::append(path.as_str(), content))?;
                Ok(DailyResult {
                    date,
                    path,
                    created,
                    note: None,
                    patch: Some(patch),
                })
            },
            DailyOp::AppendSection => {
                let content = required_content(request)?;
                let section = required_section(request)?;
                let patch =
                    self.patch(&PatchRequest::append_section(path.as_str(), section, content))?;
                Ok(DailyResult {
                    date,
                    path,
                    created,
                    note: None,
                    patch: Some(patch),
                })
            },
            DailyOp::PrependSection => {
                let content = required_content(request)?;
                let section = required_section(request)?;
                let patch =
                    self.patch(&PatchRequest::prepend_section(path.as_str(), section, content))?;
                Ok(DailyResult {
                    date,
                    path,
                    created,
                    note: None,
                    patch: Some(patch),
                })
            },
        }
    }

    fn today(&self) -> String {
        chrono::Utc::now()
            .with_timezone(&self.timezone)
            .format("%Y-%m-%d")
            .to_string()
    }
}

fn canonical_date(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid date '{date}', expected YYYY-MM-DD")))?;

    // "2026-1-1" parses but is not the spelling the path needs.
    let canonical = parsed.format("%Y-%m-%d").to_string();
    if canonical != date {
        return Err(Error::Validation(format!(
            "invalid date '{date}', expected YYYY-MM-DD"
        )));
    }
    Ok(canonical)
}

fn required_content(request: &DailyRequest) -> Result<&str> {
    request
        .content
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            Error::Validation(format!(
                "content is required for {}",
                request.op.as_str()
            ))
        })
}

fn required_section(request: &DailyRequest) -> Result<&str> {
    request
        .section
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            Error::Validation(format!(
                "section is required for {}",
                request.op.as_str()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::WorkspaceIndex;
    use crate::storage::MemoryBlobStore;
    use std::sync::Arc;
    use test_case::test_case;

    fn service() -> WorkspaceService {
        WorkspaceService::new(
            "test",
            Arc::new(MemoryBlobStore::new()),
            Arc::new(WorkspaceIndex::in_memory("test").unwrap()),
            chrono_tz::UTC,
        )
    }

    fn read_request(date: &str) -> DailyRequest {
        DailyRequest {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_read_auto_creates() {
        let svc = service();
        let result = svc.daily(&read_request("2026-02-24")).unwrap();

        assert_eq!(result.path, "daily/2026-02-24");
        assert!(result.created);
        let note = result.note.unwrap();
        assert_eq!(note.frontmatter.title.as_deref(), Some("2026-02-24"));
        assert_eq!(note.frontmatter.note_type.as_deref(), Some("daily"));
        assert_eq!(note.frontmatter.tags, vec!["daily"]);
        assert_eq!(note.body.as_deref(), Some(""));

        // Creation went through the normal write path, so the index saw it.
        let indexed = svc.index.note("daily/2026-02-24").unwrap().unwrap();
        assert_eq!(indexed.note_type, "daily");

        // Second touch finds the existing note.
        let again = svc.daily(&read_request("2026-02-24")).unwrap();
        assert!(!again.created);
    }

    #[test]
    fn test_daily_defaults_to_today() {
        let svc = service();
        let result = svc.daily(&DailyRequest::default()).unwrap();

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(result.date, today);
        assert_eq!(result.path, format!("daily/{today}"));
    }

    #[test]
    fn test_daily_append() {
        let svc = service();
        let result = svc
            .daily(&DailyRequest {
                date: Some("2026-02-24".to_string()),
                op: DailyOp::Append,
                content: Some("Met with [[people/jamie]].".to_string()),
                section: None,
            })
            .unwrap();

        assert!(result.created);
        assert!(result.patch.unwrap().bytes_added > 0);

        let note = svc.read("daily/2026-02-24", None, false).unwrap();
        assert_eq!(note.body.as_deref(), Some("Met with [[people/jamie]]."));
        assert_eq!(note.links.len(), 1);
    }

    #[test]
    fn test_daily_section_ops() {
        let svc = service();
        svc.daily(&DailyRequest {
            date: Some("2026-02-24".to_string()),
            op: DailyOp::Append,
            content: Some("## Log\nfirst".to_string()),
            section: None,
        })
        .unwrap();

        svc.daily(&DailyRequest {
            date: Some("2026-02-24".to_string()),
            op: DailyOp::AppendSection,
            content: Some("second".to_string()),
            section: Some("Log".to_string()),
        })
        .unwrap();
        svc.daily(&DailyRequest {
            date: Some("2026-02-24".to_string()),
            op: DailyOp::PrependSection,
            content: Some("zeroth".to_string()),
            section: Some("Log".to_string()),
        })
        .unwrap();

        let note = svc.read("daily/2026-02-24", None, false).unwrap();
        assert_eq!(
            note.body.as_deref(),
            Some("## Log\nzeroth\nfirst\n\nsecond")
        );

        // Fresh notes have no sections to target.
        let err = svc
            .daily(&DailyRequest {
                date: Some("2026-02-25".to_string()),
                op: DailyOp::AppendSection,
                content: Some("x".to_string()),
                section: Some("Log".to_string()),
            })
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_daily_mutations_require_content_and_section() {
        let svc = service();

        let err = svc
            .daily(&DailyRequest {
                date: Some("2026-02-24".to_string()),
                op: DailyOp::Append,
                content: None,
                section: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let err = svc
            .daily(&DailyRequest {
                date: Some("2026-02-24".to_string()),
                op: DailyOp::AppendSection,
                content: Some("x".to_string()),
                section: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test_case("2026-13-01"; "month out of range")]
    #[test_case("2026-02-30"; "day out of range")]
    #[test_case("2026-1-1"; "not zero padded")]
    #[test_case("24-02-2026"; "wrong field order")]
    #[test_case("yesterday"; "not a date")]
    fn test_daily_rejects_malformed_dates(date: &str) {
        let svc = service();
        let err = svc.daily(&read_request(date)).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_daily_op_parse_round_trip() {
        for op in [
            DailyOp::Read,
            DailyOp::Append,
            DailyOp::AppendSection,
            DailyOp::PrependSection,
        ] {
            assert_eq!(DailyOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(DailyOp::parse("prepend"), None);
    }
}
