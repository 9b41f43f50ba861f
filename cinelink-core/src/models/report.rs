use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::id::{ReportId, SourceId};
use super::source::WatchSource;

/// Report lifecycle: filed open, resolved only by an operator action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Open,
    Resolved,
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("Unknown report status: {s}")),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// Community report filed against a curated source. Anonymous reporters are
/// allowed; `email` is an optional contact hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub source_id: SourceId,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl Report {
    #[must_use]
    pub fn new(source_id: SourceId, reason: String, email: Option<String>) -> Self {
        Self {
            id: ReportId::new(),
            source_id,
            reason,
            email,
            status: ReportStatus::Open,
            created_at: Utc::now(),
        }
    }
}

/// Open report joined with the source it targets (moderation surface)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWithSource {
    #[serde(flatten)]
    pub report: Report,
    pub source: WatchSource,
}
