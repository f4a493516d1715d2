//! Workflow run projection as returned by the upstream API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream run identifier.
pub type RunId = u64;

/// Lifecycle status of a workflow run.
///
/// Values the upstream API adds later (`waiting`, `requested`, ...) are kept
/// verbatim in [`RunStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Other(String),
}

impl RunStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Other(value) => value,
        }
    }

    /// Whether a run in this status counts as an active session.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::InProgress)
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Other(String),
}

impl RunConclusion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for RunConclusion {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<RunConclusion> for String {
    fn from(conclusion: RunConclusion) -> Self {
        match conclusion {
            RunConclusion::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One workflow run, deserialized verbatim from the upstream listing.
///
/// Unknown upstream fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub id: RunId,
    /// Current lifecycle status.
    pub status: RunStatus,
    /// Outcome, present only once `status` is `completed`.
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    /// Creation timestamp; only used for ordering.
    pub created_at: DateTime<Utc>,
    /// Link to the run in the upstream web UI.
    #[serde(default)]
    pub html_url: String,
}

impl RunSummary {
    /// Whether this run is queued or in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
