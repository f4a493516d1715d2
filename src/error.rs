//! Error types for session control.

use std::fmt;

use thiserror::Error;

/// Upstream call that produced an [`ControlError::Upstream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOperation {
    /// Workflow dispatch (start).
    Dispatch,
    /// Listing recent runs (status, stop).
    ListRuns,
    /// Cancelling one run (stop).
    Cancel,
}

impl UpstreamOperation {
    /// Operator-facing summary used in error responses.
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Dispatch => "Failed to start remote desktop session.",
            Self::ListRuns => "Failed to list workflow runs.",
            Self::Cancel => "Failed to stop remote desktop session.",
        }
    }
}

impl fmt::Display for UpstreamOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dispatch => "workflow dispatch",
            Self::ListRuns => "list workflow runs",
            Self::Cancel => "cancel workflow run",
        })
    }
}

/// Failure of a start, stop, or status operation.
#[derive(Error, Debug)]
pub enum ControlError {
    /// A required setting is absent or still holds its placeholder value.
    #[error("{field} is not set or is a placeholder")]
    ConfigurationMissing {
        /// Name of the setting, as an operator would configure it.
        field: &'static str,
    },

    /// Browser-supplied repository is not `owner/repo`.
    #[error("Invalid repository name format '{0}'. Use: owner/repository")]
    InvalidRepository(String),

    /// Nothing is queued or running, so there is nothing to stop.
    #[error("No active remote desktop session found to stop.")]
    NoActiveSession,

    /// Upstream answered with an unexpected status; body kept verbatim.
    #[error("{operation} failed with status {status}")]
    Upstream {
        operation: UpstreamOperation,
        status: u16,
        body: String,
    },

    /// Network or TLS failure talking to the upstream API.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered 2xx with a body we could not read.
    #[error("Invalid upstream payload: {0}")]
    Decode(String),
}

/// Result type alias for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;
