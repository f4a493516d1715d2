//! Request and response payloads of the workflow endpoints.

use serde::{Deserialize, Serialize};

use crate::session::RunSummary;

/// Body of `POST /repos/{owner}/{repo}/actions/workflows/{id}/dispatches`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRequest {
    /// Branch or tag the workflow runs on.
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Response of `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<RunSummary>,
}
