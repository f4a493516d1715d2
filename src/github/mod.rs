//! Upstream run registry.
//!
//! The GitHub Actions REST API is the single source of truth for run state.
//! This module abstracts the three calls the control surface needs behind
//! [`RunRegistry`] so they can be faked in tests.
//!
//! # Architecture
//!
//! - [`RunRegistry`]: Trait with dispatch, list-runs, and cancel
//! - [`GitHubClient`]: `reqwest` implementation against `api.github.com`

mod client;
mod types;

pub use client::GitHubClient;
pub use types::{DispatchRequest, WorkflowRunsPage};

use async_trait::async_trait;

use crate::config::WorkflowTarget;
use crate::error::Result;
use crate::session::{RunId, RunSummary};

/// Operations the control surface issues against the upstream API.
///
/// Each method performs exactly one outbound request and never retries.
/// Unexpected upstream statuses surface as
/// [`ControlError::Upstream`](crate::error::ControlError::Upstream).
#[async_trait]
pub trait RunRegistry: Send + Sync {
    /// Queue a new run of `target.workflow_id` on `target.branch_ref`.
    ///
    /// Succeeds only on `204 No Content`.
    async fn dispatch_workflow(&self, target: &WorkflowTarget) -> Result<()>;

    /// Most recent runs of the workflow, newest first, at most `per_page`.
    async fn list_runs(&self, target: &WorkflowTarget, per_page: u32) -> Result<Vec<RunSummary>>;

    /// Request cancellation of one run.
    ///
    /// Succeeds only on `202 Accepted`.
    async fn cancel_run(&self, target: &WorkflowTarget, run_id: RunId) -> Result<()>;
}
