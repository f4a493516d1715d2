//! `reqwest` implementation of [`RunRegistry`].

use async_trait::async_trait;
use reqwest::{
    Method, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use url::Url;

use super::RunRegistry;
use super::types::{DispatchRequest, WorkflowRunsPage};
use crate::config::WorkflowTarget;
use crate::error::{ControlError, Result, UpstreamOperation};
use crate::session::{RunId, RunSummary};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// HTTP client for the GitHub Actions REST API.
///
/// Credentials are per call (taken from the [`WorkflowTarget`]) so one client
/// serves both process-level and browser-supplied settings.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: Url,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com`).
    ///
    /// A base path such as `/api/v3` for GitHub Enterprise is preserved.
    pub fn new(base_url: impl AsRef<str>, user_agent: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("GitHub API base URL cannot be a base: {base_url}");
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn workflow_endpoint(&self, target: &WorkflowTarget, tail: &str) -> Url {
        self.endpoint(&[
            "repos",
            &target.owner,
            &target.repo,
            "actions",
            "workflows",
            &target.workflow_id,
            tail,
        ])
    }

    fn request(&self, method: Method, url: Url, target: &WorkflowTarget) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", target.credential))
            .header(ACCEPT, GITHUB_ACCEPT)
    }

    async fn upstream_error(operation: UpstreamOperation, response: Response) -> ControlError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            operation = %operation,
            status = status,
            body_length = body.len(),
            "GitHub API returned an unexpected status"
        );
        tracing::debug!(operation = %operation, body = %body, "GitHub API error body");
        ControlError::Upstream {
            operation,
            status,
            body,
        }
    }
}

#[async_trait]
impl RunRegistry for GitHubClient {
    async fn dispatch_workflow(&self, target: &WorkflowTarget) -> Result<()> {
        let url = self.workflow_endpoint(target, "dispatches");
        tracing::debug!(url = %url, git_ref = %target.branch_ref, "Dispatching workflow");

        let response = self
            .request(Method::POST, url, target)
            .json(&DispatchRequest {
                git_ref: target.branch_ref.clone(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::upstream_error(UpstreamOperation::Dispatch, response).await)
        }
    }

    async fn list_runs(&self, target: &WorkflowTarget, per_page: u32) -> Result<Vec<RunSummary>> {
        let url = self.workflow_endpoint(target, "runs");
        tracing::debug!(url = %url, per_page = per_page, "Listing workflow runs");

        let response = self
            .request(Method::GET, url, target)
            .query(&[("per_page", per_page)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(UpstreamOperation::ListRuns, response).await);
        }

        let page: WorkflowRunsPage = response
            .json()
            .await
            .map_err(|e| ControlError::Decode(e.to_string()))?;
        tracing::debug!(
            total_count = page.total_count,
            returned = page.workflow_runs.len(),
            "Workflow runs listed"
        );
        Ok(page.workflow_runs)
    }

    async fn cancel_run(&self, target: &WorkflowTarget, run_id: RunId) -> Result<()> {
        let run = run_id.to_string();
        let url = self.endpoint(&[
            "repos",
            &target.owner,
            &target.repo,
            "actions",
            "runs",
            &run,
            "cancel",
        ]);
        tracing::debug!(url = %url, run_id = run_id, "Cancelling workflow run");

        let response = self.request(Method::POST, url, target).send().await?;

        if response.status() == StatusCode::ACCEPTED {
            Ok(())
        } else {
            Err(Self::upstream_error(UpstreamOperation::Cancel, response).await)
        }
    }
}
