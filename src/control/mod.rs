//! Start, stop, and status operations.
//!
//! Each operation validates its [`SessionSettings`] before touching the
//! network, then issues one or two [`RunRegistry`] calls. Nothing is cached
//! between calls and nothing is retried.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::SessionSettings;
use crate::error::Result;
use crate::github::RunRegistry;
use crate::session::{RunId, SessionView, compute_status, select_run_to_cancel};

/// Upstream page size used when none is configured.
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Translates start/stop/status into upstream workflow calls.
#[derive(Clone)]
pub struct ControlSurface {
    registry: Arc<dyn RunRegistry>,
    per_page: u32,
}

impl fmt::Debug for ControlSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSurface")
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

impl ControlSurface {
    /// Create a control surface over `registry`.
    ///
    /// `per_page` bounds how many recent runs `status` and `stop` inspect;
    /// an active run older than that window is not seen.
    pub fn new(registry: Arc<dyn RunRegistry>, per_page: u32) -> Self {
        Self {
            registry,
            per_page: if per_page == 0 { DEFAULT_PER_PAGE } else { per_page },
        }
    }

    /// Dispatch the workflow once.
    pub async fn start(&self, settings: &SessionSettings) -> Result<()> {
        let target = settings.validate()?;
        self.registry.dispatch_workflow(&target).await?;

        info!(
            name: "session.start.dispatched",
            repository = %target.repository(),
            workflow = %target.workflow_id,
            git_ref = %target.branch_ref,
            "Workflow dispatched"
        );
        Ok(())
    }

    /// Cancel the newest queued or in-progress run and return its id.
    ///
    /// Fails with [`ControlError::NoActiveSession`](crate::error::ControlError::NoActiveSession)
    /// without issuing a cancel when nothing is active.
    pub async fn stop(&self, settings: &SessionSettings) -> Result<RunId> {
        let target = settings.validate()?;
        let runs = self.registry.list_runs(&target, self.per_page).await?;
        let run_id = select_run_to_cancel(&runs)?.id;

        self.registry.cancel_run(&target, run_id).await?;

        info!(
            name: "session.stop.cancelled",
            repository = %target.repository(),
            run_id = run_id,
            "Workflow run cancellation accepted"
        );
        Ok(run_id)
    }

    /// Current session view derived from the most recent runs.
    pub async fn status(&self, settings: &SessionSettings) -> Result<SessionView> {
        let target = settings.validate()?;
        let runs = self.registry.list_runs(&target, self.per_page).await?;
        let view = compute_status(&runs);

        tracing::debug!(
            name: "session.status.computed",
            repository = %target.repository(),
            inspected = runs.len(),
            active = view.is_active(),
            "Session status computed"
        );
        Ok(view)
    }
}
