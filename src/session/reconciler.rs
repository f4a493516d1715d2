//! Derives session state from a list of recent runs.

use crate::error::ControlError;

use super::run::RunSummary;

/// User-facing session status, computed fresh on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    /// A queued or in-progress run exists.
    Active(RunSummary),
    /// No active run; `last_run` is the newest run regardless of status.
    Inactive { last_run: Option<RunSummary> },
}

impl SessionView {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// Map runs ordered newest first to a [`SessionView`].
///
/// Scans the whole slice: the newest run may be completed while an older
/// one is still queued.
#[must_use]
pub fn compute_status(runs: &[RunSummary]) -> SessionView {
    match runs.iter().find(|run| run.is_active()) {
        Some(run) => SessionView::Active(run.clone()),
        None => SessionView::Inactive {
            last_run: runs.first().cloned(),
        },
    }
}

/// Pick the run a stop request should cancel: the most recently created
/// active run.
///
/// Inactive runs in the input are ignored. Equal timestamps keep their input
/// order (stable sort).
pub fn select_run_to_cancel(runs: &[RunSummary]) -> Result<&RunSummary, ControlError> {
    let mut candidates: Vec<&RunSummary> = runs.iter().filter(|run| run.is_active()).collect();
    candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    candidates
        .into_iter()
        .next()
        .ok_or(ControlError::NoActiveSession)
}
