//! JSON bodies returned by the control endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::{RunId, SessionView};

/// `{message}` acknowledgement for start and stop.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub message: String,
}

/// Normalized `GET /status` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Active {
        /// `queued` or `in_progress`.
        status: String,
        run_id: RunId,
        html_url: String,
        created_at: DateTime<Utc>,
        message: String,
    },
    Inactive {
        /// Always `inactive`.
        status: String,
        /// Conclusion of the newest run; `"none"` when there are no runs,
        /// `null` when the newest run has not concluded.
        last_run_status: Option<String>,
        last_run_id: Option<RunId>,
        message: String,
    },
}

impl From<SessionView> for StatusResponse {
    fn from(view: SessionView) -> Self {
        match view {
            SessionView::Active(run) => Self::Active {
                status: run.status.to_string(),
                run_id: run.id,
                html_url: run.html_url,
                created_at: run.created_at,
                message: "Remote desktop session is currently active or starting.".into(),
            },
            SessionView::Inactive { last_run } => Self::Inactive {
                status: "inactive".into(),
                last_run_status: match &last_run {
                    Some(run) => run.conclusion.clone().map(String::from),
                    None => Some("none".into()),
                },
                last_run_id: last_run.map(|run| run.id),
                message: "No active remote desktop session. Check last run status for details."
                    .into(),
            },
        }
    }
}

/// `GET /healthz` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RunConclusion, RunStatus, RunSummary};
    use chrono::TimeZone;
    use serde_json::json;

    fn run(status: RunStatus, conclusion: Option<RunConclusion>) -> RunSummary {
        RunSummary {
            id: 77,
            status,
            conclusion,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            html_url: "https://github.com/octo/desktop/actions/runs/77".into(),
        }
    }

    #[test]
    fn test_active_shape() {
        let body = serde_json::to_value(StatusResponse::from(SessionView::Active(run(
            RunStatus::InProgress,
            None,
        ))))
        .unwrap();

        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["run_id"], 77);
        assert_eq!(body["html_url"], "https://github.com/octo/desktop/actions/runs/77");
        assert_eq!(body["created_at"], "2024-06-01T12:00:00Z");
    }

    #[test]
    fn test_inactive_without_runs() {
        let body =
            serde_json::to_value(StatusResponse::from(SessionView::Inactive { last_run: None }))
                .unwrap();

        assert_eq!(body["status"], "inactive");
        assert_eq!(body["last_run_status"], "none");
        assert_eq!(body["last_run_id"], json!(null));
    }

    #[test]
    fn test_inactive_reports_conclusion() {
        let body = serde_json::to_value(StatusResponse::from(SessionView::Inactive {
            last_run: Some(run(RunStatus::Completed, Some(RunConclusion::Cancelled))),
        }))
        .unwrap();

        assert_eq!(body["last_run_status"], "cancelled");
        assert_eq!(body["last_run_id"], 77);
    }

    #[test]
    fn test_inactive_unconcluded_run_is_null() {
        let body = serde_json::to_value(StatusResponse::from(SessionView::Inactive {
            last_run: Some(run(RunStatus::Other("waiting".into()), None)),
        }))
        .unwrap();

        assert_eq!(body["last_run_status"], json!(null));
    }
}
