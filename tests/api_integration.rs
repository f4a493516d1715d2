//! HTTP-level tests for the control endpoints.
//!
//! The upstream API is replaced by an in-memory [`RunRegistry`] so each test
//! can script run state and count outbound calls.

use actions_desktop_panel::AppState;
use actions_desktop_panel::config::{
    AppConfig, GithubConfig, LoggingConfig, PanelConfig, ServerConfig, WorkflowTarget,
};
use actions_desktop_panel::control::ControlSurface;
use actions_desktop_panel::error::{ControlError, Result, UpstreamOperation};
use actions_desktop_panel::github::RunRegistry;
use actions_desktop_panel::server::{build_app, start_server};
use actions_desktop_panel::session::{RunConclusion, RunId, RunStatus, RunSummary};
use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Utilities
// =============================================================================

#[derive(Default)]
struct ScriptedRegistry {
    runs: Mutex<Vec<RunSummary>>,
    dispatch_failure: Mutex<Option<(u16, String)>>,
    dispatches: AtomicUsize,
    lists: AtomicUsize,
    cancelled: Mutex<Vec<RunId>>,
    seen_targets: Mutex<Vec<WorkflowTarget>>,
}

impl ScriptedRegistry {
    fn record(&self, target: &WorkflowTarget) {
        self.seen_targets.lock().unwrap().push(target.clone());
    }

    fn total_calls(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
            + self.lists.load(Ordering::SeqCst)
            + self.cancelled.lock().unwrap().len()
    }
}

#[async_trait]
impl RunRegistry for ScriptedRegistry {
    async fn dispatch_workflow(&self, target: &WorkflowTarget) -> Result<()> {
        self.record(target);
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        match self.dispatch_failure.lock().unwrap().clone() {
            Some((status, body)) => Err(ControlError::Upstream {
                operation: UpstreamOperation::Dispatch,
                status,
                body,
            }),
            None => Ok(()),
        }
    }

    async fn list_runs(
        &self,
        target: &WorkflowTarget,
        _per_page: u32,
    ) -> Result<Vec<RunSummary>> {
        self.record(target);
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.runs.lock().unwrap().clone())
    }

    async fn cancel_run(&self, target: &WorkflowTarget, run_id: RunId) -> Result<()> {
        self.record(target);
        self.cancelled.lock().unwrap().push(run_id);
        Ok(())
    }
}

fn app_config(token: Option<&str>, browser_config: bool) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
        },
        github: GithubConfig {
            token: token.map(String::from),
            owner: Some("octo".into()),
            repo: Some("desktop".into()),
            workflow_id: "main.yml".into(),
            branch_ref: "main".into(),
            api_base_url: "http://127.0.0.1:9".into(),
            per_page: 5,
            user_agent: "panel-tests".into(),
        },
        panel: PanelConfig {
            browser_config,
            cookie_max_age_days: 30,
            poll_interval_secs: 30,
        },
        logging: LoggingConfig { json: false },
    }
}

fn server_with(registry: &Arc<ScriptedRegistry>, config: AppConfig) -> TestServer {
    let state = AppState {
        control: ControlSurface::new(Arc::clone(registry) as Arc<dyn RunRegistry>, 5),
        config: Arc::new(config),
    };
    TestServer::new(build_app(state)).expect("test server")
}

fn run(id: u64, status: RunStatus, conclusion: Option<RunConclusion>, minute: u32) -> RunSummary {
    RunSummary {
        id,
        status,
        conclusion,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap(),
        html_url: format!("https://github.com/octo/desktop/actions/runs/{id}"),
    }
}

// =============================================================================
// Start
// =============================================================================

#[tokio::test]
async fn test_start_acknowledges_dispatch() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let response = server.post("/start").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "Remote desktop session starting..." })
    );
    assert_eq!(registry.dispatches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_start_without_credential_fails_before_network() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, false));

    let response = server.post("/start").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("GITHUB_PAT"));
    assert_eq!(registry.total_calls(), 0);
}

#[tokio::test]
async fn test_start_passes_upstream_error_through() {
    let registry = Arc::new(ScriptedRegistry::default());
    *registry.dispatch_failure.lock().unwrap() =
        Some((422, r#"{"message":"No ref found for: nope"}"#.into()));
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let response = server.post("/start").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "error": "Failed to start remote desktop session.",
            "details": r#"{"message":"No ref found for: nope"}"#
        })
    );
}

// =============================================================================
// Stop
// =============================================================================

#[tokio::test]
async fn test_stop_without_active_run_is_404_and_skips_cancel() {
    let registry = Arc::new(ScriptedRegistry::default());
    registry.runs.lock().unwrap().push(run(
        1,
        RunStatus::Completed,
        Some(RunConclusion::Success),
        10,
    ));
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let response = server.post("/stop").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "No active remote desktop session found to stop." })
    );
    assert!(registry.cancelled.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_cancels_newest_active_run() {
    let registry = Arc::new(ScriptedRegistry::default());
    registry.runs.lock().unwrap().extend([
        run(20, RunStatus::Queued, None, 30),
        run(10, RunStatus::InProgress, None, 10),
    ]);
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let response = server.post("/stop").await;
    response.assert_status_ok();
    let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
    assert!(message.contains("run ID: 20"), "{message}");
    assert_eq!(*registry.cancelled.lock().unwrap(), vec![20]);
}

// =============================================================================
// Status
// =============================================================================

#[tokio::test]
async fn test_status_follows_run_from_queued_to_completed() {
    let registry = Arc::new(ScriptedRegistry::default());
    registry
        .runs
        .lock()
        .unwrap()
        .push(run(555, RunStatus::Queued, None, 10));
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let response = server.get("/status").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["run_id"], 555);
    assert_eq!(body["html_url"], "https://github.com/octo/desktop/actions/runs/555");

    {
        let mut runs = registry.runs.lock().unwrap();
        runs[0].status = RunStatus::Completed;
        runs[0].conclusion = Some(RunConclusion::Success);
    }

    let body = server.get("/status").await.json::<Value>();
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["last_run_status"], "success");
    assert_eq!(body["last_run_id"], 555);
    assert_eq!(registry.lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_status_with_no_runs() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    let body = server.get("/status").await.json::<Value>();
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["last_run_status"], "none");
    assert_eq!(body["last_run_id"], Value::Null);
}

#[tokio::test]
async fn test_legacy_paths_and_health() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    server.get("/api/status-rdp").await.assert_status_ok();
    server.post("/api/start-rdp").await.assert_status_ok();
    assert_eq!(registry.dispatches.load(Ordering::SeqCst), 1);

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>(), json!({ "status": "ok" }));
}

// =============================================================================
// Browser configuration
// =============================================================================

#[tokio::test]
async fn test_cookies_overlay_process_settings() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, true));

    server
        .get("/status")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("github_token=ghp_cookie; repository_name=alice/rdp-box"),
        )
        .await
        .assert_status_ok();

    let seen = registry.seen_targets.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].credential, "ghp_cookie");
    assert_eq!(seen[0].repository(), "alice/rdp-box");
}

#[tokio::test]
async fn test_cookies_ignored_when_browser_config_disabled() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, false));

    let response = server
        .post("/start")
        .add_header(header::COOKIE, HeaderValue::from_static("github_token=ghp_cookie"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(registry.total_calls(), 0);
}

#[tokio::test]
async fn test_malformed_repository_cookie_is_rejected() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), true));

    let response = server
        .get("/status")
        .add_header(header::COOKIE, HeaderValue::from_static("repository_name=not-a-repo"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(registry.total_calls(), 0);
}

#[tokio::test]
async fn test_save_config_sets_cookies_and_redirects() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, true));

    let response = server
        .post("/config")
        .form(&[("github_token", "ghp_form"), ("repository_name", "alice/rdp")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();

    assert!(cookies.iter().any(|c| c.starts_with("github_token=ghp_form")));
    // Values are percent-encoded on the wire.
    assert!(cookies.iter().any(|c| c.starts_with("repository_name=alice%2Frdp")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly") && c.contains("Max-Age=2592000")));

    // The encoded cookie is read back as the plain repository.
    server
        .get("/status")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("github_token=ghp_form; repository_name=alice%2Frdp"),
        )
        .await
        .assert_status_ok();
    let seen = registry.seen_targets.lock().unwrap();
    assert_eq!(seen[0].repository(), "alice/rdp");
    assert_eq!(seen[0].credential, "ghp_form");
}

#[tokio::test]
async fn test_clear_config_removes_both_cookies() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, true));

    let response = server
        .post("/config/clear")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("github_token=ghp_form; repository_name=alice%2Frdp"),
        )
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();

    for name in ["github_token", "repository_name"] {
        let removal = cookies
            .iter()
            .find(|c| c.starts_with(&format!("{name}=;")))
            .unwrap_or_else(|| panic!("no removal cookie for {name}: {cookies:?}"));
        assert!(removal.contains("Max-Age=0"), "{removal}");
        assert!(removal.contains("Path=/"), "{removal}");
    }
}

#[tokio::test]
async fn test_save_config_rejects_bad_repository() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(None, true));

    let response = server
        .post("/config")
        .form(&[("github_token", "ghp_form"), ("repository_name", "alice rdp")])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_save_config_forbidden_when_disabled() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), false));

    server
        .post("/config")
        .form(&[("repository_name", "alice/rdp")])
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_index_renders_panel() {
    let registry = Arc::new(ScriptedRegistry::default());
    let server = server_with(&registry, app_config(Some("ghp_env"), true));

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("GitHub Actions Remote Desktop"));
    assert!(html.contains(r#"value="octo/desktop""#));
    assert!(!html.contains("ghp_env"));
    assert_eq!(registry.total_calls(), 0);
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_start_server_refuses_incomplete_configuration() {
    let err = start_server(Arc::new(app_config(None, false)))
        .await
        .expect_err("startup must fail without a credential");
    assert!(format!("{err:#}").contains("GITHUB_PAT"), "{err:#}");
}

#[tokio::test]
async fn test_start_server_refuses_placeholder_owner() {
    let mut config = app_config(Some("ghp_env"), false);
    config.github.owner = Some("your-github-username".into());

    let err = start_server(Arc::new(config))
        .await
        .expect_err("startup must fail with a placeholder owner");
    assert!(format!("{err:#}").contains("REPO_OWNER"), "{err:#}");
}
