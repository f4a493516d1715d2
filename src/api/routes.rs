use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use super::error::ApiError;
use super::types::{AckResponse, HealthResponse, StatusResponse};
use crate::AppState;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_session))
        .route("/stop", post(stop_session))
        .route("/status", get(session_status))
        // Paths used by the original serverless deployment.
        .route("/api/start-rdp", get(start_session).post(start_session))
        .route("/api/stop-rdp", get(stop_session).post(stop_session))
        .route("/api/status-rdp", get(session_status))
        .route("/healthz", get(healthz))
}

/// POST /start - Dispatch the desktop workflow.
async fn start_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AckResponse>, ApiError> {
    let settings = state.session_settings(&jar)?;
    state.control.start(&settings).await?;

    Ok(Json(AckResponse {
        message: "Remote desktop session starting...".into(),
    }))
}

/// POST /stop - Cancel the newest active run.
async fn stop_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AckResponse>, ApiError> {
    let settings = state.session_settings(&jar)?;
    let run_id = state.control.stop(&settings).await?;

    Ok(Json(AckResponse {
        message: format!("Remote desktop session (run ID: {run_id}) stopping request accepted."),
    }))
}

/// GET /status - Derive the session view from recent runs.
async fn session_status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<StatusResponse>, ApiError> {
    let settings = state.session_settings(&jar)?;
    let view = state.control.status(&settings).await?;

    Ok(Json(StatusResponse::from(view)))
}

/// GET /healthz - Liveness probe; never calls upstream.
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
