use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::AppState;
use crate::config::AppConfig;
use crate::control::ControlSurface;
use crate::github::GitHubClient;
use crate::{api, ui};

/// Wire the GitHub client and control surface for `config`.
pub fn build_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let client = GitHubClient::new(&config.github.api_base_url, &config.github.user_agent)
        .context("Failed to create GitHub API client")?;
    let control = ControlSurface::new(Arc::new(client), config.github.per_page);

    Ok(AppState { control, config })
}

/// Router with every route and the request trace layer.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .merge(ui::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
///
/// Without browser configuration the process settings must be complete;
/// a missing field aborts startup.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    match config.github.session_settings().validate() {
        Ok(target) => info!(
            name: "config.loaded",
            repository = %target.repository(),
            workflow = %target.workflow_id,
            git_ref = %target.branch_ref,
            api = %config.github.api_base_url,
            "GitHub workflow configuration loaded"
        ),
        Err(e) if config.panel.browser_config => warn!(
            error = %e,
            "Server configuration incomplete; requests rely on browser-supplied settings"
        ),
        Err(e) => return Err(e).context("Server configuration incomplete"),
    }

    let state = build_state(Arc::clone(&config))?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        browser_config = config.panel.browser_config,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
