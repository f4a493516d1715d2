//! Browser control panel.
//!
//! A single server-rendered page with a configuration form and start/stop
//! buttons. Token and repository entered in the form are kept in cookies and
//! overlaid on the process configuration by [`AppState::session_settings`].

mod page;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::AppState;
use crate::api::ApiError;
use crate::config::parse_repository;

pub use page::{PanelView, render_panel};

/// Cookie holding the browser-supplied GitHub token.
pub const TOKEN_COOKIE: &str = "github_token";
/// Cookie holding the browser-supplied `owner/repo`.
pub const REPOSITORY_COOKIE: &str = "repository_name";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/config", post(save_config))
        .route("/config/clear", post(clear_config))
}

/// Form posted by the configuration card.
#[derive(Debug, Deserialize)]
struct ConfigForm {
    #[serde(default)]
    github_token: String,
    #[serde(default)]
    repository_name: String,
}

fn session_cookie(name: &'static str, value: String, max_age_days: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(max_age_days))
        .build()
}

/// GET / - Control panel page.
async fn index_handler(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let github = &state.config.github;
    let saved_repository = jar
        .get(REPOSITORY_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let configured_repository = match (&github.owner, &github.repo) {
        (Some(owner), Some(repo)) => Some(format!("{owner}/{repo}")),
        _ => None,
    };

    let view = PanelView {
        browser_config: state.config.panel.browser_config,
        repository: saved_repository.or(configured_repository),
        token_saved: jar.get(TOKEN_COOKIE).is_some_and(|c| !c.value().is_empty()),
        workflow_id: github.workflow_id.clone(),
        poll_interval_secs: state.config.panel.poll_interval_secs,
    };

    Html(render_panel(&view))
}

/// POST /config - Persist token and repository in cookies.
///
/// Empty fields leave the existing cookie untouched.
async fn save_config(
    State(state): State<AppState>,
    mut jar: CookieJar,
    Form(form): Form<ConfigForm>,
) -> Result<Response, ApiError> {
    if !state.config.panel.browser_config {
        return Ok((StatusCode::FORBIDDEN, "Browser configuration is disabled").into_response());
    }

    let max_age = state.config.panel.cookie_max_age_days;

    let repository = form.repository_name.trim();
    if !repository.is_empty() {
        parse_repository(repository)?;
        jar = jar.add(session_cookie(REPOSITORY_COOKIE, repository.to_string(), max_age));
    }

    let token = form.github_token.trim();
    if !token.is_empty() {
        jar = jar.add(session_cookie(TOKEN_COOKIE, token.to_string(), max_age));
    }

    tracing::info!(
        repository_saved = !repository.is_empty(),
        token_saved = !token.is_empty(),
        "Browser configuration saved"
    );

    Ok((jar, Redirect::to("/")).into_response())
}

/// POST /config/clear - Forget browser-supplied settings.
async fn clear_config(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar
        .remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REPOSITORY_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}
