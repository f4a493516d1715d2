//! Actions Desktop Panel
//!
//! A control panel that starts, stops, and polls a remote-desktop session
//! provisioned by a GitHub Actions workflow. Session state is never stored
//! here: every request re-reads the workflow's recent runs.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server exposing start/stop/status as JSON
//! - **Control Surface**: Validates settings, then issues one or two GitHub API calls
//! - **Reconciler**: Pure functions deriving session state from recent runs
//! - **UI**: Server-rendered panel with cookie-backed browser configuration
//!
//! # Modules
//!
//! - [`api`]: JSON endpoints and error mapping
//! - [`config`]: Layered configuration and settings validation
//! - [`control`]: Start, stop, and status operations
//! - [`github`]: Upstream run registry trait and REST client
//! - [`session`]: Run model and reconciliation
//! - [`ui`]: Control panel page and cookie handling

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod control;
pub mod error;
pub mod github;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use crate::config::{AppConfig, SessionSettings};
use crate::control::ControlSurface;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Start/stop/status operations.
    pub control: ControlSurface,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Settings for one request: process configuration, overlaid with the
    /// browser's saved token and repository when browser config is enabled.
    pub fn session_settings(&self, jar: &CookieJar) -> error::Result<SessionSettings> {
        let settings = self.config.github.session_settings();
        if !self.config.panel.browser_config {
            return Ok(settings);
        }

        let settings = settings.with_token(jar.get(ui::TOKEN_COOKIE).map(|c| c.value()));
        match jar.get(ui::REPOSITORY_COOKIE).map(|c| c.value()) {
            Some(repository) if !repository.trim().is_empty() => {
                settings.with_repository(repository)
            }
            _ => Ok(settings),
        }
    }
}
