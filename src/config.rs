use std::fmt;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{ControlError, Result};

/// Placeholder owner shipped in sample deployments; treated as unset.
pub const OWNER_PLACEHOLDER: &str = "your-github-username";
/// Placeholder repository shipped in sample deployments; treated as unset.
pub const REPO_PLACEHOLDER: &str = "your-repo-name";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// GitHub personal access token with `actions` scope
    #[arg(long, env = "GITHUB_PAT", hide_env_values = true)]
    pub github_pat: Option<String>,

    /// Owner of the repository hosting the desktop workflow
    #[arg(long, env = "REPO_OWNER")]
    pub repo_owner: Option<String>,

    /// Name of the repository hosting the desktop workflow
    #[arg(long, env = "REPO_NAME")]
    pub repo_name: Option<String>,

    /// Workflow file name or numeric id
    #[arg(long, env = "WORKFLOW_ID")]
    pub workflow_id: Option<String>,

    /// Branch the workflow is dispatched on
    #[arg(long, env = "BRANCH_REF")]
    pub branch_ref: Option<String>,

    /// Accept token and repository from browser cookies
    #[arg(long, env = "BROWSER_CONFIG")]
    pub browser_config: Option<bool>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub panel: PanelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Upstream API endpoint and the workflow that provisions the desktop.
#[derive(Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    pub workflow_id: String,
    pub branch_ref: String,
    pub api_base_url: String,
    pub per_page: u32,
    pub user_agent: String,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workflow_id", &self.workflow_id)
            .field("branch_ref", &self.branch_ref)
            .field("api_base_url", &self.api_base_url)
            .field("per_page", &self.per_page)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GithubConfig {
    /// Process-level session settings, before any browser overlay.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            token: self.token.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            workflow_id: Some(self.workflow_id.clone()),
            branch_ref: Some(self.branch_ref.clone()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    /// Let the control panel supply token and repository via cookies.
    pub browser_config: bool,
    pub cookie_max_age_days: i64,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("github.workflow_id", "main.yml")?
            .set_default("github.branch_ref", "main")?
            .set_default("github.api_base_url", "https://api.github.com")?
            .set_default("github.per_page", 5)?
            .set_default(
                "github.user_agent",
                concat!("actions-desktop-panel/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("panel.browser_config", false)?
            .set_default("panel.cookie_max_age_days", 30)?
            .set_default("panel.poll_interval_secs", 30)?
            .set_default("logging.json", false)?;

        // Explicit file wins; otherwise ./config.{yaml,toml,json} when present.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. PANEL_SERVER__PORT=8000, PANEL_GITHUB__PER_PAGE=10
        builder = builder.add_source(
            Environment::with_prefix("PANEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Clap already folded the conventional env names (GITHUB_PAT, PORT, ...)
        // into `cli`, so these overrides cover flags and legacy env vars alike.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(token) = cli.github_pat {
            builder = builder.set_override("github.token", token)?;
        }
        if let Some(owner) = cli.repo_owner {
            builder = builder.set_override("github.owner", owner)?;
        }
        if let Some(repo) = cli.repo_name {
            builder = builder.set_override("github.repo", repo)?;
        }
        if let Some(workflow) = cli.workflow_id {
            builder = builder.set_override("github.workflow_id", workflow)?;
        }
        if let Some(branch) = cli.branch_ref {
            builder = builder.set_override("github.branch_ref", branch)?;
        }
        if let Some(enabled) = cli.browser_config {
            builder = builder.set_override("panel.browser_config", enabled)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session settings
// ─────────────────────────────────────────────────────────────────────────────

/// Unvalidated settings for one control operation.
///
/// Built from [`GithubConfig`] and optionally overlaid with values the
/// operator saved in the browser.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub workflow_id: Option<String>,
    pub branch_ref: Option<String>,
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workflow_id", &self.workflow_id)
            .field("branch_ref", &self.branch_ref)
            .finish()
    }
}

impl SessionSettings {
    /// Replace the token when `token` is non-empty.
    #[must_use]
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            self.token = Some(token.to_string());
        }
        self
    }

    /// Replace owner and repo from an `owner/repo` string.
    pub fn with_repository(mut self, repository: &str) -> Result<Self> {
        let (owner, repo) = parse_repository(repository)?;
        self.owner = Some(owner);
        self.repo = Some(repo);
        Ok(self)
    }

    /// Check every field is present and not a placeholder.
    ///
    /// Runs before any upstream call.
    pub fn validate(&self) -> Result<WorkflowTarget> {
        let credential = required(self.token.as_deref(), "GITHUB_PAT", None)?;
        let owner = required(self.owner.as_deref(), "REPO_OWNER", Some(OWNER_PLACEHOLDER))?;
        let repo = required(self.repo.as_deref(), "REPO_NAME", Some(REPO_PLACEHOLDER))?;
        let workflow_id = required(self.workflow_id.as_deref(), "WORKFLOW_ID", None)?;
        let branch_ref = required(self.branch_ref.as_deref(), "BRANCH_REF", None)?;

        Ok(WorkflowTarget {
            credential,
            owner,
            repo,
            workflow_id,
            branch_ref,
        })
    }
}

fn required(
    value: Option<&str>,
    field: &'static str,
    placeholder: Option<&str>,
) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && Some(v) != placeholder => Ok(v.to_string()),
        _ => Err(ControlError::ConfigurationMissing { field }),
    }
}

/// Split `owner/repo`, allowing only ASCII word characters, `.` and `-`.
pub fn parse_repository(repository: &str) -> Result<(String, String)> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    };

    match repository.trim().split_once('/') {
        Some((owner, repo)) if valid_part(owner) && valid_part(repo) => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ControlError::InvalidRepository(repository.to_string())),
    }
}

/// Validated settings identifying the workflow to drive.
#[derive(Clone, PartialEq, Eq)]
pub struct WorkflowTarget {
    pub credential: String,
    pub owner: String,
    pub repo: String,
    pub workflow_id: String,
    pub branch_ref: String,
}

impl WorkflowTarget {
    /// `owner/repo` form, for logs and the panel.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Debug for WorkflowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowTarget")
            .field("credential", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workflow_id", &self.workflow_id)
            .field("branch_ref", &self.branch_ref)
            .finish()
    }
}
