//! HTML rendering for the control panel.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Values the panel template needs.
#[derive(Debug, Clone, Default)]
pub struct PanelView {
    pub browser_config: bool,
    /// `owner/repo` from cookie or process configuration.
    pub repository: Option<String>,
    /// Whether a token cookie is present. The token itself is never rendered.
    pub token_saved: bool,
    pub workflow_id: String,
    pub poll_interval_secs: u64,
}

const STYLES: &str = r"
body { font-family: system-ui, sans-serif; background: #0f172a; color: #e2e8f0; margin: 0; }
main { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
.grid { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); }
.card { background: rgba(255,255,255,0.06); border: 1px solid rgba(255,255,255,0.15); border-radius: 12px; padding: 1.5rem; }
label { display: block; font-size: 0.875rem; margin: 0.75rem 0 0.25rem; color: #93c5fd; }
input { width: 100%; box-sizing: border-box; padding: 0.5rem; border-radius: 8px; border: 1px solid #334155; background: #1e293b; color: inherit; }
button { padding: 0.5rem 1rem; border: 0; border-radius: 8px; color: white; cursor: pointer; margin-top: 1rem; }
button:disabled { opacity: 0.5; cursor: not-allowed; }
.primary { background: #2563eb; } .start { background: #16a34a; } .stop { background: #dc2626; } .muted { background: #475569; }
.hint { font-size: 0.75rem; color: #94a3b8; }
pre { white-space: pre-wrap; font-size: 0.8rem; color: #cbd5e1; }
";

/// Page script; `__POLL_MS__` is replaced with the poll interval.
const CONTROL_SCRIPT: &str = r"
(() => {
    const statusEl = document.getElementById('session-status');
    const runEl = document.getElementById('session-run');
    const startedEl = document.getElementById('session-started');
    const outEl = document.getElementById('last-response');
    const buttons = ['start-btn', 'stop-btn', 'refresh-btn'].map(id => document.getElementById(id));

    const call = async (method, path) => {
        const response = await fetch(path, { method, credentials: 'same-origin' });
        const body = await response.json().catch(() => ({}));
        return { ok: response.ok, status: response.status, body };
    };

    const render = ({ ok, status, body }) => {
        outEl.textContent = `${status} ${JSON.stringify(body, null, 2)}`;
        if (!ok) return;
        statusEl.textContent = body.status || statusEl.textContent;
        startedEl.textContent = body.created_at
            ? `Initiated: ${new Date(body.created_at).toLocaleString()}`
            : '';
        if (body.run_id) {
            runEl.innerHTML = '';
            const link = document.createElement('a');
            link.href = body.html_url;
            link.textContent = `Run ${body.run_id}`;
            link.target = '_blank';
            runEl.appendChild(link);
        } else if (body.status === 'inactive') {
            runEl.textContent = `Last run: ${body.last_run_id ?? 'none'} (${body.last_run_status ?? 'pending'})`;
        }
    };

    const refresh = async () => {
        try { render(await call('GET', '/status')); }
        catch (err) { outEl.textContent = String(err); }
    };

    const act = async (path) => {
        buttons.forEach(b => b.disabled = true);
        try {
            const result = await call('POST', path);
            outEl.textContent = `${result.status} ${JSON.stringify(result.body, null, 2)}`;
            setTimeout(refresh, 3000);
        } catch (err) {
            outEl.textContent = String(err);
        } finally {
            buttons.forEach(b => b.disabled = false);
        }
    };

    buttons[0].addEventListener('click', () => act('/start'));
    buttons[1].addEventListener('click', () => act('/stop'));
    buttons[2].addEventListener('click', refresh);

    refresh();
    setInterval(refresh, __POLL_MS__);
})();
";

fn poll_millis(view: &PanelView) -> u64 {
    view.poll_interval_secs.max(1).saturating_mul(1000)
}

fn config_card(view: &PanelView) -> Markup {
    if !view.browser_config {
        return html! {
            section class="card" {
                h2 { "Configuration" }
                p class="hint" { "Token and repository are managed by the server environment." }
            }
        };
    }

    let token_hint = if view.token_saved {
        "A token is saved in this browser. Leave blank to keep it."
    } else {
        "Needs repo and actions permissions."
    };

    html! {
        section class="card" {
            h2 { "GitHub configuration" }
            form method="post" action="/config" {
                label for="github_token" { "GitHub personal access token" }
                input id="github_token" name="github_token" type="password"
                    placeholder="ghp_..." autocomplete="off";
                p class="hint" { (token_hint) }
                label for="repository_name" { "Repository" }
                input id="repository_name" name="repository_name" type="text"
                    placeholder="owner/repository"
                    pattern="[-A-Za-z0-9_.]+/[-A-Za-z0-9_.]+"
                    value=(view.repository.as_deref().unwrap_or_default());
                button class="primary" type="submit" { "Save configuration" }
            }
            form method="post" action="/config/clear" {
                button class="muted" type="submit" { "Forget saved settings" }
            }
        }
    }
}

fn control_card(view: &PanelView) -> Markup {
    let repository = view.repository.as_deref().unwrap_or("not configured");
    let script = CONTROL_SCRIPT.replace("__POLL_MS__", &poll_millis(view).to_string());

    html! {
        section class="card" id="control" {
            h2 { "Remote desktop" }
            p class="hint" { (repository) " · " (view.workflow_id) }
            p { "Status: " strong id="session-status" { "unknown" } }
            p id="session-run" class="hint" {}
            p id="session-started" class="hint" {}
            button class="start" id="start-btn" type="button" { "Start session" }
            button class="stop" id="stop-btn" type="button" { "Stop session" }
            button class="muted" id="refresh-btn" type="button" { "Refresh" }
            h3 { "Connection" }
            p class="hint" {
                "Username: " code { "runneradmin" }
                ". Password: the " code { "RDP_PASSWORD" } " repository secret."
            }
            pre id="last-response" {}
        }
        script { (PreEscaped(script)) }
    }
}

/// Render the full control panel page.
#[must_use]
pub fn render_panel(view: &PanelView) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="description" content="Remote desktop sessions on GitHub Actions";
                title { "Control Panel - Actions Desktop Panel" }
                style { (PreEscaped(STYLES)) }
            }
            body {
                main {
                    header {
                        h1 { "GitHub Actions Remote Desktop" }
                        p class="hint" { "Start, stop, and watch the workflow that hosts your desktop." }
                    }
                    div class="grid" {
                        (config_card(view))
                        (control_card(view))
                    }
                }
            }
        }
    };

    markup.into_string()
}
