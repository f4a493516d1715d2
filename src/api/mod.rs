//! JSON control endpoints.
//!
//! - `POST /start`, `POST /stop`, `GET /status`
//! - Legacy aliases `/api/start-rdp`, `/api/stop-rdp`, `/api/status-rdp`
//! - `GET /healthz`

pub mod error;
pub mod routes;
pub mod types;

use axum::Router;

use crate::AppState;

pub use error::ApiError;
pub use types::StatusResponse;

pub fn router() -> Router<AppState> {
    routes::build_router()
}
