//! HTTP error mapping for control handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ControlError;

/// Body for failures: `{error, details?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body for the expected "nothing to stop" outcome.
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Wrapper turning a [`ControlError`] into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub ControlError);

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        Self(err)
    }
}

fn error_body(error: impl Into<String>, details: Option<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: error.into(),
        details,
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            err @ ControlError::ConfigurationMissing { .. } => {
                tracing::error!(error = %err, "Configuration incomplete");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body(err.to_string(), None),
                )
                    .into_response()
            }
            err @ ControlError::InvalidRepository(_) => {
                (StatusCode::BAD_REQUEST, error_body(err.to_string(), None)).into_response()
            }
            err @ ControlError::NoActiveSession => {
                tracing::info!("Stop requested with no active session");
                (
                    StatusCode::NOT_FOUND,
                    Json(MessageBody {
                        message: err.to_string(),
                    }),
                )
                    .into_response()
            }
            ControlError::Upstream {
                operation,
                status,
                body,
            } => {
                // Upstream codes are passed through so the operator sees what GitHub said.
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (code, error_body(operation.failure_message(), Some(body))).into_response()
            }
            ControlError::Transport(e) => {
                tracing::error!(error = %e, "GitHub API unreachable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Internal Server Error", Some(e.to_string())),
                )
                    .into_response()
            }
            ControlError::Decode(msg) => {
                tracing::error!(error = %msg, "Unreadable GitHub API response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Internal Server Error", Some(msg)),
                )
                    .into_response()
            }
        }
    }
}
