//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes. Operational solver failures each get a
//! distinct code so callers never confuse them with an `Unsatisfiable` answer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use satbridge_solver::ErrorReason;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "SOLVER_TIMEOUT", "BUSY").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (e.g., the solver's exit code and stderr).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),

    /// Every solver slot is taken (503).
    #[error("server busy: {0}")]
    Busy(String),

    /// The formula could not be staged; the solver never ran (500).
    #[error("staging failed: {0}")]
    StagingFailed(String),

    /// The solver executable could not be started (502).
    #[error("solver launch failed: {0}")]
    SolverLaunchFailed(String),

    /// The solver exited with a non-success status (502).
    #[error("solver failed: {message}")]
    SolverFailed {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The solver exceeded its time bound and was killed (504).
    #[error("solver timed out after {timeout_ms} ms")]
    SolverTimeout { timeout_ms: u64 },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InternalError(_) | ApiError::StagingFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::SolverLaunchFailed(_) | ApiError::SolverFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::SolverTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Busy(_) => "BUSY",
            ApiError::StagingFailed(_) => "STAGING_FAILED",
            ApiError::SolverLaunchFailed(_) => "SOLVER_LAUNCH_FAILED",
            ApiError::SolverFailed { .. } => "SOLVER_FAILED",
            ApiError::SolverTimeout { .. } => "SOLVER_TIMEOUT",
        }
    }

    pub fn detail(&self) -> ApiErrorDetail {
        let details = match self {
            ApiError::SolverFailed {
                exit_code, stderr, ..
            } => Some(serde_json::json!({
                "exit_code": exit_code,
                "stderr": stderr,
            })),
            ApiError::SolverTimeout { timeout_ms } => {
                Some(serde_json::json!({ "timeout_ms": timeout_ms }))
            }
            _ => None,
        };
        ApiErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.detail(),
        });

        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<ErrorReason> for ApiError {
    fn from(reason: ErrorReason) -> Self {
        match reason {
            ErrorReason::Staging { message } => ApiError::StagingFailed(message),
            ErrorReason::Launch { message } => ApiError::SolverLaunchFailed(message),
            ErrorReason::Timeout { timeout_ms } => ApiError::SolverTimeout { timeout_ms },
            ErrorReason::SolverFailed { exit_code, stderr } => {
                let message = ErrorReason::SolverFailed {
                    exit_code,
                    stderr: stderr.clone(),
                }
                .to_string();
                ApiError::SolverFailed {
                    message,
                    exit_code,
                    stderr,
                }
            }
        }
    }
}
