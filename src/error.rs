use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::Language;

/// Each variant maps to one client-visible message; none are retried.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("code is required")]
    CodeRequired,
    #[error("code exceeds the {0} byte limit")]
    CodeTooLarge(usize),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("execution timed out after {budget_ms}ms")]
    Timeout { budget_ms: u64 },
    #[error("{0}")]
    Runtime(String),
    #[error("{language} runtime is not available on this host")]
    RuntimeUnavailable { language: Language },
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ExecuteError {
    fn into_response(self) -> Response {
        let status = match self {
            ExecuteError::CodeRequired
            | ExecuteError::CodeTooLarge(_)
            | ExecuteError::UnsupportedLanguage(_)
            | ExecuteError::Timeout { .. }
            | ExecuteError::Runtime(_)
            | ExecuteError::RuntimeUnavailable { .. } => StatusCode::BAD_REQUEST,
            ExecuteError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ExecuteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<std::io::Error> for ExecuteError {
    fn from(value: std::io::Error) -> Self {
        Self::Internal(value.to_string())
    }
}
