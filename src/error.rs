//! Application error type shared by all HTTP handlers.
//!
//! Every failure surfaces as a JSON body `{"error": "..."}` with a status
//! that matches the failure class. Internal details go to the log, not to
//! the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced article/user id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint hit (duplicate username).
    #[error("{0}")]
    Conflict(String),

    /// The LLM's quiz payload failed to decode as the expected structure.
    #[error("Failed to parse quiz data: {0}")]
    QuizParse(String),

    /// No API key was present at startup, so the LLM path is disabled.
    #[error("LLM provider is not configured (set OPENAI_API_KEY)")]
    LlmUnavailable,

    /// Upstream HTTP/transport failure talking to the LLM provider.
    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("question log is corrupt: {0}")]
    Store(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::QuizParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LlmUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Store(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(target: "linguaquiz_backend", %status, %message, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
