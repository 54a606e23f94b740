//! Application error type mapping to HTTP status codes and error bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use twinchat_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat pipeline errors.
    Chat(ChatError),
    /// Request validation error.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::EmptyMessage) => (StatusCode::BAD_REQUEST, "EMPTY_MESSAGE"),
            AppError::Chat(ChatError::InvalidSessionId(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_SESSION_ID")
            }
            AppError::Chat(ChatError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            AppError::Chat(ChatError::ModelInvocation(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_INVOCATION_ERROR")
            }
            AppError::Chat(ChatError::Persist(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSIST_ERROR")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Chat(e) => write!(f, "{e}"),
            AppError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        }

        let body = json!({
            "detail": self.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
