use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recipe_chef::ChefError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] AiLlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    // --- Request handling ---
    /// Request body could not be read as the expected JSON.
    #[error("{0}")]
    Request(String),

    /// Model call or response validation failed.
    #[error(transparent)]
    Chef(#[from] ChefError),
}

impl AppError {
    /// Every failure is reported as a server-side error; clients only
    /// distinguish ok from not ok.
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Request(_) => "BAD_REQUEST_BODY",
            AppError::Chef(ChefError::Upstream(_)) => "UPSTREAM_ERROR",
            AppError::Chef(ChefError::Malformed(_)) => "MALFORMED_MODEL_OUTPUT",
        }
    }
}

/// Wire shape of every failure: `{ "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        error!(code = self.error_code(), %status, error = %message, "request failed");

        let body = ErrorBody {
            error: if message.trim().is_empty() {
                "Server error".to_string()
            } else {
                message
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
