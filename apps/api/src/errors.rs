use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::llm_client::LlmError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as `{"success": false, "error": <message>, "code": <CODE>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    /// `detail` carries the upstream body and is only logged.
    #[error("AI provider error: {detail}")]
    Provider { status: Option<u16>, detail: String },

    #[error("AI reply could not be parsed: {0}")]
    MalformedReply(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("PDF rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, .. } => AppError::Provider {
                status: Some(status),
                detail: err.to_string(),
            },
            LlmError::Http(_) => AppError::Provider {
                status: None,
                detail: err.to_string(),
            },
            LlmError::Parse(_) | LlmError::EmptyContent | LlmError::NoJsonObject => {
                AppError::MalformedReply(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken | AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Unauthorized,
            AuthError::Database(e) => AppError::Database(e),
            AuthError::Hash(_) | AuthError::Join(_) => AppError::Internal(anyhow::anyhow!(err)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Provider { status, detail } => {
                tracing::error!("Provider error: {detail}");
                let message = match status {
                    Some(code) => format!("The AI provider request failed (status {code})"),
                    None => "The AI provider could not be reached".to_string(),
                };
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
            }
            AppError::MalformedReply(msg) => {
                tracing::error!("Malformed provider reply: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_REPLY",
                    "The AI reply could not be parsed".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SESSION_ERROR",
                    "A session error occurred".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The PDF could not be generated".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

/// `Json` extractor whose rejections use the `AppError` envelope instead of plain text.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
