use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Internal messages are stable strings; causes were logged where they happened.
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Extension trait for logging a foreign error and converting it into an [`AppError`].
///
/// The `message` ends up in the response body, the underlying error only in the logs.
pub trait LogErr<T> {
    /// Log with `error!` and return `AppError::Internal`
    fn log_internal(self, message: &str) -> Result<T>;

    /// Log with `warn!` and return `AppError::BadRequest`
    fn log_bad_request(self, message: &str) -> Result<T>;

    /// Log with `warn!` and return `AppError::Unauthorized`
    fn log_unauthorized(self, message: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> LogErr<T> for std::result::Result<T, E> {
    fn log_internal(self, message: &str) -> Result<T> {
        self.map_err(|e| {
            tracing::error!("{}: {}", message, e);
            AppError::Internal(message.to_string())
        })
    }

    fn log_bad_request(self, message: &str) -> Result<T> {
        self.map_err(|e| {
            tracing::warn!("{}: {}", message, e);
            AppError::BadRequest(message.to_string())
        })
    }

    fn log_unauthorized(self, message: &str) -> Result<T> {
        self.map_err(|e| {
            tracing::warn!("{}: {}", message, e);
            AppError::Unauthorized(message.to_string())
        })
    }
}
