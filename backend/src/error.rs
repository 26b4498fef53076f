use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the connection ledger, the messaging gate and the user directory.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Connection request already pending")]
    DuplicateRequest,

    #[error("Already connected with this user")]
    AlreadyConnected,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not authorized, missing or unknown user id")]
    Unauthenticated,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Request has already been processed")]
    AlreadyProcessed,

    #[error("You can only exchange messages with connected users")]
    NotConnected,

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_)
            | AppError::DuplicateRequest
            | AppError::AlreadyConnected
            | AppError::AlreadyProcessed => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) | AppError::NotConnected => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Storage failure: {}", e);
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

/// True when the storage layer rejected a write on a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
