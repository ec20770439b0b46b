use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::users::RepoError;

pub const ALREADY_LINKED: &str = "Account is already linked";

/// Request-boundary error. Every handler and the admin gate return this, so
/// nothing reaches the transport layer untranslated.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    AuthRequired,

    #[error("invalid token")]
    InvalidToken,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthRequired | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            // Existing clients expect 400 for an already linked account.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::AuthRequired => "Authentication required".to_string(),
            AppError::InvalidToken => "Invalid token".to_string(),
            AppError::Conflict(msg) | AppError::NotFound(msg) | AppError::Forbidden(msg) => {
                msg.clone()
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail(_) => AppError::Conflict(ALREADY_LINKED.into()),
            RepoError::Store(e) => AppError::Internal(e.into()),
        }
    }
}

pub type ApiResult<T> = Result<T, AppError>;
