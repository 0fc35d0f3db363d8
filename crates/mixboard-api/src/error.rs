use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use mixboard_types::api::{FieldError, ValidationErrorBody};

/// Every failure a request can end in. Each variant owns one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or expired credential, or a bad login.
    #[error("{0}")]
    Authentication(String),

    /// Payload failed its contract. Carries every violation found.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Caller is known but their role does not cover the action.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violated.
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected. The detail is logged, never returned.
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Persistence error classifier. A unique-constraint failure means a racing
/// writer got there first and is reported as a conflict; everything else is
/// internal.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if mixboard_db::is_unique_violation(&err) {
            Self::Conflict("Resource already exists".into())
        } else {
            Self::Internal(err)
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => (
                status,
                Json(ValidationErrorBody {
                    message: "Validation failed".into(),
                    errors,
                }),
            )
                .into_response(),
            Self::Internal(err) => {
                error!("Internal error: {:#}", err);
                (status, Json(json!({ "message": "Internal server error" }))).into_response()
            }
            other => (status, Json(json!({ "message": other.to_string() }))).into_response(),
        }
    }
}
