//! Single translation point from handler failures to HTTP responses.
//!
//! Handlers return `ApiResult<T>`; any failure short-circuits here, gets logged
//! once, and is rendered as `{error, message}` or `{error, details}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::db::{self, StoreErrorKind};

pub type ApiResult<T> = Result<T, ApiError>;

/// One failed rule on one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("value too long: {0}")]
    TooLong(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidReference(_) | ApiError::TooLong(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) | ApiError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Failed",
            ApiError::Conflict(_) => "Conflict",
            ApiError::InvalidReference(_) => "Invalid Reference",
            ApiError::TooLong(_) => "Bad Request",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::AuthenticationFailed => "Authentication Failed",
            ApiError::AccessDenied(_) => "Access Denied",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }

    fn body(self) -> ErrorBody {
        let error = self.category();
        match self {
            ApiError::Validation(fields) => ErrorBody {
                error,
                message: None,
                details: Some(fields.iter().map(ToString::to_string).collect()),
            },
            ApiError::Conflict(msg)
            | ApiError::InvalidReference(msg)
            | ApiError::TooLong(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::AccessDenied(msg)
            | ApiError::NotFound(msg) => ErrorBody {
                error,
                message: Some(msg),
                details: None,
            },
            ApiError::AuthenticationFailed => ErrorBody {
                error,
                message: Some("Invalid email or password".into()),
                details: None,
            },
            ApiError::Internal(_) => ErrorBody {
                error,
                message: Some("An unexpected error occurred. Please try again later.".into()),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(e) => error!(error = ?e, %status, "request failed"),
            other => warn!(error = %other, %status, "request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match db::classify(&err) {
            StoreErrorKind::UniqueViolation => ApiError::Conflict(
                "This record already exists (e.g., email already registered).".into(),
            ),
            StoreErrorKind::ForeignKeyViolation => ApiError::InvalidReference(
                "Operation failed because a referenced resource (User or Project) does not exist."
                    .into(),
            ),
            StoreErrorKind::ValueTooLong => {
                ApiError::TooLong("Input data is too long for one or more fields.".into())
            }
            StoreErrorKind::Other => {
                ApiError::Internal(anyhow::Error::new(err).context("database error"))
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed {} check", e.code));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    }
}
