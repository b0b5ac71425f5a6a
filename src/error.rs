use thiserror::Error;
use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

// Import Axum types for HTTP response conversion
use axum::{
    extract::rejection::JsonRejection,
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: BTreeMap<String, String> },
}

impl ValidationErrors {
    /// Shorthand for a single field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationErrors::Single {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Flattens either shape into a field -> message map.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        match self {
            ValidationErrors::Single { field, message } => BTreeMap::from([(field, message)]),
            ValidationErrors::Multiple { fields } => fields,
        }
    }

    /// Message reported for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        match self {
            ValidationErrors::Single { field: f, message } if f == field => Some(message),
            ValidationErrors::Single { .. } => None,
            ValidationErrors::Multiple { fields } => fields.get(field).map(String::as_str),
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A failed schema migration.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A validation error with field-level details.
    #[error("Validation error: {0:?}")]
    Validation(ValidationErrors),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (resource belongs to another user).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// A conflict error (resource already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An authentication error (missing or invalid credentials).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A session expired error.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// An invalid session token error.
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// Too many requests in the current window.
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::single(field, message))
    }

    /// HTTP status for this error class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Error::SessionExpired(_) => StatusCode::UNAUTHORIZED,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Migrate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error classification.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Conflict(_) => "CONFLICT",
            Error::Authentication(_) => "AUTHENTICATION_FAILED",
            Error::InvalidToken(_) => "INVALID_TOKEN",
            Error::SessionExpired(_) => "SESSION_EXPIRED",
            Error::RateLimited { .. } => "RATE_LIMITED",
            Error::Sqlx(_) | Error::Migrate(_) | Error::Internal(_) | Error::Config(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

/// Malformed or non-JSON request bodies surface as validation errors.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation("body", rejection.body_text())
    }
}

/// Convert custom Error to HTTP response
///
/// Each variant maps to a status code and a JSON body carrying a message and
/// a machine-readable code. Internal failures are logged here with full
/// detail and reported to the caller with a generic message only.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match &self {
            Error::Validation(errors) => serde_json::json!({
                "error": "Validation failed",
                "code": code,
                "fields": errors.clone().into_fields(),
            }),
            Error::RateLimited { retry_after_secs } => serde_json::json!({
                "error": "Too many requests",
                "code": code,
                "retry_after": retry_after_secs,
            }),
            Error::NotFound(msg)
            | Error::Forbidden(msg)
            | Error::Conflict(msg)
            | Error::Authentication(msg)
            | Error::InvalidToken(msg)
            | Error::SessionExpired(msg) => serde_json::json!({
                "error": msg,
                "code": code,
            }),
            Error::Sqlx(_) | Error::Migrate(_) | Error::Internal(_) | Error::Config(_) => {
                tracing::error!(error = %self, "Unhandled internal error");
                serde_json::json!({
                    "error": "Internal server error",
                    "code": code,
                })
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let Error::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}
