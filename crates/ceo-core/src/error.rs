//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Postgres SQLSTATE for a unique constraint violation.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for a foreign key violation.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Unified error type for the CEO platform.
///
/// Every service and repository returns this type; the REST layer maps it
/// onto an HTTP status with [`CeoError::status_code`].
#[derive(Error, Debug)]
pub enum CeoError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("{0}")]
    Validation(String),

    /// Business-level duplicate, e.g. an email that is already registered
    #[error("{0}")]
    Conflict(String),

    /// Unique constraint violation raised by the database
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Foreign key violation raised by the database
    #[error("Referenced record does not exist: {0}")]
    ReferenceMissing(String),

    // ============ Authentication/Authorization Errors ============
    /// Unauthorized access
    #[error("{0}")]
    Unauthorized(String),

    /// Forbidden access
    #[error("{0}")]
    Forbidden(String),

    /// Invalid token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token expired
    #[error("Token expired")]
    TokenExpired,

    /// Invalid credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error (SMTP relay, Twilio)
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CeoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::Duplicate(_)
            | Self::ReferenceMissing(_)
            | Self::InvalidCredentials => 400,
            Self::Unauthorized(_) | Self::InvalidToken(_) | Self::TokenExpired => 401,
            Self::Forbidden(_) => 403,
            Self::ExternalService { .. } => 502,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Duplicate(_) => "DUPLICATE_ENTRY",
            Self::ReferenceMissing(_) => "INVALID_REFERENCE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors whose message must not reach API clients.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an external service error.
    #[must_use]
    pub fn external<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for CeoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "Record",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => Self::Duplicate(
                    db_err
                        .constraint()
                        .map_or_else(|| db_err.message().to_string(), ToString::to_string),
                ),
                Some(PG_FOREIGN_KEY_VIOLATION) => Self::ReferenceMissing(
                    db_err
                        .constraint()
                        .map_or_else(|| db_err.message().to_string(), ToString::to_string),
                ),
                _ => Self::Database(err.to_string()),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CeoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {err}"))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `CeoError`.
    ///
    /// Server-side failures are reported with a generic message; the
    /// details are only written to the log.
    #[must_use]
    pub fn from_error(error: &CeoError) -> Self {
        let message = if error.is_server_error() && !matches!(error, CeoError::ExternalService { .. }) {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };

        Self {
            code: error.error_code().to_string(),
            message,
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&CeoError> for ErrorResponse {
    fn from(error: &CeoError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(CeoError::not_found("User", 1).status_code(), 404);
        assert_eq!(CeoError::validation("invalid email").status_code(), 400);
        assert_eq!(CeoError::conflict("User already exists").status_code(), 400);
        assert_eq!(CeoError::Duplicate("users_email_key".into()).status_code(), 400);
        assert_eq!(CeoError::ReferenceMissing("fk".into()).status_code(), 400);
        assert_eq!(CeoError::InvalidCredentials.status_code(), 400);
        assert_eq!(CeoError::unauthorized("No token provided").status_code(), 401);
        assert_eq!(CeoError::TokenExpired.status_code(), 401);
        assert_eq!(CeoError::InvalidToken("bad".into()).status_code(), 401);
        assert_eq!(CeoError::forbidden("Access denied").status_code(), 403);
        assert_eq!(CeoError::external("twilio", "down").status_code(), 502);
        assert_eq!(CeoError::Database("db error".into()).status_code(), 500);
        assert_eq!(CeoError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CeoError::not_found("User", 1).error_code(), "NOT_FOUND");
        assert_eq!(CeoError::validation("bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(CeoError::Duplicate("x".into()).error_code(), "DUPLICATE_ENTRY");
        assert_eq!(CeoError::ReferenceMissing("x".into()).error_code(), "INVALID_REFERENCE");
        assert_eq!(CeoError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(CeoError::internal("err").error_code(), "INTERNAL_ERROR");
        assert_eq!(
            CeoError::Other(anyhow::anyhow!("boom")).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = CeoError::not_found("Report", 42);
        assert_eq!(err.to_string(), "Report not found: 42");
    }

    #[test]
    fn test_error_response_hides_internal_details() {
        let err = CeoError::Database("connection refused on 10.0.0.3".into());
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "DATABASE_ERROR");
        assert_eq!(response.message, "Internal server error");
    }

    #[test]
    fn test_error_response_keeps_client_messages() {
        let err = CeoError::validation("Please verify your email first");
        let response = ErrorResponse::from(&err);
        assert_eq!(response.message, "Please verify your email first");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let err = CeoError::validation("bad input");
        let details = vec![FieldError {
            field: "email".to_string(),
            message: "Invalid email".to_string(),
            code: "email".to_string(),
        }];
        let response = ErrorResponse::from_error(&err).with_details(details);
        assert_eq!(response.details.map(|d| d.len()), Some(1));
    }
}
