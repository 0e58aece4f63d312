//! Unified error handling for HTTP.
//!
//! Wraps the domain taxonomy and adds the transport-only failures
//! (malformed payloads, request validation). Converts to an Axum response
//! with a stable machine-readable code and a user-facing message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Request payload could not be parsed
    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Request payload violates a field constraint
    #[error("{0}")]
    Validation(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => match err {
                DomainError::InvalidArgument(_) => "INVALID_ARGUMENT",
                DomainError::InvalidTenant(_) => "INVALID_TENANT",
                DomainError::MissingField(_) => "MISSING_FIELD",
                DomainError::InvalidGender(_) => "INVALID_GENDER",
                DomainError::InvalidBirthDate => "INVALID_BIRTH_DATE",
                DomainError::Underage => "UNDERAGE",
                DomainError::NotFound => "NOT_FOUND",
                DomainError::DuplicateIdentity => "DUPLICATE_IDENTITY",
                DomainError::DuplicateEmail => "DUPLICATE_EMAIL",
                DomainError::DuplicatePhone => "DUPLICATE_PHONE",
                DomainError::DuplicateEntry => "DUPLICATE_ENTRY",
                DomainError::StorageFailure(_) => "STORAGE_FAILURE",
            },
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => match err {
                DomainError::NotFound => StatusCode::NOT_FOUND,
                DomainError::DuplicateIdentity
                | DomainError::DuplicateEmail
                | DomainError::DuplicatePhone
                | DomainError::DuplicateEntry => StatusCode::CONFLICT,
                DomainError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::StorageFailure(msg)) => {
                tracing::error!("Storage failure: {}", msg);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (DomainError::invalid_argument("id"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_tenant("0"), StatusCode::BAD_REQUEST),
            (DomainError::MissingField("email"), StatusCode::BAD_REQUEST),
            (DomainError::Underage, StatusCode::BAD_REQUEST),
            (DomainError::NotFound, StatusCode::NOT_FOUND),
            (DomainError::DuplicateIdentity, StatusCode::CONFLICT),
            (DomainError::DuplicateEntry, StatusCode::CONFLICT),
            (
                DomainError::storage("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_codes_follow_domain_kind() {
        assert_eq!(
            AppError::from(DomainError::DuplicatePhone).code(),
            "DUPLICATE_PHONE"
        );
        assert_eq!(
            AppError::from(DomainError::InvalidBirthDate).code(),
            "INVALID_BIRTH_DATE"
        );
        assert_eq!(AppError::bad_request("x").code(), "BAD_REQUEST");
    }

    #[test]
    fn test_storage_failure_message_is_hidden() {
        let err = AppError::from(DomainError::storage(
            "duplicate key value violates unique constraint \"users_pkey\"",
        ));
        let message = err.user_message();

        assert_eq!(message, "A database error occurred");
        assert!(!message.contains("users_pkey"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::from(DomainError::MissingField("phone"));
        assert_eq!(err.user_message(), "phone is required");
    }
}
