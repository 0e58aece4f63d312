//! Domain-level errors.
//!
//! One variant per outcome a caller can observe. They are independent of
//! infrastructure concerns (HTTP, database); the transport maps them to
//! presentation status codes.

use thiserror::Error;

/// Domain-specific errors for business rule violations and storage outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Zero id, empty lookup key or similar malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing, malformed or zero tenant token
    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    /// A required field is empty after normalization
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Gender other than "M" or "F"
    #[error("Invalid gender '{0}', expected M or F")]
    InvalidGender(String),

    /// Birth date absent or in the future
    #[error("Invalid birth date")]
    InvalidBirthDate,

    /// User younger than the minimum age
    #[error("User must be at least 18 years old")]
    Underage,

    /// No visible record for the tenant
    #[error("User not found")]
    NotFound,

    #[error("Identity number already exists")]
    DuplicateIdentity,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Phone already exists")]
    DuplicatePhone,

    /// Uniqueness conflict whose field could not be determined
    #[error("Duplicate entry")]
    DuplicateEntry,

    /// Opaque backend failure
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl DomainError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DomainError::InvalidArgument(msg.into())
    }

    /// Create an invalid tenant error
    pub fn invalid_tenant(msg: impl Into<String>) -> Self {
        DomainError::InvalidTenant(msg.into())
    }

    /// Create a storage failure
    pub fn storage(msg: impl Into<String>) -> Self {
        DomainError::StorageFailure(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
