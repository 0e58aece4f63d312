//! Named uniqueness constraints of the users table.
//!
//! Storage backends report a violated unique constraint by name; this module
//! maps that name to the duplicate error for the matching field.

use domain::DomainError;

/// Unique (tenant_id, dni)
pub const USERS_TENANT_DNI: &str = "uq_users_tenant_dni";

/// Unique (tenant_id, email)
pub const USERS_TENANT_EMAIL: &str = "uq_users_tenant_email";

/// Unique (tenant_id, phone)
pub const USERS_TENANT_PHONE: &str = "uq_users_tenant_phone";

/// Map a violated unique constraint to its duplicate error.
///
/// Unknown or missing constraint names fall back to `DuplicateEntry`.
pub fn duplicate_error(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(USERS_TENANT_DNI) => DomainError::DuplicateIdentity,
        Some(USERS_TENANT_EMAIL) => DomainError::DuplicateEmail,
        Some(USERS_TENANT_PHONE) => DomainError::DuplicatePhone,
        Some(other) => {
            tracing::warn!(constraint = other, "Unclassified unique constraint violation");
            DomainError::DuplicateEntry
        }
        None => DomainError::DuplicateEntry,
    }
}
