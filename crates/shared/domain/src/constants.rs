//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Tenancy
// =============================================================================

/// Request header carrying the caller's tenant identifier
pub const TENANT_HEADER: &str = "X-Tenant-ID";

// =============================================================================
// User Fields
// =============================================================================

/// Maximum first name length
pub const MAX_FIRST_NAME_LENGTH: u64 = 30;

/// Maximum last name length
pub const MAX_LAST_NAME_LENGTH: u64 = 40;

/// Maximum identity number (Dni) length
pub const MAX_DNI_LENGTH: u64 = 20;

/// Maximum phone length
pub const MAX_PHONE_LENGTH: u64 = 15;

/// Maximum email length
pub const MAX_EMAIL_LENGTH: u64 = 50;

/// Minimum age, in whole years, of a registered user
pub const MIN_AGE_YEARS: i32 = 18;

/// Accepted gender codes
pub const GENDER_MALE: &str = "M";
pub const GENDER_FEMALE: &str = "F";

/// Storage representation of an active record
pub const STATUS_ACTIVE: &str = "active";

/// Storage representation of a soft-deleted record
pub const STATUS_DELETED: &str = "deleted";

/// Birth date wire format (`YYYY-MM-DD`)
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";
