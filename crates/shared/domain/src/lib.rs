//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the tenant identifier, the user entity, field validation and the error
//! taxonomy shared by the repository, service and transport layers.

pub mod constants;
pub mod error;
pub mod tenant;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use tenant::TenantId;
pub use user::{Gender, User, UserDraft, UserFields, UserId, UserPatch, UserStatus};
pub use validation::age_on;
