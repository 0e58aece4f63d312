//! Tenant identifier and token resolution.
//!
//! Every read and write in the system is scoped to a `TenantId`. It only ever
//! comes from the caller-supplied tenant token, never from a request body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::TENANT_HEADER;
use crate::error::{DomainError, DomainResult};

/// Positive integer identifying a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(u32);

impl TenantId {
    /// Build a tenant id, rejecting zero.
    pub fn new(id: u32) -> DomainResult<Self> {
        if id == 0 {
            return Err(DomainError::invalid_tenant(format!(
                "{} must be a positive integer",
                TENANT_HEADER
            )));
        }
        Ok(Self(id))
    }

    /// Resolve a raw tenant token, typically the `X-Tenant-ID` header value.
    ///
    /// # Errors
    /// `InvalidTenant` if the token is missing, blank, non-numeric or zero.
    pub fn resolve(token: Option<&str>) -> DomainResult<Self> {
        let token = token.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            return Err(DomainError::invalid_tenant(format!(
                "{} header is required",
                TENANT_HEADER
            )));
        }
        token.parse()
    }

    /// Raw value
    pub fn get(self) -> u32 {
        self.0
    }

    /// Storage representation
    pub fn as_i64(self) -> i64 {
        i64::from(self.0)
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DomainError::invalid_tenant(format!("'{}' is not a valid {}", s, TENANT_HEADER));

        // Digits only: `u32::from_str` would also take a leading '+'
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let id = s.parse::<u32>().map_err(|_| invalid())?;
        Self::new(id)
    }
}

impl TryFrom<i64> for TenantId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let id = u32::try_from(value)
            .map_err(|_| DomainError::invalid_tenant(format!("tenant {} is out of range", value)))?;
        Self::new(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
