//! User domain entity and related types.
//!
//! - `UserDraft`: raw candidate as received from a caller, not yet validated
//! - `UserFields`: normalized and validated attributes, ready to persist
//! - `UserPatch`: partial update, only the fields present are applied
//! - `User`: the stored entity, always owned by exactly one tenant

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{GENDER_FEMALE, GENDER_MALE, STATUS_ACTIVE, STATUS_DELETED};
use crate::error::DomainError;
use crate::tenant::TenantId;

/// System-assigned user identifier
pub type UserId = i64;

/// Gender enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => GENDER_MALE,
            Gender::Female => GENDER_FEMALE,
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    /// Exact match only: "m" or " M" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            GENDER_MALE => Ok(Gender::Male),
            GENDER_FEMALE => Ok(Gender::Female),
            other => Err(DomainError::InvalidGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record status, the soft-delete marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Deleted => STATUS_DELETED,
        }
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_DELETED => UserStatus::Deleted,
            _ => UserStatus::Active,
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: UserStatus,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user owned by `tenant_id`
    pub fn new(id: UserId, tenant_id: TenantId, fields: UserFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            tenant_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            dni: fields.dni,
            gender: fields.gender,
            phone: fields.phone,
            email: fields.email,
            birth_date: fields.birth_date,
            created_at: now,
            updated_at: now,
            status: UserStatus::Active,
            deleted_at: None,
        }
    }

    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.status == UserStatus::Deleted
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Overwrite the mutable attributes. The owning tenant is never touched.
    pub fn apply(&mut self, fields: UserFields, now: DateTime<Utc>) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.dni = fields.dni;
        self.gender = fields.gender;
        self.phone = fields.phone;
        self.email = fields.email;
        self.birth_date = fields.birth_date;
        self.updated_at = now;
    }

    /// Soft delete the user
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.status = UserStatus::Deleted;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Current attributes as an editable draft
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            dni: self.dni.clone(),
            gender: self.gender.as_str().to_string(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            birth_date: Some(self.birth_date),
        }
    }
}

/// User candidate as supplied by a caller.
///
/// Carries no tenant: ownership is decided by the resolved tenant of the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    /// `None` stands for a zero-valued birth date
    pub birth_date: Option<NaiveDate>,
}

/// Normalized, validated user attributes, as produced by `UserDraft::into_fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub birth_date: NaiveDate,
}

/// Partial update payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dni: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl UserPatch {
    /// Merge onto the current state of `user`, leaving absent fields untouched.
    pub fn merge_into(self, user: &User) -> UserDraft {
        let mut draft = user.to_draft();
        if let Some(first_name) = self.first_name {
            draft.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            draft.last_name = last_name;
        }
        if let Some(dni) = self.dni {
            draft.dni = dni;
        }
        if let Some(gender) = self.gender {
            draft.gender = gender;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(birth_date) = self.birth_date {
            draft.birth_date = Some(birth_date);
        }
        draft
    }
}
