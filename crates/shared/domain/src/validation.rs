//! User field normalization and validation.
//!
//! Order of checks matters: required fields are checked first (after
//! normalization), then field lengths, then the business rules (gender,
//! birth date, minimum age).
//! The first failure is returned.

use chrono::{Datelike, NaiveDate, Utc};

use crate::constants::{
    MAX_DNI_LENGTH, MAX_EMAIL_LENGTH, MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH,
    MAX_PHONE_LENGTH, MIN_AGE_YEARS,
};
use crate::error::{DomainError, DomainResult};
use crate::user::{Gender, UserDraft, UserFields};

/// Age in whole years on `today`, not counting a birthday not yet reached.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

impl UserDraft {
    /// Trim names, identity number and phone; trim and lower-case email.
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        trim_in_place(&mut self.dni);
        trim_in_place(&mut self.phone);
        self.email = self.email.trim().to_lowercase();
    }

    /// Fail with `MissingField` on the first empty required field.
    pub fn required_fields(&self) -> DomainResult<()> {
        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("dni", &self.dni),
            ("phone", &self.phone),
        ];
        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(DomainError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// Fail with `InvalidArgument` on the first field over its maximum length,
    /// counted in characters.
    pub fn field_lengths(&self) -> DomainResult<()> {
        let limits = [
            ("first name", &self.first_name, MAX_FIRST_NAME_LENGTH),
            ("last name", &self.last_name, MAX_LAST_NAME_LENGTH),
            ("email", &self.email, MAX_EMAIL_LENGTH),
            ("dni", &self.dni, MAX_DNI_LENGTH),
            ("phone", &self.phone, MAX_PHONE_LENGTH),
        ];
        for (field, value, max) in limits {
            if value.chars().count() as u64 > max {
                return Err(DomainError::invalid_argument(format!(
                    "{} must be at most {} characters",
                    field, max
                )));
            }
        }
        Ok(())
    }

    /// Business rules evaluated against today's date (UTC).
    pub fn validate(&self) -> DomainResult<()> {
        self.validate_on(Utc::now().date_naive())
    }

    /// Business rules evaluated against `today`.
    pub fn validate_on(&self, today: NaiveDate) -> DomainResult<()> {
        self.gender.parse::<Gender>()?;
        let birth_date = self.birth_date.ok_or(DomainError::InvalidBirthDate)?;
        if birth_date > today {
            return Err(DomainError::InvalidBirthDate);
        }
        if age_on(birth_date, today) < MIN_AGE_YEARS {
            return Err(DomainError::Underage);
        }
        Ok(())
    }

    /// Required fields, field lengths, then business rules.
    pub fn validate_all(&self) -> DomainResult<()> {
        self.validate_all_on(Utc::now().date_naive())
    }

    pub fn validate_all_on(&self, today: NaiveDate) -> DomainResult<()> {
        self.required_fields()?;
        self.field_lengths()?;
        self.validate_on(today)
    }

    /// Normalize, validate and convert into persistable attributes.
    pub fn into_fields(self) -> DomainResult<UserFields> {
        self.into_fields_on(Utc::now().date_naive())
    }

    pub fn into_fields_on(mut self, today: NaiveDate) -> DomainResult<UserFields> {
        self.normalize();
        self.validate_all_on(today)?;

        let gender = self.gender.parse::<Gender>()?;
        let birth_date = self.birth_date.ok_or(DomainError::InvalidBirthDate)?;
        Ok(UserFields {
            first_name: self.first_name,
            last_name: self.last_name,
            dni: self.dni,
            gender,
            phone: self.phone,
            email: self.email,
            birth_date,
        })
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
