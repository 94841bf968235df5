//! Field rules for the login and register forms.
//!
//! Values are trimmed before every rule, so whitespace-only input counts as
//! missing.

#[cfg(test)]
#[path = "schemas_test.rs"]
mod schemas_test;

use validator::{Validate, ValidateEmail, ValidationError};

use super::validation::validation_error;
use crate::net::types::{LoginData, RegisterData, Role};

pub const MIN_PASSWORD_LEN: usize = 6;

pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const ROLE: &str = "role";

fn validate_email_field(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error("required", "Email is required"));
    }
    if !value.validate_email() {
        return Err(validation_error("email", "Invalid email format"));
    }
    Ok(())
}

fn validate_password_field(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error("required", "Password is required"));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(validation_error("min_length", "Password must be at least 6 characters"));
    }
    Ok(())
}

fn validate_role_field(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error("required", "Role is required"));
    }
    if value.parse::<Role>().is_err() {
        return Err(validation_error("one_of", "Invalid role"));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_email_field"))]
    pub email: String,
    #[validate(custom(function = "validate_password_field"))]
    pub password: String,
}

impl LoginForm {
    /// Trimmed request body.
    pub fn to_payload(&self) -> LoginData {
        LoginData { email: self.email.trim().to_owned(), password: self.password.trim().to_owned() }
    }
}

/// Login fields plus the role picked in the select. `role` stays a string so
/// "nothing picked yet" is representable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "validate_email_field"))]
    pub email: String,
    #[validate(custom(function = "validate_password_field"))]
    pub password: String,
    #[validate(custom(function = "validate_role_field"))]
    pub role: String,
}

impl RegisterForm {
    /// Trimmed request body, or `None` when the role does not parse.
    pub fn to_payload(&self) -> Option<RegisterData> {
        let role = self.role.trim().parse::<Role>().ok()?;
        Some(RegisterData { email: self.email.trim().to_owned(), password: self.password.trim().to_owned(), role })
    }
}
