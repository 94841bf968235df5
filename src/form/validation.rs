//! Per-field validation state over any `validator::Validate` type.
//!
//! A full pass collects every failing field, not just the first. Messages are
//! shown for a field once it has been touched, or for all fields after a
//! submit attempt.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::collections::{BTreeMap, BTreeSet};

use validator::{Validate, ValidationError, ValidationErrors};

/// Field name to the first message reported for it.
pub type FieldErrors = BTreeMap<String, String>;

/// Build a [`ValidationError`] carrying a display message.
pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// First message per failing field. Falls back to the error code.
pub fn collect_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first.message.as_ref().map_or_else(|| first.code.to_string(), ToString::to_string);
            Some((field.to_string(), message))
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    errors: FieldErrors,
    touched: BTreeSet<String>,
    dirty: bool,
    valid: bool,
    submitted: bool,
}

impl Validation {
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Result of the last full pass; `false` before any pass ran.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Full pass over `data`, replacing the error map.
    pub fn validate<T: Validate>(&mut self, data: &T) -> bool {
        self.dirty = true;
        self.errors = match data.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => collect_errors(&errors),
        };
        self.valid = self.errors.is_empty();
        self.valid
    }

    /// A submit attempt: validate everything and reveal every message.
    pub fn validate_for_submit<T: Validate>(&mut self, data: &T) -> bool {
        self.submitted = true;
        self.validate(data)
    }

    /// Re-check one field, leaving other fields' messages untouched.
    pub fn validate_field<T: Validate>(&mut self, data: &T, field: &str) -> bool {
        self.dirty = true;
        let current = match data.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => collect_errors(&errors),
        };
        match current.get(field) {
            Some(message) => {
                self.errors.insert(field.to_owned(), message.clone());
                self.valid = false;
                false
            }
            None => {
                self.errors.remove(field);
                self.valid = current.is_empty();
                true
            }
        }
    }

    pub fn mark_touched(&mut self, field: &str) {
        self.touched.insert(field.to_owned());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Message to render next to `field`, if it should be shown yet.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.submitted || self.is_touched(field) { self.error(field) } else { None }
    }

    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_owned(), message.into());
        self.valid = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
