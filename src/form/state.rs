//! Submit lifecycle for one mounted form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages own one `FormState` per mount behind an `Rc` and bump a revision
//! signal after every call that changes it. The state itself is not reactive
//! so the whole submit sequence is testable without a Leptos runtime.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures are data: `handle_submit` returns `Ok(None)` and the
//! error map is filled. Submit failures are stored as the server error and
//! returned to the caller as well.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::cell::{Cell, RefCell};
use std::future::Future;

use validator::Validate;

use super::validation::{FieldErrors, Validation};
use crate::net::error::ApiError;
use crate::state::query::PendingFlag;

pub const FALLBACK_SERVER_ERROR: &str = "Something went wrong";

/// Display text for a failed submit: the server's message, else the error's
/// own description, else a fixed fallback.
pub fn submit_error_message(err: &ApiError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_owned();
    }
    let own = err.to_string();
    if own.trim().is_empty() { FALLBACK_SERVER_ERROR.to_owned() } else { own }
}

pub struct FormState<T, R> {
    initial: T,
    data: RefCell<T>,
    validation: RefCell<Validation>,
    server_error: RefCell<Option<String>>,
    loading: Cell<bool>,
    on_success: Option<Box<dyn Fn(&R)>>,
}

impl<T, R> FormState<T, R>
where
    T: Validate + Clone,
{
    pub fn new(initial: T) -> Self {
        Self {
            data: RefCell::new(initial.clone()),
            initial,
            validation: RefCell::new(Validation::default()),
            server_error: RefCell::new(None),
            loading: Cell::new(false),
            on_success: None,
        }
    }

    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(&R) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn data(&self) -> T {
        self.data.borrow().clone()
    }

    /// Change field values. A field that already shows a message is
    /// re-checked so the message clears as soon as the input is fixed.
    pub fn update(&self, field: &str, change: impl FnOnce(&mut T)) {
        change(&mut self.data.borrow_mut());
        let shown = self.validation.borrow().visible_error(field).is_some();
        if shown {
            self.validation.borrow_mut().validate_field(&*self.data.borrow(), field);
        }
    }

    /// Blur handler: mark `field` touched and re-check it.
    pub fn handle_blur(&self, field: &str) {
        let mut validation = self.validation.borrow_mut();
        validation.mark_touched(field);
        validation.validate_field(&*self.data.borrow(), field);
    }

    pub fn errors(&self) -> FieldErrors {
        self.validation.borrow().errors().clone()
    }

    pub fn visible_error(&self, field: &str) -> Option<String> {
        self.validation.borrow().visible_error(field).map(str::to_owned)
    }

    pub fn set_field_error(&self, field: &str, message: impl Into<String>) {
        self.validation.borrow_mut().set_error(field, message);
    }

    pub fn server_error(&self) -> Option<String> {
        self.server_error.borrow().clone()
    }

    pub fn set_server_error(&self, message: Option<String>) {
        *self.server_error.borrow_mut() = message;
    }

    /// Field messages with the server error under `"server"`.
    pub fn all_errors(&self) -> FieldErrors {
        let mut all = self.errors();
        if let Some(message) = self.server_error() {
            all.insert("server".to_owned(), message);
        }
        all
    }

    pub fn has_errors(&self) -> bool {
        self.validation.borrow().errors().values().any(|m| !m.is_empty()) || self.server_error.borrow().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.validation.borrow().is_dirty()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.borrow().is_valid()
    }

    /// Drop field messages and touched marks, keeping the values.
    pub fn reset_validation(&self) {
        self.validation.borrow_mut().reset();
    }

    /// Restore the initial values and clear every error and flag.
    pub fn reset_form(&self) {
        *self.data.borrow_mut() = self.initial.clone();
        self.reset_validation();
        self.set_server_error(None);
        self.loading.set(false);
    }

    /// Validate and, when valid, run `submit` on a snapshot of the data.
    ///
    /// Returns `Ok(None)` without calling `submit` when validation fails.
    /// The loading flag is cleared on every exit, including a dropped future.
    ///
    /// # Errors
    ///
    /// The submit operation's error, after its message is stored as the
    /// server error.
    pub async fn handle_submit<F, Fut>(&self, submit: F) -> Result<Option<R>, ApiError>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        self.set_server_error(None);

        let data = self.data();
        if !self.validation.borrow_mut().validate_for_submit(&data) {
            log::debug!("form submit blocked by {} field error(s)", self.validation.borrow().errors().len());
            return Ok(None);
        }

        let _loading = PendingFlag::raise(&self.loading);
        match submit(data).await {
            Ok(result) => {
                if let Some(callback) = &self.on_success {
                    callback(&result);
                }
                Ok(Some(result))
            }
            Err(err) => {
                if !err.is_handled() {
                    self.set_server_error(Some(submit_error_message(&err)));
                }
                Err(err)
            }
        }
    }
}
