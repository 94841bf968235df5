//! Auth-session snapshot for the view layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages render from this plain value held in an `RwSignal`; the session
//! coordinator produces a fresh one after every action that can change it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::User;

/// Authentication state tracking the current user, loading and error status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// A profile is cached, which is what "signed in" means here. A stored
    /// token alone does not count.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
