//! Request and response interceptors applied by the HTTP client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request gets the stored bearer token. Every failed response passes
//! through [`SessionExpiryInterceptor`], the single place a 401 is turned into
//! "forget the token and go to `/login`". Individual call sites never handle
//! session expiry themselves.

#[cfg(test)]
#[path = "interceptors_test.rs"]
mod interceptors_test;

use std::cell::Cell;
use std::rc::Rc;

use super::error::ApiError;
use super::transport::HttpRequest;
use crate::router::routes::LOGIN_PATH;
use crate::util::navigation::Navigator;
use crate::util::storage::TokenStore;

/// Endpoints whose 401s are credential rejections, not expired sessions.
const CREDENTIAL_ENDPOINTS: [&str; 2] = ["/auth/login", "/auth/register"];

/// Add `Authorization: Bearer <token>` when a token is stored.
pub fn attach_bearer_token(request: &mut HttpRequest, tokens: &dyn TokenStore) {
    if let Some(token) = tokens.get() {
        request.set_header("Authorization", format!("Bearer {token}"));
    }
}

/// One-shot guard around the expired-session redirect.
///
/// Held from the moment a redirect is issued until the next navigation
/// completes, so concurrently failing requests trigger at most one redirect.
#[derive(Debug, Default)]
pub struct RedirectLatch {
    held: Cell<bool>,
}

impl RedirectLatch {
    /// Take the latch. Returns `false` if a redirect is already in flight.
    pub fn try_acquire(&self) -> bool {
        !self.held.replace(true)
    }

    pub fn release(&self) {
        self.held.set(false);
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Response-failure interceptor reacting to 401 from non-credential endpoints.
pub struct SessionExpiryInterceptor {
    tokens: Rc<dyn TokenStore>,
    navigator: Rc<dyn Navigator>,
    latch: Rc<RedirectLatch>,
}

impl SessionExpiryInterceptor {
    pub fn new(tokens: Rc<dyn TokenStore>, navigator: Rc<dyn Navigator>, latch: Rc<RedirectLatch>) -> Self {
        Self { tokens, navigator, latch }
    }

    /// Inspect a failed request and return the error the caller should see.
    ///
    /// Checks run in order: non-HTTP failures, credential endpoints, 5xx and
    /// 403 all pass through untouched. A 401 purges the token, redirects to
    /// `/login` at most once, and comes back as [`ApiError::Unauthorized`].
    pub fn on_error(&self, request: &HttpRequest, error: ApiError) -> ApiError {
        let ApiError::Network { status, .. } = &error else {
            return error;
        };
        let status = *status;

        if CREDENTIAL_ENDPOINTS.iter().any(|endpoint| request.path.contains(endpoint)) {
            return error;
        }
        if status >= 500 {
            return error;
        }
        // Authenticated but not allowed; the session is still good.
        if status == 403 {
            return error;
        }
        if status != 401 {
            return error;
        }

        self.tokens.clear();
        if self.navigator.current_path().contains(LOGIN_PATH) {
            log::debug!("401 from {} while already on login page", request.path);
        } else if self.latch.try_acquire() {
            log::info!("session expired on {}; redirecting to {LOGIN_PATH}", request.path);
            self.navigator.redirect(LOGIN_PATH);
        } else {
            log::debug!("401 from {} while a redirect is already in flight", request.path);
        }
        ApiError::Unauthorized
    }
}
