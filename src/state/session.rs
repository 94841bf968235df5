//! Session coordinator: token lifecycle, profile cache and auth actions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Constructed once at start-up and handed to the router guard and pages.
//! It owns the HTTP pipeline, the query cache and the redirect latch, so
//! nothing else reaches for storage or the cache directly.
//!
//! "Signed in" means a profile is cached. A stored token is only a candidate
//! credential until `/auth/profile` accepts it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use super::auth::AuthState;
use super::query::{MutationState, PROFILE_KEY, QueryClient, QueryOptions, RetryPolicy, USER_KEY};
use crate::config::ClientConfig;
use crate::net::api::AuthApi;
use crate::net::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::interceptors::{RedirectLatch, SessionExpiryInterceptor};
use crate::net::transport::{FetchTransport, Transport};
use crate::net::types::{AuthResponse, LoginData, RegisterData, User};
use crate::util::clock::{Clock, SystemClock};
use crate::util::navigation::{Navigator, WindowNavigator};
use crate::util::storage::{LocalStorageTokenStore, TokenStore};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const PROFILE_FAILED: &str = "Failed to load profile";

pub struct Session {
    tokens: Rc<dyn TokenStore>,
    api: AuthApi,
    queries: Rc<QueryClient>,
    latch: Rc<RedirectLatch>,
    login_mutation: MutationState,
    register_mutation: MutationState,
    profile_options: QueryOptions,
    /// Token was present when the session was built; gates `load_profile`.
    profile_enabled: bool,
}

impl Session {
    pub fn new(
        config: &ClientConfig,
        tokens: Rc<dyn TokenStore>,
        transport: Rc<dyn Transport>,
        navigator: Rc<dyn Navigator>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let latch = Rc::new(RedirectLatch::default());
        let expiry = SessionExpiryInterceptor::new(tokens.clone(), navigator, latch.clone());
        let http = HttpClient::new(config.api_base_domain.clone(), transport, tokens.clone(), expiry);
        let profile_enabled = tokens.is_present();

        Self {
            tokens,
            api: AuthApi::new(Rc::new(http)),
            queries: Rc::new(QueryClient::new(clock)),
            latch,
            login_mutation: MutationState::default(),
            register_mutation: MutationState::default(),
            profile_options: QueryOptions {
                stale_time_ms: config.profile_stale_time_ms,
                retry: RetryPolicy::UnlessUnauthorized(config.query_retry),
            },
            profile_enabled,
        }
    }

    /// Session wired to `localStorage`, `fetch` and `window.location`.
    pub fn browser(config: &ClientConfig) -> Self {
        Self::new(
            config,
            Rc::new(LocalStorageTokenStore::new(config.token_storage_key.clone())),
            Rc::new(FetchTransport),
            Rc::new(WindowNavigator),
            Rc::new(SystemClock),
        )
    }

    pub fn user(&self) -> Option<User> {
        self.queries.get_query_data::<User>(PROFILE_KEY)
    }

    pub fn has_token(&self) -> bool {
        self.tokens.is_present()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.queries.is_fetching(PROFILE_KEY) || self.login_mutation.is_pending() || self.register_mutation.is_pending()
    }

    /// First user-facing error among profile, login and register, in that order.
    pub fn error(&self) -> Option<String> {
        let profile = self.queries.query_error(PROFILE_KEY).filter(|e| !e.is_handled());
        [
            (profile, PROFILE_FAILED),
            (self.login_mutation.error(), LOGIN_FAILED),
            (self.register_mutation.error(), REGISTER_FAILED),
        ]
        .into_iter()
        .find_map(|(err, fallback)| err.map(|e| message_or(&e, fallback)))
    }

    pub fn snapshot(&self) -> AuthState {
        AuthState { user: self.user(), loading: self.is_loading(), error: self.error() }
    }

    /// Sign in. On success the token is stored and the returned user seeds
    /// the profile cache, so no profile round trip follows.
    ///
    /// # Errors
    ///
    /// The endpoint's failure; the token and profile are cleared first.
    pub async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError> {
        let result = self.login_mutation.run(self.api.login(data)).await;
        self.apply_auth_result(&result, "login");
        result
    }

    /// Create an account with a role and sign in as it.
    ///
    /// # Errors
    ///
    /// The endpoint's failure; the token and profile are cleared first.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        let result = self.register_mutation.run(self.api.register(data)).await;
        self.apply_auth_result(&result, "register");
        result
    }

    fn apply_auth_result(&self, result: &Result<AuthResponse, ApiError>, action: &str) {
        match result {
            Ok(resp) => {
                self.tokens.set(&resp.access_token);
                self.queries.set_query_data(PROFILE_KEY, Some(resp.user.clone()));
                self.queries.invalidate_queries(USER_KEY);
                log::info!("{action} succeeded for user {}", resp.user.id);
            }
            Err(err) => {
                self.tokens.clear();
                self.queries.set_query_data::<User>(PROFILE_KEY, None);
                log::warn!("{action} failed: {err}");
            }
        }
    }

    /// Forget the credential and every user-scoped cache entry. Local only.
    pub fn logout(&self) {
        self.tokens.clear();
        self.queries.set_query_data::<User>(PROFILE_KEY, None);
        self.queries.remove_queries(USER_KEY);
        self.login_mutation.reset();
        self.register_mutation.reset();
        log::info!("logged out");
    }

    /// Profile for the page mount: served from cache while fresh, fetched
    /// otherwise. Does nothing when no token existed at start-up.
    ///
    /// # Errors
    ///
    /// The profile fetch's failure after retries.
    pub async fn load_profile(&self) -> Result<Option<User>, ApiError> {
        if !self.profile_enabled {
            return Ok(self.user());
        }
        let result = self.queries.fetch_query(PROFILE_KEY, self.profile_options, self.profile_fetcher()).await;
        self.after_profile_fetch(result).map(Some)
    }

    /// Fetch the profile from the network, ignoring freshness.
    ///
    /// # Errors
    ///
    /// The profile fetch's failure after retries; the cached profile is
    /// cleared.
    pub async fn refetch_profile(&self) -> Result<User, ApiError> {
        let result = self.queries.refetch_query(PROFILE_KEY, self.profile_options, self.profile_fetcher()).await;
        self.after_profile_fetch(result)
    }

    fn after_profile_fetch(&self, result: Result<User, ApiError>) -> Result<User, ApiError> {
        if let Err(err) = &result {
            self.queries.clear_query_data(PROFILE_KEY);
            log::warn!("profile fetch failed: {err}");
        }
        result
    }

    fn profile_fetcher(&self) -> impl Fn() -> futures::future::LocalBoxFuture<'static, Result<User, ApiError>> + 'static {
        use futures::FutureExt;

        let api = self.api.clone();
        move || {
            let api = api.clone();
            async move { api.profile().await }.boxed_local()
        }
    }

    /// Clear the stored token without touching the cache.
    pub fn discard_token(&self) {
        self.tokens.clear();
    }

    /// Called once the router has finished moving to `path`; re-arms the
    /// expired-session redirect.
    pub fn navigation_completed(&self, path: &str) {
        if self.latch.is_held() {
            log::debug!("navigation to {path} completed; releasing redirect latch");
        }
        self.latch.release();
    }
}

fn message_or(err: &ApiError, fallback: &str) -> String {
    let message = err.user_message();
    if message.trim().is_empty() { fallback.to_owned() } else { message }
}
