//! The three remote operations behind the session: login, register, profile.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use super::error::ApiError;
use super::http::HttpClient;
use super::types::{AuthResponse, LoginData, RegisterData, User};

const AUTH_BASE: &str = "/auth";

fn auth_endpoint(name: &str) -> String {
    format!("{AUTH_BASE}/{name}")
}

#[derive(Clone)]
pub struct AuthApi {
    http: Rc<HttpClient>,
}

impl AuthApi {
    pub fn new(http: Rc<HttpClient>) -> Self {
        Self { http }
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; a 401 here is a credential rejection and stays a
    /// `Network` error.
    pub async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError> {
        self.http.post(&auth_endpoint("login"), data).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        self.http.post(&auth_endpoint("register"), data).await
    }

    /// `GET /auth/profile` for the bearer of the stored token.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; an expired session surfaces as [`ApiError::Unauthorized`].
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.http.get(&auth_endpoint("profile")).await
    }
}
