//! Configured HTTP client: base URL, JSON headers, interceptor pipeline.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::interceptors::{SessionExpiryInterceptor, attach_bearer_token};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use super::types::ApiErrorBody;
use crate::util::storage::TokenStore;

pub struct HttpClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    tokens: Rc<dyn TokenStore>,
    expiry: SessionExpiryInterceptor,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn Transport>,
        tokens: Rc<dyn TokenStore>,
        expiry: SessionExpiryInterceptor,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, transport, tokens, expiry }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.execute(Method::Get, path, None).await?;
        decode(&resp)
    }

    /// `POST` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::unknown)?;
        let resp = self.execute(Method::Post, path, Some(body)).await?;
        decode(&resp)
    }

    /// Send one request through the interceptor pipeline.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unknown`] when no response arrived, [`ApiError::Network`]
    /// for non-2xx statuses, and [`ApiError::Unauthorized`] when an expired
    /// session was already handled.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ApiError> {
        let mut request = HttpRequest {
            method,
            path: path.to_owned(),
            url: format!("{}{path}", self.base_url),
            headers: vec![
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("Accept".to_owned(), "application/json".to_owned()),
            ],
            body,
        };
        attach_bearer_token(&mut request, self.tokens.as_ref());

        log::debug!("{} {}", method.as_str(), request.path);
        let result = match self.transport.send(&request).await {
            Ok(resp) if resp.ok() => Ok(resp),
            Ok(resp) => Err(ApiError::Network { status: resp.status, body: parse_error_body(&resp.body) }),
            Err(err) => Err(ApiError::unknown(err)),
        };
        result.map_err(|err| self.expiry.on_error(&request, err))
    }
}

fn decode<T: DeserializeOwned>(resp: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&resp.body).map_err(|e| ApiError::unknown(format!("invalid response body: {e}")))
}

fn parse_error_body(raw: &str) -> Option<ApiErrorBody> {
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}
