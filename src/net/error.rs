//! Failure shapes produced by the HTTP layer.
//!
//! ERROR HANDLING
//! ==============
//! Callers match on variants instead of probing an untyped error value:
//! `Network` carries the HTTP status and decoded body, `Unknown` covers
//! transport and decode failures, and `Unauthorized` marks a 401 the response
//! interceptor already handled (token purged, redirect issued).

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use super::types::ApiErrorBody;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Network { status: u16, body: Option<ApiErrorBody> },
    #[error("{cause}")]
    Unknown { cause: String },
    #[error("session expired")]
    Unauthorized,
}

impl ApiError {
    pub fn unknown(cause: impl ToString) -> Self {
        Self::Unknown { cause: cause.to_string() }
    }

    /// HTTP status associated with the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Unknown { .. } => None,
        }
    }

    /// Whether the failure was already dealt with globally and must not be
    /// shown to the user.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Message for display: the server-supplied text when present, otherwise
    /// this error's own description.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { body: Some(body), .. } => {
                body.text().map_or_else(|| self.to_string(), str::to_owned)
            }
            _ => self.to_string(),
        }
    }

    /// Server-supplied text only, without falling back to the error description.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Network { body: Some(body), .. } => body.text(),
            _ => None,
        }
    }
}
