//! Error taxonomy shared by every layer of the client.
//!
//! Validation failures never reach the network, API failures carry the
//! server message (and a [`RateLimitStatus`] for `429 Too Many Requests`),
//! transport and decode failures wrap the underlying cause.

use crate::domain::entities::RateLimitStatus;
use crate::utils::{AliasValidationError, UrlValidationError};

/// Result alias used throughout the crate.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by the client library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The API answered with a non-success status or `success: false`.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        rate_limit: Option<RateLimitStatus>,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The owning view was closed or a newer request superseded this one.
    #[error("Request superseded or view closed")]
    Closed,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            rate_limit: None,
        }
    }

    /// Builds a `429` error carrying the parsed rate-limit headers.
    pub fn rate_limited(message: impl Into<String>, status: RateLimitStatus) -> Self {
        Self::Api {
            status: 429,
            message: message.into(),
            rate_limit: Some(status),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Rate-limit status attached to a `429` response, if any.
    pub fn rate_limit(&self) -> Option<&RateLimitStatus> {
        match self {
            Self::Api { rate_limit, .. } => rate_limit.as_ref(),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api { status: 429, .. })
    }

    /// Text shown to the user for this error.
    ///
    /// Server-provided messages and validation messages are shown as-is;
    /// anything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<UrlValidationError> for ClientError {
    fn from(e: UrlValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<AliasValidationError> for ClientError {
    fn from(e: AliasValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
