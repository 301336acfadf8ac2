//! Port for the remote shortening API.

use crate::domain::entities::{AnalyticsSummary, HistoryPage, RateLimitStatus, ShortenResult};
use crate::error::ClientResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A successful API payload plus any rate-limit signal seen on the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    pub data: T,
    /// Present only when the response headers indicate the client is limited.
    pub rate_limit: Option<RateLimitStatus>,
}

impl<T> ApiReply<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            rate_limit: None,
        }
    }

    pub fn with_rate_limit(mut self, status: RateLimitStatus) -> Self {
        self.rate_limit = Some(status);
        self
    }
}

/// Operations offered by the shortening service.
///
/// The service itself is a black box: it generates codes, stores links and
/// computes analytics. Implementations only move requests and responses.
///
/// # Implementations
///
/// - [`crate::infrastructure::http::HttpShortenerApi`] - HTTPS/JSON client
/// - Test mocks available with `cfg(test)`
///
/// # Errors
///
/// Every method returns [`crate::error::ClientError::Api`] for non-success
/// responses (with a [`RateLimitStatus`] on `429`) and
/// [`crate::error::ClientError::Transport`] when no response arrived.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortenerApi: Send + Sync {
    /// `POST /shorten` with a server-generated code.
    async fn shorten(
        &self,
        long_url: &str,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>>;

    /// `POST /shorten` with a caller-chosen alias.
    async fn shorten_with_alias(
        &self,
        long_url: &str,
        alias: &str,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>>;

    /// `POST /bulk-shorten`.
    async fn bulk_shorten(
        &self,
        urls: Vec<String>,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<Vec<ShortenResult>>>;

    /// `POST /history` for one page.
    async fn history(&self, page: u32, limit: u32) -> ClientResult<ApiReply<HistoryPage>>;

    /// `GET /analytics/:short_id`.
    async fn analytics(&self, short_id: &str) -> ClientResult<ApiReply<AnalyticsSummary>>;
}
