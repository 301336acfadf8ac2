//! HTTPS/JSON implementation of [`ShortenerApi`].

use super::dto::{BulkShortenBody, Envelope, ErrorBody, HistoryBody, HistoryPayload, ShortenBody};
use super::headers::{default_headers, parse_rate_limit_headers};
use crate::domain::entities::{AnalyticsSummary, HistoryPage, ShortenResult};
use crate::domain::repositories::{ApiReply, ShortenerApi};
use crate::error::{ClientError, ClientResult};
use crate::utils::security::{enforce_https, generate_csrf_token};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

/// Client for the remote shortening API.
///
/// Construction upgrades the base URL to HTTPS (loopback hosts excepted),
/// generates the session anti-forgery token and installs the hardening
/// headers as defaults, so every request carries them.
///
/// Timeouts are left to `reqwest` defaults.
#[derive(Debug, Clone)]
pub struct HttpShortenerApi {
    http: Client,
    base_url: Url,
}

impl HttpShortenerApi {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL cannot carry paths,
    /// no random token can be generated, or the HTTP client fails to build.
    pub fn new(base_url: &Url) -> ClientResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "Base URL cannot carry paths: {}",
                base_url
            )));
        }

        let mut base_url = enforce_https(base_url.clone());
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let csrf_token = generate_csrf_token()
            .map_err(|e| ClientError::Config(format!("Failed to generate token: {}", e)))?;

        let http = Client::builder()
            .default_headers(default_headers(&csrf_token)?)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Base URL after HTTPS enforcement.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint {}: {}", path, e)))?;
        Ok(enforce_https(url))
    }

    async fn post<B, T>(&self, endpoint: &'static str, body: &B) -> ClientResult<ApiReply<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(endpoint)?;
        debug!("POST {}", url);

        let started = Instant::now();
        let result = self.http.post(url).json(body).send().await;
        record_duration(endpoint, started);

        Self::handle_response(endpoint, result?).await
    }

    async fn get<T>(&self, endpoint: &'static str, url: Url) -> ClientResult<ApiReply<T>>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", url);

        let started = Instant::now();
        let result = self.http.get(url).send().await;
        record_duration(endpoint, started);

        Self::handle_response(endpoint, result?).await
    }

    /// Maps a response to a payload or a typed error.
    ///
    /// Rate-limit headers are attached to `429` errors and, when they
    /// signal a limit, to successful replies.
    async fn handle_response<T>(endpoint: &str, response: Response) -> ClientResult<ApiReply<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let mut rate_limit = parse_rate_limit_headers(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ErrorBody::parse_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

            if status.as_u16() == 429 {
                rate_limit.is_rate_limited = true;
                warn!("Rate limited on {}: {:?}", endpoint, rate_limit);
                return Err(ClientError::rate_limited(message, rate_limit));
            }

            error!("{} failed with {}: {}", endpoint, status, message);
            return Err(ClientError::api(status.as_u16(), message));
        }

        let envelope: Envelope<T> = response.json().await?;
        let data = envelope.into_payload(status.as_u16())?;

        let reply = ApiReply::new(data);
        Ok(if rate_limit.is_rate_limited {
            warn!("Rate limit reached on {}: {:?}", endpoint, rate_limit);
            reply.with_rate_limit(rate_limit)
        } else {
            reply
        })
    }
}

fn record_duration(endpoint: &'static str, started: Instant) {
    metrics::histogram!("shortener_api_request_duration_seconds", "endpoint" => endpoint)
        .record(started.elapsed().as_secs_f64());
    debug!("{} took {}ms", endpoint, started.elapsed().as_millis());
}

#[async_trait]
impl ShortenerApi for HttpShortenerApi {
    async fn shorten(
        &self,
        long_url: &str,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>> {
        let body = ShortenBody {
            long_url,
            custom_alias: None,
            expiry_date: expiry,
        };
        self.post("shorten", &body).await
    }

    async fn shorten_with_alias(
        &self,
        long_url: &str,
        alias: &str,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>> {
        let body = ShortenBody {
            long_url,
            custom_alias: Some(alias),
            expiry_date: expiry,
        };
        self.post("shorten", &body).await
    }

    async fn bulk_shorten(
        &self,
        urls: Vec<String>,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<Vec<ShortenResult>>> {
        let body = BulkShortenBody {
            urls,
            expiry_date: expiry,
        };
        self.post("bulk-shorten", &body).await
    }

    async fn history(&self, page: u32, limit: u32) -> ClientResult<ApiReply<HistoryPage>> {
        let reply: ApiReply<HistoryPayload> =
            self.post("history", &HistoryBody { page, limit }).await?;

        Ok(ApiReply {
            data: HistoryPage::from(reply.data),
            rate_limit: reply.rate_limit,
        })
    }

    async fn analytics(&self, short_id: &str) -> ClientResult<ApiReply<AnalyticsSummary>> {
        if short_id.trim().is_empty() {
            return Err(ClientError::validation("Short ID is required"));
        }

        let mut url = self.endpoint("analytics")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("Base URL cannot carry paths".to_string()))?
            .pop_if_empty()
            .push(short_id);

        self.get("analytics", url).await
    }
}
