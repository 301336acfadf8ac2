//! Single-URL shorten form.

use super::rate_limit_tracker::RateLimitTracker;
use crate::domain::entities::ShortenResult;
use crate::domain::repositories::ShortenerApi;
use crate::error::{ClientError, ClientResult};
use crate::utils::{sanitized_alias, secure_url, validate_alias, validate_url};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Fallback shown when shortening fails without a server message.
pub const SHORTEN_FALLBACK: &str = "Failed to shorten URL";

/// Rejects expiry dates before `today`. Today itself is accepted.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] with
/// "Expiration date cannot be in the past".
pub fn validate_expiry(expiry: Option<NaiveDate>, today: NaiveDate) -> ClientResult<()> {
    match expiry {
        Some(date) if date < today => Err(ClientError::validation(
            "Expiration date cannot be in the past",
        )),
        _ => Ok(()),
    }
}

/// Raw user input for one shortening.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortenRequest {
    pub url: String,
    pub alias: Option<String>,
    pub expiry: Option<NaiveDate>,
}

impl ShortenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

/// What the form currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenState {
    pub short_url: Option<String>,
    pub result: Option<ShortenResult>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Validates input, calls the API and keeps the latest result.
///
/// Input is checked in order: rate limit, URL, alias, expiry. The first
/// failure becomes the form error and no request is sent.
pub struct ShortenForm<A> {
    api: Arc<A>,
    tracker: Arc<RateLimitTracker>,
    state: Mutex<ShortenState>,
}

impl<A: ShortenerApi> ShortenForm<A> {
    pub fn new(api: Arc<A>, tracker: Arc<RateLimitTracker>) -> Self {
        Self {
            api,
            tracker,
            state: Mutex::new(ShortenState::default()),
        }
    }

    /// Shortens `request.url`, with the custom alias when one survives
    /// sanitization.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] with status 429 while rate limited
    /// - [`ClientError::Validation`] for rejected input
    /// - Any API or transport error from the call itself
    pub async fn submit(&self, request: ShortenRequest) -> ClientResult<ShortenResult> {
        if let Err(e) = self.prepare(&request) {
            self.fail(&e, None);
            return Err(e);
        }

        let long_url = secure_url(&request.url);
        let alias = sanitized_alias(request.alias.as_deref());

        self.lock().loading = true;

        let reply = match alias.as_deref() {
            Some(alias) => {
                self.api
                    .shorten_with_alias(&long_url, alias, request.expiry)
                    .await
            }
            None => self.api.shorten(&long_url, request.expiry).await,
        };

        match reply {
            Ok(reply) => {
                self.tracker.observe_reply(reply.rate_limit.as_ref());
                info!("Shortened {} to {}", reply.data.original_url, reply.data.short_url);

                let mut state = self.lock();
                state.loading = false;
                state.error = None;
                state.short_url = Some(reply.data.short_url.clone());
                state.result = Some(reply.data.clone());
                Ok(reply.data)
            }
            Err(e) => {
                error!("Failed to shorten {}: {}", long_url, e);
                let limited = self.tracker.observe_error(&e);
                self.fail(&e, limited);
                Err(e)
            }
        }
    }

    /// Clears result and error.
    pub fn reset(&self) {
        *self.lock() = ShortenState::default();
    }

    /// Drops the held rate limit and the form error so the next submit is
    /// sent.
    pub fn retry_now(&self) {
        self.tracker.clear();
        self.lock().error = None;
    }

    pub fn snapshot(&self) -> ShortenState {
        self.lock().clone()
    }

    fn prepare(&self, request: &ShortenRequest) -> ClientResult<()> {
        self.tracker.check()?;
        validate_url(&request.url)?;
        validate_alias(request.alias.as_deref())?;
        validate_expiry(request.expiry, Utc::now().date_naive())
    }

    fn fail(&self, error: &ClientError, message: Option<String>) {
        let mut state = self.lock();
        state.loading = false;
        state.error = Some(message.unwrap_or_else(|| error.user_message(SHORTEN_FALLBACK)));
    }

    fn lock(&self) -> MutexGuard<'_, ShortenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
