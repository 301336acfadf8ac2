//! Bulk shorten form: many URLs, one request.

use super::rate_limit_tracker::RateLimitTracker;
use super::shorten_service::validate_expiry;
use crate::domain::entities::ShortenResult;
use crate::domain::repositories::ShortenerApi;
use crate::error::{ClientError, ClientResult};
use crate::utils::{secure_url, validate_url};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Fallback shown when a bulk call fails without a server message.
pub const BULK_FALLBACK: &str = "Failed to shorten URLs";

/// Splits pasted text into URLs: one per line, trimmed, blank lines dropped.
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates every URL and reports the first failure with its 1-based line.
///
/// Line numbers count only non-blank lines, as returned by
/// [`parse_url_list`].
///
/// # Errors
///
/// [`ClientError::Validation`] with "Please enter at least one URL" for an
/// empty list, or "Line <n>: <message>".
pub fn validate_url_list(urls: &[String]) -> ClientResult<()> {
    if urls.is_empty() {
        return Err(ClientError::validation("Please enter at least one URL"));
    }

    for (index, url) in urls.iter().enumerate() {
        if let Err(e) = validate_url(url) {
            return Err(ClientError::validation(format!("Line {}: {}", index + 1, e)));
        }
    }
    Ok(())
}

/// Renders results as CSV with an `Original URL,Short URL,Status` header.
pub fn results_csv(results: &[ShortenResult]) -> String {
    let mut csv = String::from("Original URL,Short URL,Status\n");
    for result in results {
        csv.push_str(&csv_field(&result.original_url));
        csv.push(',');
        csv.push_str(&csv_field(&result.short_url));
        csv.push_str(",success\n");
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkState {
    pub results: Vec<ShortenResult>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Shortens a pasted list of URLs in a single `bulk_shorten` call.
pub struct BulkShortenForm<A> {
    api: Arc<A>,
    tracker: Arc<RateLimitTracker>,
    state: Mutex<BulkState>,
}

impl<A: ShortenerApi> BulkShortenForm<A> {
    pub fn new(api: Arc<A>, tracker: Arc<RateLimitTracker>) -> Self {
        Self {
            api,
            tracker,
            state: Mutex::new(BulkState::default()),
        }
    }

    /// Parses `input`, validates every line and shortens the lot.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] with status 429 while rate limited
    /// - [`ClientError::Validation`] for an empty list, a bad line or a past
    ///   expiry
    /// - Any API or transport error from the call itself
    pub async fn submit(
        &self,
        input: &str,
        expiry: Option<NaiveDate>,
    ) -> ClientResult<Vec<ShortenResult>> {
        let urls = parse_url_list(input);

        if let Err(e) = self.prepare(&urls, expiry) {
            self.fail(&e, None);
            return Err(e);
        }

        let secure: Vec<String> = urls.iter().map(|url| secure_url(url)).collect();
        let count = secure.len();
        self.lock().loading = true;

        match self.api.bulk_shorten(secure, expiry).await {
            Ok(reply) => {
                self.tracker.observe_reply(reply.rate_limit.as_ref());
                info!("Shortened {} of {} URLs", reply.data.len(), count);

                let mut state = self.lock();
                state.loading = false;
                state.error = None;
                state.results = reply.data.clone();
                Ok(reply.data)
            }
            Err(e) => {
                error!("Bulk shorten of {} URLs failed: {}", count, e);
                let limited = self.tracker.observe_error(&e);
                self.fail(&e, limited);
                Err(e)
            }
        }
    }

    pub fn reset(&self) {
        *self.lock() = BulkState::default();
    }

    /// Drops the held rate limit and the form error so the next submit is
    /// sent.
    pub fn retry_now(&self) {
        self.tracker.clear();
        self.lock().error = None;
    }

    pub fn snapshot(&self) -> BulkState {
        self.lock().clone()
    }

    fn prepare(&self, urls: &[String], expiry: Option<NaiveDate>) -> ClientResult<()> {
        self.tracker.check()?;
        validate_url_list(urls)?;
        validate_expiry(expiry, Utc::now().date_naive())
    }

    fn fail(&self, error: &ClientError, message: Option<String>) {
        let mut state = self.lock();
        state.loading = false;
        state.error = Some(message.unwrap_or_else(|| error.user_message(BULK_FALLBACK)));
    }

    fn lock(&self) -> MutexGuard<'_, BulkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RateLimitStatus;
    use crate::domain::repositories::{ApiReply, MockShortenerApi};
    use chrono::TimeZone;

    fn result(original: &str, short: &str) -> ShortenResult {
        ShortenResult {
            original_url: original.to_string(),
            short_url: short.to_string(),
            alias: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            clicks: None,
        }
    }

    #[test]
    fn test_parse_url_list() {
        let urls = parse_url_list("  https://a.com \n\n\t\nhttps://b.com\r\n");
        assert_eq!(urls, ["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_validate_url_list_reports_first_bad_line() {
        let urls = parse_url_list("https://a.com\nnot a url\nftp//bad");
        let err = validate_url_list(&urls).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 2: URL must start with http://, https://, or ftp://"
        );
    }

    #[test]
    fn test_validate_url_list_rejects_empty_input() {
        let err = validate_url_list(&parse_url_list(" \n \n")).unwrap_err();
        assert_eq!(err.to_string(), "Please enter at least one URL");
    }

    #[test]
    fn test_results_csv_quotes_fields() {
        let csv = results_csv(&[
            result("https://a.com/?x=1,2", "https://short.ly/a"),
            result("https://b.com", "https://short.ly/b"),
        ]);

        assert_eq!(
            csv,
            "Original URL,Short URL,Status\n\
             \"https://a.com/?x=1,2\",https://short.ly/a,success\n\
             https://b.com,https://short.ly/b,success\n"
        );
    }

    #[tokio::test]
    async fn test_submit_sends_one_request() {
        let mut mock = MockShortenerApi::new();
        mock.expect_bulk_shorten()
            .withf(|urls, expiry| {
                urls == &["https://a.com".to_string(), "https://b.com".to_string()]
                    && expiry.is_none()
            })
            .times(1)
            .returning(|urls, _| {
                Ok(ApiReply::new(
                    urls.iter()
                        .enumerate()
                        .map(|(i, url)| result(url, &format!("https://short.ly/{i}")))
                        .collect(),
                ))
            });

        let form = BulkShortenForm::new(Arc::new(mock), Arc::new(RateLimitTracker::new()));
        let results = form.submit("https://a.com\n\nhttps://b.com", None).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(form.snapshot().results.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_line_never_calls_api() {
        let mut mock = MockShortenerApi::new();
        mock.expect_bulk_shorten().never();

        let form = BulkShortenForm::new(Arc::new(mock), Arc::new(RateLimitTracker::new()));
        assert!(form.submit("https://a.com\nexample", None).await.is_err());
        assert_eq!(
            form.snapshot().error.as_deref(),
            Some("Line 2: URL must start with http://, https://, or ftp://")
        );
    }

    #[tokio::test]
    async fn test_transport_error_uses_fallback() {
        let mut mock = MockShortenerApi::new();
        mock.expect_bulk_shorten()
            .returning(|_, _| Err(ClientError::transport("dns failure")));

        let form = BulkShortenForm::new(Arc::new(mock), Arc::new(RateLimitTracker::new()));
        assert!(form.submit("https://a.com", None).await.is_err());

        let state = form.snapshot();
        assert_eq!(state.error.as_deref(), Some(BULK_FALLBACK));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_now_lifts_rate_limit() {
        let mut mock = MockShortenerApi::new();
        mock.expect_bulk_shorten().times(1).returning(|_, _| {
            Err(ClientError::rate_limited(
                "Too many requests",
                RateLimitStatus::from_headers_values(None, None, Some(60)),
            ))
        });

        let tracker = Arc::new(RateLimitTracker::new());
        let form = BulkShortenForm::new(Arc::new(mock), tracker.clone());
        assert!(form.submit("https://a.com", None).await.is_err());
        assert_eq!(
            form.snapshot().error.as_deref(),
            Some("Rate limit exceeded. Try again in 60s")
        );

        form.retry_now();
        assert!(!tracker.is_rate_limited());
        assert!(form.snapshot().error.is_none());
    }
}
