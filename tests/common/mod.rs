#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;
use url_shortener_client::domain::entities::{
    AnalyticsSummary, HistoryItem, HistoryPage, ShortenResult,
};
use url_shortener_client::domain::repositories::{ApiReply, ShortenerApi};
use url_shortener_client::error::{ClientError, ClientResult};

pub fn history_item(id: &str) -> HistoryItem {
    HistoryItem {
        id: id.to_string(),
        original_url: format!("https://example.com/{id}"),
        short_url: format!("https://short.ly/{id}"),
        alias: id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
        clicks: 0,
    }
}

pub fn shorten_result(long_url: &str, short_url: &str) -> ShortenResult {
    ShortenResult {
        original_url: long_url.to_string(),
        short_url: short_url.to_string(),
        alias: short_url.rsplit('/').next().unwrap_or_default().to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        clicks: None,
    }
}

/// In-memory API serving `total_items` history entries, `page_size` per page.
///
/// Every history call sleeps for `delay` first, so tests running on a paused
/// clock can observe the "loading" window.
pub struct FakeApi {
    pub total_items: u32,
    pub delay: Duration,
    history_calls: AtomicUsize,
    requested_pages: Mutex<Vec<(u32, u32)>>,
    failing_pages: Mutex<HashMap<u32, ClientError>>,
}

impl FakeApi {
    pub fn new(total_items: u32) -> Self {
        Self {
            total_items,
            delay: Duration::from_millis(100),
            history_calls: AtomicUsize::new(0),
            requested_pages: Mutex::new(Vec::new()),
            failing_pages: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_page(&self, page: u32, error: ClientError) {
        self.failing_pages.lock().unwrap().insert(page, error);
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn requested_pages(&self) -> Vec<(u32, u32)> {
        self.requested_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShortenerApi for FakeApi {
    async fn shorten(
        &self,
        long_url: &str,
        _expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>> {
        Ok(ApiReply::new(shorten_result(long_url, "https://short.ly/abc123")))
    }

    async fn shorten_with_alias(
        &self,
        long_url: &str,
        alias: &str,
        _expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<ShortenResult>> {
        Ok(ApiReply::new(shorten_result(
            long_url,
            &format!("https://short.ly/{alias}"),
        )))
    }

    async fn bulk_shorten(
        &self,
        urls: Vec<String>,
        _expiry: Option<NaiveDate>,
    ) -> ClientResult<ApiReply<Vec<ShortenResult>>> {
        let results = urls
            .iter()
            .enumerate()
            .map(|(i, url)| shorten_result(url, &format!("https://short.ly/b{i}")))
            .collect();
        Ok(ApiReply::new(results))
    }

    async fn history(&self, page: u32, limit: u32) -> ClientResult<ApiReply<HistoryPage>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pages.lock().unwrap().push((page, limit));

        tokio::time::sleep(self.delay).await;

        if let Some(error) = self.failing_pages.lock().unwrap().get(&page) {
            return Err(error.clone());
        }

        let total_pages = self.total_items.div_ceil(limit);
        let start = (page - 1) * limit;
        let end = (start + limit).min(self.total_items);
        let items = (start..end)
            .map(|i| history_item(&format!("link-{}", i + 1)))
            .collect();

        Ok(ApiReply::new(HistoryPage::new(
            items,
            total_pages,
            u64::from(self.total_items),
        )))
    }

    async fn analytics(&self, _short_id: &str) -> ClientResult<ApiReply<AnalyticsSummary>> {
        Ok(ApiReply::new(AnalyticsSummary::default()))
    }
}

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_stub(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/api/")).unwrap()
}
