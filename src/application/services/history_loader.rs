//! Cache-first page source shared by both history controllers.

use crate::domain::entities::{HistoryPage, PageSize};
use crate::domain::repositories::ShortenerApi;
use crate::error::ClientResult;
use crate::infrastructure::cache::{CacheStats, HistoryCache, history_key};
use std::sync::Arc;
use tracing::debug;

pub(crate) struct HistoryLoader<A> {
    api: Arc<A>,
    cache: Arc<HistoryCache>,
}

impl<A: ShortenerApi> HistoryLoader<A> {
    pub(crate) fn new(api: Arc<A>, cache: Arc<HistoryCache>) -> Self {
        Self { api, cache }
    }

    /// Cached page for `(page, limit)`, if still fresh.
    pub(crate) fn cached(&self, page: u32, limit: PageSize) -> Option<HistoryPage> {
        let key = history_key(page, limit.get());
        let hit = self.cache.get(&key);

        if hit.is_some() {
            metrics::counter!("shortener_history_cache_hits_total").increment(1);
        } else {
            metrics::counter!("shortener_history_cache_misses_total").increment(1);
        }
        hit
    }

    /// Fetches a page from the API and stores it in the cache.
    pub(crate) async fn fetch(&self, page: u32, limit: PageSize) -> ClientResult<HistoryPage> {
        let reply = self.api.history(page, limit.get()).await?;
        self.cache
            .set(history_key(page, limit.get()), reply.data.clone());

        let stats = self.cache.stats();
        debug!(
            "History cache: {} total, {} valid, {} expired",
            stats.total, stats.valid, stats.expired
        );

        Ok(reply.data)
    }

    /// Drops cached pages `1..=total_pages` for `limit`.
    pub(crate) fn purge(&self, total_pages: u32, limit: PageSize) {
        for page in 1..=total_pages {
            self.cache.delete(&history_key(page, limit.get()));
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
