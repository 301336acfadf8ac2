//! Infinite-scroll history controller.
//!
//! Accumulates pages into one list. [`InfiniteHistory::load_more`] is the
//! only way to grow it, and it is guarded: while a page is loading, or once
//! the last page has been seen, further calls do nothing. A visibility signal
//! from the front-end ([`InfiniteHistory::on_visibility_change`]) is the
//! intended trigger; the controller never polls.
//!
//! Appended items whose `id` is already in the list are skipped, so
//! overlapping pages (new links inserted while scrolling) do not show twice.

use super::history_loader::HistoryLoader;
use super::history_service::HISTORY_FALLBACK;
use crate::domain::entities::{HistoryItem, HistoryPage, PageSize};
use crate::domain::repositories::ShortenerApi;
use crate::error::{ClientError, ClientResult};
use crate::infrastructure::cache::{CacheStats, HistoryCache};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Snapshot of an [`InfiniteHistory`] for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfiniteView {
    pub items: Vec<HistoryItem>,
    pub loading: bool,
    pub has_more: bool,
    /// True until the first page has settled, successfully or not.
    pub is_initial_load: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: PageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Replace,
    Append,
}

#[derive(Debug)]
struct InfiniteState {
    items: Vec<HistoryItem>,
    seen_ids: HashSet<String>,
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    limit: PageSize,
    has_more: bool,
    loading: bool,
    is_initial_load: bool,
    error: Option<String>,
    generation: u64,
    closed: bool,
}

impl InfiniteState {
    fn new(limit: PageSize) -> Self {
        Self {
            items: Vec::new(),
            seen_ids: HashSet::new(),
            current_page: 0,
            total_pages: 1,
            total_items: 0,
            limit,
            has_more: true,
            loading: false,
            is_initial_load: true,
            error: None,
            generation: 0,
            closed: false,
        }
    }

    fn apply(&mut self, page_no: u32, page: HistoryPage, mode: Mode) {
        if mode == Mode::Replace {
            self.items.clear();
            self.seen_ids.clear();
        }

        let has_more = page.has_more_after(page_no);
        let mut skipped = 0usize;
        for item in page.items {
            if self.seen_ids.insert(item.id.clone()) {
                self.items.push(item);
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Skipped {} duplicate history items on page {}", skipped, page_no);
        }

        self.current_page = page_no;
        self.total_pages = page.total_pages.max(page_no);
        self.total_items = page.total_items;
        self.has_more = has_more;
        self.loading = false;
        self.is_initial_load = false;
        self.error = None;
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.closed && self.generation == generation
    }
}

/// Controller for the infinite-scroll history list.
pub struct InfiniteHistory<A> {
    loader: HistoryLoader<A>,
    state: Mutex<InfiniteState>,
}

impl<A: ShortenerApi> InfiniteHistory<A> {
    pub fn new(api: Arc<A>, cache: Arc<HistoryCache>) -> Self {
        Self::with_page_size(api, cache, PageSize::DEFAULT)
    }

    pub fn with_page_size(api: Arc<A>, cache: Arc<HistoryCache>, limit: PageSize) -> Self {
        Self {
            loader: HistoryLoader::new(api, cache),
            state: Mutex::new(InfiniteState::new(limit)),
        }
    }

    /// Loads the first page, cache-first, replacing the list.
    ///
    /// # Errors
    ///
    /// Returns the API error or [`ClientError::Closed`] when superseded.
    pub async fn load(&self) -> ClientResult<()> {
        self.fetch(Mode::Replace, false).await.map(|_| ())
    }

    /// Appends the next page when more pages exist and nothing is loading.
    ///
    /// Returns `Ok(false)` when the call was dropped by the guard.
    ///
    /// # Errors
    ///
    /// Returns the API error or [`ClientError::Closed`] when superseded.
    pub async fn load_more(&self) -> ClientResult<bool> {
        self.fetch(Mode::Append, false).await
    }

    /// Front-end visibility signal for the end-of-list sentinel.
    ///
    /// # Errors
    ///
    /// Same as [`load_more`](Self::load_more).
    pub async fn on_visibility_change(&self, visible: bool) -> ClientResult<bool> {
        if !visible {
            return Ok(false);
        }
        self.load_more().await
    }

    /// Purges cached pages and reloads page 1 from the network.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn refresh(&self) -> ClientResult<()> {
        self.purge_cached_pages();
        self.fetch(Mode::Replace, true).await.map(|_| ())
    }

    /// Switches page size: purges the pages cached under the old size and
    /// reloads page 1 from the network.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a size outside 5, 10, 20, 50;
    /// otherwise same as [`load`](Self::load).
    pub async fn change_items_per_page(&self, limit: u32) -> ClientResult<()> {
        let limit = PageSize::try_from(limit)?;
        self.purge_cached_pages();
        self.lock().limit = limit;
        self.fetch(Mode::Replace, true).await.map(|_| ())
    }

    /// Drops the cached pages of the current page size.
    pub fn clear_cache(&self) {
        self.purge_cached_pages();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.loader.stats()
    }

    /// Tears the view down. Responses still in flight are discarded.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.generation += 1;
        state.loading = false;
    }

    pub fn snapshot(&self) -> InfiniteView {
        let state = self.lock();
        InfiniteView {
            items: state.items.clone(),
            loading: state.loading,
            has_more: state.has_more,
            is_initial_load: state.is_initial_load,
            error: state.error.clone(),
            current_page: state.current_page.max(1),
            total_pages: state.total_pages,
            total_items: state.total_items,
            items_per_page: state.limit,
        }
    }

    fn purge_cached_pages(&self) {
        let (total_pages, limit) = {
            let state = self.lock();
            (state.total_pages, state.limit)
        };
        self.loader.purge(total_pages, limit);
    }

    /// Fetches page 1 (replace) or the page after the current one (append).
    ///
    /// The append guard, the cache lookup and the switch to `loading` happen
    /// under one lock, so two concurrent `load_more` calls fetch one page.
    async fn fetch(&self, mode: Mode, force: bool) -> ClientResult<bool> {
        let (page_no, limit, generation) = {
            let mut state = self.lock();
            if state.closed {
                return Err(ClientError::Closed);
            }
            if mode == Mode::Append && (!state.has_more || state.loading) {
                return Ok(false);
            }

            let page_no = match mode {
                Mode::Replace => 1,
                Mode::Append => state.current_page + 1,
            };
            let limit = state.limit;
            state.generation += 1;

            if !force {
                if let Some(page) = self.loader.cached(page_no, limit) {
                    state.apply(page_no, page, mode);
                    return Ok(true);
                }
            }

            state.loading = true;
            state.error = None;
            (page_no, state.limit, state.generation)
        };

        let result = self.loader.fetch(page_no, limit).await;

        let mut state = self.lock();
        if !state.is_current(generation) {
            return Err(ClientError::Closed);
        }

        match result {
            Ok(page) => {
                info!(
                    "Loaded history page {} of {} ({} items)",
                    page_no,
                    page.total_pages,
                    page.items.len()
                );
                state.apply(page_no, page, mode);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to fetch history page {}: {}", page_no, e);
                state.loading = false;
                state.is_initial_load = false;
                state.error = Some(e.user_message(HISTORY_FALLBACK));
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, InfiniteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
